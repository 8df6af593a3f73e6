//! Query and REST-XML response parsers.
//!
//! The structural walk is shared; the protocols differ only in where
//! the output shape's data starts (result wrapper vs. document root)
//! and in response-metadata placement.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::{OperationModel, ShapeRef, ShapeType};
use crate::parse::xml::XmlNode;
use crate::parse::{DefaultLeafHooks, ParseResponse, ResponseLeafHooks};

/// Parser for query-protocol responses
/// (`<OperationName>Response` envelope, optional result wrapper).
pub struct QueryParser<H: ResponseLeafHooks = DefaultLeafHooks> {
    hooks: H,
}

impl QueryParser {
    pub fn new() -> Self {
        Self {
            hooks: DefaultLeafHooks,
        }
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ResponseLeafHooks> QueryParser<H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self { hooks }
    }
}

impl<H: ResponseLeafHooks> ParseResponse for QueryParser<H> {
    fn parse(&self, body: &[u8], operation: &OperationModel<'_>) -> Result<Value, Error> {
        let root = XmlNode::parse(body)?;

        let mut parsed = Map::new();
        if let Some(output) = operation.output() {
            let start = output
                .result_wrapper
                .as_deref()
                .and_then(|wrapper| root.child(wrapper))
                .unwrap_or(&root);
            let shape = operation.resolve(output)?;
            if shape.shape_type == ShapeType::Structure {
                parse_structure(&mut parsed, start, output, operation, &self.hooks)?;
            }
        }

        if let Some(request_id) = response_request_id(&root) {
            let mut metadata = Map::new();
            metadata.insert("RequestId".to_string(), Value::String(request_id));
            parsed.insert("ResponseMetadata".to_string(), Value::Object(metadata));
        }
        Ok(Value::Object(parsed))
    }
}

/// Parser for REST-XML responses (output shape at the document root).
pub struct RestXmlParser<H: ResponseLeafHooks = DefaultLeafHooks> {
    hooks: H,
}

impl RestXmlParser {
    pub fn new() -> Self {
        Self {
            hooks: DefaultLeafHooks,
        }
    }
}

impl Default for RestXmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ResponseLeafHooks> ParseResponse for RestXmlParser<H> {
    fn parse(&self, body: &[u8], operation: &OperationModel<'_>) -> Result<Value, Error> {
        let mut parsed = Map::new();
        if let Some(output) = operation.output() {
            let root = XmlNode::parse(body)?;
            let shape = operation.resolve(output)?;
            if shape.shape_type == ShapeType::Structure {
                parse_structure(&mut parsed, &root, output, operation, &self.hooks)?;
            }
        }
        Ok(Value::Object(parsed))
    }
}

/// Request id from either the query envelope
/// (`ResponseMetadata/RequestId`) or the EC2 envelope (`requestId`).
fn response_request_id(root: &XmlNode) -> Option<String> {
    root.child("ResponseMetadata")
        .and_then(|m| m.child("RequestId"))
        .or_else(|| root.child("requestId"))
        .or_else(|| root.child("RequestID"))
        .map(|n| n.text.clone())
}

fn parse_structure(
    out: &mut Map<String, Value>,
    node: &XmlNode,
    shape_ref: &ShapeRef,
    operation: &OperationModel<'_>,
    hooks: &dyn ResponseLeafHooks,
) -> Result<(), Error> {
    let shape = operation.resolve(shape_ref)?;
    for (member_name, member_ref) in &shape.members {
        let element = member_ref.location_name.as_deref().unwrap_or(member_name);
        let Some(child) = node.child(element) else {
            continue;
        };
        let value = parse_value(child, member_ref, operation, hooks)?;
        out.insert(member_name.clone(), value);
    }
    Ok(())
}

fn parse_value(
    node: &XmlNode,
    shape_ref: &ShapeRef,
    operation: &OperationModel<'_>,
    hooks: &dyn ResponseLeafHooks,
) -> Result<Value, Error> {
    let shape = operation.resolve(shape_ref)?;
    match shape.shape_type {
        ShapeType::Structure => {
            let mut out = Map::new();
            parse_structure(&mut out, node, shape_ref, operation, hooks)?;
            Ok(Value::Object(out))
        }
        ShapeType::List => {
            let member_ref = shape.member.as_deref().ok_or_else(|| {
                Error::ResponseParse(format!("list shape at '{}' has no member shape", node.name))
            })?;
            let item_element = member_ref.location_name.as_deref().unwrap_or("member");
            let mut items = Vec::new();
            for item in node.children_named(item_element) {
                items.push(parse_value(item, member_ref, operation, hooks)?);
            }
            Ok(Value::Array(items))
        }
        ShapeType::String | ShapeType::Blob => Ok(Value::String(node.text.clone())),
        ShapeType::Integer | ShapeType::Long => hooks.parse_integer(&node.text),
        ShapeType::Timestamp => hooks.parse_timestamp(&node.text),
        ShapeType::Float | ShapeType::Double => node
            .text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| Error::ResponseParse(format!("invalid number '{}'", node.text))),
        ShapeType::Boolean => match node.text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(Error::ResponseParse(format!("invalid boolean '{other}'"))),
        },
    }
}
