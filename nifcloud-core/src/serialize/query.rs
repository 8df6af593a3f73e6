//! Query-protocol request serialization.
//!
//! Flattens structured parameters into `Key.SubKey.N` wire parameters.
//! Two flavors exist: the plain query convention (lists as
//! `Prefix.member.N`) and the EC2 convention (lists as `Prefix.N`,
//! member names capitalized from their `locationName`).

use base64::Engine;
use serde_json::Value;

use crate::error::Error;
use crate::model::{OperationModel, Shape, ShapeRef, ShapeType};
use crate::params::{scalar_to_wire, RequestBody, SerializedRequest, WireParams};
use crate::serialize::SerializeRequest;

/// Key convention for serializing a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKeyStyle {
    /// `Prefix.<memberName>.N`: the member's `locationName` (default
    /// `member`) is kept as a key segment.
    Member,
    /// `Prefix.N`, with no member segment.
    Flat,
}

/// Seam for wrappers that need to change list naming per shape.
pub trait QuerySerializeHooks: Send + Sync {
    /// Decide the key style for a list whose item shape is `member`.
    fn list_key_style(&self, member: &ShapeRef, default: ListKeyStyle) -> ListKeyStyle {
        let _ = member;
        default
    }
}

/// Hooks that keep the protocol defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryHooks;

impl QuerySerializeHooks for DefaultQueryHooks {}

/// Naming flavor of the query protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFlavor {
    Query,
    Ec2,
}

/// Serializer for the query protocol family.
pub struct QuerySerializer<H: QuerySerializeHooks = DefaultQueryHooks> {
    flavor: QueryFlavor,
    hooks: H,
}

impl QuerySerializer {
    /// Plain query convention.
    pub fn query() -> Self {
        Self {
            flavor: QueryFlavor::Query,
            hooks: DefaultQueryHooks,
        }
    }

    /// EC2 convention.
    pub fn ec2() -> Self {
        Self {
            flavor: QueryFlavor::Ec2,
            hooks: DefaultQueryHooks,
        }
    }
}

impl<H: QuerySerializeHooks> QuerySerializer<H> {
    pub fn with_hooks(flavor: QueryFlavor, hooks: H) -> Self {
        Self { flavor, hooks }
    }

    /// Wire name for a structure member.
    fn member_key(&self, member: &ShapeRef, member_name: &str) -> String {
        match (&member.location_name, self.flavor) {
            (Some(name), QueryFlavor::Ec2) => capitalize(name),
            (Some(name), QueryFlavor::Query) => name.clone(),
            (None, _) => member_name.to_string(),
        }
    }

    fn default_list_style(&self) -> ListKeyStyle {
        match self.flavor {
            QueryFlavor::Query => ListKeyStyle::Member,
            QueryFlavor::Ec2 => ListKeyStyle::Flat,
        }
    }

    fn serialize_value(
        &self,
        out: &mut WireParams,
        value: &Value,
        shape_ref: &ShapeRef,
        prefix: &str,
        operation: &OperationModel<'_>,
    ) -> Result<(), Error> {
        let shape = operation.resolve(shape_ref)?;
        match shape.shape_type {
            ShapeType::Structure => self.serialize_structure(out, value, shape, prefix, operation),
            ShapeType::List => self.serialize_list(out, value, shape, prefix, operation),
            ShapeType::Blob => {
                let text = value.as_str().ok_or_else(|| {
                    Error::Serialization(format!("expected a string for blob at '{prefix}'"))
                })?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
                out.insert(prefix.to_string(), encoded);
                Ok(())
            }
            _ => {
                let rendered = scalar_to_wire(value).ok_or_else(|| {
                    Error::Serialization(format!("expected a scalar value at '{prefix}'"))
                })?;
                out.insert(prefix.to_string(), rendered);
                Ok(())
            }
        }
    }

    fn serialize_structure(
        &self,
        out: &mut WireParams,
        value: &Value,
        shape: &Shape,
        prefix: &str,
        operation: &OperationModel<'_>,
    ) -> Result<(), Error> {
        let object = value.as_object().ok_or_else(|| {
            Error::Serialization(format!("expected an object at '{prefix}'"))
        })?;
        for (member_name, member_ref) in &shape.members {
            let member_value = match object.get(member_name) {
                Some(Value::Null) | None => continue,
                Some(v) => v,
            };
            let key = self.member_key(member_ref, member_name);
            let child_prefix = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };
            self.serialize_value(out, member_value, member_ref, &child_prefix, operation)?;
        }
        Ok(())
    }

    fn serialize_list(
        &self,
        out: &mut WireParams,
        value: &Value,
        shape: &Shape,
        prefix: &str,
        operation: &OperationModel<'_>,
    ) -> Result<(), Error> {
        let member_ref = shape.member.as_deref().ok_or_else(|| {
            Error::Serialization(format!("list shape at '{prefix}' has no member shape"))
        })?;
        let items = value.as_array().ok_or_else(|| {
            Error::Serialization(format!("expected a list at '{prefix}'"))
        })?;
        if items.is_empty() {
            out.insert(prefix.to_string(), String::new());
            return Ok(());
        }

        let style = self
            .hooks
            .list_key_style(member_ref, self.default_list_style());
        let list_prefix = match style {
            ListKeyStyle::Member => {
                let segment = member_ref.location_name.as_deref().unwrap_or("member");
                format!("{prefix}.{segment}")
            }
            ListKeyStyle::Flat => prefix.to_string(),
        };
        for (i, item) in items.iter().enumerate() {
            let element_prefix = format!("{list_prefix}.{}", i + 1);
            self.serialize_value(out, item, member_ref, &element_prefix, operation)?;
        }
        Ok(())
    }
}

impl<H: QuerySerializeHooks> SerializeRequest for QuerySerializer<H> {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut body = WireParams::new();
        body.insert("Action".to_string(), operation.name().to_string());
        body.insert("Version".to_string(), operation.api_version().to_string());

        if let Some(input) = operation.input() {
            let shape = operation.resolve(input)?;
            if !params.is_null() {
                self.serialize_structure(&mut body, params, shape, "", operation)?;
            }
        }

        // The query family posts to the endpoint root; wrappers that
        // need the operation's requestUri override the path themselves.
        let mut serialized = SerializedRequest::new(operation.http().method.clone());
        serialized.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        );
        serialized.body = RequestBody::Query(body);
        Ok(serialized)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
