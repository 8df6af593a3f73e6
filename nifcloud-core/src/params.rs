//! Request parameter and serialized-request data types.
//!
//! Caller input is plain `serde_json::Value`; the wire body is an
//! ordered string map so member-indexed keys keep their input order.

use indexmap::IndexMap;
use serde_json::Value;

/// Ordered wire-parameter map (wire key -> rendered string value).
pub type WireParams = IndexMap<String, String>;

/// Body of a serialized request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// URL-form-encoded key/value pairs (query-style protocols).
    Query(WireParams),
    /// XML document (REST-XML protocol).
    Xml(String),
    Empty,
}

/// A request after protocol serialization, before signing.
#[derive(Debug, Clone)]
pub struct SerializedRequest {
    pub method: String,
    pub url_path: String,
    pub headers: IndexMap<String, String>,
    pub body: RequestBody,
}

impl SerializedRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url_path: "/".to_string(),
            headers: IndexMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Mutable access to the query body, if this request has one.
    pub fn query_params_mut(&mut self) -> Option<&mut WireParams> {
        match &mut self.body {
            RequestBody::Query(params) => Some(params),
            _ => None,
        }
    }

    pub fn query_params(&self) -> Option<&WireParams> {
        match &self.body {
            RequestBody::Query(params) => Some(params),
            _ => None,
        }
    }
}

/// Presence check used by parameter fixups: a key counts as present only
/// when its value is truthy (non-empty string/list/object, non-zero
/// number, `true`).
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
    }
}

/// Render a scalar JSON value to its wire string form.
pub fn scalar_to_wire(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
