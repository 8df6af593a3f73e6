//! Data-driven service model catalog.
//!
//! Service definitions are JSON documents enumerating operations and
//! shapes. The catalog drives serialization, parsing, endpoint
//! resolution, and auth selection; nothing about a service is hard-coded
//! in the request pipeline.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::Error;

/// A complete service definition loaded from the data catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceModel {
    pub metadata: ServiceMetadata,
    pub operations: HashMap<String, Operation>,
    pub shapes: HashMap<String, Shape>,
}

/// Service-level metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    pub api_version: String,
    pub endpoint_prefix: String,
    /// Wire protocol name; keys the protocol registry.
    pub protocol: String,
    pub service_id: String,
    pub signature_version: String,
    /// Endpoint URL template; `{region}` is substituted when present.
    pub endpoint_template: String,
}

/// One remote operation.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub http: HttpSpec,
    #[serde(default)]
    pub input: Option<ShapeRef>,
    #[serde(default)]
    pub output: Option<ShapeRef>,
}

/// HTTP method and request-URI template for an operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSpec {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub request_uri: Option<String>,
}

fn default_method() -> String {
    "POST".to_string()
}

/// Reference from a member slot to a shape, with optional wire naming.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRef {
    pub shape: String,
    #[serde(default)]
    pub location_name: Option<String>,
    /// Binding of the member outside the body (e.g. `uri`).
    #[serde(default)]
    pub location: Option<String>,
    /// Response envelope element the result is nested under.
    #[serde(default)]
    pub result_wrapper: Option<String>,
}

/// A schema node describing a parameter's type and wire naming.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    /// Structure members, in declaration order.
    #[serde(default)]
    pub members: IndexMap<String, ShapeRef>,
    /// List item shape.
    #[serde(default)]
    pub member: Option<Box<ShapeRef>>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Structure,
    List,
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Timestamp,
    Blob,
}

impl ShapeType {
    pub fn is_scalar(self) -> bool {
        !matches!(self, ShapeType::Structure | ShapeType::List)
    }
}

/// View of one operation resolved against its service model.
#[derive(Debug, Clone, Copy)]
pub struct OperationModel<'a> {
    name: &'a str,
    operation: &'a Operation,
    service: &'a ServiceModel,
}

impl ServiceModel {
    /// Resolve an operation by name.
    pub fn operation<'a>(&'a self, name: &'a str) -> Result<OperationModel<'a>, Error> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        Ok(OperationModel {
            name,
            operation,
            service: self,
        })
    }

    /// Look up a shape by name; the model is malformed if a referenced
    /// shape is missing.
    pub fn shape(&self, name: &str) -> Result<&Shape, Error> {
        self.shapes
            .get(name)
            .ok_or_else(|| Error::InvalidModel(format!("shape '{name}' is not defined")))
    }
}

impl<'a> OperationModel<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn api_version(&self) -> &'a str {
        &self.service.metadata.api_version
    }

    pub fn http(&self) -> &'a HttpSpec {
        &self.operation.http
    }

    /// Request-URI template, defaulting to `/` when the model omits it.
    pub fn request_uri(&self) -> &'a str {
        self.operation
            .http
            .request_uri
            .as_deref()
            .unwrap_or("/")
    }

    pub fn input(&self) -> Option<&'a ShapeRef> {
        self.operation.input.as_ref()
    }

    pub fn output(&self) -> Option<&'a ShapeRef> {
        self.operation.output.as_ref()
    }

    pub fn service(&self) -> &'a ServiceModel {
        self.service
    }

    pub fn resolve(&self, shape_ref: &ShapeRef) -> Result<&'a Shape, Error> {
        self.service.shape(&shape_ref.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> ServiceModel {
        serde_json::from_str(
            r#"{
                "metadata": {
                    "apiVersion": "2.1",
                    "endpointPrefix": "example",
                    "protocol": "query",
                    "serviceId": "Example",
                    "signatureVersion": "v2",
                    "endpointTemplate": "https://example.{region}.api.example.com"
                },
                "operations": {
                    "DoThing": {
                        "http": {"method": "POST", "requestUri": "/api/"},
                        "input": {"shape": "DoThingRequest"}
                    }
                },
                "shapes": {
                    "DoThingRequest": {
                        "type": "structure",
                        "members": {
                            "Name": {"shape": "String", "locationName": "name"}
                        }
                    },
                    "String": {"type": "string"}
                }
            }"#,
        )
        .expect("model parses")
    }

    #[test]
    fn operation_lookup() {
        let model = sample_model();
        let op = model.operation("DoThing").unwrap();
        assert_eq!(op.name(), "DoThing");
        assert_eq!(op.api_version(), "2.1");
        assert_eq!(op.request_uri(), "/api/");
    }

    #[test]
    fn unknown_operation() {
        let model = sample_model();
        assert!(matches!(
            model.operation("Nope"),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn member_location_name() {
        let model = sample_model();
        let op = model.operation("DoThing").unwrap();
        let input = op.input().unwrap();
        let shape = op.resolve(input).unwrap();
        assert_eq!(shape.shape_type, ShapeType::Structure);
        let member = shape.members.get("Name").unwrap();
        assert_eq!(member.location_name.as_deref(), Some("name"));
    }
}
