//! REST-XML request serialization.
//!
//! URI members fill the `{placeholder}` slots of the operation's
//! request-URI template; the remaining members become an XML document
//! rooted at the input shape's declared element name.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use crate::error::Error;
use crate::model::{OperationModel, Shape, ShapeRef, ShapeType};
use crate::params::{scalar_to_wire, RequestBody, SerializedRequest};
use crate::serialize::SerializeRequest;

/// Serializer for the REST-XML protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestXmlSerializer;

impl RestXmlSerializer {
    fn fill_uri_template(
        template: &str,
        params: &Value,
        shape: &Shape,
    ) -> Result<String, Error> {
        let mut uri = template.to_string();
        for (member_name, member_ref) in &shape.members {
            if member_ref.location.as_deref() != Some("uri") {
                continue;
            }
            let slot = format!(
                "{{{}}}",
                member_ref.location_name.as_deref().unwrap_or(member_name)
            );
            if !uri.contains(&slot) {
                continue;
            }
            let value = params
                .get(member_name)
                .and_then(scalar_to_wire)
                .ok_or_else(|| {
                    Error::Serialization(format!(
                        "missing required uri parameter '{member_name}'"
                    ))
                })?;
            uri = uri.replace(&slot, &value);
        }
        Ok(uri)
    }

    fn write_xml_body(
        params: &Value,
        input: &ShapeRef,
        shape: &Shape,
        operation: &OperationModel<'_>,
    ) -> Result<Option<String>, Error> {
        let has_body_members = shape
            .members
            .iter()
            .any(|(name, r)| r.location.is_none() && !params.get(name).map_or(true, Value::is_null));
        if !has_body_members {
            return Ok(None);
        }

        let root_name = input.location_name.as_deref().unwrap_or(&input.shape);
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Start(BytesStart::new(root_name)))
            .map_err(xml_write_err)?;
        for (member_name, member_ref) in &shape.members {
            if member_ref.location.is_some() {
                continue;
            }
            let value = match params.get(member_name) {
                Some(Value::Null) | None => continue,
                Some(v) => v,
            };
            let element = member_ref.location_name.as_deref().unwrap_or(member_name);
            write_value(&mut writer, value, element, member_ref, operation)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(root_name)))
            .map_err(xml_write_err)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl SerializeRequest for RestXmlSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut serialized = SerializedRequest::new(operation.http().method.clone());
        serialized.url_path = operation.request_uri().to_string();

        if let Some(input) = operation.input() {
            let shape = operation.resolve(input)?;
            serialized.url_path =
                Self::fill_uri_template(operation.request_uri(), params, shape)?;
            if let Some(xml) = Self::write_xml_body(params, input, shape, operation)? {
                serialized
                    .headers
                    .insert("Content-Type".to_string(), "application/xml".to_string());
                serialized.body = RequestBody::Xml(xml);
            }
        }
        Ok(serialized)
    }
}

fn write_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    value: &Value,
    element: &str,
    shape_ref: &ShapeRef,
    operation: &OperationModel<'_>,
) -> Result<(), Error> {
    let shape = operation.resolve(shape_ref)?;
    match shape.shape_type {
        ShapeType::Structure => {
            writer
                .write_event(Event::Start(BytesStart::new(element)))
                .map_err(xml_write_err)?;
            for (member_name, member_ref) in &shape.members {
                let member_value = match value.get(member_name) {
                    Some(Value::Null) | None => continue,
                    Some(v) => v,
                };
                let child = member_ref.location_name.as_deref().unwrap_or(member_name);
                write_value(writer, member_value, child, member_ref, operation)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(element)))
                .map_err(xml_write_err)?;
        }
        ShapeType::List => {
            let member_ref = shape.member.as_deref().ok_or_else(|| {
                Error::Serialization(format!("list shape at '{element}' has no member shape"))
            })?;
            let items = value.as_array().ok_or_else(|| {
                Error::Serialization(format!("expected a list at '{element}'"))
            })?;
            writer
                .write_event(Event::Start(BytesStart::new(element)))
                .map_err(xml_write_err)?;
            let item_element = member_ref.location_name.as_deref().unwrap_or("member");
            for item in items {
                write_value(writer, item, item_element, member_ref, operation)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(element)))
                .map_err(xml_write_err)?;
        }
        _ => {
            let text = scalar_to_wire(value).ok_or_else(|| {
                Error::Serialization(format!("expected a scalar value at '{element}'"))
            })?;
            writer
                .write_event(Event::Start(BytesStart::new(element)))
                .map_err(xml_write_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(xml_write_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(element)))
                .map_err(xml_write_err)?;
        }
    }
    Ok(())
}

fn xml_write_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Serialization(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceModel;
    use serde_json::json;

    fn model() -> ServiceModel {
        serde_json::from_str(
            r#"{
                "metadata": {
                    "apiVersion": "2012-12-12N2013-12-12",
                    "endpointPrefix": "dns",
                    "protocol": "restxml",
                    "serviceId": "Dns",
                    "signatureVersion": "v2",
                    "endpointTemplate": "https://dns.api.example.com"
                },
                "operations": {
                    "GetHostedZone": {
                        "http": {"method": "GET", "requestUri": "/2012-12-12N2013-12-12/hostedzone/{Id}"},
                        "input": {"shape": "GetHostedZoneRequest"}
                    },
                    "CreateHostedZone": {
                        "http": {"method": "POST", "requestUri": "/2012-12-12N2013-12-12/hostedzone"},
                        "input": {"shape": "CreateHostedZoneRequest", "locationName": "CreateHostedZoneRequest"}
                    }
                },
                "shapes": {
                    "GetHostedZoneRequest": {
                        "type": "structure",
                        "members": {
                            "Id": {"shape": "String", "location": "uri", "locationName": "Id"}
                        }
                    },
                    "CreateHostedZoneRequest": {
                        "type": "structure",
                        "members": {
                            "Name": {"shape": "String"},
                            "HostedZoneConfig": {"shape": "HostedZoneConfig"}
                        }
                    },
                    "HostedZoneConfig": {
                        "type": "structure",
                        "members": {
                            "Comment": {"shape": "String"}
                        }
                    },
                    "String": {"type": "string"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn uri_template_substitution() {
        let m = model();
        let op = m.operation("GetHostedZone").unwrap();
        let serialized = RestXmlSerializer
            .serialize(&json!({"Id": "example.jp"}), &op)
            .unwrap();
        assert_eq!(
            serialized.url_path,
            "/2012-12-12N2013-12-12/hostedzone/example.jp"
        );
        assert_eq!(serialized.body, RequestBody::Empty);
    }

    #[test]
    fn missing_uri_parameter_fails() {
        let m = model();
        let op = m.operation("GetHostedZone").unwrap();
        assert!(RestXmlSerializer.serialize(&json!({}), &op).is_err());
    }

    #[test]
    fn xml_body_from_members() {
        let m = model();
        let op = m.operation("CreateHostedZone").unwrap();
        let serialized = RestXmlSerializer
            .serialize(
                &json!({"Name": "example.jp", "HostedZoneConfig": {"Comment": "zone"}}),
                &op,
            )
            .unwrap();
        match serialized.body {
            RequestBody::Xml(xml) => {
                assert!(xml.starts_with("<CreateHostedZoneRequest>"));
                assert!(xml.contains("<Name>example.jp</Name>"));
                assert!(xml.contains("<Comment>zone</Comment>"));
            }
            other => panic!("expected xml body, got {other:?}"),
        }
    }
}
