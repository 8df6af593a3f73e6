//! Error-envelope parsing for non-2xx responses.
//!
//! Query endpoints answer with `<Response><Errors><Error>...` and
//! REST-XML endpoints with `<ErrorResponse><Error>...`; both carry a
//! `Code`, a `Message`, and usually a request id.

use crate::error::Error;
use crate::parse::xml::XmlNode;

/// Parse a failed response body into [`Error::Api`].
///
/// A body that does not look like a known error envelope still produces
/// an `Api` error so callers always see the HTTP status.
pub fn parse_error_response(service: &str, status_code: u16, body: &[u8]) -> Error {
    let (code, message, request_id) = match XmlNode::parse(body) {
        Ok(root) => {
            let error_node = root.find("Error");
            let code = error_node
                .and_then(|e| e.child("Code"))
                .map(|n| n.text.clone())
                .unwrap_or_else(|| "UnknownError".to_string());
            let message = error_node
                .and_then(|e| e.child("Message"))
                .map(|n| n.text.clone())
                .unwrap_or_else(|| format!("HTTP {status_code} from {service}"));
            let request_id = root
                .find("RequestID")
                .or_else(|| root.find("RequestId"))
                .map(|n| n.text.clone());
            (code, message, request_id)
        }
        Err(_) => {
            let snippet = String::from_utf8_lossy(&body[..body.len().min(200)]).into_owned();
            ("UnknownError".to_string(), snippet, None)
        }
    };

    Error::Api {
        service: service.to_string(),
        code,
        message,
        status_code,
        request_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_envelope() {
        let body = br#"<Response>
            <Errors>
                <Error>
                    <Code>Client.InvalidParameterNotFound.Instance</Code>
                    <Message>The instanceId 'web01' does not exist.</Message>
                </Error>
            </Errors>
            <RequestID>req-9</RequestID>
        </Response>"#;
        let err = parse_error_response("computing", 400, body);
        match err {
            Error::Api {
                service,
                code,
                message,
                status_code,
                request_id,
            } => {
                assert_eq!(service, "computing");
                assert_eq!(code, "Client.InvalidParameterNotFound.Instance");
                assert!(message.contains("web01"));
                assert_eq!(status_code, 400);
                assert_eq!(request_id.as_deref(), Some("req-9"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn rest_xml_error_envelope() {
        let body = br#"<ErrorResponse>
            <Error><Code>NoSuchHostedZone</Code><Message>missing zone</Message></Error>
            <RequestId>r-1</RequestId>
        </ErrorResponse>"#;
        let err = parse_error_response("dns", 404, body);
        match err {
            Error::Api {
                code, request_id, ..
            } => {
                assert_eq!(code, "NoSuchHostedZone");
                assert_eq!(request_id.as_deref(), Some("r-1"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_body_still_yields_api_error() {
        let err = parse_error_response("computing", 502, b"bad gateway");
        match err {
            Error::Api {
                code, status_code, ..
            } => {
                assert_eq!(code, "UnknownError");
                assert_eq!(status_code, 502);
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
