//! Error handling for the SDK core.
//!
//! One error enum is shared across the whole workspace. Service API
//! failures carry the provider's error code and request id; transport
//! and parsing failures pass through with their source message.

use thiserror::Error;

/// Errors produced by the SDK core and the layers built on it.
#[derive(Debug, Error)]
pub enum Error {
    /// No service model data exists for the requested service.
    #[error("unknown service '{0}'")]
    UnknownService(String),

    /// The requested API version does not match the shipped model data.
    #[error("no model data for service '{service}' with api version '{requested}'")]
    ApiVersionNotFound { service: String, requested: String },

    /// The service model does not define the requested operation.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// The service model data is malformed.
    #[error("invalid service model: {0}")]
    InvalidModel(String),

    /// Request parameters could not be serialized to the wire format.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Client construction was given an unusable configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The service rejected the request.
    #[error("{service} returned {code}: {message} (HTTP {status_code})")]
    Api {
        service: String,
        code: String,
        message: String,
        status_code: u16,
        request_id: Option<String>,
    },

    /// Transport-level failure (connect, timeout, TLS, ...).
    #[error("http transport error: {0}")]
    Http(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidModel(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::ResponseParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = Error::Api {
            service: "computing".to_string(),
            code: "Client.InvalidParameterValue".to_string(),
            message: "bad instance id".to_string(),
            status_code: 400,
            request_id: Some("req-1".to_string()),
        };
        let s = err.to_string();
        assert!(s.contains("computing"));
        assert!(s.contains("Client.InvalidParameterValue"));
        assert!(s.contains("400"));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidModel(_)));
    }
}
