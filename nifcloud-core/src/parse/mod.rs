//! Response parsing.
//!
//! Parsers turn an XML response body into JSON-shaped output guided by
//! the operation's output shape. Scalar leaves go through
//! [`ResponseLeafHooks`] so a wrapping parser can change leaf behavior
//! (e.g. empty-string handling) without touching structure handling.

mod envelope;
mod query;
mod xml;

pub use envelope::parse_error_response;
pub use query::{QueryParser, RestXmlParser};

use chrono::{NaiveDateTime, SecondsFormat};
use serde_json::Value;

use crate::error::Error;
use crate::model::OperationModel;

/// Parse a successful response body into output data.
pub trait ParseResponse: Send + Sync {
    fn parse(&self, body: &[u8], operation: &OperationModel<'_>) -> Result<Value, Error>;
}

/// Overridable scalar-leaf conversions.
pub trait ResponseLeafHooks: Send + Sync {
    fn parse_timestamp(&self, text: &str) -> Result<Value, Error> {
        default_parse_timestamp(text)
    }

    fn parse_integer(&self, text: &str) -> Result<Value, Error> {
        default_parse_integer(text)
    }
}

/// Hooks that keep the generic leaf grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLeafHooks;

impl ResponseLeafHooks for DefaultLeafHooks {}

/// Generic timestamp grammar: ISO-8601, rendered back in normalized
/// `YYYY-MM-DDThh:mm:ssZ` form.
pub fn default_parse_timestamp(text: &str) -> Result<Value, Error> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(Value::String(
            dt.with_timezone(&chrono::Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
    }
    // Some endpoints omit the zone designator.
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Value::String(
            naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
    }
    Err(Error::ResponseParse(format!("invalid timestamp '{text}'")))
}

/// Generic integer grammar.
pub fn default_parse_integer(text: &str) -> Result<Value, Error> {
    text.parse::<i64>()
        .map(Value::from)
        .map_err(|_| Error::ResponseParse(format!("invalid integer '{text}'")))
}
