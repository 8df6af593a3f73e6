//! Parsers for NIFCLOUD API response parsing.
//!
//! Computing endpoints render absent optional timestamps and integers
//! as empty elements; the generic grammar would reject those, so the
//! Computing parser maps empty text to null at the leaf hooks.

use serde_json::Value;

use nifcloud_core::error::Error;
use nifcloud_core::model::OperationModel;
use nifcloud_core::parse::{
    default_parse_integer, default_parse_timestamp, ParseResponse, QueryParser, ResponseLeafHooks,
};

/// Leaf hooks that treat an empty string as an absent value.
struct EmptyTolerantLeaves;

impl ResponseLeafHooks for EmptyTolerantLeaves {
    fn parse_timestamp(&self, text: &str) -> Result<Value, Error> {
        if text.is_empty() {
            Ok(Value::Null)
        } else {
            default_parse_timestamp(text)
        }
    }

    fn parse_integer(&self, text: &str) -> Result<Value, Error> {
        if text.is_empty() {
            Ok(Value::Null)
        } else {
            default_parse_integer(text)
        }
    }
}

/// Parser for NIFCLOUD Computing API responses.
pub struct ComputingQueryParser {
    inner: QueryParser<EmptyTolerantLeaves>,
}

impl ComputingQueryParser {
    pub fn new() -> Self {
        Self {
            inner: QueryParser::with_hooks(EmptyTolerantLeaves),
        }
    }
}

impl Default for ComputingQueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseResponse for ComputingQueryParser {
    fn parse(&self, body: &[u8], operation: &OperationModel<'_>) -> Result<Value, Error> {
        self.inner.parse(body, operation)
    }
}
