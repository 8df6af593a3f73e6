//! Request serialization.
//!
//! Each wire protocol gets a serializer that turns caller parameters
//! plus an operation model into a [`SerializedRequest`]. Provider layers
//! wrap these via delegation and post-process the result; the list-key
//! seam ([`QuerySerializeHooks`]) lets a wrapper change list naming
//! without reimplementing the structural walk.

mod query;
mod rest_xml;

pub use query::{
    DefaultQueryHooks, ListKeyStyle, QueryFlavor, QuerySerializeHooks, QuerySerializer,
};
pub use rest_xml::RestXmlSerializer;

use serde_json::Value;

use crate::error::Error;
use crate::model::OperationModel;
use crate::params::SerializedRequest;

/// Serialize caller parameters into a wire request.
pub trait SerializeRequest: Send + Sync {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error>;
}
