//! Serializers for NIFCLOUD API request serialization.
//!
//! Each service wraps a generic serializer from the core toolkit and
//! fixes up the handful of operations whose wire format differs from
//! what the generic protocol would produce.

use chrono::NaiveDateTime;
use serde_json::Value;

use nifcloud_core::error::Error;
use nifcloud_core::model::{OperationModel, ShapeRef};
use nifcloud_core::params::{is_truthy, scalar_to_wire, RequestBody, SerializedRequest, WireParams};
use nifcloud_core::serialize::{
    ListKeyStyle, QueryFlavor, QuerySerializeHooks, QuerySerializer, RestXmlSerializer,
    SerializeRequest,
};

/// Timestamp form accepted by the parameter fixups.
const TIMESTAMP_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Restores member-indexed list keys (`Prefix.member.N`) when a list's
/// item shape declares its own wire name; the EC2 default would drop
/// the `.member.` segment for those lists.
struct MemberIndexedLists;

impl QuerySerializeHooks for MemberIndexedLists {
    fn list_key_style(&self, member: &ShapeRef, default: ListKeyStyle) -> ListKeyStyle {
        if member.location_name.is_some() {
            ListKeyStyle::Member
        } else {
            default
        }
    }
}

/// Serializer for the NIFCLOUD Computing API.
pub struct ComputingSerializer {
    inner: QuerySerializer<MemberIndexedLists>,
}

impl ComputingSerializer {
    pub fn new() -> Self {
        Self {
            inner: QuerySerializer::with_hooks(QueryFlavor::Ec2, MemberIndexedLists),
        }
    }
}

impl Default for ComputingSerializer {
    fn default() -> Self {
        Self::new()
    }
}

const USER_DATA_FIX_TARGETS: [&str; 3] = ["RunInstances", "StartInstances", "RebootInstances"];

impl SerializeRequest for ComputingSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut serialized = self.inner.serialize(params, operation)?;
        serialized.url_path = operation.request_uri().to_string();
        if operation.name() == "DescribeLoadBalancers" {
            serialized.body = RequestBody::Query(fix_describe_load_balancers_params(
                params,
                operation.api_version(),
            )?);
        }
        if USER_DATA_FIX_TARGETS.contains(&operation.name()) {
            fix_user_data_param(&mut serialized);
        }
        Ok(serialized)
    }
}

/// Serializer for the NIFCLOUD RDB API.
pub struct RdbSerializer {
    inner: QuerySerializer,
}

impl RdbSerializer {
    pub fn new() -> Self {
        Self {
            inner: QuerySerializer::query(),
        }
    }
}

impl Default for RdbSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeRequest for RdbSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut serialized = self.inner.serialize(params, operation)?;
        serialized.url_path = operation.request_uri().to_string();
        if operation.name() == "NiftyGetMetricStatistics" {
            serialized.body = RequestBody::Query(fix_get_metric_statistics_params(
                params,
                operation.api_version(),
                operation.name(),
            )?);
        }
        Ok(serialized)
    }
}

/// Serializer for the NIFCLOUD NAS API.
pub struct NasSerializer {
    inner: QuerySerializer,
}

impl NasSerializer {
    pub fn new() -> Self {
        Self {
            inner: QuerySerializer::query(),
        }
    }
}

impl Default for NasSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeRequest for NasSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut serialized = self.inner.serialize(params, operation)?;
        serialized.url_path = operation.request_uri().to_string();
        if operation.name() == "GetMetricStatistics" {
            serialized.body = RequestBody::Query(fix_get_metric_statistics_params(
                params,
                operation.api_version(),
                operation.name(),
            )?);
        }
        Ok(serialized)
    }
}

/// Serializer for the NIFCLOUD ESS API.
pub struct EssSerializer {
    inner: QuerySerializer,
}

impl EssSerializer {
    pub fn new() -> Self {
        Self {
            inner: QuerySerializer::query(),
        }
    }
}

impl Default for EssSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeRequest for EssSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        let mut serialized = self.inner.serialize(params, operation)?;
        serialized.url_path = operation.request_uri().to_string();
        if operation.name() == "GetDeliveryLog" {
            serialized.body = RequestBody::Query(fix_get_delivery_log_params(
                params,
                operation.api_version(),
                operation.name(),
            )?);
        }
        Ok(serialized)
    }
}

/// Serializer for the NIFCLOUD DNS API.
pub struct DnsSerializer {
    inner: RestXmlSerializer,
}

impl DnsSerializer {
    pub fn new() -> Self {
        Self {
            inner: RestXmlSerializer,
        }
    }
}

impl Default for DnsSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeRequest for DnsSerializer {
    fn serialize(
        &self,
        params: &Value,
        operation: &OperationModel<'_>,
    ) -> Result<SerializedRequest, Error> {
        // The REST-XML base already derives the path from the
        // operation's requestUri template, uri members substituted.
        self.inner.serialize(params, operation)
    }
}

/// Replacement body for `DescribeLoadBalancers`.
///
/// Each listener descriptor expands to `LoadBalancerNames.member.N`,
/// `LoadBalancerNames.LoadBalancerPort.N`, and
/// `LoadBalancerNames.InstancePort.N`, in input order.
fn fix_describe_load_balancers_params(
    params: &Value,
    api_version: &str,
) -> Result<WireParams, Error> {
    let prefix = "LoadBalancerNames";
    let mut body = WireParams::new();
    body.insert("Action".to_string(), "DescribeLoadBalancers".to_string());
    body.insert("Version".to_string(), api_version.to_string());
    if !is_truthy(params.get(prefix)) {
        return Ok(body);
    }
    let descriptors = required_array(params, prefix)?;
    for (i, descriptor) in descriptors.iter().enumerate() {
        let n = i + 1;
        body.insert(
            format!("{prefix}.member.{n}"),
            required_scalar(descriptor, "LoadBalancerName")?,
        );
        body.insert(
            format!("{prefix}.LoadBalancerPort.{n}"),
            required_scalar(descriptor, "LoadBalancerPort")?,
        );
        body.insert(
            format!("{prefix}.InstancePort.{n}"),
            required_scalar(descriptor, "InstancePort")?,
        );
    }
    Ok(body)
}

/// Rename `UserData.Content` to `UserData` when present and non-empty.
fn fix_user_data_param(serialized: &mut SerializedRequest) {
    let Some(body) = serialized.query_params_mut() else {
        return;
    };
    let content = match body.get("UserData.Content") {
        Some(content) if !content.is_empty() => content.clone(),
        _ => return,
    };
    body.shift_remove("UserData.Content");
    body.insert("UserData".to_string(), content);
}

/// Replacement body for the metric-statistics operations (RDB and NAS).
fn fix_get_metric_statistics_params(
    params: &Value,
    api_version: &str,
    operation_name: &str,
) -> Result<WireParams, Error> {
    let prefix = "Dimensions";
    let mut body = WireParams::new();
    body.insert("Action".to_string(), operation_name.to_string());
    body.insert("Version".to_string(), api_version.to_string());
    if !is_truthy(params.get(prefix)) && !is_truthy(params.get("MetricName")) {
        return Ok(body);
    }
    let dimensions = required_array(params, prefix)?;
    for (i, dimension) in dimensions.iter().enumerate() {
        let n = i + 1;
        body.insert(
            format!("{prefix}.member.{n}.Name"),
            required_scalar(dimension, "Name")?,
        );
        body.insert(
            format!("{prefix}.member.{n}.Value"),
            required_scalar(dimension, "Value")?,
        );
    }
    body.insert(
        "MetricName".to_string(),
        required_scalar(params, "MetricName")?,
    );
    // Convert from %Y-%m-%dT%H:%M:%SZ to %Y-%m-%d %H:%M
    for key in ["StartTime", "EndTime"] {
        if is_truthy(params.get(key)) {
            body.insert(
                key.to_string(),
                reformat_timestamp(params, key, "%Y-%m-%d %H:%M")?,
            );
        }
    }
    Ok(body)
}

/// Replacement body for `GetDeliveryLog` (ESS).
fn fix_get_delivery_log_params(
    params: &Value,
    api_version: &str,
    operation_name: &str,
) -> Result<WireParams, Error> {
    let mut body = WireParams::new();
    body.insert("Action".to_string(), operation_name.to_string());
    body.insert("Version".to_string(), api_version.to_string());
    for key in ["Status", "MaxItems", "NextToken"] {
        if is_truthy(params.get(key)) {
            body.insert(key.to_string(), required_scalar(params, key)?);
        }
    }
    // Convert from %Y-%m-%dT%H:%M:%SZ to %Y-%m-%dT%H:%M
    for key in ["StartDate", "EndDate"] {
        if is_truthy(params.get(key)) {
            body.insert(
                key.to_string(),
                reformat_timestamp(params, key, "%Y-%m-%dT%H:%M")?,
            );
        }
    }
    Ok(body)
}

fn required_array<'a>(params: &'a Value, key: &str) -> Result<&'a Vec<Value>, Error> {
    params
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Serialization(format!("'{key}' must be a list")))
}

fn required_scalar(params: &Value, key: &str) -> Result<String, Error> {
    params
        .get(key)
        .and_then(scalar_to_wire)
        .ok_or_else(|| Error::Serialization(format!("missing required parameter '{key}'")))
}

fn reformat_timestamp(params: &Value, key: &str, output_format: &str) -> Result<String, Error> {
    let text = params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Serialization(format!("'{key}' must be a timestamp string")))?;
    let parsed = NaiveDateTime::parse_from_str(text, TIMESTAMP_INPUT_FORMAT)
        .map_err(|e| Error::Serialization(format!("invalid timestamp '{text}' for '{key}': {e}")))?;
    Ok(parsed.format(output_format).to_string())
}
