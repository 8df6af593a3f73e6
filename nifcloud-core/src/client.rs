//! Service client and request pipeline.
//!
//! One `call` drives the full cycle: resolve operation, serialize,
//! sign, send, map the error envelope, parse. Retries and credential
//! resolution are deliberately out of scope; failures surface
//! unchanged.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use url::Url;

use crate::auth::{query_encode, QuerySigner};
use crate::credentials::Credentials;
use crate::error::Error;
use crate::model::{ServiceMetadata, ServiceModel};
use crate::params::RequestBody;
use crate::parse::{parse_error_response, ParseResponse};
use crate::registry::{AuthRegistry, ProtocolRegistry};
use crate::serialize::SerializeRequest;
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest, Verify};

/// Generic client construction parameters.
///
/// Field names follow the toolkit's conventions; provider layers map
/// their own parameter names onto these.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service_name: String,
    pub region_name: Option<String>,
    pub api_version: Option<String>,
    pub use_ssl: bool,
    pub verify: Verify,
    pub endpoint_url: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub user_agent_name: String,
    pub user_agent_version: String,
    pub user_agent_extra: String,
}

impl ClientConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            region_name: None,
            api_version: None,
            use_ssl: true,
            verify: Verify::Enabled,
            endpoint_url: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            user_agent_name: "nifcloud-core".to_string(),
            user_agent_version: env!("CARGO_PKG_VERSION").to_string(),
            user_agent_extra: String::new(),
        }
    }
}

/// A client bound to one service, one protocol adapter pair, and one
/// credential set.
pub struct Client {
    service_name: String,
    model: ServiceModel,
    serializer: Arc<dyn SerializeRequest>,
    parser: Arc<dyn ParseResponse>,
    signer: Arc<dyn QuerySigner>,
    credentials: Credentials,
    endpoint: Url,
    user_agent: String,
    transport: Box<dyn HttpTransport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service_name", &self.service_name)
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client from generic configuration plus the registries
    /// owned by the caller.
    pub fn from_config(
        config: ClientConfig,
        model: ServiceModel,
        protocols: &ProtocolRegistry,
        auth: &AuthRegistry,
    ) -> Result<Self, Error> {
        let access_key_id = config
            .aws_access_key_id
            .clone()
            .ok_or_else(|| Error::InvalidConfig("an access key id is required".to_string()))?;
        let secret = config
            .aws_secret_access_key
            .clone()
            .ok_or_else(|| Error::InvalidConfig("a secret access key is required".to_string()))?;
        let credentials =
            Credentials::new(access_key_id, secret, config.aws_session_token.clone());

        let protocol = &model.metadata.protocol;
        let serializer = protocols.serializer(protocol).ok_or_else(|| {
            Error::InvalidConfig(format!("no serializer registered for protocol '{protocol}'"))
        })?;
        let parser = protocols.parser(protocol).ok_or_else(|| {
            Error::InvalidConfig(format!("no parser registered for protocol '{protocol}'"))
        })?;
        let scheme = &model.metadata.signature_version;
        let signer = auth.signer(scheme).ok_or_else(|| {
            Error::InvalidConfig(format!("no signer registered for auth scheme '{scheme}'"))
        })?;

        let endpoint = resolve_endpoint(&config, &model.metadata)?;
        let user_agent = format!(
            "{}/{} {}",
            config.user_agent_name, config.user_agent_version, config.user_agent_extra
        )
        .trim_end()
        .to_string();

        tracing::debug!(
            service = %config.service_name,
            endpoint = %endpoint,
            protocol = %protocol,
            "constructed client"
        );

        Ok(Self {
            service_name: config.service_name,
            model,
            serializer,
            parser,
            signer,
            credentials,
            endpoint,
            user_agent,
            transport: Box::new(ReqwestTransport::new(config.verify)),
        })
    }

    /// Replace the transport (test doubles, embedded stacks).
    pub fn with_transport(mut self, transport: Box<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn transport_mut(&mut self) -> &mut dyn HttpTransport {
        self.transport.as_mut()
    }

    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    pub fn service_model(&self) -> &ServiceModel {
        &self.model
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Invoke a modeled operation.
    pub async fn call(&self, operation_name: &str, params: Value) -> Result<Value, Error> {
        let operation = self.model.operation(operation_name)?;
        let mut serialized = self.serializer.serialize(&params, &operation)?;

        let host = self
            .endpoint
            .host_str()
            .ok_or_else(|| Error::InvalidConfig("endpoint has no host".to_string()))?
            .to_string();
        let method = serialized.method.clone();
        let path = serialized.url_path.clone();
        if let Some(body_params) = serialized.query_params_mut() {
            self.signer.add_auth(
                &method,
                &host,
                &path,
                body_params,
                &self.credentials,
                Utc::now(),
            )?;
        }

        let url = self
            .endpoint
            .join(&serialized.url_path)
            .map_err(|e| Error::InvalidConfig(format!("invalid request uri: {e}")))?;
        let body = match &serialized.body {
            RequestBody::Query(params) => params
                .iter()
                .map(|(k, v)| format!("{}={}", query_encode(k), query_encode(v)))
                .collect::<Vec<_>>()
                .join("&")
                .into_bytes(),
            RequestBody::Xml(xml) => xml.clone().into_bytes(),
            RequestBody::Empty => Vec::new(),
        };

        let mut headers = serialized.headers.clone();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());

        tracing::debug!(
            service = %self.service_name,
            operation = operation_name,
            url = %url,
            "dispatching request"
        );
        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(parse_error_response(
                &self.service_name,
                response.status,
                &response.body,
            ));
        }
        self.parser.parse(&response.body, &operation)
    }
}

fn resolve_endpoint(config: &ClientConfig, metadata: &ServiceMetadata) -> Result<Url, Error> {
    let raw = match &config.endpoint_url {
        Some(url) => url.clone(),
        None => {
            let template = &metadata.endpoint_template;
            if template.contains("{region}") {
                let region = config.region_name.as_deref().ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "region_name is required for service '{}'",
                        config.service_name
                    ))
                })?;
                template.replace("{region}", region)
            } else {
                template.clone()
            }
        }
    };
    let mut url = Url::parse(&raw)
        .map_err(|e| Error::InvalidConfig(format!("invalid endpoint '{raw}': {e}")))?;
    if !config.use_ssl {
        url.set_scheme("http")
            .map_err(|_| Error::InvalidConfig(format!("cannot disable ssl for '{raw}'")))?;
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SigV2Signer;
    use crate::parse::QueryParser;
    use crate::serialize::QuerySerializer;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use indexmap::IndexMap;
    use std::sync::Mutex;

    fn model() -> ServiceModel {
        serde_json::from_str(
            r#"{
                "metadata": {
                    "apiVersion": "3.0",
                    "endpointPrefix": "svc",
                    "protocol": "query",
                    "serviceId": "Svc",
                    "signatureVersion": "v2",
                    "endpointTemplate": "https://svc.{region}.api.example.com"
                },
                "operations": {
                    "DescribeWidgets": {
                        "http": {"method": "POST", "requestUri": "/api/"},
                        "output": {"shape": "DescribeWidgetsResult", "resultWrapper": "DescribeWidgetsResult"}
                    }
                },
                "shapes": {
                    "DescribeWidgetsResult": {
                        "type": "structure",
                        "members": {"Count": {"shape": "Integer"}}
                    },
                    "Integer": {"type": "integer"}
                }
            }"#,
        )
        .unwrap()
    }

    fn registries() -> (ProtocolRegistry, AuthRegistry) {
        let mut protocols = ProtocolRegistry::new();
        protocols.register_serializer("query", Arc::new(QuerySerializer::query()));
        protocols.register_parser("query", Arc::new(QueryParser::new()));
        let mut auth = AuthRegistry::new();
        auth.register("v2", Arc::new(SigV2Signer));
        (protocols, auth)
    }

    fn config() -> ClientConfig {
        let mut config = ClientConfig::new("svc");
        config.region_name = Some("east-1".to_string());
        config.aws_access_key_id = Some("AKID".to_string());
        config.aws_secret_access_key = Some("secret".to_string());
        config
    }

    struct CapturingTransport {
        captured: Arc<Mutex<Option<TransportRequest>>>,
        response_body: &'static str,
    }

    #[async_trait]
    impl HttpTransport for CapturingTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
            *self.captured.lock().unwrap() = Some(request);
            Ok(TransportResponse {
                status: 200,
                headers: IndexMap::new(),
                body: self.response_body.as_bytes().to_vec(),
            })
        }
    }

    #[test]
    fn endpoint_from_template() {
        let (protocols, auth) = registries();
        let client = Client::from_config(config(), model(), &protocols, &auth).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://svc.east-1.api.example.com/"
        );
    }

    #[test]
    fn endpoint_override_wins() {
        let (protocols, auth) = registries();
        let mut cfg = config();
        cfg.endpoint_url = Some("https://localhost:8443".to_string());
        let client = Client::from_config(cfg, model(), &protocols, &auth).unwrap();
        assert_eq!(client.endpoint().host_str(), Some("localhost"));
    }

    #[test]
    fn region_required_by_template() {
        let (protocols, auth) = registries();
        let mut cfg = config();
        cfg.region_name = None;
        assert!(matches!(
            Client::from_config(cfg, model(), &protocols, &auth),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn credentials_required() {
        let (protocols, auth) = registries();
        let mut cfg = config();
        cfg.aws_secret_access_key = None;
        assert!(matches!(
            Client::from_config(cfg, model(), &protocols, &auth),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn call_signs_and_parses() {
        let (protocols, auth) = registries();
        let captured = Arc::new(Mutex::new(None));
        let client = Client::from_config(config(), model(), &protocols, &auth)
            .unwrap()
            .with_transport(Box::new(CapturingTransport {
                captured: Arc::clone(&captured),
                response_body: r#"<DescribeWidgetsResponse>
                    <DescribeWidgetsResult><Count>3</Count></DescribeWidgetsResult>
                    <ResponseMetadata><RequestId>r-1</RequestId></ResponseMetadata>
                </DescribeWidgetsResponse>"#,
            }));

        let parsed = client
            .call("DescribeWidgets", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(parsed["Count"], serde_json::json!(3));
        assert_eq!(parsed["ResponseMetadata"]["RequestId"], serde_json::json!("r-1"));

        let request = captured.lock().unwrap().take().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.url.path(), "/api/");
        let body = String::from_utf8(request.body).unwrap();
        assert!(body.contains("Action=DescribeWidgets"));
        assert!(body.contains("AWSAccessKeyId=AKID"));
        assert!(body.contains("Signature="));
        assert_eq!(
            request.headers.get("User-Agent").map(String::as_str),
            Some(client.user_agent())
        );
    }

    #[tokio::test]
    async fn non_2xx_maps_to_api_error() {
        let (protocols, auth) = registries();

        struct FailingTransport;
        #[async_trait]
        impl HttpTransport for FailingTransport {
            async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, Error> {
                Ok(TransportResponse {
                    status: 400,
                    headers: IndexMap::new(),
                    body: br#"<Response><Errors><Error><Code>Oops</Code><Message>m</Message></Error></Errors></Response>"#.to_vec(),
                })
            }
        }

        let client = Client::from_config(config(), model(), &protocols, &auth)
            .unwrap()
            .with_transport(Box::new(FailingTransport));
        let err = client
            .call("DescribeWidgets", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { code, .. } if code == "Oops"));
    }
}
