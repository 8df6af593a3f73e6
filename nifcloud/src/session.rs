//! NIFCLOUD session management.
//!
//! A [`Session`] owns the protocol and auth registries, the model
//! catalog loader, and the user-agent identity, and hands out clients
//! bound to NIFCLOUD's protocol adapters. Every client shares one TLS
//! context carrying the platform default ciphers plus `AES256-SHA256`.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;

use nifcloud_core::client::{Client, ClientConfig};
use nifcloud_core::error::Error;
use nifcloud_core::loader::Loader;
use nifcloud_core::parse::{QueryParser, RestXmlParser};
use nifcloud_core::registry::{AuthRegistry, ProtocolRegistry};
use nifcloud_core::tls::TlsContext;
use nifcloud_core::transport::Verify;

use crate::auth::SigV2ComputingAuth;
use crate::parse::ComputingQueryParser;
use crate::serialize::{
    ComputingSerializer, DnsSerializer, EssSerializer, NasSerializer, RdbSerializer,
};

// for ncl4lb
const EXTRA_CIPHERS: &str = "AES256-SHA256";

static TLS_CONTEXT: Lazy<Arc<TlsContext>> = Lazy::new(|| {
    Arc::new(TlsContext::platform_default().with_extra_cipher(EXTRA_CIPHERS))
});

/// The TLS context shared by every client this SDK constructs.
pub fn shared_tls_context() -> Arc<TlsContext> {
    Arc::clone(&TLS_CONTEXT)
}

/// Path of the bundled service model catalog.
pub fn builtin_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Client factory for NIFCLOUD services.
pub struct Session {
    protocols: ProtocolRegistry,
    auth: AuthRegistry,
    loader: Loader,
    user_agent_name: String,
    user_agent_version: String,
    user_agent_extra: String,
}

impl Session {
    pub fn new() -> Self {
        let mut protocols = ProtocolRegistry::new();
        protocols.register_serializer("computing", Arc::new(ComputingSerializer::new()));
        protocols.register_serializer("rdb", Arc::new(RdbSerializer::new()));
        protocols.register_serializer("nas", Arc::new(NasSerializer::new()));
        protocols.register_serializer("ess", Arc::new(EssSerializer::new()));
        protocols.register_serializer("dns", Arc::new(DnsSerializer::new()));

        protocols.register_parser("computing", Arc::new(ComputingQueryParser::new()));
        protocols.register_parser("rdb", Arc::new(QueryParser::new()));
        protocols.register_parser("nas", Arc::new(QueryParser::new()));
        protocols.register_parser("ess", Arc::new(QueryParser::new()));
        protocols.register_parser("dns", Arc::new(RestXmlParser::new()));

        let mut auth = AuthRegistry::new();
        auth.register("v2", Arc::new(SigV2ComputingAuth::new()));

        tracing::debug!("registered nifcloud protocol adapters");
        Self {
            protocols,
            auth,
            loader: Loader::new(builtin_data_path()),
            user_agent_name: "nifcloud".to_string(),
            user_agent_version: crate::VERSION.to_string(),
            user_agent_extra: format!("nifcloud-core/{}", nifcloud_core::VERSION),
        }
    }

    /// Use a different model catalog directory.
    pub fn with_data_path(mut self, data_path: impl Into<PathBuf>) -> Self {
        self.loader = Loader::new(data_path);
        self
    }

    pub fn user_agent_name(&self) -> &str {
        &self.user_agent_name
    }

    pub fn user_agent_version(&self) -> &str {
        &self.user_agent_version
    }

    pub fn user_agent_extra(&self) -> &str {
        &self.user_agent_extra
    }

    /// Start building a client for a service.
    pub fn client(&self, service_name: impl Into<String>) -> ClientBuilder<'_> {
        ClientBuilder {
            session: self,
            service_name: service_name.into(),
            region_name: None,
            api_version: None,
            use_ssl: true,
            verify: Verify::Enabled,
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a NIFCLOUD service client.
pub struct ClientBuilder<'a> {
    session: &'a Session,
    service_name: String,
    region_name: Option<String>,
    api_version: Option<String>,
    use_ssl: bool,
    verify: Verify,
    endpoint_url: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
}

impl ClientBuilder<'_> {
    pub fn region_name(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn verify(mut self, verify: Verify) -> Self {
        self.verify = verify;
        self
    }

    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn nifcloud_access_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(key_id.into());
        self
    }

    pub fn nifcloud_secret_access_key(mut self, secret: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret.into());
        self
    }

    pub fn nifcloud_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Construct the client.
    pub fn build(self) -> Result<Client, Error> {
        let session = self.session;
        let model = session
            .loader
            .load_service(&self.service_name, self.api_version.as_deref())?;

        let mut config = ClientConfig::new(&self.service_name);
        config.region_name = self.region_name;
        config.api_version = self.api_version;
        config.use_ssl = self.use_ssl;
        config.verify = self.verify;
        config.endpoint_url = self.endpoint_url;
        config.aws_access_key_id = self.access_key_id;
        config.aws_secret_access_key = self.secret_access_key;
        config.aws_session_token = self.session_token;
        config.user_agent_name = session.user_agent_name.clone();
        config.user_agent_version = session.user_agent_version.clone();
        config.user_agent_extra = session.user_agent_extra.clone();

        let mut client =
            Client::from_config(config, model, &session.protocols, &session.auth)?;
        // Transports without a pool surface skip TLS injection; kept
        // permissive for alternate transport implementations.
        if let Some(pool) = client.transport_mut().pool_config_mut() {
            pool.set_tls_context(shared_tls_context());
        }
        Ok(client)
    }
}
