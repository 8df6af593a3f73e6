//! HTTP transport.
//!
//! The default transport is reqwest-backed and exposes its
//! connection-pool configuration so callers can attach a TLS context
//! before the first request. Alternate transports (test doubles,
//! embedded stacks) implement [`HttpTransport`] and may expose no pool
//! surface at all.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use url::Url;

use crate::error::Error;
use crate::tls::TlsContext;

/// Certificate verification policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verify {
    #[default]
    Enabled,
    Disabled,
    /// Verify against an additional PEM bundle.
    CaBundle(PathBuf),
}

/// Connection-pool configuration surface.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    max_idle_per_host: Option<usize>,
    tls_context: Option<Arc<TlsContext>>,
}

impl PoolConfig {
    pub fn set_tls_context(&mut self, context: Arc<TlsContext>) {
        self.tls_context = Some(context);
    }

    pub fn tls_context(&self) -> Option<&Arc<TlsContext>> {
        self.tls_context.as_ref()
    }

    pub fn set_max_idle_per_host(&mut self, max: usize) {
        self.max_idle_per_host = Some(max);
    }
}

/// A transport-level request, fully resolved.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: String,
    pub url: Url,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

/// A transport-level response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

/// Pluggable HTTP transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error>;

    /// The connection-pool configuration surface, when this transport
    /// has one. Default: none.
    fn pool_config_mut(&mut self) -> Option<&mut PoolConfig> {
        None
    }

    fn pool_config(&self) -> Option<&PoolConfig> {
        None
    }
}

/// reqwest-backed transport.
///
/// The inner client is built lazily on first send so pool configuration
/// applied after construction still takes effect.
pub struct ReqwestTransport {
    verify: Verify,
    pool: PoolConfig,
    client: OnceCell<reqwest::Client>,
}

impl ReqwestTransport {
    pub fn new(verify: Verify) -> Self {
        Self {
            verify,
            pool: PoolConfig::default(),
            client: OnceCell::new(),
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(self.pool.max_idle_per_host.unwrap_or(10));

        match &self.verify {
            Verify::Enabled => {}
            Verify::Disabled => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            Verify::CaBundle(path) => {
                let pem = std::fs::read(path)?;
                let cert = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::InvalidConfig(format!("unusable CA bundle: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
        }
        // The rustls backend has no cipher-string API; names in the
        // pool's TLS context that the backend cannot express are
        // ignored.
        builder.build().map_err(Error::from)
    }

    fn client(&self) -> Result<&reqwest::Client, Error> {
        self.client.get_or_try_init(|| self.build_client())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        let client = self.client()?;
        let method: reqwest::Method = request
            .method
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid http method '{}'", request.method)))?;

        tracing::debug!(method = %method, url = %request.url, "sending request");
        let mut req = client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            req = req.body(request.body.clone());
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let mut headers = IndexMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }
        let body = response.bytes().await?.to_vec();
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    fn pool_config_mut(&mut self) -> Option<&mut PoolConfig> {
        Some(&mut self.pool)
    }

    fn pool_config(&self) -> Option<&PoolConfig> {
        Some(&self.pool)
    }
}
