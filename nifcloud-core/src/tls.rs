//! TLS context configuration.
//!
//! A [`TlsContext`] is an ordered cipher-suite preference list attached
//! to a transport's connection pool. Transports apply the names their
//! TLS backend can express and ignore the rest.

/// Platform default cipher preference list (OpenSSL names).
pub const DEFAULT_CIPHERS: &[&str] = &[
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
    "TLS_AES_128_GCM_SHA256",
    "ECDHE-ECDSA-AES256-GCM-SHA384",
    "ECDHE-RSA-AES256-GCM-SHA384",
    "ECDHE-ECDSA-CHACHA20-POLY1305",
    "ECDHE-RSA-CHACHA20-POLY1305",
    "ECDHE-ECDSA-AES128-GCM-SHA256",
    "ECDHE-RSA-AES128-GCM-SHA256",
];

/// Ordered cipher-suite preference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsContext {
    ciphers: Vec<String>,
}

impl TlsContext {
    /// The platform default cipher list.
    pub fn platform_default() -> Self {
        Self {
            ciphers: DEFAULT_CIPHERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Append a cipher suite unless it is already listed.
    pub fn with_extra_cipher(mut self, name: &str) -> Self {
        if !self.ciphers.iter().any(|c| c == name) {
            self.ciphers.push(name.to_string());
        }
        self
    }

    pub fn ciphers(&self) -> &[String] {
        &self.ciphers
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ciphers.iter().any(|c| c == name)
    }

    /// OpenSSL-style colon-separated cipher string.
    pub fn cipher_string(&self) -> String {
        self.ciphers.join(":")
    }
}

impl Default for TlsContext {
    fn default() -> Self {
        Self::platform_default()
    }
}
