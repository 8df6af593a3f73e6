//! Custom authentication handler for the NIFCLOUD API.

use nifcloud_core::auth::{QuerySigner, SigV2Signer};
use nifcloud_core::credentials::Credentials;
use nifcloud_core::error::Error;
use nifcloud_core::params::WireParams;

/// SigV2 signing with NIFCLOUD parameter naming.
///
/// NIFCLOUD expects the credential identifier as `AccessKeyId` where
/// the generic signer emits `AWSAccessKeyId`; the rename happens in
/// place on the signed parameter set, immediately before signature
/// computation.
pub struct SigV2ComputingAuth {
    inner: SigV2Signer,
}

impl SigV2ComputingAuth {
    pub fn new() -> Self {
        Self {
            inner: SigV2Signer,
        }
    }
}

impl Default for SigV2ComputingAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySigner for SigV2ComputingAuth {
    fn calc_signature(
        &self,
        method: &str,
        host: &str,
        path: &str,
        params: &mut WireParams,
        credentials: &Credentials,
    ) -> Result<String, Error> {
        if let Some(value) = params.shift_remove("AWSAccessKeyId") {
            params.insert("AccessKeyId".to_string(), value);
        }
        self.inner
            .calc_signature(method, host, path, params, credentials)
    }
}
