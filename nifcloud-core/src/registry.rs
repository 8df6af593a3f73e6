//! Protocol and auth-scheme registries.
//!
//! Registries are explicit values owned by whoever constructs clients;
//! there is no process-global registration. Re-registering a name
//! replaces the previous entry, and lookups hand out shared adapter
//! instances.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::QuerySigner;
use crate::parse::ParseResponse;
use crate::serialize::SerializeRequest;

/// Wire-protocol name -> serializer/parser pair.
#[derive(Default)]
pub struct ProtocolRegistry {
    serializers: HashMap<String, Arc<dyn SerializeRequest>>,
    parsers: HashMap<String, Arc<dyn ParseResponse>>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_serializer(
        &mut self,
        protocol: impl Into<String>,
        serializer: Arc<dyn SerializeRequest>,
    ) {
        self.serializers.insert(protocol.into(), serializer);
    }

    pub fn register_parser(
        &mut self,
        protocol: impl Into<String>,
        parser: Arc<dyn ParseResponse>,
    ) {
        self.parsers.insert(protocol.into(), parser);
    }

    pub fn serializer(&self, protocol: &str) -> Option<Arc<dyn SerializeRequest>> {
        self.serializers.get(protocol).cloned()
    }

    pub fn parser(&self, protocol: &str) -> Option<Arc<dyn ParseResponse>> {
        self.parsers.get(protocol).cloned()
    }
}

/// Auth-scheme name -> signer.
#[derive(Default)]
pub struct AuthRegistry {
    signers: HashMap<String, Arc<dyn QuerySigner>>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scheme: impl Into<String>, signer: Arc<dyn QuerySigner>) {
        self.signers.insert(scheme.into(), signer);
    }

    pub fn signer(&self, scheme: &str) -> Option<Arc<dyn QuerySigner>> {
        self.signers.get(scheme).cloned()
    }
}
