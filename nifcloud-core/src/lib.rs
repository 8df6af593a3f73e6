//! nifcloud-core
//!
//! Provider-agnostic AWS-compatible SDK toolkit: a data-driven service
//! model catalog, query/EC2-query/REST-XML wire protocols, SigV2
//! request signing, and a reqwest-backed transport with a pluggable
//! seam at every protocol boundary.
//!
//! Provider layers customize behavior by wrapping the serializers,
//! parsers, and signer via delegation and registering the wrappers in
//! the registries they own; see the `nifcloud` crate for the reference
//! adaptation.
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod loader;
pub mod model;
pub mod params;
pub mod parse;
pub mod registry;
pub mod serialize;
pub mod tls;
pub mod transport;

/// Toolkit version, for user-agent composition.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use client::{Client, ClientConfig};
pub use credentials::Credentials;
pub use error::Error;
pub use loader::Loader;
pub use registry::{AuthRegistry, ProtocolRegistry};
pub use transport::Verify;
