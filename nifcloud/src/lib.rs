//! NIFCLOUD SDK for Rust.
//!
//! A data-driven SDK for NIFCLOUD APIs built on the AWS-compatible
//! `nifcloud-core` toolkit. Supports the Computing, RDB, NAS, ESS, and
//! DNS APIs.
//!
//! # Example
//!
//! ```rust,no_run
//! use nifcloud::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nifcloud::Error> {
//!     let session = Session::new();
//!     let client = session
//!         .client("computing")
//!         .region_name("jp-east-1")
//!         .nifcloud_access_key_id("YOUR_KEY")
//!         .nifcloud_secret_access_key("YOUR_SECRET")
//!         .build()?;
//!     let response = client.call("DescribeInstances", serde_json::json!({})).await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```
#![deny(unsafe_code)]

pub mod auth;
pub mod parse;
pub mod serialize;
pub mod session;

pub use nifcloud_core::{Client, Credentials, Error, Verify};
pub use session::Session;

/// SDK version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenience entry point; equivalent to [`Session::new`].
pub fn session() -> Session {
    Session::new()
}
