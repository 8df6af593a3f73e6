//! Service model loader.
//!
//! Reads service definitions from a data directory, one JSON file per
//! service. The adaptation layer points the loader at its bundled
//! catalog; tests can point it anywhere.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::ServiceModel;

/// Loads service models from `<data_path>/<service>.json`.
#[derive(Debug, Clone)]
pub struct Loader {
    data_path: PathBuf,
}

impl Loader {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Load the model for a service, optionally pinned to an API version.
    pub fn load_service(
        &self,
        service_name: &str,
        api_version: Option<&str>,
    ) -> Result<ServiceModel, Error> {
        let path = self.data_path.join(format!("{service_name}.json"));
        let raw = fs::read_to_string(&path)
            .map_err(|_| Error::UnknownService(service_name.to_string()))?;
        let model: ServiceModel = serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidModel(format!("{}: {e}", path.display())))?;

        if let Some(requested) = api_version {
            if requested != model.metadata.api_version {
                return Err(Error::ApiVersionNotFound {
                    service: service_name.to_string(),
                    requested: requested.to_string(),
                });
            }
        }
        tracing::debug!(
            service = service_name,
            api_version = %model.metadata.api_version,
            protocol = %model.metadata.protocol,
            "loaded service model"
        );
        Ok(model)
    }
}
