//! JSON persistence under the engine home directory.
//!
//! Every artifact lives at `<home>/<product_id>_<suffix>.json`, pretty-printed
//! with two-space indentation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use toolkit_engine_core::{Capability, EndpointMapping, ProductDefinition};
use tracing::{debug, instrument};

use crate::config::{ConfigError, EngineConfig};

pub const PRODUCT_SUFFIX: &str = "product";
pub const RAW_SPEC_SUFFIX: &str = "raw_spec";
pub const CAPABILITIES_SUFFIX: &str = "capabilities";
pub const MAPPING_SUFFIX: &str = "mapping";

/// One capability as written by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub entity_name: String,
    pub action: String,
    pub http_method: String,
    pub path: String,
    pub score: Option<f64>,
}

impl From<&Capability> for CapabilityRecord {
    fn from(cap: &Capability) -> Self {
        Self {
            entity_name: cap.entity_name.clone(),
            action: cap.action.clone(),
            http_method: cap.http_method.clone(),
            path: cap.path.clone(),
            score: cap.score,
        }
    }
}

/// The `<id>_capabilities.json` document.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitiesFile {
    pub product_id: String,
    pub total_capabilities: usize,
    pub discovered_at: DateTime<Utc>,
    pub capabilities: Vec<CapabilityRecord>,
}

/// Either the wrapper written by discovery or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum CapabilitiesDocument {
    Wrapped { capabilities: Vec<Capability> },
    Bare(Vec<Capability>),
}

/// File-backed store for products, specs, capabilities and mappings.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.home.clone())
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base>/<product_id>_<suffix>.json`
    #[must_use]
    pub fn path_for(&self, product_id: &str, suffix: &str) -> PathBuf {
        self.base_dir.join(format!("{product_id}_{suffix}.json"))
    }

    /// Whether the file for `(product_id, suffix)` exists.
    pub async fn exists(&self, product_id: &str, suffix: &str) -> bool {
        tokio::fs::try_exists(self.path_for(product_id, suffix))
            .await
            .unwrap_or(false)
    }

    /// Write `data` as pretty JSON, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory or file cannot be written.
    #[instrument(skip(self, data))]
    pub async fn save_json<T>(
        &self,
        product_id: &str,
        suffix: &str,
        data: &T,
    ) -> Result<PathBuf, ConfigError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let path = self.path_for(product_id, suffix);
        let json = serde_json::to_string_pretty(data).map_err(|e| ConfigError::InvalidJson {
            path: path.clone(),
            message: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|source| ConfigError::Io {
                path: self.base_dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Saved JSON");
        Ok(path)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] (with `hint`) if the file is
    /// missing, or [`ConfigError::InvalidJson`] if it does not parse as `T`.
    pub async fn load_json_with_hint<T: DeserializeOwned>(
        &self,
        product_id: &str,
        suffix: &str,
        hint: &str,
    ) -> Result<T, ConfigError> {
        let path = self.path_for(product_id, suffix);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path,
                    hint: hint.to_string(),
                });
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let data = serde_json::from_slice(&bytes).map_err(|e| ConfigError::InvalidJson {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded JSON");
        Ok(data)
    }

    /// [`load_json_with_hint`](Self::load_json_with_hint) without a hint.
    ///
    /// # Errors
    ///
    /// See [`load_json_with_hint`](Self::load_json_with_hint).
    pub async fn load_json<T: DeserializeOwned>(
        &self,
        product_id: &str,
        suffix: &str,
    ) -> Result<T, ConfigError> {
        self.load_json_with_hint(product_id, suffix, "").await
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub async fn save_product(&self, product: &ProductDefinition) -> Result<PathBuf, ConfigError> {
        self.save_json(&product.product_id, PRODUCT_SUFFIX, product)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the product was never registered.
    pub async fn load_product(&self, product_id: &str) -> Result<ProductDefinition, ConfigError> {
        self.load_json_with_hint(
            product_id,
            PRODUCT_SUFFIX,
            "Register it first with 'toolkit-engine register'.",
        )
        .await
    }

    /// Ids of every saved product, sorted.
    ///
    /// A missing base directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory cannot be read.
    pub async fn list_product_ids(&self) -> Result<Vec<String>, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.base_dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_err(err)),
        };

        let suffix = format!("_{PRODUCT_SUFFIX}.json");
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(&suffix))
                .filter(|id| !id.is_empty())
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub async fn save_mapping(
        &self,
        product_id: &str,
        mapping: &EndpointMapping,
    ) -> Result<PathBuf, ConfigError> {
        self.save_json(product_id, MAPPING_SUFFIX, mapping).await
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] telling the caller to run `select`.
    pub async fn load_mapping(&self, product_id: &str) -> Result<EndpointMapping, ConfigError> {
        let hint = format!("Run 'toolkit-engine select --id {product_id}' first.");
        self.load_json_with_hint(product_id, MAPPING_SUFFIX, &hint)
            .await
    }

    /// Write the capabilities file for a discovery run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub async fn save_capabilities(
        &self,
        product_id: &str,
        capabilities: &[Capability],
    ) -> Result<PathBuf, ConfigError> {
        let file = CapabilitiesFile {
            product_id: product_id.to_string(),
            total_capabilities: capabilities.len(),
            discovered_at: Utc::now(),
            capabilities: capabilities.iter().map(CapabilityRecord::from).collect(),
        };
        self.save_json(product_id, CAPABILITIES_SUFFIX, &file).await
    }

    /// Load capabilities written by discovery (wrapper or bare list).
    ///
    /// Records without a product id are attributed to `product_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] telling the caller to run
    /// `discover`, or [`ConfigError::InvalidJson`].
    pub async fn load_capabilities(&self, product_id: &str) -> Result<Vec<Capability>, ConfigError> {
        let hint = format!("Run 'toolkit-engine discover --id {product_id}' first.");
        let document: CapabilitiesDocument = self
            .load_json_with_hint(product_id, CAPABILITIES_SUFFIX, &hint)
            .await?;

        let (CapabilitiesDocument::Wrapped { capabilities } | CapabilitiesDocument::Bare(capabilities)) =
            document;

        Ok(capabilities
            .into_iter()
            .map(|mut cap| {
                if cap.product_id.is_empty() {
                    cap.product_id = product_id.to_string();
                }
                cap
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub async fn save_raw_spec(
        &self,
        product_id: &str,
        spec: &serde_json::Value,
    ) -> Result<PathBuf, ConfigError> {
        self.save_json(product_id, RAW_SPEC_SUFFIX, spec).await
    }
}
