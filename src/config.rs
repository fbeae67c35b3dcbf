//! Configuration for the session, loader and in-memory catalog.
//!
//! Every struct deserializes with defaults for missing keys, so a partial
//! JSON document is enough:
//!
//! ```ignore
//! let config = EngineConfig::from_json(r#"{ "loader": { "concurrency": 2 } }"#)?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Loader tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Collection reads in flight at once.
    pub concurrency: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Top-level config for a [`CatalogSession`](crate::CatalogSession).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub loader: LoaderConfig,
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_loader_concurrency(mut self, concurrency: usize) -> Self {
        self.loader.concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "loader.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Server-side caps enforced by [`InMemoryCatalog`](crate::InMemoryCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogLimits {
    /// Most variants a single product may have.
    pub max_variants_per_product: usize,
    /// Most variants a product delete will cascade over.
    pub max_cascade_delete: usize,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            max_variants_per_product: 100,
            max_cascade_delete: 25,
        }
    }
}

impl CatalogLimits {
    pub fn with_max_variants_per_product(mut self, max: usize) -> Self {
        self.max_variants_per_product = max;
        self
    }

    pub fn with_max_cascade_delete(mut self, max: usize) -> Self {
        self.max_cascade_delete = max;
        self
    }
}
