use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single catalog service call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum CatalogError {
    /// The payload was malformed or broke a referential rule.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A stale id pointed at nothing.
    #[error("not found: {0}")]
    NotFound(String),
    /// A variant-count or cascading-delete cap was hit.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// Network, serialization or storage failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl CatalogError {
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => "validation",
            CatalogError::NotFound(_) => "notFound",
            CatalogError::LimitExceeded(_) => "limitExceeded",
            CatalogError::Transport(_) => "transport",
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Validation(_) => 400,
            CatalogError::NotFound(_) => 404,
            CatalogError::LimitExceeded(_) => 409,
            CatalogError::Transport(_) => 502,
        }
    }

    /// Inverse of [`status_code`](Self::status_code) for transports that
    /// only see a status and a message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => CatalogError::Validation(message),
            404 => CatalogError::NotFound(message),
            409 => CatalogError::LimitExceeded(message),
            _ => CatalogError::Transport(message),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}
