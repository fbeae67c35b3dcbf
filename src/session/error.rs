use thiserror::Error;

use crate::buffer::BufferError;
use crate::catalog::CatalogError;
use crate::commit::{CommitError, CommitReport};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("load failed: {0}")]
    Load(#[source] CatalogError),
    #[error(transparent)]
    Commit(#[from] CommitError),
    /// The commit went through but re-reading the catalog did not. The
    /// buffer still holds the pre-commit edits.
    #[error("commit applied but reload failed: {source}")]
    Reload {
        #[source]
        source: CatalogError,
        report: CommitReport,
    },
    #[error("undo of {entity} failed: {source}")]
    Undo {
        entity: String,
        #[source]
        source: CatalogError,
    },
}

impl SessionError {
    /// The underlying catalog failure, if there was one.
    pub fn catalog_error(&self) -> Option<&CatalogError> {
        match self {
            SessionError::Buffer(_) => None,
            SessionError::Load(source)
            | SessionError::Reload { source, .. }
            | SessionError::Undo { source, .. } => Some(source),
            SessionError::Commit(err) => err.catalog_error(),
        }
    }
}
