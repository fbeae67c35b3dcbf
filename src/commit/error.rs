use std::fmt;

use thiserror::Error;

use super::CommitReport;
use crate::catalog::CatalogError;
use crate::entity::{EntityId, TempId};

/// The six commit phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitPhase {
    Delete,
    CreateProducts,
    CreateVariants,
    UpdateProducts,
    UpdateVariants,
    ResolveDefaults,
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitPhase::Delete => "delete",
            CommitPhase::CreateProducts => "create-products",
            CommitPhase::CreateVariants => "create-variants",
            CommitPhase::UpdateProducts => "update-products",
            CommitPhase::UpdateVariants => "update-variants",
            CommitPhase::ResolveDefaults => "resolve-defaults",
        };
        f.write_str(name)
    }
}

/// A commit that stopped part way.
///
/// Phases before `phase` stay applied on the server; there is no rollback.
/// `report` describes what did go through, so a retry can be reasoned about.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit failed in {phase} phase: {source}")]
    Phase {
        phase: CommitPhase,
        #[source]
        source: CatalogError,
        report: CommitReport,
    },
    /// A new variant's parent has no server id after products were created.
    #[error("variant {variant} references product {product} which has no server id")]
    UnresolvedParent {
        variant: TempId,
        product: EntityId,
        report: CommitReport,
    },
}

impl CommitError {
    pub fn phase(&self) -> CommitPhase {
        match self {
            CommitError::Phase { phase, .. } => *phase,
            CommitError::UnresolvedParent { .. } => CommitPhase::CreateVariants,
        }
    }

    pub fn report(&self) -> &CommitReport {
        match self {
            CommitError::Phase { report, .. } | CommitError::UnresolvedParent { report, .. } => {
                report
            }
        }
    }

    pub fn catalog_error(&self) -> Option<&CatalogError> {
        match self {
            CommitError::Phase { source, .. } => Some(source),
            CommitError::UnresolvedParent { .. } => None,
        }
    }
}
