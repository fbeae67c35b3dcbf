use thiserror::Error;

use crate::entity::EntityId;

/// Error type for edit buffer operations. None of these touch the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("unknown product {0}")]
    UnknownProduct(EntityId),
    #[error("unknown variant {0}")]
    UnknownVariant(EntityId),
    /// A default-variant reference must name one of the product's own variants.
    #[error("variant {variant} does not belong to product {product}")]
    ForeignVariant { product: EntityId, variant: EntityId },
    #[error("product {0} is marked deleted")]
    ProductDeleted(EntityId),
    #[error("variants of product {0} are not loaded")]
    VariantsNotLoaded(EntityId),
    /// A server record handed to `replace_*` does not match the local entity.
    #[error("server record {actual} cannot replace {expected}")]
    IdMismatch { expected: EntityId, actual: String },
}
