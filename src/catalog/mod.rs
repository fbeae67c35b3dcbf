//! Catalog service - the remote store the buffer is reconciled against.
//!
//! The engine only ever talks to a [`CatalogService`]. Ship it an
//! [`InMemoryCatalog`] for tests and development, wrap any service in a
//! [`RecordingCatalog`] to journal calls, or (with the `http` feature) reach
//! a remote catalog through [`http::HttpCatalog`].

mod error;
mod in_memory;
mod recording;

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;

use crate::entity::{NewProduct, NewVariant, Product, Variant};

pub use error::CatalogError;
pub use in_memory::InMemoryCatalog;
pub use recording::{CatalogCall, RecordingCatalog};

/// CRUD contract of the remote catalog.
///
/// Implementations decide the transport. Timeouts, if any, belong to them.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create a product; the server assigns its id.
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError>;

    async fn update_product(
        &self,
        product_id: &str,
        product: NewProduct,
    ) -> Result<Product, CatalogError>;

    /// Delete a product and cascade over its variants, up to a server cap.
    async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError>;

    /// Create a variant; the server assigns its id and enforces the
    /// per-product variant cap.
    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogError>;

    async fn update_variant(
        &self,
        variant_id: &str,
        variant: NewVariant,
    ) -> Result<Variant, CatalogError>;

    async fn delete_variant(&self, variant_id: &str) -> Result<(), CatalogError>;

    /// Point a product at one of its own variants.
    async fn update_default_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<(), CatalogError>;

    async fn get_product_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError>;

    async fn get_variants_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CatalogError>;

    async fn get_products_by_collection_id(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Product>, CatalogError>;
}
