use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::trace;

use super::{CatalogError, CatalogService};
use crate::entity::{NewProduct, NewVariant, Product, Variant};

/// One call made against a catalog service, as seen by [`RecordingCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    CreateProduct {
        collection_id: String,
        default_variant_id: Option<String>,
    },
    UpdateProduct {
        product_id: String,
        /// `None` leaves the default alone, `Some(None)` clears it.
        default_variant_id: Option<Option<String>>,
    },
    DeleteProduct(String),
    CreateVariant {
        product_id: String,
    },
    UpdateVariant(String),
    DeleteVariant(String),
    UpdateDefaultVariant {
        product_id: String,
        variant_id: String,
    },
    GetProduct(String),
    GetVariants(String),
    GetProducts(String),
}

impl CatalogCall {
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            CatalogCall::GetProduct(_) | CatalogCall::GetVariants(_) | CatalogCall::GetProducts(_)
        )
    }

    pub fn is_write(&self) -> bool {
        !self.is_read()
    }
}

/// Wraps a catalog service and journals every call into a shared buffer.
pub struct RecordingCatalog<C> {
    inner: C,
    calls: Arc<Mutex<Vec<CatalogCall>>>,
}

impl<C> RecordingCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self::with_journal(inner, Arc::new(Mutex::new(Vec::new())))
    }

    pub fn with_journal(inner: C, calls: Arc<Mutex<Vec<CatalogCall>>>) -> Self {
        Self { inner, calls }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Snapshot of the journal so far.
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: CatalogCall) -> Result<(), CatalogError> {
        trace!(?call, "catalog call");
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| CatalogError::Transport("call journal poisoned".into()))?;
        calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl<C: CatalogService> CatalogService for RecordingCatalog<C> {
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        self.record(CatalogCall::CreateProduct {
            collection_id: product.data.collection_id.clone(),
            default_variant_id: product.default_variant_id.clone().flatten(),
        })?;
        self.inner.create_product(product).await
    }

    async fn update_product(
        &self,
        product_id: &str,
        product: NewProduct,
    ) -> Result<Product, CatalogError> {
        self.record(CatalogCall::UpdateProduct {
            product_id: product_id.to_string(),
            default_variant_id: product.default_variant_id.clone(),
        })?;
        self.inner.update_product(product_id, product).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        self.record(CatalogCall::DeleteProduct(product_id.to_string()))?;
        self.inner.delete_product(product_id).await
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogError> {
        self.record(CatalogCall::CreateVariant {
            product_id: variant.product_id.clone(),
        })?;
        self.inner.create_variant(variant).await
    }

    async fn update_variant(
        &self,
        variant_id: &str,
        variant: NewVariant,
    ) -> Result<Variant, CatalogError> {
        self.record(CatalogCall::UpdateVariant(variant_id.to_string()))?;
        self.inner.update_variant(variant_id, variant).await
    }

    async fn delete_variant(&self, variant_id: &str) -> Result<(), CatalogError> {
        self.record(CatalogCall::DeleteVariant(variant_id.to_string()))?;
        self.inner.delete_variant(variant_id).await
    }

    async fn update_default_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<(), CatalogError> {
        self.record(CatalogCall::UpdateDefaultVariant {
            product_id: product_id.to_string(),
            variant_id: variant_id.to_string(),
        })?;
        self.inner.update_default_variant(product_id, variant_id).await
    }

    async fn get_product_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        self.record(CatalogCall::GetProduct(product_id.to_string()))?;
        self.inner.get_product_by_id(product_id).await
    }

    async fn get_variants_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CatalogError> {
        self.record(CatalogCall::GetVariants(product_id.to_string()))?;
        self.inner.get_variants_by_product_id(product_id).await
    }

    async fn get_products_by_collection_id(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        self.record(CatalogCall::GetProducts(collection_id.to_string()))?;
        self.inner.get_products_by_collection_id(collection_id).await
    }
}
