//! InMemoryCatalog - HashMap-backed catalog service for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{CatalogError, CatalogService};
use crate::config::CatalogLimits;
use crate::entity::{NewProduct, NewVariant, Product, Variant};

/// Internal stored representation; `seq` keeps listings in insertion order.
struct Stored<T> {
    seq: u64,
    record: T,
}

#[derive(Default)]
struct CatalogState {
    products: HashMap<String, Stored<Product>>,
    variants: HashMap<String, Stored<Variant>>,
    next_seq: u64,
}

impl CatalogState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn variant_count(&self, product_id: &str) -> usize {
        self.variants
            .values()
            .filter(|v| v.record.product_id == product_id)
            .count()
    }

    fn check_owned_variant(&self, product_id: &str, variant_id: &str) -> Result<(), CatalogError> {
        let variant = self
            .variants
            .get(variant_id)
            .ok_or_else(|| CatalogError::NotFound(format!("variant {}", variant_id)))?;
        if variant.record.product_id != product_id {
            return Err(CatalogError::Validation(format!(
                "variant {} does not belong to product {}",
                variant_id, product_id
            )));
        }
        Ok(())
    }
}

/// In-memory catalog backed by HashMaps.
///
/// Assigns uuid ids, enforces [`CatalogLimits`] and the referential rules a
/// real document store would. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
    limits: CatalogLimits,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::with_limits(CatalogLimits::default())
    }

    pub fn with_limits(limits: CatalogLimits) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::default())),
            limits,
        }
    }

    pub fn limits(&self) -> &CatalogLimits {
        &self.limits
    }

    /// Current stored copy of a product.
    pub fn product(&self, product_id: &str) -> Option<Product> {
        let state = self.read().ok()?;
        state.products.get(product_id).map(|s| s.record.clone())
    }

    /// Current stored variants of a product, in creation order.
    pub fn variants(&self, product_id: &str) -> Vec<Variant> {
        self.read()
            .map(|state| Self::list_variants(&state, product_id))
            .unwrap_or_default()
    }

    pub fn product_count(&self) -> usize {
        self.read().map(|state| state.products.len()).unwrap_or(0)
    }

    pub fn variant_count(&self) -> usize {
        self.read().map(|state| state.variants.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, CatalogError> {
        self.state
            .read()
            .map_err(|_| CatalogError::Transport("catalog lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, CatalogError> {
        self.state
            .write()
            .map_err(|_| CatalogError::Transport("catalog lock poisoned".into()))
    }

    fn list_variants(state: &CatalogState, product_id: &str) -> Vec<Variant> {
        let mut stored: Vec<&Stored<Variant>> = state
            .variants
            .values()
            .filter(|v| v.record.product_id == product_id)
            .collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| s.record.clone()).collect()
    }

    fn validate_product(product: &NewProduct) -> Result<(), CatalogError> {
        if product.data.name.trim().is_empty() {
            return Err(CatalogError::Validation("product name is required".into()));
        }
        if product.data.collection_id.is_empty() {
            return Err(CatalogError::Validation("product collectionId is required".into()));
        }
        Ok(())
    }

    fn validate_variant(variant: &NewVariant) -> Result<(), CatalogError> {
        if variant.data.name.trim().is_empty() {
            return Err(CatalogError::Validation("variant name is required".into()));
        }
        if variant.data.collection_id.is_empty() {
            return Err(CatalogError::Validation("variant collectionId is required".into()));
        }
        if variant.data.price < 0 {
            return Err(CatalogError::Validation(format!(
                "variant price must not be negative, got {}",
                variant.data.price
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        Self::validate_product(&product)?;
        if let Some(Some(variant_id)) = &product.default_variant_id {
            // A product that does not exist yet owns no variants.
            return Err(CatalogError::Validation(format!(
                "default variant {} does not belong to the new product",
                variant_id
            )));
        }

        let mut state = self.write()?;
        let record = Product {
            product_id: Uuid::new_v4().to_string(),
            data: product.data,
            default_variant_id: None,
        };
        let seq = state.next_seq();
        state.products.insert(
            record.product_id.clone(),
            Stored {
                seq,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    async fn update_product(
        &self,
        product_id: &str,
        product: NewProduct,
    ) -> Result<Product, CatalogError> {
        Self::validate_product(&product)?;

        let mut state = self.write()?;
        if !state.products.contains_key(product_id) {
            return Err(CatalogError::NotFound(format!("product {}", product_id)));
        }
        if let Some(Some(variant_id)) = &product.default_variant_id {
            state.check_owned_variant(product_id, variant_id)?;
        }

        let stored = state
            .products
            .get_mut(product_id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {}", product_id)))?;
        stored.record.data = product.data;
        if let Some(default_variant_id) = product.default_variant_id {
            stored.record.default_variant_id = default_variant_id;
        }
        Ok(stored.record.clone())
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        let mut state = self.write()?;
        if !state.products.contains_key(product_id) {
            return Err(CatalogError::NotFound(format!("product {}", product_id)));
        }

        let cascade = state.variant_count(product_id);
        if cascade > self.limits.max_cascade_delete {
            return Err(CatalogError::LimitExceeded(format!(
                "product {} has {} variants, cascade limit is {}",
                product_id, cascade, self.limits.max_cascade_delete
            )));
        }

        state.variants.retain(|_, v| v.record.product_id != product_id);
        state.products.remove(product_id);
        Ok(())
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogError> {
        Self::validate_variant(&variant)?;

        let mut state = self.write()?;
        if !state.products.contains_key(&variant.product_id) {
            return Err(CatalogError::NotFound(format!("product {}", variant.product_id)));
        }
        let count = state.variant_count(&variant.product_id);
        if count >= self.limits.max_variants_per_product {
            return Err(CatalogError::LimitExceeded(format!(
                "product {} already has {} variants",
                variant.product_id, count
            )));
        }

        let record = Variant {
            variant_id: Uuid::new_v4().to_string(),
            product_id: variant.product_id,
            data: variant.data,
            related_product_ids: variant.related_product_ids,
        };
        let seq = state.next_seq();
        state.variants.insert(
            record.variant_id.clone(),
            Stored {
                seq,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    async fn update_variant(
        &self,
        variant_id: &str,
        variant: NewVariant,
    ) -> Result<Variant, CatalogError> {
        Self::validate_variant(&variant)?;

        let mut state = self.write()?;
        let stored = state
            .variants
            .get_mut(variant_id)
            .ok_or_else(|| CatalogError::NotFound(format!("variant {}", variant_id)))?;
        if stored.record.product_id != variant.product_id {
            return Err(CatalogError::Validation(format!(
                "variant {} cannot move to product {}",
                variant_id, variant.product_id
            )));
        }
        stored.record.data = variant.data;
        stored.record.related_product_ids = variant.related_product_ids;
        Ok(stored.record.clone())
    }

    async fn delete_variant(&self, variant_id: &str) -> Result<(), CatalogError> {
        let mut state = self.write()?;
        let removed = state
            .variants
            .remove(variant_id)
            .ok_or_else(|| CatalogError::NotFound(format!("variant {}", variant_id)))?;

        if let Some(product) = state.products.get_mut(&removed.record.product_id) {
            if product.record.default_variant_id.as_deref() == Some(variant_id) {
                product.record.default_variant_id = None;
            }
        }
        Ok(())
    }

    async fn update_default_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<(), CatalogError> {
        let mut state = self.write()?;
        if !state.products.contains_key(product_id) {
            return Err(CatalogError::NotFound(format!("product {}", product_id)));
        }
        state.check_owned_variant(product_id, variant_id)?;

        if let Some(product) = state.products.get_mut(product_id) {
            product.record.default_variant_id = Some(variant_id.to_string());
        }
        Ok(())
    }

    async fn get_product_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        let state = self.read()?;
        Ok(state.products.get(product_id).map(|s| s.record.clone()))
    }

    async fn get_variants_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CatalogError> {
        let state = self.read()?;
        Ok(Self::list_variants(&state, product_id))
    }

    async fn get_products_by_collection_id(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let state = self.read()?;
        let mut stored: Vec<&Stored<Product>> = state
            .products
            .values()
            .filter(|p| p.record.data.collection_id == collection_id)
            .collect();
        stored.sort_by_key(|s| s.seq);
        Ok(stored.into_iter().map(|s| s.record.clone()).collect())
    }
}
