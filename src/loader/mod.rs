//! Loader - fills the edit buffer from the catalog service.
//!
//! Product reads for the selected collections run with bounded concurrency.
//! The buffer is only touched once every read has succeeded, the selected
//! product's variants included, so a failed load leaves the previous
//! contents in place.

use std::collections::HashSet;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::buffer::EditBuffer;
use crate::catalog::{CatalogError, CatalogService};
use crate::config::LoaderConfig;
use crate::entity::{EntityId, Product};

/// Outcome of [`Loader::load_for_selection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub collections: usize,
    pub products: usize,
    /// Products seen under more than one collection and dropped.
    pub duplicates: usize,
    /// Variants loaded for the selected product.
    pub selected_variants: usize,
}

pub struct Loader<'a, C: ?Sized> {
    catalog: &'a C,
    config: &'a LoaderConfig,
}

impl<'a, C: CatalogService + ?Sized> Loader<'a, C> {
    pub fn new(catalog: &'a C, config: &'a LoaderConfig) -> Self {
        Self { catalog, config }
    }

    /// Replace the buffer's products with those of `collection_ids`.
    ///
    /// Keeps the current selection if the product is still loaded and
    /// otherwise selects the first product.
    pub async fn load_for_selection(
        &self,
        buffer: &mut EditBuffer,
        collection_ids: Vec<String>,
    ) -> Result<LoadSummary, CatalogError> {
        let preferred = buffer.selected_product().cloned();
        self.load_with_selection(buffer, collection_ids, preferred)
            .await
    }

    /// Replace the buffer's products with those of `collection_ids`,
    /// selecting `preferred` if it is among them and the first product
    /// otherwise.
    ///
    /// The product lists and the selected product's variants are all read
    /// before the buffer changes. On error the buffer, its selection and its
    /// variant cache are exactly as before.
    pub async fn load_with_selection(
        &self,
        buffer: &mut EditBuffer,
        collection_ids: Vec<String>,
        preferred: Option<EntityId>,
    ) -> Result<LoadSummary, CatalogError> {
        let catalog = self.catalog;
        let concurrency = self.config.concurrency.max(1);
        debug!(collections = collection_ids.len(), concurrency, "loading products");

        let batches: Vec<Vec<Product>> = stream::iter(
            collection_ids
                .iter()
                .map(|collection_id| catalog.get_products_by_collection_id(collection_id)),
        )
        .buffered(concurrency)
        .try_collect()
        .await?;

        let mut seen = HashSet::new();
        let mut products = Vec::new();
        let mut duplicates = 0;
        for product in batches.into_iter().flatten() {
            if seen.insert(product.product_id.clone()) {
                products.push(product);
            } else {
                warn!(product = %product.product_id, "product listed under several collections");
                duplicates += 1;
            }
        }

        let selected = preferred
            .filter(|id| id.as_persisted().is_some_and(|real| seen.contains(real)))
            .or_else(|| products.first().map(|p| EntityId::persisted(p.product_id.clone())));
        let variants = match selected.as_ref().and_then(EntityId::as_persisted) {
            Some(real) => catalog.get_variants_by_product_id(real).await?,
            None => Vec::new(),
        };

        let summary = LoadSummary {
            collections: collection_ids.len(),
            products: products.len(),
            duplicates,
            selected_variants: variants.len(),
        };
        buffer.retarget_selection(selected.clone());
        buffer.replace_contents(collection_ids, products);
        if let Some(id) = selected {
            buffer.insert_variants(id, variants);
        }
        info!(products = summary.products, "products loaded");
        Ok(summary)
    }

    /// Fetch and cache the variants of one product, replacing any cached ones.
    pub async fn load_variants_for(
        &self,
        buffer: &mut EditBuffer,
        product_id: &EntityId,
    ) -> Result<usize, CatalogError> {
        let Some(real) = product_id.as_persisted() else {
            // An unsaved product has nothing on the server yet.
            if !buffer.has_variants_loaded(product_id) {
                buffer.insert_variants(product_id.clone(), Vec::new());
            }
            return Ok(0);
        };

        let variants = self.catalog.get_variants_by_product_id(real).await?;
        let count = variants.len();
        buffer.insert_variants(product_id.clone(), variants);
        debug!(product = %product_id, count, "variants loaded");
        Ok(count)
    }

    /// Load variants only if the cache has no entry for the product yet.
    /// Returns whether a fetch happened.
    pub async fn ensure_variants(
        &self,
        buffer: &mut EditBuffer,
        product_id: &EntityId,
    ) -> Result<bool, CatalogError> {
        if buffer.has_variants_loaded(product_id) {
            return Ok(false);
        }
        self.load_variants_for(buffer, product_id).await?;
        Ok(product_id.as_persisted().is_some())
    }
}
