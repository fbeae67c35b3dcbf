use std::collections::HashMap;

use crate::entity::{
    BufferedProduct, BufferedVariant, EditState, EntityId, Product, ProductField,
    TempIdGenerator, Variant, VariantField,
};

use super::BufferError;

/// What a delete request did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entity was never saved and is gone from the buffer.
    Removed,
    /// The entity is marked and will be deleted on commit.
    Marked,
}

/// In-memory working copy of the catalog.
///
/// Holds the products of the selected collections, a per-product variant
/// cache filled lazily, and the current selection. Every operation here is
/// local; reconciling with the server is the commit engine's job.
#[derive(Debug, Default)]
pub struct EditBuffer {
    products: Vec<BufferedProduct>,
    variants: HashMap<EntityId, Vec<BufferedVariant>>,
    selected_collections: Vec<String>,
    selected_product: Option<EntityId>,
    ids: TempIdGenerator,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[BufferedProduct] {
        &self.products
    }

    pub fn product(&self, id: &EntityId) -> Option<&BufferedProduct> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Buffered variants of a product, or `None` if they were never loaded.
    pub fn variants_of(&self, product_id: &EntityId) -> Option<&[BufferedVariant]> {
        self.variants.get(product_id).map(Vec::as_slice)
    }

    pub fn has_variants_loaded(&self, product_id: &EntityId) -> bool {
        self.variants.contains_key(product_id)
    }

    pub fn variant(&self, id: &EntityId) -> Option<&BufferedVariant> {
        self.variants.values().flatten().find(|v| &v.id == id)
    }

    /// Every cached variant, grouped by nothing in particular.
    pub fn all_variants(&self) -> impl Iterator<Item = &BufferedVariant> {
        self.variants.values().flatten()
    }

    pub fn selected_collections(&self) -> &[String] {
        &self.selected_collections
    }

    pub fn selected_product(&self) -> Option<&EntityId> {
        self.selected_product.as_ref()
    }

    pub fn select_product(&mut self, id: &EntityId) -> Result<(), BufferError> {
        if self.product(id).is_none() {
            return Err(BufferError::UnknownProduct(id.clone()));
        }
        self.selected_product = Some(id.clone());
        Ok(())
    }

    /// Point the selection at a product of the list about to be swapped in
    /// by [`EditBuffer::replace_contents`].
    pub(crate) fn retarget_selection(&mut self, id: Option<EntityId>) {
        self.selected_product = id;
    }

    /// True when any buffered entity is new, edited or marked deleted.
    pub fn has_unsaved_changes(&self) -> bool {
        self.products.iter().any(|p| p.state.is_dirty())
            || self.all_variants().any(|v| v.state.is_dirty())
    }

    pub fn set_product_field(
        &mut self,
        id: &EntityId,
        field: ProductField,
    ) -> Result<(), BufferError> {
        if let ProductField::DefaultVariant(Some(variant_id)) = &field {
            let owned = self
                .variants
                .get(id)
                .is_some_and(|vs| vs.iter().any(|v| &v.id == variant_id));
            if !owned {
                return Err(BufferError::ForeignVariant {
                    product: id.clone(),
                    variant: variant_id.clone(),
                });
            }
        }

        // Variants live in their product's collection, so a move carries them.
        let moved_to = match &field {
            ProductField::Collection(collection_id) => {
                self.product_mut(id)?;
                if !self.variants.contains_key(id) {
                    return Err(BufferError::VariantsNotLoaded(id.clone()));
                }
                Some(collection_id.clone())
            }
            _ => None,
        };

        let product = self.product_mut(id)?;
        product.apply(field);

        if let (Some(collection_id), Some(variants)) = (moved_to, self.variants.get_mut(id)) {
            for variant in variants.iter_mut().filter(|v| !v.state.is_deleted()) {
                if variant.data.collection_id != collection_id {
                    variant.data.collection_id = collection_id.clone();
                    variant.state = variant.state.edited();
                }
            }
        }
        Ok(())
    }

    pub fn set_variant_field(
        &mut self,
        id: &EntityId,
        field: VariantField,
    ) -> Result<(), BufferError> {
        let variant = self.variant_mut(id)?;
        variant.apply(field);
        Ok(())
    }

    /// Add an unsaved product to a collection and return its temporary id.
    pub fn add_product(&mut self, collection_id: impl Into<String>) -> EntityId {
        let product = BufferedProduct::created(self.ids.next_id(), collection_id);
        let id = product.id.clone();
        self.products.push(product);
        // Nothing to fetch for a product the server has never seen.
        self.variants.insert(id.clone(), Vec::new());
        id
    }

    /// Add an unsaved variant under `product_id`. The variant inherits the
    /// product's collection.
    pub fn add_variant(&mut self, product_id: &EntityId) -> Result<EntityId, BufferError> {
        let product = self
            .product(product_id)
            .ok_or_else(|| BufferError::UnknownProduct(product_id.clone()))?;
        if product.state.is_deleted() {
            return Err(BufferError::ProductDeleted(product_id.clone()));
        }
        let collection_id = product.data.collection_id.clone();

        let temp = self.ids.next_id();
        let variants = self
            .variants
            .get_mut(product_id)
            .ok_or_else(|| BufferError::VariantsNotLoaded(product_id.clone()))?;
        let variant = BufferedVariant::created(temp, product_id.clone(), collection_id);
        let id = variant.id.clone();
        variants.push(variant);
        Ok(id)
    }

    /// Delete a product. Unsaved products vanish with their variants;
    /// saved ones are marked and their variants go with the server's
    /// cascading delete.
    pub fn delete_product(&mut self, id: &EntityId) -> Result<DeleteOutcome, BufferError> {
        let product = self.product_mut(id)?;
        product.state = product.state.deleted();
        if product.state != EditState::CreatedThenDeleted {
            return Ok(DeleteOutcome::Marked);
        }

        self.discard_product(id)?;
        Ok(DeleteOutcome::Removed)
    }

    /// Delete a variant. Unsaved variants vanish; saved ones are marked.
    pub fn delete_variant(&mut self, id: &EntityId) -> Result<DeleteOutcome, BufferError> {
        let variant = self.variant_mut(id)?;
        variant.state = variant.state.deleted();
        if variant.state != EditState::CreatedThenDeleted {
            return Ok(DeleteOutcome::Marked);
        }

        self.discard_variant(id)?;
        Ok(DeleteOutcome::Removed)
    }

    /// Lift an unedited delete mark. Returns `false` when the product needs
    /// the server's copy instead.
    pub fn restore_product(&mut self, id: &EntityId) -> Result<bool, BufferError> {
        let product = self.product_mut(id)?;
        match product.state.restored() {
            Some(state) => {
                product.state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn restore_variant(&mut self, id: &EntityId) -> Result<bool, BufferError> {
        let variant = self.variant_mut(id)?;
        match variant.state.restored() {
            Some(state) => {
                variant.state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Overwrite a local product with the server's record, clearing its
    /// state. The product's buffered variants are left alone.
    pub fn replace_product(&mut self, product: Product) -> Result<(), BufferError> {
        let id = EntityId::persisted(product.product_id.clone());
        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BufferError::IdMismatch {
                expected: id.clone(),
                actual: product.product_id.clone(),
            })?;
        *slot = BufferedProduct::from_server(product);
        Ok(())
    }

    pub fn replace_variant(&mut self, variant: Variant) -> Result<(), BufferError> {
        let id = EntityId::persisted(variant.variant_id.clone());
        let slot = self.variant_mut(&id)?;
        if slot.product_id.as_persisted() != Some(variant.product_id.as_str()) {
            return Err(BufferError::IdMismatch {
                expected: slot.product_id.clone(),
                actual: variant.product_id,
            });
        }
        *slot = BufferedVariant::from_server(variant);
        Ok(())
    }

    /// Drop a product and its variant cache entry from the buffer.
    pub fn discard_product(&mut self, id: &EntityId) -> Result<(), BufferError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| BufferError::UnknownProduct(id.clone()))?;
        self.products.remove(index);
        self.variants.remove(id);
        if self.selected_product.as_ref() == Some(id) {
            self.selected_product = None;
        }
        Ok(())
    }

    /// Drop a variant from the buffer, clearing any default reference to it.
    pub fn discard_variant(&mut self, id: &EntityId) -> Result<(), BufferError> {
        let (product_id, index) = self
            .locate_variant(id)
            .ok_or_else(|| BufferError::UnknownVariant(id.clone()))?;
        if let Some(variants) = self.variants.get_mut(&product_id) {
            variants.remove(index);
        }
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            if product.default_variant_id.as_ref() == Some(id) {
                product.default_variant_id = None;
            }
        }
        Ok(())
    }

    /// Swap in a freshly loaded product list. The variant cache is emptied and
    /// the selection kept only if the product is still there, otherwise the
    /// first product becomes selected.
    pub fn replace_contents(&mut self, collection_ids: Vec<String>, products: Vec<Product>) {
        self.products = products.into_iter().map(BufferedProduct::from_server).collect();
        self.variants.clear();
        self.selected_collections = collection_ids;

        let still_there = self
            .selected_product
            .as_ref()
            .is_some_and(|id| self.products.iter().any(|p| &p.id == id));
        if !still_there {
            self.selected_product = self.products.first().map(|p| p.id.clone());
        }
    }

    /// Fill the variant cache entry of one product.
    pub fn insert_variants(&mut self, product_id: EntityId, variants: Vec<Variant>) {
        let buffered = variants.into_iter().map(BufferedVariant::from_server).collect();
        self.variants.insert(product_id, buffered);
    }

    fn product_mut(&mut self, id: &EntityId) -> Result<&mut BufferedProduct, BufferError> {
        self.products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| BufferError::UnknownProduct(id.clone()))
    }

    fn variant_mut(&mut self, id: &EntityId) -> Result<&mut BufferedVariant, BufferError> {
        self.variants
            .values_mut()
            .flatten()
            .find(|v| &v.id == id)
            .ok_or_else(|| BufferError::UnknownVariant(id.clone()))
    }

    fn locate_variant(&self, id: &EntityId) -> Option<(EntityId, usize)> {
        self.variants.iter().find_map(|(product_id, variants)| {
            variants
                .iter()
                .position(|v| &v.id == id)
                .map(|index| (product_id.clone(), index))
        })
    }
}
