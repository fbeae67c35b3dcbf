use std::collections::HashSet;

use crate::buffer::EditBuffer;
use crate::entity::{EntityId, NewProduct, NewVariant, ProductData, TempId, VariantData};

/// A product to create in phase 2.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreate {
    pub temp: TempId,
    /// Payload with any temporary default stripped.
    pub payload: NewProduct,
    /// Default variant that only exists once phase 3 has run.
    pub deferred_default: Option<TempId>,
}

/// A variant to create in phase 3. Ids stay unresolved until the phase runs.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCreate {
    pub temp: TempId,
    pub product_id: EntityId,
    pub data: VariantData,
    pub related_products: Vec<EntityId>,
}

impl VariantCreate {
    pub(crate) fn payload(&self, product_id: String, related_product_ids: Vec<String>) -> NewVariant {
        NewVariant {
            product_id,
            data: self.data.clone(),
            related_product_ids,
        }
    }
}

/// A saved product to update in phase 4.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub product_id: String,
    pub data: ProductData,
    /// `None` clears the stored default.
    pub default_variant_id: Option<EntityId>,
}

/// A saved variant to update in phase 5.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantUpdate {
    pub variant_id: String,
    pub product_id: String,
    pub data: VariantData,
    pub related_products: Vec<EntityId>,
}

/// Snapshot of everything a commit has to send, sorted into phases.
///
/// Taken once when the commit starts; later buffer edits do not leak in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    pub variant_deletes: Vec<String>,
    pub product_deletes: Vec<String>,
    pub product_creates: Vec<ProductCreate>,
    pub variant_creates: Vec<VariantCreate>,
    pub product_updates: Vec<ProductUpdate>,
    pub variant_updates: Vec<VariantUpdate>,
}

impl CommitPlan {
    pub fn from_buffer(buffer: &EditBuffer) -> Self {
        let mut plan = CommitPlan::default();

        let deleted_products: HashSet<&EntityId> = buffer
            .products()
            .iter()
            .filter(|p| p.state.is_deleted())
            .map(|p| &p.id)
            .collect();
        // Phase 1 removes these before phase 4 could point a default at them.
        let deleted_variants: HashSet<&EntityId> = buffer
            .all_variants()
            .filter(|v| v.state.needs_delete())
            .map(|v| &v.id)
            .collect();

        for product in buffer.products() {
            let state = product.state;
            if state.needs_delete() {
                if let Some(id) = product.id.as_persisted() {
                    plan.product_deletes.push(id.to_string());
                }
            } else if state.needs_create() {
                let Some(temp) = product.id.as_temporary() else {
                    continue;
                };
                let (default_variant_id, deferred_default) = match &product.default_variant_id {
                    Some(EntityId::Temporary(variant)) => (None, Some(*variant)),
                    Some(EntityId::Persisted(variant)) => (Some(variant.clone()), None),
                    None => (None, None),
                };
                plan.product_creates.push(ProductCreate {
                    temp,
                    payload: product.payload(default_variant_id),
                    deferred_default,
                });
            } else if state.needs_update() {
                if let Some(id) = product.id.as_persisted() {
                    plan.product_updates.push(ProductUpdate {
                        product_id: id.to_string(),
                        data: product.data.clone(),
                        default_variant_id: product
                            .default_variant_id
                            .clone()
                            .filter(|id| !deleted_variants.contains(id)),
                    });
                }
            }
        }

        for product in buffer.products() {
            let Some(variants) = buffer.variants_of(&product.id) else {
                continue;
            };
            for variant in variants {
                let state = variant.state;
                if state.needs_delete() {
                    if let Some(id) = variant.id.as_persisted() {
                        plan.variant_deletes.push(id.to_string());
                    }
                    continue;
                }
                // The server's cascade takes care of everything under a
                // deleted product.
                if deleted_products.contains(&variant.product_id) {
                    continue;
                }
                if state.needs_create() {
                    if let Some(temp) = variant.id.as_temporary() {
                        plan.variant_creates.push(VariantCreate {
                            temp,
                            product_id: variant.product_id.clone(),
                            data: variant.data.clone(),
                            related_products: variant.related_products.clone(),
                        });
                    }
                } else if state.needs_update() {
                    if let (Some(id), Some(product_id)) =
                        (variant.id.as_persisted(), variant.product_id.as_persisted())
                    {
                        plan.variant_updates.push(VariantUpdate {
                            variant_id: id.to_string(),
                            product_id: product_id.to_string(),
                            data: variant.data.clone(),
                            related_products: variant.related_products.clone(),
                        });
                    }
                }
            }
        }

        plan
    }

    /// Number of write calls the plan will issue, deferred defaults included.
    pub fn write_count(&self) -> usize {
        self.variant_deletes.len()
            + self.product_deletes.len()
            + self.product_creates.len()
            + self.variant_creates.len()
            + self.product_updates.len()
            + self.variant_updates.len()
            + self
                .product_creates
                .iter()
                .filter(|c| c.deferred_default.is_some())
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.write_count() == 0
    }
}
