use std::collections::HashMap;

use crate::entity::{EntityId, TempId};

/// Temporary-to-server id mappings built up during a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    products: HashMap<TempId, String>,
    variants: HashMap<TempId, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product(&self, temp: TempId) -> Option<&str> {
        self.products.get(&temp).map(String::as_str)
    }

    pub fn variant(&self, temp: TempId) -> Option<&str> {
        self.variants.get(&temp).map(String::as_str)
    }

    /// Server id for a product reference, if one is known yet.
    pub fn resolve_product(&self, id: &EntityId) -> Option<String> {
        match id {
            EntityId::Persisted(real) => Some(real.clone()),
            EntityId::Temporary(temp) => self.product(*temp).map(str::to_string),
        }
    }

    pub fn resolve_variant(&self, id: &EntityId) -> Option<String> {
        match id {
            EntityId::Persisted(real) => Some(real.clone()),
            EntityId::Temporary(temp) => self.variant(*temp).map(str::to_string),
        }
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub(crate) fn insert_product(&mut self, temp: TempId, real: String) {
        self.products.insert(temp, real);
    }

    pub(crate) fn insert_variant(&mut self, temp: TempId, real: String) {
        self.variants.insert(temp, real);
    }
}
