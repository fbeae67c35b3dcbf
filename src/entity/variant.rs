use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EditState, EntityId, TempId};

/// Content shared by the server record, the payload and the buffered copy of
/// a variant. Ids that may still be temporary in the buffer live outside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantData {
    pub collection_id: String,
    pub name: String,
    /// Minor currency units.
    pub price: i64,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_in_order: Option<u32>,
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// A variant as stored by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: String,
    pub product_id: String,
    #[serde(flatten)]
    pub data: VariantData,
    #[serde(default)]
    pub related_product_ids: Vec<String>,
}

/// Create/update payload for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub product_id: String,
    #[serde(flatten)]
    pub data: VariantData,
    #[serde(default)]
    pub related_product_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantField {
    Name(String),
    Price(i64),
    Stock(u32),
    MaximumInOrder(Option<u32>),
    RelatedProducts(Vec<EntityId>),
    Fields(Vec<Value>),
    ImageUrls(Vec<String>),
}

/// A variant held in the edit buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedVariant {
    pub id: EntityId,
    pub product_id: EntityId,
    pub data: VariantData,
    pub related_products: Vec<EntityId>,
    pub state: EditState,
}

impl BufferedVariant {
    pub fn created(id: TempId, product_id: EntityId, collection_id: impl Into<String>) -> Self {
        Self {
            id: EntityId::Temporary(id),
            product_id,
            data: VariantData {
                collection_id: collection_id.into(),
                name: "New variant".to_string(),
                ..VariantData::default()
            },
            related_products: Vec::new(),
            state: EditState::Created,
        }
    }

    pub fn from_server(variant: Variant) -> Self {
        Self {
            id: EntityId::Persisted(variant.variant_id),
            product_id: EntityId::Persisted(variant.product_id),
            data: variant.data,
            related_products: variant
                .related_product_ids
                .into_iter()
                .map(EntityId::Persisted)
                .collect(),
            state: EditState::Unmodified,
        }
    }

    pub fn apply(&mut self, field: VariantField) {
        match field {
            VariantField::Name(name) => self.data.name = name,
            VariantField::Price(price) => self.data.price = price,
            VariantField::Stock(stock) => self.data.stock = stock,
            VariantField::MaximumInOrder(max) => self.data.maximum_in_order = max,
            VariantField::RelatedProducts(ids) => self.related_products = ids,
            VariantField::Fields(fields) => self.data.fields = fields,
            VariantField::ImageUrls(urls) => self.data.image_urls = urls,
        }
        self.state = self.state.edited();
    }
}
