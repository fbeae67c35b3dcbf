use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{EditState, EntityId, TempId};

/// Content shared by the server record, the create/update payload and the
/// buffered copy of a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub collection_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Structured content blocks, opaque to the engine.
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// A product as stored by the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    #[serde(flatten)]
    pub data: ProductData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant_id: Option<String>,
}

/// Create/update payload for a product. The server owns the id.
///
/// On update `default_variant_id` is tri-state: absent (`None`) leaves the
/// stored default as is, `null` (`Some(None)`) clears it and an id sets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(flatten)]
    pub data: ProductData,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_variant_id: Option<Option<String>>,
}

// Maps a present field, `null` included, to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A single field edit on a buffered product.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductField {
    Collection(String),
    Name(String),
    Description(Option<String>),
    Fields(Vec<Value>),
    ImageUrls(Vec<String>),
    DefaultVariant(Option<EntityId>),
}

/// A product held in the edit buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedProduct {
    pub id: EntityId,
    pub data: ProductData,
    pub default_variant_id: Option<EntityId>,
    pub state: EditState,
}

impl BufferedProduct {
    /// A fresh, unsaved product with default content.
    pub fn created(id: TempId, collection_id: impl Into<String>) -> Self {
        Self {
            id: EntityId::Temporary(id),
            data: ProductData {
                collection_id: collection_id.into(),
                name: "New product".to_string(),
                ..ProductData::default()
            },
            default_variant_id: None,
            state: EditState::Created,
        }
    }

    pub fn from_server(product: Product) -> Self {
        Self {
            id: EntityId::Persisted(product.product_id),
            data: product.data,
            default_variant_id: product.default_variant_id.map(EntityId::Persisted),
            state: EditState::Unmodified,
        }
    }

    /// Apply an edit and move the state machine. Reference checks on
    /// `DefaultVariant` are the buffer's job.
    pub fn apply(&mut self, field: ProductField) {
        match field {
            ProductField::Collection(collection_id) => self.data.collection_id = collection_id,
            ProductField::Name(name) => self.data.name = name,
            ProductField::Description(description) => self.data.description = description,
            ProductField::Fields(fields) => self.data.fields = fields,
            ProductField::ImageUrls(urls) => self.data.image_urls = urls,
            ProductField::DefaultVariant(variant_id) => self.default_variant_id = variant_id,
        }
        self.state = self.state.edited();
    }

    /// Create payload. A new product can only name a default that already
    /// exists on the server.
    pub fn payload(&self, default_variant_id: Option<String>) -> NewProduct {
        NewProduct {
            data: self.data.clone(),
            default_variant_id: default_variant_id.map(Some),
        }
    }
}
