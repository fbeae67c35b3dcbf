//! Edit buffer - the offline working copy of products and variants.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_commit::{EditBuffer, ProductField, VariantField};
//!
//! let mut buffer = EditBuffer::new();
//! let product = buffer.add_product("shoes");
//! let variant = buffer.add_variant(&product)?;
//! buffer.set_variant_field(&variant, VariantField::Price(12_900))?;
//! buffer.set_product_field(&product, ProductField::DefaultVariant(Some(variant)))?;
//! assert!(buffer.has_unsaved_changes());
//! ```

mod edit_buffer;
mod error;

pub use edit_buffer::{DeleteOutcome, EditBuffer};
pub use error::BufferError;
