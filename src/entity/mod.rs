//! Catalog entities: ids, edit state, and the product/variant records in
//! their server, payload and buffered shapes.

mod id;
mod product;
mod state;
mod variant;

pub use id::{EntityId, TempId, TempIdGenerator};
pub use product::{BufferedProduct, NewProduct, Product, ProductData, ProductField};
pub use state::EditState;
pub use variant::{BufferedVariant, NewVariant, Variant, VariantData, VariantField};
