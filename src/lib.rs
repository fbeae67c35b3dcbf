mod buffer;
mod commit;
mod config;
mod entity;
mod loader;
mod notify;
mod session;

pub mod catalog;

pub use buffer::{BufferError, DeleteOutcome, EditBuffer};
pub use catalog::{CatalogCall, CatalogError, CatalogService, InMemoryCatalog, RecordingCatalog};
pub use commit::{
    CommitEngine, CommitError, CommitPhase, CommitPlan, CommitReport, IdMap, ProductCreate,
    ProductUpdate, VariantCreate, VariantUpdate,
};
pub use config::{CatalogLimits, ConfigError, EngineConfig, LoaderConfig};
pub use entity::{
    BufferedProduct, BufferedVariant, EditState, EntityId, NewProduct, NewVariant, Product,
    ProductData, ProductField, TempId, TempIdGenerator, Variant, VariantData, VariantField,
};
pub use loader::{LoadSummary, Loader};
pub use notify::{LogNotifier, Notification, Notifier};
pub use session::{CatalogSession, SessionError, UndoOutcome};

#[cfg(feature = "emitter")]
pub use notify::EmitterNotifier;

// Re-export the EventEmitter so listeners can be built without a direct dependency
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
