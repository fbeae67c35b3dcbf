//! Session - ties the edit buffer, loader and commit engine together.
//!
//! `CatalogSession<C>` owns an [`EditBuffer`] and a shared catalog service.
//! Edits go straight to the buffer; `commit` drains it against the service
//! and reloads the current selection.
//!
//! ## Example
//!
//! ```ignore
//! let mut session = CatalogSession::new(Arc::new(InMemoryCatalog::new()));
//! session.load_for_selection(vec!["shoes".into()]).await?;
//!
//! let product = session.buffer_mut().add_product("shoes");
//! session.buffer_mut().set_product_field(&product, ProductField::Name("Runner".into()))?;
//!
//! let report = session.commit().await?;
//! assert!(!session.has_unsaved_changes());
//! ```

mod error;

pub use error::SessionError;

use std::sync::Arc;

use tracing::{debug, info};

use crate::buffer::{BufferError, EditBuffer};
use crate::catalog::{CatalogError, CatalogService};
use crate::commit::{CommitEngine, CommitPlan, CommitReport};
use crate::config::EngineConfig;
use crate::entity::EntityId;
use crate::loader::{LoadSummary, Loader};
use crate::notify::{LogNotifier, Notification, Notifier};

/// What an undo did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Nothing to undo.
    Unchanged,
    /// A delete mark was lifted locally.
    Restored,
    /// Local state was replaced with the server's record.
    Refetched,
    /// The entity was dropped from the buffer: it was new, or the server no
    /// longer has it.
    Discarded,
}

pub struct CatalogSession<C: ?Sized> {
    buffer: EditBuffer,
    catalog: Arc<C>,
    config: EngineConfig,
    notifier: Box<dyn Notifier>,
}

impl<C: CatalogService + ?Sized> CatalogSession<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            buffer: EditBuffer::new(),
            catalog,
            config: EngineConfig::default(),
            notifier: Box::new(LogNotifier::new()),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Local edits. Nothing here touches the catalog service.
    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.buffer.has_unsaved_changes()
    }

    /// Load the products of `collection_ids` and the selected product's
    /// variants. On failure the buffer keeps its previous contents.
    pub async fn load_for_selection(
        &mut self,
        collection_ids: Vec<String>,
    ) -> Result<LoadSummary, SessionError> {
        let selection = self.buffer.selected_product().cloned();
        self.load(collection_ids, selection).await
    }

    /// Re-read the currently selected collections.
    pub async fn reload(&mut self) -> Result<LoadSummary, SessionError> {
        let collections = self.buffer.selected_collections().to_vec();
        self.load_for_selection(collections).await
    }

    async fn load(
        &mut self,
        collection_ids: Vec<String>,
        selection: Option<EntityId>,
    ) -> Result<LoadSummary, SessionError> {
        let loader = Loader::new(self.catalog.as_ref(), &self.config.loader);
        loader
            .load_with_selection(&mut self.buffer, collection_ids, selection)
            .await
            .map_err(|err| {
                self.notifier.notify(&Notification::LoadFailed {
                    message: err.to_string(),
                });
                SessionError::Load(err)
            })
    }

    /// Select a product, loading its variants on first selection.
    pub async fn select_product(&mut self, id: &EntityId) -> Result<(), SessionError> {
        self.buffer.select_product(id)?;
        let loader = Loader::new(self.catalog.as_ref(), &self.config.loader);
        if let Err(err) = loader.ensure_variants(&mut self.buffer, id).await {
            self.notifier.notify(&Notification::LoadFailed {
                message: err.to_string(),
            });
            return Err(SessionError::Load(err));
        }
        Ok(())
    }

    /// Send every buffered change to the catalog and reload.
    ///
    /// A clean buffer makes no calls at all. When a phase fails the buffer
    /// is left as it was so the commit can be retried; whatever earlier
    /// phases applied stays applied.
    pub async fn commit(&mut self) -> Result<CommitReport, SessionError> {
        let plan = CommitPlan::from_buffer(&self.buffer);
        if plan.is_empty() {
            debug!("commit skipped, buffer is clean");
            return Ok(CommitReport::default());
        }

        let report = match CommitEngine::new(self.catalog.as_ref()).run(plan).await {
            Ok(report) => report,
            Err(err) => {
                self.notifier.notify(&Notification::CommitFailed {
                    phase: err.phase().to_string(),
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        // A selected new product keeps its selection under its server id.
        let selection = match self.buffer.selected_product() {
            Some(EntityId::Temporary(temp)) => report.ids.product(*temp).map(EntityId::persisted),
            other => other.cloned(),
        };
        let collections = self.buffer.selected_collections().to_vec();
        if let Err(err) = self.load(collections, selection).await {
            return Err(match err {
                SessionError::Load(source) => SessionError::Reload {
                    source,
                    report,
                },
                other => other,
            });
        }

        info!(writes = report.write_count(), "commit applied");
        self.notifier.notify(&Notification::Committed {
            writes: report.write_count(),
        });
        Ok(report)
    }

    /// Undo local changes to a product.
    ///
    /// An unedited delete mark is lifted locally. Anything else saved is
    /// replaced with the server's record through a single read, leaving the
    /// product's buffered variants as they are. A new product is dropped.
    pub async fn undo_product(&mut self, id: &EntityId) -> Result<UndoOutcome, SessionError> {
        let state = self
            .buffer
            .product(id)
            .map(|p| p.state)
            .ok_or_else(|| BufferError::UnknownProduct(id.clone()))?;

        if !state.is_dirty() {
            return Ok(UndoOutcome::Unchanged);
        }
        if state.is_new() {
            self.buffer.discard_product(id)?;
            debug!(product = %id, "new product discarded");
            return Ok(UndoOutcome::Discarded);
        }
        if self.buffer.restore_product(id)? {
            debug!(product = %id, "product restored");
            return Ok(UndoOutcome::Restored);
        }

        let Some(real) = id.as_persisted() else {
            return Err(BufferError::UnknownProduct(id.clone()).into());
        };
        match self.catalog.get_product_by_id(real).await {
            Ok(Some(product)) => {
                self.buffer.replace_product(product)?;
                debug!(product = %id, "product refetched");
                Ok(UndoOutcome::Refetched)
            }
            Ok(None) => {
                self.buffer.discard_product(id)?;
                info!(product = %id, "product gone from catalog, discarded");
                Ok(UndoOutcome::Discarded)
            }
            Err(source) => Err(self.undo_failed(id, source)),
        }
    }

    /// Undo local changes to a variant, by the same rules as
    /// [`undo_product`](Self::undo_product). The canonical record comes from
    /// the parent product's variant list.
    pub async fn undo_variant(&mut self, id: &EntityId) -> Result<UndoOutcome, SessionError> {
        let (state, product_id) = self
            .buffer
            .variant(id)
            .map(|v| (v.state, v.product_id.clone()))
            .ok_or_else(|| BufferError::UnknownVariant(id.clone()))?;

        if !state.is_dirty() {
            return Ok(UndoOutcome::Unchanged);
        }
        if state.is_new() {
            self.buffer.discard_variant(id)?;
            return Ok(UndoOutcome::Discarded);
        }
        if self.buffer.restore_variant(id)? {
            return Ok(UndoOutcome::Restored);
        }

        let (Some(real_variant), Some(real_product)) = (id.as_persisted(), product_id.as_persisted())
        else {
            return Err(BufferError::UnknownVariant(id.clone()).into());
        };
        let variants = match self.catalog.get_variants_by_product_id(real_product).await {
            Ok(variants) => variants,
            Err(source) => return Err(self.undo_failed(id, source)),
        };

        match variants.into_iter().find(|v| v.variant_id == real_variant) {
            Some(variant) => {
                self.buffer.replace_variant(variant)?;
                debug!(variant = %id, "variant refetched");
                Ok(UndoOutcome::Refetched)
            }
            None => {
                self.buffer.discard_variant(id)?;
                info!(variant = %id, "variant gone from catalog, discarded");
                Ok(UndoOutcome::Discarded)
            }
        }
    }

    fn undo_failed(&mut self, id: &EntityId, source: CatalogError) -> SessionError {
        self.notifier.notify(&Notification::UndoFailed {
            entity: id.to_string(),
            message: source.to_string(),
        });
        SessionError::Undo {
            entity: id.to_string(),
            source,
        }
    }
}
