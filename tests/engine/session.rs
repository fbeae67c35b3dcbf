//! Session-level behavior: commit then reload, notifications, undo.

use std::sync::{Arc, Mutex};

use catalog_commit::{
    CatalogCall, CatalogService, CatalogSession, DeleteOutcome, EditState, EntityId,
    InMemoryCatalog, LogNotifier, Notification, ProductField, RecordingCatalog, SessionError,
    UndoOutcome, VariantField,
};

use crate::support::{init_tracing, seed_product, seed_variant, FailOn, Flaky, SHOES};

async fn recorded_session(
    inner: InMemoryCatalog,
) -> (
    CatalogSession<RecordingCatalog<InMemoryCatalog>>,
    Arc<RecordingCatalog<InMemoryCatalog>>,
) {
    let catalog = Arc::new(RecordingCatalog::new(inner));
    let mut session = CatalogSession::new(catalog.clone());
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();
    catalog.clear();
    (session, catalog)
}

#[tokio::test]
async fn commit_reloads_and_clears_every_flag() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let id = EntityId::persisted(product.product_id.clone());
    session
        .buffer_mut()
        .set_product_field(&id, ProductField::Name("Road Runner".into()))
        .unwrap();
    let created = session.buffer_mut().add_product(SHOES);
    assert!(session.has_unsaved_changes());

    let report = session.commit().await.unwrap();

    assert_eq!(report.products_updated, 1);
    assert_eq!(report.products_created, 1);
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.buffer().products().len(), 2);
    assert!(session.buffer().product(&created).is_none());
    assert_eq!(session.buffer().product(&id).unwrap().data.name, "Road Runner");
    assert!(session
        .buffer()
        .products()
        .iter()
        .all(|p| p.state == EditState::Unmodified && !p.id.is_temporary()));
    assert!(catalog.calls().contains(&CatalogCall::GetProducts(SHOES.into())));
}

#[tokio::test]
async fn selected_new_product_stays_selected_after_commit() {
    let inner = InMemoryCatalog::new();
    seed_product(&inner, "Runner").await;
    let (mut session, _) = recorded_session(inner).await;

    let created = session.buffer_mut().add_product(SHOES);
    session.select_product(&created).await.unwrap();
    let report = session.commit().await.unwrap();

    let real = report.ids.resolve_product(&created).unwrap();
    assert_eq!(
        session.buffer().selected_product(),
        Some(&EntityId::persisted(real.clone()))
    );
    assert!(session
        .buffer()
        .has_variants_loaded(&EntityId::persisted(real)));
}

#[tokio::test]
async fn deleted_selection_falls_back_to_first_product() {
    let inner = InMemoryCatalog::new();
    let first = seed_product(&inner, "First").await;
    let second = seed_product(&inner, "Second").await;
    let (mut session, _) = recorded_session(inner).await;

    let second_id = EntityId::persisted(second.product_id);
    session.select_product(&second_id).await.unwrap();
    session.buffer_mut().delete_product(&second_id).unwrap();
    session.commit().await.unwrap();

    assert_eq!(
        session.buffer().selected_product(),
        Some(&EntityId::persisted(first.product_id))
    );
}

#[tokio::test]
async fn failed_commit_notifies_once_and_keeps_the_buffer_dirty() {
    init_tracing();
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let catalog = Arc::new(Flaky::new(inner));
    let notes = Arc::new(Mutex::new(Vec::new()));
    let mut session = CatalogSession::new(catalog.clone())
        .with_notifier(LogNotifier::with_buffer(notes.clone()));
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let id = EntityId::persisted(product.product_id.clone());
    session
        .buffer_mut()
        .set_product_field(&id, ProductField::Name("Local".into()))
        .unwrap();
    catalog.arm(Some(FailOn::UpdateProduct));

    let err = session.commit().await.unwrap_err();
    assert!(matches!(err, SessionError::Commit(_)));
    assert!(session.has_unsaved_changes());
    assert_eq!(session.buffer().product(&id).unwrap().data.name, "Local");
    {
        let notes = notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        match &notes[0] {
            Notification::CommitFailed { phase, .. } => assert_eq!(phase, "update-products"),
            other => panic!("unexpected notification {other:?}"),
        }
    }

    catalog.arm(None);
    session.commit().await.unwrap();
    assert!(!session.has_unsaved_changes());
    assert_eq!(catalog.inner.product(&product.product_id).unwrap().data.name, "Local");
}

#[tokio::test]
async fn failed_reload_leaves_the_buffer_untouched() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let catalog = Arc::new(Flaky::new(inner));
    let notes = Arc::new(Mutex::new(Vec::new()));
    let mut session = CatalogSession::new(catalog.clone())
        .with_notifier(LogNotifier::with_buffer(notes.clone()));
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let id = EntityId::persisted(product.product_id);
    session
        .buffer_mut()
        .set_product_field(&id, ProductField::Name("Local".into()))
        .unwrap();
    catalog.arm(Some(FailOn::ProductsRead));

    let err = session.reload().await.unwrap_err();

    assert!(matches!(err, SessionError::Load(_)));
    assert_eq!(session.buffer().product(&id).unwrap().data.name, "Local");
    assert_eq!(session.buffer().product(&id).unwrap().state, EditState::Modified);
    assert_eq!(notes.lock().unwrap()[0].event_type(), "catalog.load_failed");
}

#[tokio::test]
async fn reload_failure_after_commit_carries_the_report() {
    let inner = InMemoryCatalog::new();
    seed_product(&inner, "Runner").await;
    let catalog = Arc::new(Flaky::new(inner));
    let mut session = CatalogSession::new(catalog.clone());
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    session.buffer_mut().add_product(SHOES);
    catalog.arm(Some(FailOn::ProductsRead));

    match session.commit().await.unwrap_err() {
        SessionError::Reload { report, .. } => assert_eq!(report.products_created, 1),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(catalog.inner.product_count(), 2);
}

#[tokio::test]
async fn failed_variant_read_during_reload_keeps_edits_and_selection() {
    let inner = InMemoryCatalog::new();
    let first = seed_product(&inner, "First").await;
    let second = seed_product(&inner, "Second").await;
    let catalog = Arc::new(Flaky::new(inner));
    let mut session = CatalogSession::new(catalog.clone());
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let first_id = EntityId::persisted(first.product_id);
    let second_id = EntityId::persisted(second.product_id);
    session.select_product(&second_id).await.unwrap();
    let buffer = session.buffer_mut();
    buffer
        .set_product_field(&first_id, ProductField::Name("Local".into()))
        .unwrap();
    let variant = buffer.add_variant(&second_id).unwrap();
    catalog.arm(Some(FailOn::VariantsRead));

    let err = session.reload().await.unwrap_err();

    assert!(matches!(err, SessionError::Load(_)));
    let buffer = session.buffer();
    assert_eq!(buffer.selected_product(), Some(&second_id));
    assert_eq!(buffer.product(&first_id).unwrap().data.name, "Local");
    assert_eq!(buffer.product(&first_id).unwrap().state, EditState::Modified);
    assert_eq!(buffer.variant(&variant).unwrap().state, EditState::Created);
    assert!(session.has_unsaved_changes());
}

#[tokio::test]
async fn failed_variant_read_after_commit_keeps_the_pre_commit_buffer() {
    let inner = InMemoryCatalog::new();
    seed_product(&inner, "Runner").await;
    let catalog = Arc::new(Flaky::new(inner));
    let mut session = CatalogSession::new(catalog.clone());
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let created = session.buffer_mut().add_product(SHOES);
    session.select_product(&created).await.unwrap();
    catalog.arm(Some(FailOn::VariantsRead));

    match session.commit().await.unwrap_err() {
        SessionError::Reload { report, .. } => assert_eq!(report.products_created, 1),
        other => panic!("unexpected error {other:?}"),
    }
    let buffer = session.buffer();
    assert_eq!(buffer.selected_product(), Some(&created));
    assert_eq!(buffer.product(&created).unwrap().state, EditState::Created);
    assert_eq!(catalog.inner.product_count(), 2);

    catalog.arm(None);
    session.reload().await.unwrap();
    assert_eq!(session.buffer().products().len(), 2);
}

#[tokio::test]
async fn undo_of_unedited_delete_makes_no_calls() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let id = EntityId::persisted(product.product_id);
    assert_eq!(
        session.buffer_mut().delete_product(&id).unwrap(),
        DeleteOutcome::Marked
    );
    assert_eq!(session.undo_product(&id).await.unwrap(), UndoOutcome::Restored);

    assert_eq!(session.buffer().product(&id).unwrap().state, EditState::Unmodified);
    assert!(!session.has_unsaved_changes());
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn undo_of_edited_delete_reads_once_and_leaves_variants_alone() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let variant = seed_variant(&inner, &product.product_id, "42").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let id = EntityId::persisted(product.product_id.clone());
    let variant_id = EntityId::persisted(variant.variant_id);
    let buffer = session.buffer_mut();
    buffer
        .set_product_field(&id, ProductField::Name("Local".into()))
        .unwrap();
    buffer
        .set_variant_field(&variant_id, VariantField::Stock(0))
        .unwrap();
    buffer.delete_product(&id).unwrap();

    assert_eq!(session.undo_product(&id).await.unwrap(), UndoOutcome::Refetched);

    assert_eq!(catalog.calls(), vec![CatalogCall::GetProduct(product.product_id)]);
    let restored = session.buffer().product(&id).unwrap();
    assert_eq!(restored.state, EditState::Unmodified);
    assert_eq!(restored.data.name, "Runner");
    assert_eq!(
        session.buffer().variant(&variant_id).unwrap().state,
        EditState::Modified
    );
}

#[tokio::test]
async fn undo_of_product_gone_from_server_discards_it() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let id = EntityId::persisted(product.product_id.clone());
    session
        .buffer_mut()
        .set_product_field(&id, ProductField::Name("Local".into()))
        .unwrap();
    catalog.inner().delete_product(&product.product_id).await.unwrap();

    assert_eq!(session.undo_product(&id).await.unwrap(), UndoOutcome::Discarded);
    assert!(session.buffer().product(&id).is_none());
}

#[tokio::test]
async fn undo_variant_refetches_from_the_product_listing() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let variant = seed_variant(&inner, &product.product_id, "42").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let variant_id = EntityId::persisted(variant.variant_id);
    session
        .buffer_mut()
        .set_variant_field(&variant_id, VariantField::Stock(0))
        .unwrap();

    assert_eq!(session.undo_variant(&variant_id).await.unwrap(), UndoOutcome::Refetched);

    assert_eq!(catalog.calls(), vec![CatalogCall::GetVariants(product.product_id)]);
    let restored = session.buffer().variant(&variant_id).unwrap();
    assert_eq!(restored.data.stock, 5);
    assert_eq!(restored.state, EditState::Unmodified);
}

#[tokio::test]
async fn new_entities_vanish_without_server_calls() {
    let inner = InMemoryCatalog::new();
    seed_product(&inner, "Runner").await;
    let (mut session, catalog) = recorded_session(inner).await;

    let buffer = session.buffer_mut();
    let product = buffer.add_product(SHOES);
    let variant = buffer.add_variant(&product).unwrap();
    assert_eq!(buffer.delete_variant(&variant).unwrap(), DeleteOutcome::Removed);
    assert_eq!(buffer.delete_product(&product).unwrap(), DeleteOutcome::Removed);
    assert!(!session.has_unsaved_changes());

    session.commit().await.unwrap();
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn undo_of_new_product_drops_it_and_its_variants() {
    let (mut session, catalog) = recorded_session(InMemoryCatalog::new()).await;

    let product = session.buffer_mut().add_product(SHOES);
    let variant = session.buffer_mut().add_variant(&product).unwrap();

    assert_eq!(session.undo_product(&product).await.unwrap(), UndoOutcome::Discarded);
    assert!(session.buffer().product(&product).is_none());
    assert!(session.buffer().variant(&variant).is_none());
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn failed_undo_read_notifies() {
    let inner = InMemoryCatalog::new();
    let product = seed_product(&inner, "Runner").await;
    let catalog = Arc::new(Flaky::new(inner));
    let notes = Arc::new(Mutex::new(Vec::new()));
    let mut session = CatalogSession::new(catalog.clone())
        .with_notifier(LogNotifier::with_buffer(notes.clone()));
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let id = EntityId::persisted(product.product_id);
    session
        .buffer_mut()
        .set_product_field(&id, ProductField::Name("Local".into()))
        .unwrap();
    catalog.arm(Some(FailOn::ProductRead));

    let err = session.undo_product(&id).await.unwrap_err();
    assert!(matches!(err, SessionError::Undo { .. }));
    assert!(err.catalog_error().is_some());
    assert_eq!(session.buffer().product(&id).unwrap().data.name, "Local");
    assert_eq!(notes.lock().unwrap()[0].event_type(), "catalog.undo_failed");
}
