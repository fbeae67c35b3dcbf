//! HTTP transport tests.
//!
//! Serves an in-memory catalog with axum and drives it through `HttpCatalog`.

use std::sync::Arc;

use catalog_commit::catalog::http::{self, HttpCatalog};
use catalog_commit::{
    CatalogError, CatalogService, CatalogSession, EntityId, InMemoryCatalog, NewProduct,
    ProductData, ProductField,
};

use crate::support::{seed_product, seed_variant, SHOES};

/// Bind to port 0 and return the actual address.
async fn start_server(catalog: Arc<InMemoryCatalog>) -> String {
    let app = http::router(catalog);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn reads_round_trip() {
    let store = Arc::new(InMemoryCatalog::new());
    let product = seed_product(store.as_ref(), "Runner").await;
    seed_variant(store.as_ref(), &product.product_id, "42").await;
    let remote = HttpCatalog::new(&start_server(store).await).unwrap();

    let products = remote.get_products_by_collection_id(SHOES).await.unwrap();
    assert_eq!(products, vec![product.clone()]);

    let variants = remote
        .get_variants_by_product_id(&product.product_id)
        .await
        .unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].data.name, "42");
}

#[tokio::test]
async fn missing_product_reads_as_none() {
    let remote = HttpCatalog::new(&start_server(Arc::new(InMemoryCatalog::new())).await).unwrap();

    assert_eq!(remote.get_product_by_id("missing").await.unwrap(), None);
}

#[tokio::test]
async fn errors_keep_their_kind() {
    let store = Arc::new(InMemoryCatalog::new());
    let product = seed_product(store.as_ref(), "Runner").await;
    let remote = HttpCatalog::new(&start_server(store).await).unwrap();

    let err = remote.delete_variant("missing").await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    let err = remote
        .update_product(
            &product.product_id,
            NewProduct {
                data: ProductData {
                    name: String::new(),
                    ..product.data.clone()
                },
                default_variant_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn session_commits_over_http() {
    let store = Arc::new(InMemoryCatalog::new());
    let remote = Arc::new(HttpCatalog::new(&start_server(store.clone()).await).unwrap());
    let mut session = CatalogSession::new(remote);
    session.load_for_selection(vec![SHOES.into()]).await.unwrap();

    let buffer = session.buffer_mut();
    let product = buffer.add_product(SHOES);
    let variant = buffer.add_variant(&product).unwrap();
    buffer
        .set_product_field(&product, ProductField::DefaultVariant(Some(variant.clone())))
        .unwrap();

    let report = session.commit().await.unwrap();

    let real_product = report.ids.resolve_product(&product).unwrap();
    let real_variant = report.ids.resolve_variant(&variant).unwrap();
    assert_eq!(
        store.product(&real_product).unwrap().default_variant_id,
        Some(real_variant)
    );
    assert_eq!(
        session.buffer().selected_product(),
        Some(&EntityId::persisted(real_product))
    );
    assert!(!session.has_unsaved_changes());
}
