use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;

use crate::catalog::{CatalogError, CatalogService};
use crate::entity::{NewProduct, NewVariant, Product, Variant};

/// Build an axum `Router` serving the given catalog.
pub fn router<C: CatalogService + ?Sized + 'static>(service: Arc<C>) -> Router {
    Router::new()
        .route("/products", post(create_product::<C>))
        .route(
            "/products/:id",
            get(get_product::<C>)
                .put(update_product::<C>)
                .delete(delete_product::<C>),
        )
        .route("/products/:id/default-variant", put(update_default_variant::<C>))
        .route("/products/:id/variants", get(get_variants::<C>))
        .route("/collections/:id/products", get(get_products::<C>))
        .route("/variants", post(create_variant::<C>))
        .route(
            "/variants/:id",
            put(update_variant::<C>).delete(delete_variant::<C>),
        )
        .with_state(service)
}

/// Serve the catalog over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<C: CatalogService + ?Sized + 'static>(
    service: Arc<C>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    debug!(addr, "catalog http listening");
    axum::serve(listener, app).await
}

struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultVariantBody {
    variant_id: String,
}

async fn create_product<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = service.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    match service.get_product_by_id(&id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(CatalogError::NotFound(format!("product {id}")).into()),
    }
}

async fn update_product<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
    Json(product): Json<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(service.update_product(&id, product).await?))
}

async fn delete_product<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_default_variant<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
    Json(body): Json<DefaultVariantBody>,
) -> Result<StatusCode, ApiError> {
    service.update_default_variant(&id, &body.variant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_variants<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Variant>>, ApiError> {
    Ok(Json(service.get_variants_by_product_id(&id).await?))
}

async fn get_products<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(service.get_products_by_collection_id(&id).await?))
}

async fn create_variant<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Json(variant): Json<NewVariant>,
) -> Result<(StatusCode, Json<Variant>), ApiError> {
    let variant = service.create_variant(variant).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

async fn update_variant<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
    Json(variant): Json<NewVariant>,
) -> Result<Json<Variant>, ApiError> {
    Ok(Json(service.update_variant(&id, variant).await?))
}

async fn delete_variant<C: CatalogService + ?Sized>(
    State(service): State<Arc<C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_variant(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
