//! HTTP transport for the catalog service.
//!
//! Requires the `http` feature. [`router`] exposes any [`CatalogService`]
//! as a JSON API with axum; [`HttpCatalog`] implements the trait against
//! that API with reqwest.
//!
//! ## Routes
//!
//! - `POST /products`, `GET|PUT|DELETE /products/:id`
//! - `PUT /products/:id/default-variant` with body `{ "variantId": .. }`
//! - `GET /products/:id/variants`
//! - `GET /collections/:id/products`
//! - `POST /variants`, `PUT|DELETE /variants/:id`
//!
//! Failures answer with the [`CatalogError`] as JSON
//! (`{ "kind": "notFound", "message": .. }`) and its status code.
//!
//! ## Example
//!
//! ```ignore
//! let catalog = Arc::new(InMemoryCatalog::new());
//! tokio::spawn(http::serve(catalog, "127.0.0.1:3000"));
//!
//! let remote = HttpCatalog::new("http://127.0.0.1:3000")?;
//! let mut session = CatalogSession::new(Arc::new(remote));
//! ```
//!
//! [`CatalogService`]: super::CatalogService
//! [`CatalogError`]: super::CatalogError

mod client;
mod server;

pub use client::HttpCatalog;
pub use server::{router, serve};
