use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::catalog::{CatalogError, CatalogService};
use crate::entity::{NewProduct, NewVariant, Product, Variant};

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}

/// [`CatalogService`] over the JSON API served by [`router`](super::router).
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Transport(format!("bad base url {base_url}: {e}")))?;
        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Transport(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CatalogError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CatalogError> {
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let url = self.url(&["products"])?;
        self.send_json(self.client.post(url).json(&product)).await
    }

    async fn update_product(
        &self,
        product_id: &str,
        product: NewProduct,
    ) -> Result<Product, CatalogError> {
        let url = self.url(&["products", product_id])?;
        self.send_json(self.client.put(url).json(&product)).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        let url = self.url(&["products", product_id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogError> {
        let url = self.url(&["variants"])?;
        self.send_json(self.client.post(url).json(&variant)).await
    }

    async fn update_variant(
        &self,
        variant_id: &str,
        variant: NewVariant,
    ) -> Result<Variant, CatalogError> {
        let url = self.url(&["variants", variant_id])?;
        self.send_json(self.client.put(url).json(&variant)).await
    }

    async fn delete_variant(&self, variant_id: &str) -> Result<(), CatalogError> {
        let url = self.url(&["variants", variant_id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn update_default_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<(), CatalogError> {
        let url = self.url(&["products", product_id, "default-variant"])?;
        let body = json!({ "variantId": variant_id });
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn get_product_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        let url = self.url(&["products", product_id])?;
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(Some(response.json().await?))
    }

    async fn get_variants_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CatalogError> {
        let url = self.url(&["products", product_id, "variants"])?;
        self.send_json(self.client.get(url)).await
    }

    async fn get_products_by_collection_id(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let url = self.url(&["collections", collection_id, "products"])?;
        self.send_json(self.client.get(url)).await
    }
}

/// Decode the server's JSON error body, falling back to the status code.
async fn error_from(response: Response) -> CatalogError {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(text) => serde_json::from_str(&text)
            .unwrap_or_else(|_| CatalogError::from_status(status, text)),
        Err(err) => err.into(),
    }
}
