//! Shared fixtures: seeding helpers and a catalog that fails on demand.

use std::sync::Mutex;

use async_trait::async_trait;
use catalog_commit::{
    CatalogError, CatalogService, EditBuffer, EntityId, InMemoryCatalog, NewProduct, NewVariant,
    Product, ProductData, Variant, VariantData,
};

pub const SHOES: &str = "shoes";

/// Route engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub async fn seed_product(catalog: &impl CatalogService, name: &str) -> Product {
    catalog
        .create_product(NewProduct {
            data: ProductData {
                collection_id: SHOES.into(),
                name: name.into(),
                ..ProductData::default()
            },
            default_variant_id: None,
        })
        .await
        .unwrap()
}

pub async fn seed_variant(catalog: &impl CatalogService, product_id: &str, name: &str) -> Variant {
    catalog
        .create_variant(NewVariant {
            product_id: product_id.into(),
            data: VariantData {
                collection_id: SHOES.into(),
                name: name.into(),
                price: 1000,
                stock: 5,
                ..VariantData::default()
            },
            related_product_ids: vec![],
        })
        .await
        .unwrap()
}

/// Fill a buffer the way the loader would: products of `SHOES`, and the
/// variants of every product.
pub async fn load_all(catalog: &impl CatalogService, buffer: &mut EditBuffer) {
    let products = catalog.get_products_by_collection_id(SHOES).await.unwrap();
    let ids: Vec<String> = products.iter().map(|p| p.product_id.clone()).collect();
    buffer.replace_contents(vec![SHOES.into()], products);
    for id in ids {
        let variants = catalog.get_variants_by_product_id(&id).await.unwrap();
        buffer.insert_variants(EntityId::persisted(id), variants);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    DeleteProduct,
    CreateVariant,
    UpdateProduct,
    UpdateDefaultVariant,
    ProductsRead,
    ProductRead,
    VariantsRead,
}

/// In-memory catalog that fails one kind of call while armed.
pub struct Flaky {
    pub inner: InMemoryCatalog,
    fail_on: Mutex<Option<FailOn>>,
}

impl Flaky {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            fail_on: Mutex::new(None),
        }
    }

    pub fn arm(&self, fail_on: Option<FailOn>) {
        *self.fail_on.lock().unwrap() = fail_on;
    }

    fn check(&self, op: FailOn) -> Result<(), CatalogError> {
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(CatalogError::Transport(format!("injected failure on {op:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for Flaky {
    async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        self.inner.create_product(product).await
    }

    async fn update_product(
        &self,
        product_id: &str,
        product: NewProduct,
    ) -> Result<Product, CatalogError> {
        self.check(FailOn::UpdateProduct)?;
        self.inner.update_product(product_id, product).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        self.check(FailOn::DeleteProduct)?;
        self.inner.delete_product(product_id).await
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, CatalogError> {
        self.check(FailOn::CreateVariant)?;
        self.inner.create_variant(variant).await
    }

    async fn update_variant(
        &self,
        variant_id: &str,
        variant: NewVariant,
    ) -> Result<Variant, CatalogError> {
        self.inner.update_variant(variant_id, variant).await
    }

    async fn delete_variant(&self, variant_id: &str) -> Result<(), CatalogError> {
        self.inner.delete_variant(variant_id).await
    }

    async fn update_default_variant(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<(), CatalogError> {
        self.check(FailOn::UpdateDefaultVariant)?;
        self.inner.update_default_variant(product_id, variant_id).await
    }

    async fn get_product_by_id(&self, product_id: &str) -> Result<Option<Product>, CatalogError> {
        self.check(FailOn::ProductRead)?;
        self.inner.get_product_by_id(product_id).await
    }

    async fn get_variants_by_product_id(
        &self,
        product_id: &str,
    ) -> Result<Vec<Variant>, CatalogError> {
        self.check(FailOn::VariantsRead)?;
        self.inner.get_variants_by_product_id(product_id).await
    }

    async fn get_products_by_collection_id(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        self.check(FailOn::ProductsRead)?;
        self.inner.get_products_by_collection_id(collection_id).await
    }
}
