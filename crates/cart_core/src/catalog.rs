//! Remote product catalog used to seed an empty cart.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::CartItem,
    protocol::{CatalogRecord, CatalogResponse},
};

pub const DEFAULT_CATALOG_URL: &str =
    "https://cdn.shopify.com/s/files/1/0883/2188/4479/files/apiCartData.json?v=1728384889";

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One attempt, no retry. Each call yields items with fresh identifiers.
    async fn fetch_items(&self) -> Result<Vec<CartItem>>;
}

pub struct HttpCatalog {
    http: Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_items(&self) -> Result<Vec<CartItem>> {
        let response: CatalogResponse = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.into_cart_items())
    }
}

/// Fixed catalog served from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<CatalogRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_items(&self) -> Result<Vec<CartItem>> {
        Ok(self
            .records
            .iter()
            .cloned()
            .map(CartItem::from)
            .collect())
    }
}

/// Source that always fails, for running without network access.
pub struct UnavailableCatalog;

#[async_trait]
impl CatalogSource for UnavailableCatalog {
    async fn fetch_items(&self) -> Result<Vec<CartItem>> {
        Err(anyhow!("catalog source unavailable"))
    }
}

#[async_trait]
impl<C: CatalogSource + ?Sized> CatalogSource for Box<C> {
    async fn fetch_items(&self) -> Result<Vec<CartItem>> {
        (**self).fetch_items().await
    }
}
