use serde::{Deserialize, Serialize};

use crate::domain::{quantity_serde, CartItem};

/// Body served by the catalog endpoint. Fields beyond the ones below are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub items: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub title: String,
    pub price: f64,
    #[serde(deserialize_with = "quantity_serde::deserialize")]
    pub quantity: u32,
    pub image: String,
}

impl From<CatalogRecord> for CartItem {
    fn from(record: CatalogRecord) -> Self {
        CartItem::new(record.title, record.price, record.quantity, record.image)
    }
}

impl CatalogResponse {
    pub fn into_cart_items(self) -> Vec<CartItem> {
        self.items.into_iter().map(CartItem::from).collect()
    }
}
