//! Catalog and cart records.

use serde::{Deserialize, Serialize};

/// Catalog entry as returned by the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "image01")]
    pub image: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id", alias = "id", alias = "productId")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub total_price: f64,
}

impl CartItem {
    /// A fresh line for `product` with quantity one.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.price,
            quantity: 1,
            total_price: product.price,
        }
    }

    /// Sets the quantity and keeps the line total in step with it.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_price = self.price * f64::from(quantity);
    }
}
