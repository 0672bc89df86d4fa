//! Guest/remote cart coordination.
//!
//! A signed-out shopper builds a cart locally (persisted in the guest cart file).
//! Once signed in, every change goes to the storefront API instead, and the guest
//! cart is folded into the remote one exactly once by
//! [`CartCoordinator::reconcile_after_login`].

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use savor_api::StorefrontClient;
use savor_types::{CartItem, Product};
use tracing::{debug, info};

use crate::auth::AuthStore;
use crate::cart::{Cart, CartError};
use crate::local_cart::LocalCartFile;

/// Remote cart operations used by the coordinator.
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn fetch_cart(&self) -> anyhow::Result<Vec<CartItem>>;
    async fn add_item(&self, product_id: &str, quantity: u32) -> anyhow::Result<()>;
    /// Replaces the remote cart and returns the lines the server kept.
    async fn replace_cart(&self, items: &[CartItem]) -> anyhow::Result<Vec<CartItem>>;
    async fn update_quantity(&self, product_id: &str, quantity: u32) -> anyhow::Result<()>;
    async fn remove_item(&self, product_id: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl CartBackend for StorefrontClient {
    async fn fetch_cart(&self) -> anyhow::Result<Vec<CartItem>> {
        self.cart().await
    }

    async fn add_item(&self, product_id: &str, quantity: u32) -> anyhow::Result<()> {
        self.add_to_cart(product_id, quantity).await.map(|_| ())
    }

    async fn replace_cart(&self, items: &[CartItem]) -> anyhow::Result<Vec<CartItem>> {
        self.sync_cart(items).await
    }

    async fn update_quantity(&self, product_id: &str, quantity: u32) -> anyhow::Result<()> {
        self.update_cart_item(product_id, quantity).await.map(|_| ())
    }

    async fn remove_item(&self, product_id: &str) -> anyhow::Result<()> {
        self.remove_cart_item(product_id).await.map(|_| ())
    }
}

/// Where a cart change was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLocation {
    Local,
    Remote,
}

/// Routes cart changes to the guest cart or the remote cart depending on the
/// authentication state.
pub struct CartCoordinator {
    auth: Arc<dyn AuthStore>,
    backend: Arc<dyn CartBackend>,
    local: Cart,
    file: Option<LocalCartFile>,
}

impl CartCoordinator {
    /// Builds a coordinator, loading the guest cart from `file` when one is given.
    pub fn new(auth: Arc<dyn AuthStore>, backend: Arc<dyn CartBackend>, file: Option<LocalCartFile>) -> Result<Self, CartError> {
        let local = match &file {
            Some(file) => file.load()?,
            None => Cart::new(),
        };
        Ok(Self {
            auth,
            backend,
            local,
            file,
        })
    }

    pub fn local_cart(&self) -> &Cart {
        &self.local
    }

    pub async fn add_product(&mut self, product: &Product) -> Result<CartLocation, CartError> {
        if self.auth.is_authenticated() {
            self.backend.add_item(&product.id, 1).await?;
            return Ok(CartLocation::Remote);
        }
        self.local.add_product(product);
        self.persist()?;
        Ok(CartLocation::Local)
    }

    pub async fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<CartLocation, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                id: product_id.to_string(),
            });
        }
        if self.auth.is_authenticated() {
            self.backend.update_quantity(product_id, quantity).await?;
            return Ok(CartLocation::Remote);
        }
        self.local.set_quantity(product_id, quantity)?;
        self.persist()?;
        Ok(CartLocation::Local)
    }

    pub async fn remove_item(&mut self, product_id: &str) -> Result<CartLocation, CartError> {
        if self.auth.is_authenticated() {
            self.backend.remove_item(product_id).await?;
            return Ok(CartLocation::Remote);
        }
        self.local.remove_item(product_id)?;
        self.persist()?;
        Ok(CartLocation::Local)
    }

    /// Lines of whichever cart is authoritative right now.
    pub async fn current_items(&self) -> Result<Vec<CartItem>, CartError> {
        if self.auth.is_authenticated() {
            return Ok(self.backend.fetch_cart().await?);
        }
        Ok(self.local.to_items())
    }

    /// Folds the guest cart into the remote cart after a login.
    ///
    /// Quantities of products present in both carts are summed. The guest cart is
    /// cleared only after the server accepted the merged cart. Returns the remote
    /// cart. Signed-out callers get the guest cart back unchanged.
    pub async fn reconcile_after_login(&mut self) -> Result<Vec<CartItem>, CartError> {
        if !self.auth.is_authenticated() {
            debug!("not signed in; keeping guest cart");
            return Ok(self.local.to_items());
        }
        let remote = self.backend.fetch_cart().await?;
        if self.local.is_empty() {
            return Ok(remote);
        }

        let merged = merge_carts(remote, &self.local.to_items());
        let kept = self.backend.replace_cart(&merged).await?;
        info!(lines = kept.len(), "merged guest cart into remote cart");
        self.local.clear();
        self.persist()?;
        Ok(kept)
    }

    fn persist(&self) -> Result<(), CartError> {
        match &self.file {
            Some(file) => file.save(&self.local),
            None => Ok(()),
        }
    }
}

/// Merges guest lines into remote lines, summing quantities per product.
///
/// Remote lines keep their order; guest-only products are appended.
pub fn merge_carts(remote: Vec<CartItem>, local: &[CartItem]) -> Vec<CartItem> {
    let mut merged: IndexMap<String, CartItem> = remote.into_iter().map(|item| (item.id.clone(), item)).collect();
    for item in local {
        match merged.get_mut(&item.id) {
            Some(existing) => {
                let quantity = existing.quantity + item.quantity;
                existing.set_quantity(quantity);
            }
            None => {
                merged.insert(item.id.clone(), item.clone());
            }
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, price: f64, quantity: u32) -> CartItem {
        let mut item = CartItem {
            id: id.into(),
            title: id.to_uppercase(),
            image: None,
            price,
            quantity: 1,
            total_price: price,
        };
        item.set_quantity(quantity);
        item
    }

    #[test]
    fn merge_sums_shared_products_and_appends_new_ones() {
        let merged = merge_carts(vec![line("a", 2.0, 1), line("b", 5.0, 2)], &[line("b", 5.0, 1), line("c", 1.0, 3)]);
        let summary: Vec<_> = merged.iter().map(|item| (item.id.as_str(), item.quantity)).collect();
        assert_eq!(summary, vec![("a", 1), ("b", 3), ("c", 3)]);
        assert_eq!(merged[1].total_price, 15.0);
    }
}
