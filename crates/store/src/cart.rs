//! Cart reducer.
//!
//! Lines are keyed by product id and keep insertion order. Totals are recomputed
//! after every mutation so readers never see a stale sum.

use indexmap::IndexMap;
use savor_types::{CartItem, Product};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart has no line for product '{id}'")]
    UnknownItem { id: String },
    #[error("quantity for '{id}' must be at least 1; remove the item instead")]
    InvalidQuantity { id: String },
    #[error("cart file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cart file serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: IndexMap<String, CartItem>,
    total_amount: f64,
    total_quantity: u32,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        cart.set_items(items);
        cart
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    pub fn to_items(&self) -> Vec<CartItem> {
        self.items.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Adds one unit of `product`, creating the line if needed.
    pub fn add_product(&mut self, product: &Product) {
        match self.items.get_mut(&product.id) {
            Some(line) => {
                let quantity = line.quantity + 1;
                line.set_quantity(quantity);
            }
            None => {
                self.items.insert(product.id.clone(), CartItem::from_product(product));
            }
        }
        self.recompute();
    }

    pub fn increase_quantity(&mut self, id: &str) -> Result<(), CartError> {
        let line = self.line_mut(id)?;
        let quantity = line.quantity + 1;
        line.set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    /// Removes one unit; the line disappears when its last unit goes.
    pub fn decrease_quantity(&mut self, id: &str) -> Result<(), CartError> {
        let line = self.line_mut(id)?;
        if line.quantity <= 1 {
            self.items.shift_remove(id);
        } else {
            let quantity = line.quantity - 1;
            line.set_quantity(quantity);
        }
        self.recompute();
        Ok(())
    }

    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { id: id.to_string() });
        }
        self.line_mut(id)?.set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<CartItem, CartError> {
        let removed = self
            .items
            .shift_remove(id)
            .ok_or_else(|| CartError::UnknownItem { id: id.to_string() })?;
        self.recompute();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Replaces every line. Later duplicates of a product id win.
    pub fn set_items(&mut self, items: Vec<CartItem>) {
        self.items = items
            .into_iter()
            .map(|mut item| {
                item.set_quantity(item.quantity);
                (item.id.clone(), item)
            })
            .collect();
        self.recompute();
    }

    fn line_mut(&mut self, id: &str) -> Result<&mut CartItem, CartError> {
        self.items
            .get_mut(id)
            .ok_or_else(|| CartError::UnknownItem { id: id.to_string() })
    }

    fn recompute(&mut self) {
        self.total_quantity = self.items.values().map(|item| item.quantity).sum();
        self.total_amount = self.items.values().map(|item| item.price * f64::from(item.quantity)).sum();
    }
}
