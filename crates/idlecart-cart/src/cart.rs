//! Cart data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::error::CartError;
use crate::Result;

/// One line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Opaque item key, stable per product within a session
    pub key: String,
    /// Product this line refers to
    pub product_id: u64,
    /// Units of the product
    pub quantity: u32,
    /// Unit price in minor currency units
    pub unit_price_cents: i64,
    /// When the line was first added
    pub added_at: DateTime<Utc>,
}

/// Computed cart totals, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal_cents: i64,
    pub total_cents: i64,
    pub item_count: u32,
}

/// A session's shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Session this cart belongs to
    pub session_id: String,
    /// Line items keyed by their opaque item key
    items: HashMap<String, LineItem>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            items: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Derive the opaque item key for a product in this cart.
    ///
    /// Stable per (session, product), so adding the same product twice
    /// merges into one line instead of duplicating it.
    pub fn item_key(&self, product_id: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_id.as_bytes());
        hasher.update(product_id.to_le_bytes());
        let digest = hasher.finalize();
        hex_prefix(&digest, 16)
    }

    /// Add a product to the cart, merging quantities on an existing line.
    /// Returns the item key of the affected line.
    pub fn add(&mut self, product_id: u64, quantity: u32, unit_price_cents: i64) -> Result<String> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let key = self.item_key(product_id);

        match self.items.get_mut(&key) {
            Some(item) => {
                item.quantity += quantity;
            }
            None => {
                self.items.insert(
                    key.clone(),
                    LineItem {
                        key: key.clone(),
                        product_id,
                        quantity,
                        unit_price_cents,
                        added_at: Utc::now(),
                    },
                );
            }
        }

        self.updated_at = Utc::now();

        tracing::debug!(
            session_id = %self.session_id,
            product_id,
            quantity,
            "Added product to cart"
        );

        Ok(key)
    }

    /// Remove a line by its item key.
    pub fn remove(&mut self, key: &str) -> Result<LineItem> {
        let item = self
            .items
            .remove(key)
            .ok_or_else(|| CartError::ItemNotFound(key.to_string()))?;

        self.updated_at = Utc::now();
        Ok(item)
    }

    /// Set the quantity of an existing line. A quantity of zero removes
    /// the line.
    pub fn set_quantity(&mut self, key: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            self.remove(key)?;
            return Ok(());
        }

        let item = self
            .items
            .get_mut(key)
            .ok_or_else(|| CartError::ItemNotFound(key.to_string()))?;

        item.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drop every line at once. Emptying an already-empty cart is a no-op
    /// success; the expiry protocol relies on that idempotency.
    pub fn empty(&mut self) {
        let dropped = self.items.len();
        self.items.clear();
        self.updated_at = Utc::now();

        if dropped > 0 {
            tracing::info!(
                session_id = %self.session_id,
                dropped,
                "Emptied cart"
            );
        }
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal: i64 = self
            .items
            .values()
            .map(|i| i.unit_price_cents * i.quantity as i64)
            .sum();
        let item_count: u32 = self.items.values().map(|i| i.quantity).sum();

        CartTotals {
            subtotal_cents: subtotal,
            total_cents: subtotal,
            item_count,
        }
    }

    pub fn get_item(&self, key: &str) -> Option<&LineItem> {
        self.items.get(key)
    }

    /// Find the item key for a product, if it is in the cart.
    pub fn key_for_product(&self, product_id: u64) -> Option<String> {
        let key = self.item_key(product_id);
        self.items.contains_key(&key).then_some(key)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines (not units) in the cart.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", b);
        if out.len() >= len {
            break;
        }
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new("session-1".to_string());

        let key_a = cart.add(42, 1, 1500).unwrap();
        let key_b = cart.add(42, 2, 1500).unwrap();

        assert_eq!(key_a, key_b);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.get_item(&key_a).unwrap().quantity, 3);
    }

    #[test]
    fn test_zero_quantity_add_rejected() {
        let mut cart = Cart::new("session-1".to_string());
        assert!(cart.add(42, 0, 1500).is_err());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new("session-1".to_string());
        let key = cart.add(42, 3, 1500).unwrap();

        cart.set_quantity(&key, 0).unwrap();
        assert!(cart.is_empty());
        assert!(cart.set_quantity(&key, 1).is_err());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new("session-1".to_string());
        cart.add(1, 2, 1000).unwrap();
        cart.add(2, 1, 250).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal_cents, 2250);
        assert_eq!(totals.total_cents, 2250);
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_empty_is_idempotent() {
        let mut cart = Cart::new("session-1".to_string());
        cart.add(1, 2, 1000).unwrap();

        cart.empty();
        assert!(cart.is_empty());

        // Emptying again is a no-op, not an error
        cart.empty();
        assert!(cart.is_empty());
        assert_eq!(cart.totals().item_count, 0);
    }

    #[test]
    fn test_key_for_product() {
        let mut cart = Cart::new("session-1".to_string());
        assert!(cart.key_for_product(42).is_none());

        let key = cart.add(42, 1, 100).unwrap();
        assert_eq!(cart.key_for_product(42).as_deref(), Some(key.as_str()));
    }

    #[test]
    fn test_keys_differ_across_sessions() {
        let a = Cart::new("session-a".to_string());
        let b = Cart::new("session-b".to_string());
        assert_ne!(a.item_key(42), b.item_key(42));
    }
}
