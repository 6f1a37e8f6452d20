//! Cart Manager
//!
//! Holds every session's cart. The host platform serializes requests per
//! session, so the lock here only guards cross-session access.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cart::{Cart, CartTotals};
use crate::error::CartError;
use crate::Result;

pub struct CartManager {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl CartManager {
    pub fn new() -> Self {
        Self {
            carts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the cart for a session, creating it lazily.
    pub fn cart_for(&self, session_id: &str) -> Cart {
        let mut carts = self.carts.write();
        carts
            .entry(session_id.to_string())
            .or_insert_with(|| Cart::new(session_id.to_string()))
            .clone()
    }

    /// Look up an existing cart without creating one. The gateway uses
    /// this to distinguish "no cart-bearing session" from an empty cart.
    pub fn get_cart(&self, session_id: &str) -> Result<Cart> {
        self.carts
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| CartError::NoCart(session_id.to_string()))
    }

    pub fn has_cart(&self, session_id: &str) -> bool {
        self.carts.read().contains_key(session_id)
    }

    pub fn add_item(
        &self,
        session_id: &str,
        product_id: u64,
        quantity: u32,
        unit_price_cents: i64,
    ) -> Result<String> {
        let mut carts = self.carts.write();
        let cart = carts
            .entry(session_id.to_string())
            .or_insert_with(|| Cart::new(session_id.to_string()));
        cart.add(product_id, quantity, unit_price_cents)
    }

    pub fn remove_item(&self, session_id: &str, key: &str) -> Result<()> {
        let mut carts = self.carts.write();
        let cart = carts
            .get_mut(session_id)
            .ok_or_else(|| CartError::NoCart(session_id.to_string()))?;
        cart.remove(key)?;
        Ok(())
    }

    pub fn set_quantity(&self, session_id: &str, key: &str, quantity: u32) -> Result<()> {
        let mut carts = self.carts.write();
        let cart = carts
            .get_mut(session_id)
            .ok_or_else(|| CartError::NoCart(session_id.to_string()))?;
        cart.set_quantity(key, quantity)
    }

    /// Empty a session's cart. Idempotent: an already-empty cart is
    /// emptied again without complaint.
    pub fn empty_cart(&self, session_id: &str) -> Result<()> {
        let mut carts = self.carts.write();
        let cart = carts
            .get_mut(session_id)
            .ok_or_else(|| CartError::NoCart(session_id.to_string()))?;
        cart.empty();
        Ok(())
    }

    pub fn totals(&self, session_id: &str) -> Result<CartTotals> {
        Ok(self.get_cart(session_id)?.totals())
    }
}

impl Default for CartManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CartManager {
    fn clone(&self) -> Self {
        Self {
            carts: Arc::clone(&self.carts),
        }
    }
}
