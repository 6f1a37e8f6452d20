//! Idlecart Session Cart
//!
//! One cart per browser session, a mutable collection of line items keyed
//! by an opaque item key. The expiry protocol only depends on `empty`,
//! which drops every line in one step; the rest of the surface backs the
//! storefront's AJAX cart operations.

mod cart;
mod error;
mod manager;

pub use cart::{Cart, CartTotals, LineItem};
pub use error::CartError;
pub use manager::CartManager;

pub type Result<T> = std::result::Result<T, CartError>;
