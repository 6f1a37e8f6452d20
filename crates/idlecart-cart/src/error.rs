//! Cart error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Cart item not found: {0}")]
    ItemNotFound(String),

    #[error("No cart for session: {0}")]
    NoCart(String),

    #[error("Quantity must be at least 1 when adding to cart")]
    ZeroQuantity,
}
