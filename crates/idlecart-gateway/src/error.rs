//! Gateway error types
//!
//! Every variant maps to a `success:false` envelope. The first three carry
//! distinct messages so a client can tell an auth failure from a disabled
//! feature from a missing cart; the tracker treats all of them as a silent
//! no-op either way.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid authenticity token")]
    AuthenticationFailure,

    #[error("Feature disabled")]
    FeatureDisabled,

    #[error("Cart unavailable")]
    CartUnavailable,

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Timeout must be between 1 and 1440 minutes, got {0}")]
    InvalidTimeout(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] idlecart_storage::StorageError),

    #[error("Cart error: {0}")]
    Cart(#[from] idlecart_cart::CartError),
}
