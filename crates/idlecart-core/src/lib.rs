//! Idlecart Core
//!
//! Central coordination layer for the idle-cart-expiry storefront
//! customization: wires the storage partition, session carts, gateway, and
//! per-tab presence trackers together.

mod config;
mod error;
mod storefront;

pub use config::Config;
pub use error::CoreError;
pub use storefront::Storefront;

// Re-export core components
pub use idlecart_cart::{Cart, CartError, CartManager, CartTotals, LineItem};
pub use idlecart_gateway::{
    AjaxRequest, AjaxResponse, CartExpiryConfig, CartGateway, GatewayError, NonceIssuer,
    ACTION_CLEAR_CART,
};
pub use idlecart_presence::{
    ClearCartEndpoint, ClearOutcome, ExpiryCheck, LoadOutcome, PageKind, PresenceError,
    PresenceTracker, TabRegistry,
};
pub use idlecart_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
