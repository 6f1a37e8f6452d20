//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] idlecart_storage::StorageError),

    #[error("Cart error: {0}")]
    Cart(#[from] idlecart_cart::CartError),

    #[error("Presence error: {0}")]
    Presence(#[from] idlecart_presence::PresenceError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] idlecart_gateway::GatewayError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
