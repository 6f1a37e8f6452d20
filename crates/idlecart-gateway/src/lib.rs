//! Idlecart Session Cart Gateway
//!
//! The server side of the expiry protocol: validates the authenticity token
//! and the feature flag, then empties the session cart. Also serves the
//! storefront's other cart operations through the same request envelope.
//! The transport (AJAX dispatcher, routing) is the host's concern; this
//! crate is the handler behind it.

mod config;
mod error;
mod gateway;
mod nonce;
mod request;

pub use config::{CartExpiryConfig, ENABLED_SETTING, TIMEOUT_SETTING};
pub use error::GatewayError;
pub use gateway::CartGateway;
pub use nonce::NonceIssuer;
pub use request::{
    AjaxRequest, AjaxResponse, ACTION_ADD_TO_CART, ACTION_CLEAR_CART, ACTION_GET_CART_TOTALS,
    ACTION_REMOVE_FROM_CART, ACTION_UPDATE_QUANTITY,
};

pub type Result<T> = std::result::Result<T, GatewayError>;
