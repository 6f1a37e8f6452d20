//! Request and response envelope
//!
//! POST-style requests: an action name, an authenticity token, and string
//! parameters. Responses are the `{"success":true}` /
//! `{"success":false,"message":...}` JSON shape the storefront scripts
//! expect.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ACTION_CLEAR_CART: &str = "clear_cart_after_timeout";
pub const ACTION_ADD_TO_CART: &str = "add_to_cart";
pub const ACTION_REMOVE_FROM_CART: &str = "remove_from_cart";
pub const ACTION_UPDATE_QUANTITY: &str = "update_quantity";
pub const ACTION_GET_CART_TOTALS: &str = "get_cart_totals";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxRequest {
    pub action: String,
    pub nonce: String,
    /// Form-encoded parameters; everything arrives as strings
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl AjaxRequest {
    pub fn new(action: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            nonce: nonce.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AjaxResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn ok_with(data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
