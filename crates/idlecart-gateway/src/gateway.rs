//! Cart gateway
//!
//! Dispatches the storefront's cart requests. Every handler verifies the
//! authenticity token first; the clear-cart handler additionally checks the
//! live feature flag and the presence of a cart-bearing session, in that
//! order, so each failure mode gets its own message.

use serde_json::json;

use idlecart_cart::CartManager;
use idlecart_storage::Database;

use crate::config::CartExpiryConfig;
use crate::error::GatewayError;
use crate::nonce::NonceIssuer;
use crate::request::{
    AjaxRequest, AjaxResponse, ACTION_ADD_TO_CART, ACTION_CLEAR_CART, ACTION_GET_CART_TOTALS,
    ACTION_REMOVE_FROM_CART, ACTION_UPDATE_QUANTITY,
};
use crate::Result;

pub struct CartGateway {
    db: Database,
    carts: CartManager,
    nonces: NonceIssuer,
}

impl CartGateway {
    pub fn new(db: Database, carts: CartManager, nonces: NonceIssuer) -> Self {
        Self { db, carts, nonces }
    }

    pub fn nonces(&self) -> &NonceIssuer {
        &self.nonces
    }

    /// Handle one request for one session. Errors never escape as panics
    /// or transport failures; they become `success:false` envelopes.
    pub fn handle(&self, session_id: &str, request: &AjaxRequest) -> AjaxResponse {
        match self.dispatch(session_id, request) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    session_id = %session_id,
                    action = %request.action,
                    error = %e,
                    "Request failed"
                );
                AjaxResponse::failure(e.to_string())
            }
        }
    }

    fn dispatch(&self, session_id: &str, request: &AjaxRequest) -> Result<AjaxResponse> {
        if !self
            .nonces
            .verify(session_id, &request.action, &request.nonce)
        {
            return Err(GatewayError::AuthenticationFailure);
        }

        match request.action.as_str() {
            ACTION_CLEAR_CART => self.clear_cart_after_timeout(session_id),
            ACTION_ADD_TO_CART => self.add_to_cart(session_id, request),
            ACTION_REMOVE_FROM_CART => self.remove_from_cart(session_id, request),
            ACTION_UPDATE_QUANTITY => self.update_quantity(session_id, request),
            ACTION_GET_CART_TOTALS => self.get_cart_totals(session_id),
            other => Err(GatewayError::UnknownAction(other.to_string())),
        }
    }

    /// The expiry protocol's server side. Succeeds unconditionally once
    /// the empty runs: clearing an already-empty cart reports success, so
    /// duplicate requests from racing tabs are harmless.
    fn clear_cart_after_timeout(&self, session_id: &str) -> Result<AjaxResponse> {
        if !CartExpiryConfig::load(&self.db)?.enabled {
            return Err(GatewayError::FeatureDisabled);
        }

        if !self.carts.has_cart(session_id) {
            return Err(GatewayError::CartUnavailable);
        }

        self.carts.empty_cart(session_id)?;

        tracing::info!(session_id = %session_id, "Cart cleared after idle timeout");
        Ok(AjaxResponse::ok())
    }

    fn add_to_cart(&self, session_id: &str, request: &AjaxRequest) -> Result<AjaxResponse> {
        let product_id = required_u64(request, "product_id")?;
        let quantity = optional_u32(request, "quantity")?.unwrap_or(1);
        // Unit price comes from the host's product lookup upstream
        let unit_price_cents = optional_i64(request, "unit_price_cents")?.unwrap_or(0);

        let key = self
            .carts
            .add_item(session_id, product_id, quantity, unit_price_cents)?;
        let totals = self.carts.totals(session_id)?;

        Ok(AjaxResponse::ok_with(json!({
            "cart_item_key": key,
            "item_count": totals.item_count,
        })))
    }

    fn remove_from_cart(&self, session_id: &str, request: &AjaxRequest) -> Result<AjaxResponse> {
        let key = request
            .param("cart_item_key")
            .ok_or(GatewayError::MissingParameter("cart_item_key"))?;

        if !self.carts.has_cart(session_id) {
            return Err(GatewayError::CartUnavailable);
        }

        self.carts.remove_item(session_id, key)?;
        let totals = self.carts.totals(session_id)?;

        Ok(AjaxResponse::ok_with(json!({
            "item_count": totals.item_count,
        })))
    }

    fn update_quantity(&self, session_id: &str, request: &AjaxRequest) -> Result<AjaxResponse> {
        let key = request
            .param("cart_item_key")
            .ok_or(GatewayError::MissingParameter("cart_item_key"))?;
        let quantity =
            optional_u32(request, "quantity")?.ok_or(GatewayError::MissingParameter("quantity"))?;

        if !self.carts.has_cart(session_id) {
            return Err(GatewayError::CartUnavailable);
        }

        self.carts.set_quantity(session_id, key, quantity)?;
        let totals = self.carts.totals(session_id)?;

        Ok(AjaxResponse::ok_with(json!({
            "subtotal_cents": totals.subtotal_cents,
            "total_cents": totals.total_cents,
            "item_count": totals.item_count,
        })))
    }

    fn get_cart_totals(&self, session_id: &str) -> Result<AjaxResponse> {
        if !self.carts.has_cart(session_id) {
            return Err(GatewayError::CartUnavailable);
        }

        let totals = self.carts.totals(session_id)?;

        Ok(AjaxResponse::ok_with(json!({
            "subtotal_cents": totals.subtotal_cents,
            "total_cents": totals.total_cents,
            "item_count": totals.item_count,
        })))
    }
}

impl Clone for CartGateway {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            carts: self.carts.clone(),
            nonces: self.nonces.clone(),
        }
    }
}

fn required_u64(request: &AjaxRequest, key: &'static str) -> Result<u64> {
    request
        .param(key)
        .ok_or(GatewayError::MissingParameter(key))?
        .parse()
        .map_err(|_| GatewayError::InvalidParameter(key))
}

fn optional_u32(request: &AjaxRequest, key: &'static str) -> Result<Option<u32>> {
    request
        .param(key)
        .map(|v| v.parse().map_err(|_| GatewayError::InvalidParameter(key)))
        .transpose()
}

fn optional_i64(request: &AjaxRequest, key: &'static str) -> Result<Option<i64>> {
    request
        .param(key)
        .map(|v| v.parse().map_err(|_| GatewayError::InvalidParameter(key)))
        .transpose()
}
