//! Main storefront state container
//!
//! Owns the storage partition, the session carts, and the gateway, and
//! hands out one presence tracker per opened commerce-page tab. The host
//! platform's dispatcher forwards requests to [`Storefront::handle_request`].

use std::sync::Arc;

use idlecart_cart::CartManager;
use idlecart_gateway::{
    AjaxRequest, AjaxResponse, CartExpiryConfig, CartGateway, NonceIssuer, ACTION_CLEAR_CART,
};
use idlecart_presence::{
    ClearCartEndpoint, ClearOutcome, PageKind, PresenceTracker, TabRegistry,
};
use idlecart_storage::Database;

use crate::config::Config;
use crate::Result;

pub struct Storefront {
    config: Config,
    db: Database,
    carts: CartManager,
    gateway: CartGateway,
}

/// Gateway-backed dispatcher end for a single session's trackers.
struct GatewayEndpoint {
    gateway: CartGateway,
    session_id: String,
}

impl ClearCartEndpoint for GatewayEndpoint {
    fn clear_cart(&self, nonce: &str) -> ClearOutcome {
        let request = AjaxRequest::new(ACTION_CLEAR_CART, nonce);
        let response = self.gateway.handle(&self.session_id, &request);

        if response.success {
            ClearOutcome::Cleared
        } else {
            ClearOutcome::Rejected(response.message.unwrap_or_default())
        }
    }
}

impl Storefront {
    /// Initialize a new storefront instance
    pub fn new(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(config, db))
    }

    /// In-memory storefront, used by tests and previews.
    pub fn in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(Config::default(), db))
    }

    fn with_database(config: Config, db: Database) -> Self {
        let carts = CartManager::new();
        let gateway = CartGateway::new(db.clone(), carts.clone(), NonceIssuer::new());

        Self {
            config,
            db,
            carts,
            gateway,
        }
    }

    /// Open a tab on a page. Returns a presence tracker only when the page
    /// is commerce-related and the expiry feature is enabled; the caller
    /// drives `on_load`/`on_unload` from the page lifecycle.
    pub fn open_tab(
        &self,
        session_id: &str,
        page: PageKind,
    ) -> Result<Option<PresenceTracker>> {
        if !page.is_commerce() {
            return Ok(None);
        }

        let expiry = CartExpiryConfig::load(&self.db)?;
        if !expiry.enabled {
            return Ok(None);
        }

        let nonce = self.gateway.nonces().issue(session_id, ACTION_CLEAR_CART);
        let endpoint = Arc::new(GatewayEndpoint {
            gateway: self.gateway.clone(),
            session_id: session_id.to_string(),
        });

        tracing::debug!(session_id = %session_id, page = ?page, "Opened commerce tab");

        Ok(Some(PresenceTracker::new(
            TabRegistry::new(self.db.clone()),
            expiry.timeout_minutes,
            nonce,
            endpoint,
        )))
    }

    /// Forward one dispatcher request to the gateway.
    pub fn handle_request(&self, session_id: &str, request: &AjaxRequest) -> AjaxResponse {
        self.gateway.handle(session_id, request)
    }

    // === Configuration ===

    pub fn cart_expiry_config(&self) -> Result<CartExpiryConfig> {
        Ok(CartExpiryConfig::load(&self.db)?)
    }

    pub fn set_cart_expiry_config(&self, config: CartExpiryConfig) -> Result<()> {
        config.store(&self.db)?;
        Ok(())
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cart_manager(&self) -> &CartManager {
        &self.carts
    }

    pub fn gateway(&self) -> &CartGateway {
        &self.gateway
    }

    pub fn registry(&self) -> TabRegistry {
        TabRegistry::new(self.db.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idlecart_presence::LoadOutcome;

    #[tokio::test]
    async fn test_end_to_end_idle_expiry() {
        let store = Storefront::in_memory().unwrap();
        let session = "session-1";
        store.cart_manager().add_item(session, 42, 2, 1500).unwrap();

        // Tab A loads and registers itself
        let mut tab_a = store.open_tab(session, PageKind::Product).unwrap().unwrap();
        assert_eq!(tab_a.on_load().await.unwrap(), LoadOutcome::Idle);
        assert_eq!(store.registry().live_tabs().unwrap().len(), 1);

        // Tab A closes; the registry records the closure moment
        tab_a.on_unload().unwrap();
        assert!(store.registry().live_tabs().unwrap().is_empty());
        assert!(store.registry().last_all_closed_at().unwrap().is_some());

        // Six minutes pass (timeout is the 5-minute default)
        store
            .registry()
            .set_last_all_closed(TabRegistry::now_ms() - 360_000)
            .unwrap();

        // Tab B loads: sole survivor, 360s idle, cart gets cleared
        let mut tab_b = store.open_tab(session, PageKind::Cart).unwrap().unwrap();
        assert_eq!(tab_b.on_load().await.unwrap(), LoadOutcome::CartCleared);

        assert!(store.cart_manager().get_cart(session).unwrap().is_empty());
        assert_eq!(store.registry().last_all_closed_at().unwrap(), None);

        tab_b.on_unload().unwrap();
    }

    #[tokio::test]
    async fn test_quick_return_keeps_cart() {
        let store = Storefront::in_memory().unwrap();
        let session = "session-1";
        store.cart_manager().add_item(session, 42, 2, 1500).unwrap();

        let mut tab_a = store.open_tab(session, PageKind::Checkout).unwrap().unwrap();
        tab_a.on_load().await.unwrap();
        tab_a.on_unload().unwrap();

        // Back within the timeout: nothing cleared, marker stays
        let mut tab_b = store.open_tab(session, PageKind::Checkout).unwrap().unwrap();
        assert_eq!(tab_b.on_load().await.unwrap(), LoadOutcome::Idle);
        assert_eq!(store.cart_manager().totals(session).unwrap().item_count, 2);
        assert!(store.registry().last_all_closed_at().unwrap().is_some());

        tab_b.on_unload().unwrap();
    }

    #[test]
    fn test_no_tracker_on_non_commerce_pages() {
        let store = Storefront::in_memory().unwrap();
        assert!(store.open_tab("session-1", PageKind::Other).unwrap().is_none());
    }

    #[test]
    fn test_no_tracker_when_disabled() {
        let store = Storefront::in_memory().unwrap();
        store
            .set_cart_expiry_config(CartExpiryConfig {
                enabled: false,
                timeout_minutes: 5,
            })
            .unwrap();

        assert!(store.open_tab("session-1", PageKind::Cart).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disable_between_load_and_clear() {
        let store = Storefront::in_memory().unwrap();
        let session = "session-1";
        store.cart_manager().add_item(session, 42, 2, 1500).unwrap();

        // Tab opens while the feature is enabled
        let mut tab = store.open_tab(session, PageKind::Cart).unwrap().unwrap();
        store
            .registry()
            .set_last_all_closed(TabRegistry::now_ms() - 360_000)
            .unwrap();

        // Feature flips off before the load-time check fires
        store
            .set_cart_expiry_config(CartExpiryConfig {
                enabled: false,
                timeout_minutes: 5,
            })
            .unwrap();

        // Gateway re-reads the live flag and rejects; cart untouched,
        // marker kept for a later retry
        assert_eq!(tab.on_load().await.unwrap(), LoadOutcome::Idle);
        assert_eq!(store.cart_manager().totals(session).unwrap().item_count, 2);
        assert!(store.registry().last_all_closed_at().unwrap().is_some());

        tab.on_unload().unwrap();
    }

    #[tokio::test]
    async fn test_racing_tabs_duplicate_clear_is_harmless() {
        let store = Storefront::in_memory().unwrap();
        let session = "session-1";
        store.cart_manager().add_item(session, 42, 2, 1500).unwrap();
        store
            .registry()
            .set_last_all_closed(TabRegistry::now_ms() - 360_000)
            .unwrap();

        // Both tabs evaluated the expiry condition before seeing each
        // other; both requests go through, the second is a no-op success.
        let tab_a = store.open_tab(session, PageKind::Cart).unwrap().unwrap();
        let tab_b = store.open_tab(session, PageKind::Cart).unwrap().unwrap();

        let request = AjaxRequest::new(
            ACTION_CLEAR_CART,
            store.gateway().nonces().issue(session, ACTION_CLEAR_CART),
        );
        assert!(store.handle_request(session, &request).success);
        assert!(store.handle_request(session, &request).success);
        assert!(store.cart_manager().get_cart(session).unwrap().is_empty());

        drop(tab_a);
        drop(tab_b);
    }
}
