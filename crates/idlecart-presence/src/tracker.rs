//! Presence tracker
//!
//! One tracker per open tab. On load it registers a heartbeat, starts the
//! periodic refresh, and evaluates whether the cart idled past the timeout
//! while no tab was open. The clear request goes through the dispatcher
//! behind [`ClearCartEndpoint`]; a failed or rejected request is a silent
//! no-op, retried naturally on the next page load because the closed-time
//! marker stays in place.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::registry::TabRegistry;
use crate::Result;

/// How often a live tab refreshes its registry entry.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Result of a clear-cart request as seen by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Rejected(String),
}

/// The dispatcher that carries the clear-cart request to the gateway.
pub trait ClearCartEndpoint: Send + Sync {
    fn clear_cart(&self, nonce: &str) -> ClearOutcome;
}

/// What a page load concluded. `CartCleared` tells the caller to reload so
/// cart-dependent UI reflects the now-empty cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    CartCleared,
    Idle,
}

/// Why the expiry check did or did not fire.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpiryCheck {
    /// All tabs had been closed for `idle_secs`, longer than the timeout.
    Eligible { idle_secs: f64 },
    /// No closure marker: some tab has been open the whole time.
    NoClosureMarker,
    /// Another tab is live besides this one.
    OtherTabsLive { live: usize },
    /// Closure recorded but the timeout has not elapsed.
    WithinTimeout { idle_secs: f64 },
}

pub struct PresenceTracker {
    tab_id: String,
    registry: TabRegistry,
    timeout_minutes: u32,
    nonce: String,
    endpoint: Arc<dyn ClearCartEndpoint>,
    heartbeat_task: Option<JoinHandle<()>>,
}

impl PresenceTracker {
    /// Build a tracker for a freshly opened tab. `timeout_minutes` is the
    /// config snapshot rendered into the page; the gateway re-checks the
    /// live value on every request.
    pub fn new(
        registry: TabRegistry,
        timeout_minutes: u32,
        nonce: String,
        endpoint: Arc<dyn ClearCartEndpoint>,
    ) -> Self {
        Self {
            tab_id: Uuid::new_v4().simple().to_string(),
            registry,
            timeout_minutes,
            nonce,
            endpoint,
            heartbeat_task: None,
        }
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    /// Page-load entry point: register this tab, start the heartbeat, then
    /// run the expiry check and issue the clear request if it fires.
    pub async fn on_load(&mut self) -> Result<LoadOutcome> {
        let now = TabRegistry::now_ms();
        self.registry.record_heartbeat(&self.tab_id, now)?;
        self.start_heartbeat();

        match self.check_expiry(now)? {
            ExpiryCheck::Eligible { idle_secs } => {
                tracing::info!(
                    tab_id = %self.tab_id,
                    idle_secs,
                    "Idle timeout exceeded, requesting cart clear"
                );

                match self.endpoint.clear_cart(&self.nonce) {
                    ClearOutcome::Cleared => {
                        self.registry.clear_last_all_closed()?;
                        Ok(LoadOutcome::CartCleared)
                    }
                    ClearOutcome::Rejected(message) => {
                        // Marker stays set; the next page load retries.
                        tracing::debug!(
                            tab_id = %self.tab_id,
                            message = %message,
                            "Cart clear rejected"
                        );
                        Ok(LoadOutcome::Idle)
                    }
                }
            }
            check => {
                tracing::trace!(tab_id = %self.tab_id, ?check, "No cart clear");
                Ok(LoadOutcome::Idle)
            }
        }
    }

    /// Refresh this tab's registry entry. Side effect only.
    pub fn heartbeat(&self) -> Result<()> {
        self.registry
            .record_heartbeat(&self.tab_id, TabRegistry::now_ms())
    }

    /// Tab teardown: stop the heartbeat and drop this tab's entry. Must
    /// stay synchronous and local; no network calls here.
    pub fn on_unload(&mut self) -> Result<()> {
        if let Some(task) = self.heartbeat_task.take() {
            task.abort();
        }
        self.registry.remove_tab(&self.tab_id, TabRegistry::now_ms())
    }

    /// Purge dead tabs, then decide whether the cart idled past the
    /// timeout. Fires only when this tab is the sole survivor: the first
    /// load after every other tab closed.
    pub fn check_expiry(&self, now_ms: i64) -> Result<ExpiryCheck> {
        let live = self.registry.purge_stale(now_ms)?;

        let Some(closed_at) = self.registry.last_all_closed_at()? else {
            return Ok(ExpiryCheck::NoClosureMarker);
        };

        if live.len() != 1 {
            return Ok(ExpiryCheck::OtherTabsLive { live: live.len() });
        }

        // Strict comparison on float seconds: an idle time of exactly the
        // timeout does not fire.
        let idle_secs = (now_ms - closed_at) as f64 / 1000.0;
        if idle_secs > (self.timeout_minutes as f64) * 60.0 {
            Ok(ExpiryCheck::Eligible { idle_secs })
        } else {
            Ok(ExpiryCheck::WithinTimeout { idle_secs })
        }
    }

    fn start_heartbeat(&mut self) {
        if self.heartbeat_task.is_some() {
            return;
        }

        let registry = self.registry.clone();
        let tab_id = self.tab_id.clone();

        self.heartbeat_task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
            // The first tick is immediate; on_load already registered.
            interval.tick().await;

            loop {
                interval.tick().await;
                if let Err(e) = registry.record_heartbeat(&tab_id, TabRegistry::now_ms()) {
                    tracing::warn!(tab_id = %tab_id, error = %e, "Heartbeat failed");
                }
            }
        }));
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        if let Some(task) = self.heartbeat_task.take() {
            task.abort();
        }
    }
}
