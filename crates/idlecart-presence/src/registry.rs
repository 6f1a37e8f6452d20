//! Tab registry
//!
//! The shared record of which tabs are live, stored under two keys in the
//! storage partition: a JSON map of tab id to last-heartbeat millis, and a
//! single millis timestamp for the moment the map last became empty. Every
//! operation here is a read-modify-write over atomic single-key accesses;
//! two tabs can interleave and overwrite each other's update. That only
//! undercounts live tabs for one cycle, which the expiry check tolerates.

use std::collections::HashMap;

use idlecart_storage::Database;

use crate::Result;

/// Partition key for the live-tabs map.
pub const ACTIVE_TABS_KEY: &str = "wc_active_tabs";
/// Partition key for the all-tabs-closed timestamp.
pub const LAST_CLOSED_KEY: &str = "wc_last_tab_closed_time";
/// Entries older than this are dead tabs that never fired unload.
pub const STALE_AFTER_MS: i64 = 10_000;

pub struct TabRegistry {
    store: Database,
}

impl TabRegistry {
    pub fn new(store: Database) -> Self {
        Self { store }
    }

    /// Current millis since epoch.
    pub fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Read the live-tabs map. A missing or unreadable entry counts as an
    /// empty registry; the next heartbeat rewrites it from scratch.
    pub fn live_tabs(&self) -> Result<HashMap<String, i64>> {
        let raw = self.store.get_value(ACTIVE_TABS_KEY)?;
        let map = match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable live-tabs entry");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Ok(map)
    }

    fn store_live_tabs(&self, tabs: &HashMap<String, i64>) -> Result<()> {
        let json = serde_json::to_string(tabs)?;
        self.store.set_value(ACTIVE_TABS_KEY, &json)?;
        Ok(())
    }

    /// Record (or refresh) a tab's heartbeat.
    pub fn record_heartbeat(&self, tab_id: &str, now_ms: i64) -> Result<()> {
        let mut tabs = self.live_tabs()?;
        tabs.insert(tab_id.to_string(), now_ms);
        self.store_live_tabs(&tabs)
    }

    /// Remove a tab's entry. If this tab was the last one live, record the
    /// moment the registry became empty.
    pub fn remove_tab(&self, tab_id: &str, now_ms: i64) -> Result<()> {
        let mut tabs = self.live_tabs()?;
        tabs.remove(tab_id);

        if tabs.is_empty() {
            self.store
                .set_value(LAST_CLOSED_KEY, &now_ms.to_string())?;
            tracing::debug!(tab_id = %tab_id, "Last tab closed, marker set");
        }

        self.store_live_tabs(&tabs)
    }

    /// Drop entries whose heartbeat is older than [`STALE_AFTER_MS`] and
    /// write the surviving map back. Returns the survivors.
    pub fn purge_stale(&self, now_ms: i64) -> Result<HashMap<String, i64>> {
        let mut tabs = self.live_tabs()?;
        let before = tabs.len();
        purge_stale_entries(&mut tabs, now_ms);

        if tabs.len() != before {
            tracing::debug!(purged = before - tabs.len(), "Purged dead tabs");
        }

        self.store_live_tabs(&tabs)?;
        Ok(tabs)
    }

    /// When the registry last became empty, if a clear-cart cycle has not
    /// consumed the marker yet.
    pub fn last_all_closed_at(&self) -> Result<Option<i64>> {
        let raw = self.store.get_value(LAST_CLOSED_KEY)?;
        Ok(raw.and_then(|s| match s.parse::<i64>() {
            Ok(ms) => Some(ms),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable closed-time marker");
                None
            }
        }))
    }

    pub fn set_last_all_closed(&self, now_ms: i64) -> Result<()> {
        self.store.set_value(LAST_CLOSED_KEY, &now_ms.to_string())?;
        Ok(())
    }

    /// Consume the marker after a successful clear-cart cycle.
    pub fn clear_last_all_closed(&self) -> Result<()> {
        self.store.remove_value(LAST_CLOSED_KEY)?;
        Ok(())
    }
}

impl Clone for TabRegistry {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Remove entries heartbeat more than [`STALE_AFTER_MS`] ago.
pub fn purge_stale_entries(tabs: &mut HashMap<String, i64>, now_ms: i64) {
    tabs.retain(|_, last| now_ms - *last <= STALE_AFTER_MS);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TabRegistry {
        TabRegistry::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_lazy_empty_registry() {
        let reg = registry();
        assert!(reg.live_tabs().unwrap().is_empty());
        assert_eq!(reg.last_all_closed_at().unwrap(), None);
    }

    #[test]
    fn test_heartbeat_round_trip() {
        let reg = registry();
        reg.record_heartbeat("tab-a", 1_000).unwrap();
        reg.record_heartbeat("tab-b", 2_000).unwrap();
        reg.record_heartbeat("tab-a", 3_000).unwrap();

        let tabs = reg.live_tabs().unwrap();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs["tab-a"], 3_000);
        assert_eq!(tabs["tab-b"], 2_000);
    }

    #[test]
    fn test_remove_last_tab_sets_marker() {
        let reg = registry();
        reg.record_heartbeat("tab-a", 1_000).unwrap();
        reg.record_heartbeat("tab-b", 1_000).unwrap();

        // Removing one of two tabs leaves no marker
        reg.remove_tab("tab-a", 5_000).unwrap();
        assert_eq!(reg.last_all_closed_at().unwrap(), None);

        // Removing the last tab records the closure time
        reg.remove_tab("tab-b", 6_000).unwrap();
        assert!(reg.live_tabs().unwrap().is_empty());
        assert_eq!(reg.last_all_closed_at().unwrap(), Some(6_000));
    }

    #[test]
    fn test_purge_keeps_fresh_entries() {
        let now = 100_000;
        let reg = registry();
        reg.record_heartbeat("stale", now - 15_000).unwrap();
        reg.record_heartbeat("fresh", now - 2_000).unwrap();

        let tabs = reg.purge_stale(now).unwrap();
        assert_eq!(tabs.len(), 1);
        assert!(tabs.contains_key("fresh"));

        // The purge is written back
        let stored = reg.live_tabs().unwrap();
        assert!(!stored.contains_key("stale"));
    }

    #[test]
    fn test_purge_boundary_is_inclusive() {
        let now = 100_000;
        let mut tabs = HashMap::from([
            ("exactly".to_string(), now - STALE_AFTER_MS),
            ("over".to_string(), now - STALE_AFTER_MS - 1),
        ]);
        purge_stale_entries(&mut tabs, now);

        // Strictly-older entries die; exactly-at-threshold survives
        assert!(tabs.contains_key("exactly"));
        assert!(!tabs.contains_key("over"));
    }

    #[test]
    fn test_unreadable_map_treated_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(ACTIVE_TABS_KEY, "not json").unwrap();

        let reg = TabRegistry::new(db);
        assert!(reg.live_tabs().unwrap().is_empty());
    }

    #[test]
    fn test_marker_clear() {
        let reg = registry();
        reg.set_last_all_closed(42_000).unwrap();
        assert_eq!(reg.last_all_closed_at().unwrap(), Some(42_000));

        reg.clear_last_all_closed().unwrap();
        assert_eq!(reg.last_all_closed_at().unwrap(), None);
    }
}
