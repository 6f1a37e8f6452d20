//! Cart expiry configuration
//!
//! Server-owned and read on both sides of the protocol: the tracker gets a
//! snapshot rendered into the page at load, the gateway re-reads the live
//! values on every request.

use serde::{Deserialize, Serialize};

use idlecart_storage::Database;

use crate::error::GatewayError;
use crate::Result;

pub const ENABLED_SETTING: &str = "cart_expiry_enabled";
pub const TIMEOUT_SETTING: &str = "cart_timeout_minutes";

const MIN_TIMEOUT_MINUTES: u32 = 1;
const MAX_TIMEOUT_MINUTES: u32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartExpiryConfig {
    /// Master switch for the whole feature
    pub enabled: bool,
    /// Idle minutes after the last tab closes before the cart may clear
    pub timeout_minutes: u32,
}

impl Default for CartExpiryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_minutes: 5,
        }
    }
}

impl CartExpiryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TIMEOUT_MINUTES..=MAX_TIMEOUT_MINUTES).contains(&self.timeout_minutes) {
            return Err(GatewayError::InvalidTimeout(self.timeout_minutes));
        }
        Ok(())
    }

    /// Load from the settings table, defaulting absent or unreadable keys.
    pub fn load(db: &Database) -> Result<Self> {
        let defaults = Self::default();

        let enabled = match db.get_setting(ENABLED_SETTING)? {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => defaults.enabled,
        };

        let timeout_minutes = db
            .get_setting(TIMEOUT_SETTING)?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.timeout_minutes);

        Ok(Self {
            enabled,
            timeout_minutes,
        })
    }

    /// Validate and persist to the settings table.
    pub fn store(&self, db: &Database) -> Result<()> {
        self.validate()?;

        db.set_setting(ENABLED_SETTING, if self.enabled { "1" } else { "0" })?;
        db.set_setting(TIMEOUT_SETTING, &self.timeout_minutes.to_string())?;

        tracing::info!(
            enabled = self.enabled,
            timeout_minutes = self.timeout_minutes,
            "Stored cart expiry configuration"
        );

        Ok(())
    }
}
