//! Idlecart Presence Protocol
//!
//! Every open tab keeps a heartbeat entry in a shared storage partition.
//! When a page load finds that all tabs had been closed for longer than the
//! configured timeout, it asks the gateway to clear the session cart. The
//! partition is last-writer-wins with no cross-tab locking; undercounting
//! races only cost a harmless duplicate clear request, and the stale-entry
//! purge self-corrects missed unloads.

mod error;
mod page;
mod registry;
mod tracker;

pub use error::PresenceError;
pub use page::PageKind;
pub use registry::{TabRegistry, ACTIVE_TABS_KEY, LAST_CLOSED_KEY, STALE_AFTER_MS};
pub use tracker::{
    ClearCartEndpoint, ClearOutcome, ExpiryCheck, LoadOutcome, PresenceTracker,
    HEARTBEAT_INTERVAL,
};

pub type Result<T> = std::result::Result<T, PresenceError>;
