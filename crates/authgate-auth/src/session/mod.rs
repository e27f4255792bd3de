//! Session lifecycle: per-request handles, the manager that decides when a
//! record is materialized, the stores behind it, and expiry sweeping.

pub mod cache_store;
pub mod cleanup;
pub mod handle;
pub mod manager;
pub mod store;
pub mod token;

pub use cache_store::CacheSessionStore;
pub use cleanup::SessionSweeper;
pub use handle::{HandleState, SessionHandle};
pub use manager::{SessionManager, SessionOutcome};
pub use store::MemorySessionStore;
