// crates/client/src/lib.rs
//! Read-side session feed for academy dashboards.
//!
//! Wraps the server's paginated session list in a cached, retrying,
//! self-refreshing feed: fresh cache hits skip the network, exhausted
//! retries fall back to the last good snapshot, and a background loop
//! re-polls while the dashboard stays mounted.

pub mod cache;
pub mod error;
pub mod feed;

pub use cache::{CacheEntry, SessionCache, DEFAULT_TTL};
pub use error::FeedError;
pub use feed::{FeedConfig, FeedPhase, FeedState, RefreshHandle, SessionFeed, DEFAULT_PAGE_SIZE};
