// crates/client/src/cache.rs
//! Per-academy snapshot cache backing the session feed.
//!
//! Each consumer owns (and injects) its own instance, so parallel
//! feeds and tests never share state through a global.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use pitchside_core::Session;

/// How long a stored snapshot counts as fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// One academy's last good first-page snapshot.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub sessions: Vec<Session>,
    pub stored_at: Instant,
}

/// In-memory snapshot store keyed by academy id.
///
/// `fresh` only returns entries within the TTL; `any` ignores age and
/// backs the stale-fallback path. Empty snapshots are stored but never
/// served: a feed must not mistake "nothing cached yet" for data.
#[derive(Debug)]
pub struct SessionCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SessionCache {
    /// Create a cache with the given freshness window.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store the latest first-page snapshot for an academy.
    pub fn store(&self, academy_id: &str, sessions: Vec<Session>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                academy_id.to_string(),
                CacheEntry {
                    sessions,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// A non-empty snapshot still within the TTL, if any.
    pub fn fresh(&self, academy_id: &str) -> Option<CacheEntry> {
        self.get(academy_id)
            .filter(|entry| entry.stored_at.elapsed() <= self.ttl)
    }

    /// The last non-empty snapshot regardless of age, if any.
    pub fn any(&self, academy_id: &str) -> Option<CacheEntry> {
        self.get(academy_id)
    }

    /// Drop every stored snapshot.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn get(&self, academy_id: &str) -> Option<CacheEntry> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(academy_id).cloned())
            .filter(|entry| !entry.sessions.is_empty())
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn make_session(name: &str) -> Session {
        Session::new(
            "acad-1",
            name,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_store_then_fresh_within_ttl() {
        let cache = SessionCache::new(Duration::from_secs(30));
        cache.store("acad-1", vec![make_session("U12")]);

        let entry = cache.fresh("acad-1").unwrap();
        assert_eq!(entry.sessions.len(), 1);
        assert_eq!(entry.sessions[0].name, "U12");
    }

    #[test]
    fn test_expired_entry_only_served_by_any() {
        let cache = SessionCache::new(Duration::ZERO);
        cache.store("acad-1", vec![make_session("U12")]);
        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.fresh("acad-1").is_none());
        let entry = cache.any("acad-1").unwrap();
        assert_eq!(entry.sessions[0].name, "U12");
    }

    #[test]
    fn test_empty_snapshot_is_never_served() {
        let cache = SessionCache::default();
        cache.store("acad-1", vec![]);

        assert!(cache.fresh("acad-1").is_none());
        assert!(cache.any("acad-1").is_none());
    }

    #[test]
    fn test_academies_are_isolated() {
        let cache = SessionCache::default();
        cache.store("acad-1", vec![make_session("U12")]);

        assert!(cache.fresh("acad-2").is_none());
        assert!(cache.any("acad-2").is_none());
    }

    #[test]
    fn test_store_replaces_previous_snapshot() {
        let cache = SessionCache::default();
        cache.store("acad-1", vec![make_session("old")]);
        cache.store("acad-1", vec![make_session("new"), make_session("newer")]);

        let entry = cache.any("acad-1").unwrap();
        assert_eq!(entry.sessions.len(), 2);
        assert_eq!(entry.sessions[0].name, "new");
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = SessionCache::default();
        cache.store("acad-1", vec![make_session("U12")]);
        cache.store("acad-2", vec![make_session("U14")]);
        cache.clear();

        assert!(cache.any("acad-1").is_none());
        assert!(cache.any("acad-2").is_none());
    }
}
