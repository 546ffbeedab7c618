// crates/client/src/feed.rs
//! Session feed state machine.
//!
//! One `SessionFeed` serves one academy's dashboard. It pages through
//! `GET /api/academies/{id}/sessions`, retries failures with linear
//! backoff, serves fresh cache hits without touching the network, and
//! falls back to the last good snapshot when every attempt fails. A
//! background loop re-polls on an interval and on focus notifications
//! until the feed shuts down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pitchside_core::{Session, SessionPage};

use crate::cache::SessionCache;
use crate::error::FeedError;

/// Sessions fetched per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Fetch attempts per load before giving up.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts; attempt N waits N times this.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How often the background loop re-polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a session feed.
pub struct FeedConfig {
    /// Server base URL, e.g. `http://127.0.0.1:47311`.
    pub base_url: String,
    pub page_size: u32,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PITCHSIDE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:47311".to_string()),
            page_size: DEFAULT_PAGE_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: DEFAULT_RETRY_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Where a feed currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedPhase {
    /// Nothing loaded yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The working set reflects a successful fetch or a fresh cache hit.
    Success,
    /// Every attempt failed; the working set is the last good snapshot.
    StaleFallback,
    /// Every attempt failed and no snapshot was available.
    Error,
}

/// Snapshot of a feed's working state, cloned out under a short lock.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub phase: FeedPhase,
    pub sessions: Vec<Session>,
    /// Highest page applied to the working set (0 before the first load).
    pub page: u32,
    pub has_more: bool,
    pub last_refreshed: Option<Instant>,
    pub last_error: Option<String>,
}

/// RAII guard that clears the loading flag on drop, even when a load
/// bails out early.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle owning a feed's background poll loop. Dropping it aborts the
/// task, so a forgotten loop never outlives its dashboard.
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read-side feed for one academy's session list.
pub struct SessionFeed {
    http: reqwest::Client,
    config: FeedConfig,
    academy_id: String,
    cache: Arc<SessionCache>,
    state: RwLock<FeedState>,
    /// Collapses overlapping triggers into one in-flight fetch.
    loading: AtomicBool,
    focus: Notify,
    cancel: CancellationToken,
}

impl SessionFeed {
    /// Create a feed for one academy over an injected cache.
    pub fn new(
        academy_id: impl Into<String>,
        cache: Arc<SessionCache>,
        config: FeedConfig,
    ) -> Arc<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Arc::new(Self {
            http,
            config,
            academy_id: academy_id.into(),
            cache,
            state: RwLock::new(FeedState::default()),
            loading: AtomicBool::new(false),
            focus: Notify::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// The academy this feed serves.
    pub fn academy_id(&self) -> &str {
        &self.academy_id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FeedState {
        self.state
            .read()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Load page 1. `forced` bypasses the fresh-cache check.
    pub async fn refresh(&self, forced: bool) {
        self.load_page(1, forced).await;
    }

    /// Load the page after the highest one applied and append it.
    pub async fn load_more(&self) {
        let next = self.state().page.saturating_add(1);
        self.load_page(next, false).await;
    }

    /// Signal a window-focus event; the background loop answers with a
    /// forced refresh.
    pub fn notify_focus(&self) {
        self.focus.notify_one();
    }

    /// Stop the background loop and drop any in-flight result.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Spawn the background loop: a forced page-1 refresh on every poll
    /// tick and after every focus notification, until `shutdown`.
    pub fn spawn_refresh_loop(self: &Arc<Self>) -> RefreshHandle {
        let feed = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut poll = tokio::time::interval(feed.config.poll_interval);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the consumer already
            // issued its own initial load.
            poll.tick().await;
            info!(academy_id = %feed.academy_id, "session poll loop started");
            loop {
                tokio::select! {
                    _ = poll.tick() => {
                        feed.refresh(true).await;
                    }
                    _ = feed.focus.notified() => {
                        debug!(academy_id = %feed.academy_id, "focus refresh");
                        feed.refresh(true).await;
                    }
                    _ = feed.cancel.cancelled() => {
                        info!(academy_id = %feed.academy_id, "session poll loop stopped");
                        break;
                    }
                }
            }
        });
        RefreshHandle { task }
    }

    async fn load_page(&self, page: u32, forced: bool) {
        if self.cancel.is_cancelled() {
            return;
        }
        // One fetch per feed at a time; overlapping triggers no-op.
        if self.loading.swap(true, Ordering::SeqCst) {
            debug!(academy_id = %self.academy_id, page, "load already in flight, skipping");
            return;
        }
        let _guard = LoadingGuard(&self.loading);

        if page == 1 && !forced {
            if let Some(entry) = self.cache.fresh(&self.academy_id) {
                debug!(
                    academy_id = %self.academy_id,
                    count = entry.sessions.len(),
                    "serving fresh cache"
                );
                self.apply(|state| {
                    state.phase = FeedPhase::Success;
                    state.page = 1;
                    state.has_more = entry.sessions.len() == self.config.page_size as usize;
                    state.last_refreshed = Some(entry.stored_at);
                    state.last_error = None;
                    state.sessions = entry.sessions;
                });
                return;
            }
        }

        self.apply(|state| state.phase = FeedPhase::Loading);

        match self.fetch_with_retry(page).await {
            Ok(fetched) => {
                if self.cancel.is_cancelled() {
                    debug!(academy_id = %self.academy_id, "shut down mid-fetch, dropping result");
                    return;
                }
                // Only the first page refreshes the cache snapshot.
                if page == 1 {
                    self.cache.store(&self.academy_id, fetched.sessions.clone());
                }
                debug!(
                    academy_id = %self.academy_id,
                    page,
                    count = fetched.sessions.len(),
                    total = fetched.total,
                    "session page loaded"
                );
                self.apply(|state| {
                    state.phase = FeedPhase::Success;
                    state.page = page;
                    state.has_more = fetched.sessions.len() == self.config.page_size as usize;
                    if page == 1 {
                        state.sessions = fetched.sessions;
                    } else {
                        state.sessions.extend(fetched.sessions);
                    }
                    state.last_refreshed = Some(Instant::now());
                    state.last_error = None;
                });
            }
            Err(err) => {
                if self.cancel.is_cancelled() {
                    return;
                }
                if page == 1 {
                    if let Some(entry) = self.cache.any(&self.academy_id) {
                        warn!(
                            academy_id = %self.academy_id,
                            error = %err,
                            age_secs = entry.stored_at.elapsed().as_secs(),
                            "every attempt failed, serving stale snapshot"
                        );
                        self.apply(|state| {
                            state.phase = FeedPhase::StaleFallback;
                            state.page = 1;
                            state.has_more =
                                entry.sessions.len() == self.config.page_size as usize;
                            state.last_refreshed = Some(entry.stored_at);
                            state.last_error = Some(err.to_string());
                            state.sessions = entry.sessions;
                        });
                        return;
                    }
                }
                warn!(
                    academy_id = %self.academy_id,
                    page,
                    error = %err,
                    "every attempt failed, nothing to fall back on"
                );
                // Later pages keep the working set; losing loaded pages
                // would be worse than a failed append.
                self.apply(|state| {
                    state.phase = FeedPhase::Error;
                    state.last_error = Some(err.to_string());
                });
            }
        }
    }

    async fn fetch_with_retry(&self, page: u32) -> Result<SessionPage, FeedError> {
        let mut attempt = 1;
        loop {
            match self.fetch_page(page).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) if attempt < self.config.max_attempts => {
                    warn!(
                        academy_id = %self.academy_id,
                        page,
                        attempt,
                        error = %err,
                        "session fetch failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_base_delay * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_page(&self, page: u32) -> Result<SessionPage, FeedError> {
        let url = format!(
            "{}/api/academies/{}/sessions?page={}&limit={}",
            self.config.base_url, self.academy_id, page, self.config.page_size
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<SessionPage>().await?)
    }

    /// Mutate the state under a short-lived write lock.
    fn apply(&self, update: impl FnOnce(&mut FeedState)) {
        if let Ok(mut state) = self.state.write() {
            update(&mut state);
        }
    }
}
