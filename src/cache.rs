//! Keyed in-memory request cache with stale-while-revalidate semantics.
//!
//! At most one request per key is in flight. Callers that ask for a key while
//! its request is running join it instead of issuing another. Failed requests
//! are retried with a fixed delay before the error is exposed.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{TmdbError, TmdbResult};

pub type FetchFuture<T> = Pin<Box<dyn Future<Output = TmdbResult<T>> + Send>>;
pub type Fetcher<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = TmdbResult<T>> + Send + 'static,
{
    Arc::new(move || -> FetchFuture<T> { Box::pin(f()) })
}

/// Endpoint name plus its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    endpoint: String,
    params: Vec<String>,
}

impl RequestKey {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, value: impl ToString) -> Self {
        self.params.push(value.to_string());
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint)?;
        for p in &self.params {
            write!(f, "|{p}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<TmdbError>,
    /// In flight with nothing cached yet.
    pub is_loading: bool,
    /// In flight, cached data or not.
    pub is_validating: bool,
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_validating: false,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevalidationPolicy {
    pub on_focus: bool,
    pub on_reconnect: bool,
    /// A key mounted again within this window reuses the last request.
    pub dedupe_interval: Duration,
}

impl Default for RevalidationPolicy {
    fn default() -> Self {
        Self {
            on_focus: false,
            on_reconnect: true,
            dedupe_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    pub retry: RetryPolicy,
    pub revalidation: RevalidationPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevalidateEvent {
    Focus,
    Reconnect,
}

struct Entry<T> {
    data: Option<T>,
    error: Option<TmdbError>,
    /// Last start or completion of a request; drives the dedupe window.
    touched_at: Option<Instant>,
    inflight: Option<watch::Receiver<bool>>,
    fetcher: Fetcher<T>,
}

impl<T: Clone> Entry<T> {
    fn new(fetcher: Fetcher<T>) -> Self {
        Self {
            data: None,
            error: None,
            touched_at: None,
            inflight: None,
            fetcher,
        }
    }

    fn state(&self) -> QueryState<T> {
        let validating = self.inflight.is_some();
        QueryState {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: validating && self.data.is_none(),
            is_validating: validating,
        }
    }
}

type Entries<T> = Arc<Mutex<HashMap<RequestKey, Entry<T>>>>;

/// What [`RequestCache::start`] did for a key.
enum Start {
    Spawned(watch::Receiver<bool>),
    Joined(watch::Receiver<bool>),
    Skipped,
}

impl Start {
    fn receiver(self) -> Option<watch::Receiver<bool>> {
        match self {
            Start::Spawned(rx) | Start::Joined(rx) => Some(rx),
            Start::Skipped => None,
        }
    }
}

pub struct RequestCache<T> {
    entries: Entries<T>,
    policy: CachePolicy,
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            policy: self.policy,
        }
    }
}

impl<T> RequestCache<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    /// Snapshot without side effects. A null key is always idle.
    pub fn read(&self, key: Option<&RequestKey>) -> QueryState<T> {
        let Some(key) = key else {
            return QueryState::idle();
        };
        self.lock()
            .get(key)
            .map(Entry::state)
            .unwrap_or_default()
    }

    /// Ensures the key is (re)validated and returns what is cached right now.
    pub fn fetch(&self, key: Option<RequestKey>, fetcher: Fetcher<T>) -> QueryState<T> {
        let Some(key) = key else {
            return QueryState::idle();
        };
        self.start(&key, Some(fetcher), false);
        self.read(Some(&key))
    }

    /// Like [`fetch`](Self::fetch) but waits for the request, retries included.
    pub async fn settle(&self, key: Option<RequestKey>, fetcher: Fetcher<T>) -> QueryState<T> {
        let Some(key) = key else {
            return QueryState::idle();
        };
        if let Some(rx) = self.start(&key, Some(fetcher), false).receiver() {
            wait_done(rx).await;
        }
        self.read(Some(&key))
    }

    /// Forces a new request for a known key, ignoring the dedupe window.
    pub async fn mutate(&self, key: &RequestKey) -> QueryState<T> {
        if let Some(rx) = self.start(key, None, true).receiver() {
            wait_done(rx).await;
        }
        self.read(Some(key))
    }

    /// Applies the revalidation policy; returns how many new requests it
    /// started. Keys already in flight are left to finish.
    pub fn notify(&self, event: RevalidateEvent) -> usize {
        let enabled = match event {
            RevalidateEvent::Focus => self.policy.revalidation.on_focus,
            RevalidateEvent::Reconnect => self.policy.revalidation.on_reconnect,
        };
        if !enabled {
            debug!(event = ?event, "revalidation disabled for event");
            return 0;
        }
        let keys: Vec<RequestKey> = self.lock().keys().cloned().collect();
        keys.iter()
            .filter(|key| matches!(self.start(key, None, true), Start::Spawned(_)))
            .count()
    }

    pub async fn wait_all(&self) {
        let pending: Vec<watch::Receiver<bool>> = self
            .lock()
            .values()
            .filter_map(|e| e.inflight.clone())
            .collect();
        for rx in pending {
            wait_done(rx).await;
        }
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start(&self, key: &RequestKey, fetcher: Option<Fetcher<T>>, force: bool) -> Start {
        let mut entries = self.lock();
        let entry = match entries.entry(key.clone()) {
            MapEntry::Occupied(o) => {
                let entry = o.into_mut();
                if let Some(f) = fetcher {
                    entry.fetcher = f;
                }
                entry
            }
            MapEntry::Vacant(v) => match fetcher {
                Some(f) => v.insert(Entry::new(f)),
                None => return Start::Skipped,
            },
        };

        if let Some(rx) = &entry.inflight {
            debug!(key = %key, "joining in-flight request");
            return Start::Joined(rx.clone());
        }

        let now = Instant::now();
        if !force {
            if let Some(started) = entry.touched_at {
                if now.duration_since(started) < self.policy.revalidation.dedupe_interval {
                    debug!(key = %key, "within dedupe window, reusing cached state");
                    return Start::Skipped;
                }
            }
        }

        let (tx, rx) = watch::channel(false);
        entry.inflight = Some(rx.clone());
        entry.touched_at = Some(now);
        let fetch = Arc::clone(&entry.fetcher);
        drop(entries);

        debug!(key = %key, "starting request");
        tokio::spawn(run_fetch(
            Arc::clone(&self.entries),
            key.clone(),
            fetch,
            self.policy.retry,
            tx,
        ));
        Start::Spawned(rx)
    }
}

async fn run_fetch<T: Clone + Send + 'static>(
    entries: Entries<T>,
    key: RequestKey,
    fetcher: Fetcher<T>,
    retry: RetryPolicy,
    done: watch::Sender<bool>,
) {
    let mut attempt = 0;
    let outcome = loop {
        match fetcher().await {
            Ok(data) => break Ok(data),
            Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                attempt += 1;
                warn!(
                    key = %key,
                    attempt,
                    max_retries = retry.max_retries,
                    "request failed, retrying in {:?}: {}",
                    retry.interval,
                    err
                );
                tokio::time::sleep(retry.interval).await;
            }
            Err(err) => break Err(err),
        }
    };

    {
        let mut guard = entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = guard.get_mut(&key) {
            match outcome {
                Ok(data) => {
                    entry.data = Some(data);
                    entry.error = None;
                }
                Err(err) => {
                    warn!(key = %key, "request failed for good: {}", err);
                    entry.error = Some(err);
                }
            }
            entry.inflight = None;
            entry.touched_at = Some(Instant::now());
        }
    }
    let _ = done.send(true);
}

async fn wait_done(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|done| *done).await;
}

/// Keeps the last resolved data visible while a new key loads.
#[derive(Debug, Clone)]
pub struct KeepPrevious<T> {
    last: Option<T>,
}

impl<T> Default for KeepPrevious<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: Clone> KeepPrevious<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, key_active: bool, state: QueryState<T>) -> QueryState<T> {
        if !key_active {
            self.last = None;
            return state;
        }
        match &state.data {
            Some(data) => {
                self.last = Some(data.clone());
                state
            }
            None => QueryState {
                data: self.last.clone(),
                ..state
            },
        }
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick_policy() -> CachePolicy {
        CachePolicy {
            retry: RetryPolicy {
                max_retries: 3,
                interval: Duration::from_millis(1),
            },
            revalidation: RevalidationPolicy {
                dedupe_interval: Duration::ZERO,
                ..RevalidationPolicy::default()
            },
        }
    }

    fn counting(calls: &Arc<AtomicUsize>, delay_ms: u64) -> Fetcher<usize> {
        let calls = Arc::clone(calls);
        fetcher(move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(n)
            }
        })
    }

    fn failing(calls: &Arc<AtomicUsize>, failures: usize, err: TmdbError) -> Fetcher<usize> {
        let calls = Arc::clone(calls);
        fetcher(move || {
            let calls = Arc::clone(&calls);
            let err = err.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    Err(err)
                } else {
                    Ok(n)
                }
            }
        })
    }

    fn transport() -> TmdbError {
        TmdbError::Transport("connection reset".to_string())
    }

    #[tokio::test]
    async fn null_key_is_idle_and_never_fetches() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let state = cache.settle(None, counting(&calls, 0)).await;
        assert_eq!(state, QueryState::idle());
        let state = cache.fetch(None, counting(&calls, 0));
        assert!(!state.is_loading);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_request() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movies/popular").param(1);
        let (a, b, c) = tokio::join!(
            cache.settle(Some(key.clone()), counting(&calls, 20)),
            cache.settle(Some(key.clone()), counting(&calls, 20)),
            cache.settle(Some(key.clone()), counting(&calls, 20)),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for state in [a, b, c] {
            assert_eq!(state.data, Some(1));
            assert!(!state.is_loading);
        }
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let first = cache.fetch(
            Some(RequestKey::new("movies/popular").param(1)),
            counting(&calls, 10),
        );
        let second = cache.fetch(
            Some(RequestKey::new("movies/popular").param(2)),
            counting(&calls, 10),
        );
        assert!(first.is_loading && second.is_loading);
        cache.wait_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movie/1");
        let state = cache
            .settle(Some(key), failing(&calls, 2, transport()))
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.data, Some(3));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn gives_up_after_three_retries() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movie/1");
        let state = cache
            .settle(Some(key), failing(&calls, usize::MAX, transport()))
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(state.data, None);
        assert_eq!(state.error, Some(transport()));
        assert!(!state.is_loading && !state.is_validating);
    }

    #[tokio::test]
    async fn missing_credential_is_not_retried() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let state = cache
            .settle(
                Some(RequestKey::new("movie/1")),
                failing(&calls, usize::MAX, TmdbError::MissingCredential),
            )
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.error, Some(TmdbError::MissingCredential));
    }

    #[tokio::test]
    async fn serves_stale_data_while_revalidating() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movie/7");
        let first = cache.settle(Some(key.clone()), counting(&calls, 1)).await;
        assert_eq!(first.data, Some(1));

        let during = cache.fetch(Some(key.clone()), counting(&calls, 30));
        assert_eq!(during.data, Some(1));
        assert!(during.is_validating);
        assert!(!during.is_loading);

        cache.wait_all().await;
        assert_eq!(cache.read(Some(&key)).data, Some(2));
    }

    #[tokio::test]
    async fn dedupe_window_reuses_recent_request() {
        let policy = CachePolicy {
            retry: RetryPolicy {
                max_retries: 0,
                interval: Duration::from_millis(1),
            },
            revalidation: RevalidationPolicy::default(),
        };
        let cache = RequestCache::new(policy);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movie/9");
        cache.settle(Some(key.clone()), counting(&calls, 0)).await;
        let again = cache.settle(Some(key.clone()), counting(&calls, 0)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(again.data, Some(1));
    }

    #[tokio::test]
    async fn reconnect_revalidates_but_focus_does_not() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movies/upcoming").param(1);
        cache.settle(Some(key.clone()), counting(&calls, 0)).await;

        assert_eq!(cache.notify(RevalidateEvent::Focus), 0);
        cache.wait_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.notify(RevalidateEvent::Reconnect), 1);
        cache.wait_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.read(Some(&key)).data, Some(2));
    }

    #[tokio::test]
    async fn reconnect_does_not_count_requests_already_in_flight() {
        let cache = RequestCache::new(quick_policy());
        let calls = Arc::new(AtomicUsize::new(0));
        let busy = RequestKey::new("movie/11");
        let landed = RequestKey::new("movie/12");
        cache.settle(Some(landed.clone()), counting(&calls, 0)).await;
        cache.fetch(Some(busy.clone()), counting(&calls, 30));

        assert_eq!(cache.notify(RevalidateEvent::Reconnect), 1);
        cache.wait_all().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let mut values = [
            cache.read(Some(&busy)).data,
            cache.read(Some(&landed)).data,
        ];
        values.sort();
        assert_eq!(values, [Some(2), Some(3)]);
    }

    #[test]
    fn default_policy_values() {
        let policy = CachePolicy::default();
        assert_eq!(policy.retry.max_retries, 3);
        assert_eq!(policy.retry.interval, Duration::from_secs(5));
        assert!(policy.revalidation.on_reconnect);
        assert!(!policy.revalidation.on_focus);
        assert_eq!(policy.revalidation.dedupe_interval, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_retries_three_times_five_seconds_apart() {
        let cache = RequestCache::new(CachePolicy::default());
        let stamps: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stamps);
        let always_down = fetcher(move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(Instant::now());
                Err::<usize, _>(transport())
            }
        });

        let begun = Instant::now();
        let state = cache
            .settle(Some(RequestKey::new("movie/13")), always_down)
            .await;
        assert_eq!(state.error, Some(transport()));

        let stamps = stamps.lock().unwrap();
        assert_eq!(stamps.len(), 4);
        for pair in stamps.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
        }
        assert_eq!(begun.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn mutate_retries_after_terminal_error() {
        let policy = CachePolicy {
            retry: RetryPolicy {
                max_retries: 0,
                interval: Duration::from_millis(1),
            },
            revalidation: RevalidationPolicy::default(),
        };
        let cache = RequestCache::new(policy);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = RequestKey::new("movie/3/credits");
        let failed = cache
            .settle(Some(key.clone()), failing(&calls, 1, transport()))
            .await;
        assert!(failed.error.is_some());

        let recovered = cache.mutate(&key).await;
        assert_eq!(recovered.data, Some(2));
        assert_eq!(recovered.error, None);
    }

    #[test]
    fn keep_previous_bridges_loading_gap() {
        let mut keep = KeepPrevious::new();
        let loaded = QueryState {
            data: Some(vec![1, 2]),
            ..QueryState::idle()
        };
        assert_eq!(keep.apply(true, loaded).data, Some(vec![1, 2]));

        let loading = QueryState {
            is_loading: true,
            is_validating: true,
            ..QueryState::idle()
        };
        let shown = keep.apply(true, loading);
        assert_eq!(shown.data, Some(vec![1, 2]));
        assert!(shown.is_loading);

        let cleared = keep.apply(false, QueryState::<Vec<i32>>::idle());
        assert_eq!(cleared.data, None);
        let after_clear = keep.apply(
            true,
            QueryState {
                is_loading: true,
                ..QueryState::idle()
            },
        );
        assert_eq!(after_clear.data, None);
    }

    #[test]
    fn key_display_lists_params_in_order() {
        let key = RequestKey::new("search/movie").param("alien").param(2);
        assert_eq!(key.to_string(), "search/movie|alien|2");
        assert_eq!(key.params(), ["alien".to_string(), "2".to_string()]);
    }
}
