//! Per-domain fetch state
//!
//! A [`Store`] owns exactly one [`FetchState`] and is its only writer. Views
//! read consistent snapshots or subscribe to changes. At most one request per
//! store is in flight; a `fetch_all` issued while one is pending does nothing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::gateway::{CountriesApi, RowsApi};
use crate::model::{Country, DataTable};
use crate::row::TestRow;

/// Items, loading flag and error of one data domain
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub items: Arc<[T]>,
    /// True only between dispatch and resolution of a request
    pub loading: bool,
    /// Message of the last failed request; cleared when a new one starts
    pub error: Option<String>,
    /// Completion time of the last successful request
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            loading: false,
            error: None,
            fetched_at: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Source of a store's items
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Name used in logs
    fn domain(&self) -> &str;

    async fn load(&self) -> Result<Vec<Self::Item>>;
}

/// Loads the full country collection
pub struct CountriesLoader {
    api: Arc<dyn CountriesApi>,
}

impl CountriesLoader {
    pub fn new(api: Arc<dyn CountriesApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Loader for CountriesLoader {
    type Item = Country;

    fn domain(&self) -> &str {
        "countries"
    }

    async fn load(&self) -> Result<Vec<Country>> {
        self.api.list_countries().await
    }
}

/// Loads every row of one backend table
pub struct RowsLoader {
    api: Arc<dyn RowsApi>,
    table: DataTable,
}

impl RowsLoader {
    pub fn new(api: Arc<dyn RowsApi>, table: DataTable) -> Self {
        Self { api, table }
    }
}

#[async_trait]
impl Loader for RowsLoader {
    type Item = TestRow;

    fn domain(&self) -> &str {
        self.table.name()
    }

    async fn load(&self) -> Result<Vec<TestRow>> {
        self.api.list_rows(self.table).await
    }
}

/// Store of one data domain
pub struct Store<L: Loader> {
    loader: Arc<L>,
    state: Arc<watch::Sender<FetchState<L::Item>>>,
}

impl<L: Loader> Clone for Store<L> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
            state: Arc::clone(&self.state),
        }
    }
}

pub type CountryStore = Store<CountriesLoader>;
pub type RowStore = Store<RowsLoader>;

impl<L: Loader> Store<L> {
    pub fn new(loader: L) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            loader: Arc::new(loader),
            state: Arc::new(state),
        }
    }

    pub fn domain(&self) -> &str {
        self.loader.domain()
    }

    /// Items, loading flag and error read together
    pub fn snapshot(&self) -> FetchState<L::Item> {
        self.state.borrow().clone()
    }

    /// Change notifications, starting from the current state
    pub fn subscribe(&self) -> watch::Receiver<FetchState<L::Item>> {
        self.state.subscribe()
    }

    /// Start a fetch unless one is already in flight
    ///
    /// Returns the handle of the spawned request, or `None` when the call was
    /// suppressed. The request runs to completion even if the handle is
    /// dropped.
    pub fn fetch_all(&self) -> Option<JoinHandle<()>> {
        let started = self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error = None;
            true
        });
        if !started {
            debug!(domain = self.domain(), "fetch already in flight");
            return None;
        }

        info!(domain = self.domain(), "fetch started");
        let store = self.clone();
        Some(tokio::spawn(async move {
            let result = store.loader.load().await;
            store.finish(result);
        }))
    }

    fn finish(&self, result: Result<Vec<L::Item>>) {
        let domain = self.domain().to_string();
        self.state.send_modify(move |state| {
            state.loading = false;
            match result {
                Ok(items) => {
                    info!(domain = %domain, count = items.len(), "fetch succeeded");
                    state.items = Arc::from(items);
                    state.fetched_at = Some(Utc::now());
                }
                Err(err) => {
                    warn!(domain = %domain, error = %err, "fetch failed");
                    state.error = Some(err.to_string());
                }
            }
        });
    }

    /// Wait until no request is in flight and return that state
    pub async fn settled(&self) -> FetchState<L::Item> {
        let mut changes = self.state.subscribe();
        loop {
            {
                let state = changes.borrow_and_update();
                if !state.loading {
                    return state.clone();
                }
            }
            if changes.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Fetch when the collection is empty, then wait for it to settle
    pub async fn ensure_loaded(&self) -> FetchState<L::Item> {
        if self.snapshot().is_empty() {
            self.fetch_all();
        }
        self.settled().await
    }

    /// Fetch again and wait for the result
    pub async fn refresh(&self) -> FetchState<L::Item> {
        self.fetch_all();
        self.settled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Loader that blocks until a permit is released and counts calls
    struct GatedLoader {
        calls: AtomicUsize,
        gate: Semaphore,
        fail: bool,
    }

    impl GatedLoader {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Loader for Arc<GatedLoader> {
        type Item = u32;

        fn domain(&self) -> &str {
            "numbers"
        }

        async fn load(&self) -> Result<Vec<u32>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
            let _permit = self.gate.acquire().await.map_err(Error::network)?;
            if self.fail {
                Err(Error::network("provider unreachable"))
            } else {
                Ok(vec![n, n + 1])
            }
        }
    }

    #[tokio::test]
    async fn duplicate_fetch_is_suppressed() {
        let loader = Arc::new(GatedLoader::new(false));
        let store = Store::new(Arc::clone(&loader));

        let first = store.fetch_all();
        let second = store.fetch_all();
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(store.snapshot().loading);

        loader.gate.add_permits(1);
        first.unwrap().await.unwrap();

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(&state.items[..], &[0, 1]);
        assert!(state.fetched_at.is_some());
    }

    #[tokio::test]
    async fn success_replaces_items_wholesale() {
        let loader = Arc::new(GatedLoader::new(false));
        let store = Store::new(Arc::clone(&loader));
        loader.gate.add_permits(2);

        store.refresh().await;
        let state = store.refresh().await;

        assert_eq!(&state.items[..], &[1, 2]);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_sets_error_and_keeps_items() {
        let loader = Arc::new(GatedLoader::new(true));
        let store = Store::new(Arc::clone(&loader));
        loader.gate.add_permits(1);

        let state = store.refresh().await;
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Network error: provider unreachable")
        );
        assert!(state.items.is_empty());
        assert!(state.fetched_at.is_none());
    }

    #[tokio::test]
    async fn loading_and_error_never_coexist() {
        let loader = Arc::new(GatedLoader::new(true));
        let store = Store::new(Arc::clone(&loader));
        let mut changes = store.subscribe();

        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                let state = changes.borrow_and_update().clone();
                seen.push((state.loading, state.error.clone()));
                if seen.len() >= 5 || changes.changed().await.is_err() {
                    break;
                }
            }
            seen
        });

        for _ in 0..2 {
            let handle = store.fetch_all().unwrap();
            assert!(store.snapshot().error.is_none());
            loader.gate.add_permits(1);
            handle.await.unwrap();
            assert!(store.snapshot().error.is_some());
        }
        drop(store);

        let seen = observer.await.unwrap();
        assert!(seen.iter().all(|(loading, error)| !(*loading && error.is_some())));
    }

    #[tokio::test]
    async fn ensure_loaded_skips_fetch_when_populated() {
        let loader = Arc::new(GatedLoader::new(false));
        let store = Store::new(Arc::clone(&loader));
        loader.gate.add_permits(1);

        store.ensure_loaded().await;
        store.ensure_loaded().await;
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn settled_waits_for_in_flight_request() {
        let loader = Arc::new(GatedLoader::new(false));
        let store = Store::new(Arc::clone(&loader));
        store.fetch_all();

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.settled().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        loader.gate.add_permits(1);
        let state = waiter.await.unwrap();
        assert_eq!(state.items.len(), 2);
    }
}
