//! Shared fixtures for the mock API tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bazaar_core::{ApiUrl, Error, ErrorKind, MemoryStore, Navigator, Reporter, SessionKey, SessionStore};
use bazaar_http::{ApiClient, ClientConfig};
use wiremock::MockServer;

/// Reporter that records the kind of every reported error.
#[derive(Default)]
pub struct RecordingReporter {
    kinds: Mutex<Vec<Option<ErrorKind>>>,
}

impl RecordingReporter {
    pub fn kinds(&self) -> Vec<Option<ErrorKind>> {
        self.kinds.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, error: &Error) {
        self.kinds.lock().unwrap().push(error.kind());
    }
}

/// Navigator that counts forced logins.
#[derive(Default)]
pub struct CountingNavigator {
    visits: AtomicUsize,
}

impl CountingNavigator {
    pub fn visits(&self) -> usize {
        self.visits.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn navigate_to_login(&self) {
        self.visits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestClient {
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
    pub reporter: Arc<RecordingReporter>,
    pub navigator: Arc<CountingNavigator>,
}

/// Configuration pointing at the mock server, with millisecond backoff.
pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(ApiUrl::new(server.uri()).unwrap()).with_backoff(
        3,
        Duration::from_millis(5),
        Duration::from_millis(20),
    )
}

pub fn client_with(config: ClientConfig, store: Arc<MemoryStore>) -> TestClient {
    let (client, reporter, navigator) = build_client(config, store.clone());

    TestClient {
        client,
        store,
        reporter,
        navigator,
    }
}

/// Client over an arbitrary store, returning the recording ports.
pub fn build_client(
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
) -> (ApiClient, Arc<RecordingReporter>, Arc<CountingNavigator>) {
    let reporter = Arc::new(RecordingReporter::default());
    let navigator = Arc::new(CountingNavigator::default());
    let client = ApiClient::builder(config)
        .store(store)
        .reporter(reporter.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    (client, reporter, navigator)
}

/// Memory store that counts how often the whole session is cleared.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    clears: AtomicUsize,
}

impl CountingStore {
    pub fn logged_in() -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.set(SessionKey::AccessToken, "t1");
        store.set(SessionKey::RefreshToken, "r1");
        store.set(SessionKey::User, r#"{"id":1}"#);
        store
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl SessionStore for CountingStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: SessionKey, value: &str) {
        self.inner.set(key, value);
    }

    fn remove(&self, key: SessionKey) {
        self.inner.remove(key);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear();
    }
}

/// A store holding access token `t1`, refresh token `r1` and a user.
pub fn logged_in_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set(SessionKey::AccessToken, "t1");
    store.set(SessionKey::RefreshToken, "r1");
    store.set(SessionKey::User, r#"{"id":1,"name":"Ada"}"#);
    store
}

pub fn empty_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
