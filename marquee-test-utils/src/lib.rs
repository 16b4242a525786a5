//! MARQUEE Test Utilities
//!
//! Shared test infrastructure for the MARQUEE workspace:
//! - Mock backends and stores with failure injection
//! - Proptest generators for movies and catalog operations
//! - Fixtures for the common scenarios
//! - Custom assertions for cache state and error variants

// Re-export core types for convenience
pub use marquee_core::{
    BackendError, ConfigError, EntityId, MarqueeError, MarqueeResult, Movie, StoreError,
};
pub use marquee_storage::{
    CacheConfig, CacheStats, InMemoryStore, KeySpace, KeyValueStore, MovieCatalog, StoreResult,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use marquee_storage::EntitySource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

// ============================================================================
// MOCK BACKENDS AND STORES
// ============================================================================

/// Mock backend that records every lookup.
///
/// Answers from a configurable table; unknown identifiers are absent. Can be
/// switched into a failing mode at any time.
#[derive(Debug, Default)]
pub struct RecordingSource {
    movies: RwLock<HashMap<EntityId, Movie>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source that knows exactly `movies`.
    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let source = Self::new();
        for movie in movies {
            source.insert(movie);
        }
        source
    }

    pub fn insert(&self, movie: Movie) {
        if let Ok(mut movies) = self.movies.write() {
            movies.insert(movie.id(), movie);
        }
    }

    /// Make subsequent lookups fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups made so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitySource<Movie> for RecordingSource {
    async fn fetch(&self, id: EntityId) -> Result<Option<Movie>, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::LookupFailed {
                id,
                reason: "backend offline".to_string(),
            });
        }
        let movies = self.movies.read().map_err(|_| BackendError::LookupFailed {
            id,
            reason: "lock poisoned".to_string(),
        })?;
        Ok(movies.get(&id).cloned())
    }
}

/// Store wrapper that fails on demand.
///
/// Reads and writes are toggled independently so a test can, for example,
/// let the aggregate invalidation succeed and then fail the entity write.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The wrapped store, for inspecting state behind the failure switch.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn check(flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: format!("injected {} failure", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.delete(key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.delete_prefix(prefix).await
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.scan_prefix(prefix).await
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for movies and catalog operation sequences.

    use super::*;
    use proptest::prelude::*;

    /// One operation against a movie catalog.
    #[derive(Debug, Clone)]
    pub enum CatalogOp {
        Get(EntityId),
        Put(Movie),
        Evict(EntityId),
        ClearAll,
        ListAll,
    }

    /// Identifiers drawn from a small pool so sequences revisit the same slots.
    pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
        0i64..8
    }

    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,24}"
    }

    pub fn arb_release_date() -> impl Strategy<Value = NaiveDate> {
        (1900i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d).expect("day 1-28 exists in every month")
        })
    }

    pub fn arb_movie() -> impl Strategy<Value = Movie> {
        (arb_entity_id(), arb_title(), arb_release_date())
            .prop_map(|(id, title, date)| Movie::new(id, title, date))
    }

    pub fn arb_op() -> impl Strategy<Value = CatalogOp> {
        prop_oneof![
            3 => arb_entity_id().prop_map(CatalogOp::Get),
            3 => arb_movie().prop_map(CatalogOp::Put),
            2 => arb_entity_id().prop_map(CatalogOp::Evict),
            1 => Just(CatalogOp::ClearAll),
            3 => Just(CatalogOp::ListAll),
        ]
    }

    pub fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<CatalogOp>> {
        prop::collection::vec(arb_op(), 1..=max_len)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built movies, catalogs and runtimes.

    use super::*;
    use std::sync::Arc;

    pub const SAMPLE_ID: EntityId = 15;
    pub const SAMPLE_TITLE: &str = "Some movie";

    pub fn sample_release_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, 19).expect("valid date")
    }

    /// The movie used throughout the scenario tests.
    pub fn sample_movie() -> Movie {
        Movie::new(SAMPLE_ID, SAMPLE_TITLE, sample_release_date())
    }

    pub fn movie_with_id(id: EntityId) -> Movie {
        Movie::new(id, format!("Movie {}", id), sample_release_date())
    }

    /// Catalog over a fresh in-memory store and a recording backend.
    pub fn in_memory_catalog(
        source: RecordingSource,
    ) -> (
        Arc<InMemoryStore>,
        Arc<RecordingSource>,
        MovieCatalog<InMemoryStore, RecordingSource>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let source = Arc::new(source);
        let catalog = MovieCatalog::with_defaults(Arc::clone(&store), Arc::clone(&source))
            .expect("default layout is valid");
        (store, source, catalog)
    }

    /// Catalog over a store with failure switches.
    pub fn failing_catalog(
        source: RecordingSource,
    ) -> (
        Arc<FailingStore>,
        Arc<RecordingSource>,
        MovieCatalog<FailingStore, RecordingSource>,
    ) {
        let store = Arc::new(FailingStore::new());
        let source = Arc::new(source);
        let catalog = MovieCatalog::with_defaults(Arc::clone(&store), Arc::clone(&source))
            .expect("default layout is valid");
        (store, source, catalog)
    }

    /// Single-threaded runtime for driving async code from proptest bodies.
    pub fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build test runtime")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for cache state and MARQUEE errors.

    use super::*;

    /// Assert that a MarqueeResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &MarqueeResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a MarqueeResult is a Store error.
    #[track_caller]
    pub fn assert_store_error<T: std::fmt::Debug>(result: &MarqueeResult<T>) {
        match result {
            Err(MarqueeError::Store(_)) => {}
            other => panic!("Expected Store error, got: {:?}", other),
        }
    }

    /// Assert that a MarqueeResult is a BackendUnavailable error.
    #[track_caller]
    pub fn assert_backend_unavailable<T: std::fmt::Debug>(result: &MarqueeResult<T>) {
        match result {
            Err(MarqueeError::BackendUnavailable(_)) => {}
            other => panic!("Expected BackendUnavailable error, got: {:?}", other),
        }
    }

    /// Assert that a MarqueeResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &MarqueeResult<T>) {
        match result {
            Err(MarqueeError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that the aggregate slot is absent from `store`.
    #[track_caller]
    pub fn assert_aggregate_absent(store: &InMemoryStore, keys: &KeySpace) {
        assert!(
            !store.contains_key(keys.aggregate_key()),
            "Expected aggregate slot {} to be absent",
            keys.aggregate_key()
        );
    }

    /// Assert that the aggregate slot is present in `store`.
    #[track_caller]
    pub fn assert_aggregate_present(store: &InMemoryStore, keys: &KeySpace) {
        assert!(
            store.contains_key(keys.aggregate_key()),
            "Expected aggregate slot {} to be present",
            keys.aggregate_key()
        );
    }

    /// Assert two movie lists hold the same movies, ignoring order.
    #[track_caller]
    pub fn assert_same_movies(actual: &[Movie], expected: &[Movie]) {
        let mut actual = actual.to_vec();
        let mut expected = expected.to_vec();
        actual.sort_by_key(Movie::id);
        expected.sort_by_key(Movie::id);
        assert_eq!(actual, expected, "Movie lists differ");
    }
}

// ============================================================================
// TESTS
// ============================================================================
