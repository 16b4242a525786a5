//! Backend collaborator consulted on entity-cache misses.

use async_trait::async_trait;
use chrono::NaiveDate;
use marquee_core::{BackendError, EntityId, Movie};

use crate::cache::CacheableEntity;

/// Source of truth for entities, queried when the entity cache misses.
///
/// Lookups are side-effect free from the cache's perspective. The cache does
/// not retry, back off, or time out; implementations own that policy and
/// report failures as [`BackendError`].
#[async_trait]
pub trait EntitySource<T: CacheableEntity>: Send + Sync {
    /// Fetch an entity by ID. `Ok(None)` means the backend has no such entity.
    async fn fetch(&self, id: EntityId) -> Result<Option<T>, BackendError>;
}

/// Stand-in backend that answers every lookup with a fixed movie.
///
/// It never fails and never reports an absent entity.
#[derive(Debug, Clone)]
pub struct FakeMovieSource {
    title: String,
    release_date: NaiveDate,
}

impl FakeMovieSource {
    pub fn new(title: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            release_date,
        }
    }
}

impl Default for FakeMovieSource {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            release_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl EntitySource<Movie> for FakeMovieSource {
    async fn fetch(&self, id: EntityId) -> Result<Option<Movie>, BackendError> {
        Ok(Some(Movie::new(id, self.title.clone(), self.release_date)))
    }
}
