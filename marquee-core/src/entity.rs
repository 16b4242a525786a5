//! Cached entity types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a cached entity.
pub type EntityId = i64;

/// A movie record as served by the backend and held in the entity cache.
///
/// Values are immutable once constructed. Every cache read hands back an
/// owned copy, so callers never share state through the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movie {
    id: EntityId,
    title: String,
    release_date: NaiveDate,
}

impl Movie {
    pub fn new(id: EntityId, title: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            release_date,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ id={}, title=\"{}\", release_date={} }}",
            self.id, self.title, self.release_date
        )
    }
}
