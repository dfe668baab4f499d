//! Recommendation domain model.
//!
//! # Responsibility
//! - Define the "book read -> book suggested" record and its composite key.
//! - Define the denormalized read models served to presentation callers.
//!
//! # Invariants
//! - The 4-tuple key is unique in the store.
//! - `book_read_id != book_suggested_id`.
//! - Only `comment` may change after insert.

use crate::model::catalog::{Book, BookId, LibraryId};
use crate::model::validation::{require_non_blank, require_positive_id, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Composite key `(user, library, book read, book suggested)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecommendationKey {
    pub user_id: String,
    pub library_id: LibraryId,
    pub book_read_id: BookId,
    pub book_suggested_id: BookId,
}

impl RecommendationKey {
    pub fn new(
        user_id: impl Into<String>,
        library_id: LibraryId,
        book_read_id: BookId,
        book_suggested_id: BookId,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            library_id,
            book_read_id,
            book_suggested_id,
        }
    }

    /// Checks field shape only: non-blank user and positive ids.
    ///
    /// Self-recommendation is a business rule and is checked separately.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("user_id", &self.user_id)?;
        require_positive_id("library_id", self.library_id)?;
        require_positive_id("book_read_id", self.book_read_id)?;
        require_positive_id("book_suggested_id", self.book_suggested_id)?;
        Ok(())
    }

    /// Returns whether the key suggests the very book that was read.
    pub fn is_self_recommendation(&self) -> bool {
        self.book_read_id == self.book_suggested_id
    }
}

impl Display for RecommendationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user={} library={} book_read={} book_suggested={}",
            self.user_id, self.library_id, self.book_read_id, self.book_suggested_id
        )
    }
}

/// Persisted recommendation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub key: RecommendationKey,
    pub comment: Option<String>,
    /// Epoch milliseconds, assigned by the store on insert.
    pub created_at: Option<i64>,
}

impl Recommendation {
    /// Creates a not-yet-persisted record.
    pub fn new(key: RecommendationKey, comment: Option<String>) -> Self {
        Self {
            key,
            comment,
            created_at: None,
        }
    }
}

/// Display-ready recommendation with library and book metadata resolved.
///
/// Lookup misses leave the matching field `None`; raw ids stay on `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationDetail {
    pub key: RecommendationKey,
    pub comment: Option<String>,
    pub created_at: Option<i64>,
    pub library_name: Option<String>,
    pub book_read: Option<Book>,
    pub book_suggested: Option<Book>,
}

/// One suggested book with the number of recommendations pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedBookCount {
    pub book_id: BookId,
    pub book: Option<Book>,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::RecommendationKey;
    use crate::model::validation::ValidationError;

    #[test]
    fn validate_reports_first_offending_field() {
        let key = RecommendationKey::new("ada", 1, 0, 3);
        assert_eq!(
            key.validate(),
            Err(ValidationError::NonPositiveId {
                field: "book_read_id",
                value: 0
            })
        );

        let blank = RecommendationKey::new(" ", 1, 2, 3);
        assert_eq!(
            blank.validate(),
            Err(ValidationError::Blank { field: "user_id" })
        );
    }

    #[test]
    fn self_recommendation_passes_shape_validation() {
        let key = RecommendationKey::new("ada", 1, 10, 10);
        assert!(key.validate().is_ok());
        assert!(key.is_self_recommendation());
    }
}
