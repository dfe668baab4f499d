//! Catalog reference entities.
//!
//! Books and libraries are owned by the catalog collaborators; recommendation
//! and rating records only carry their ids.

use serde::{Deserialize, Serialize};

/// Catalog identifier of a book. Valid ids are strictly positive.
pub type BookId = i64;

/// Identifier of a user-owned library. Valid ids are strictly positive.
pub type LibraryId = i64;

/// Book metadata as returned by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    /// Display form of the author list, e.g. `"Calvino, Italo"`.
    pub authors: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
}

impl Book {
    pub fn new(id: BookId, title: impl Into<String>, authors: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            authors: authors.into(),
            publisher: None,
            publication_year: None,
        }
    }
}

/// A user-owned named collection of books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub user_id: String,
    pub name: String,
}
