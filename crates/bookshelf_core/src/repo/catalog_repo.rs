//! Catalog lookups used for read-path enrichment.
//!
//! # Responsibility
//! - Resolve book ids to metadata and libraries by id or `(user, name)`.
//! - Offer seeding helpers for the local SQLite catalog.
//!
//! # Invariants
//! - Services only read through `BookCatalog` / `LibraryDirectory`; catalog
//!   rows are never written from recommendation or rating use-cases.

use crate::model::catalog::{Book, BookId, Library, LibraryId};
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Read-only book metadata lookup.
pub trait BookCatalog {
    fn book_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
}

/// Read-only library lookup.
pub trait LibraryDirectory {
    fn library_by_id(&self, id: LibraryId) -> RepoResult<Option<Library>>;
    fn find_library(&self, user_id: &str, name: &str) -> RepoResult<Option<Library>>;
}

/// SQLite-backed catalog over the `books` and `libraries` tables.
#[derive(Clone, Copy)]
pub struct SqliteCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts or replaces one book row.
    pub fn upsert_book(&self, book: &Book) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO books (id, title, authors, publisher, publication_year)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                authors = excluded.authors,
                publisher = excluded.publisher,
                publication_year = excluded.publication_year;",
            params![
                book.id,
                book.title.as_str(),
                book.authors.as_str(),
                book.publisher.as_deref(),
                book.publication_year,
            ],
        )?;
        Ok(())
    }

    /// Creates a library for `user_id`, or returns the existing one with the
    /// same name.
    pub fn create_library(&self, user_id: &str, name: &str) -> RepoResult<Library> {
        self.conn.execute(
            "INSERT INTO libraries (user_id, name) VALUES (?1, ?2)
             ON CONFLICT (user_id, name) DO NOTHING;",
            params![user_id, name],
        )?;
        let library = self.conn.query_row(
            "SELECT id, user_id, name FROM libraries WHERE user_id = ?1 AND name = ?2;",
            params![user_id, name],
            library_from_row,
        )?;
        Ok(library)
    }
}

impl BookCatalog for SqliteCatalog<'_> {
    fn book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let book = self
            .conn
            .query_row(
                "SELECT id, title, authors, publisher, publication_year
                 FROM books
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Book {
                        id: row.get("id")?,
                        title: row.get("title")?,
                        authors: row.get("authors")?,
                        publisher: row.get("publisher")?,
                        publication_year: row.get("publication_year")?,
                    })
                },
            )
            .optional()?;
        Ok(book)
    }
}

impl LibraryDirectory for SqliteCatalog<'_> {
    fn library_by_id(&self, id: LibraryId) -> RepoResult<Option<Library>> {
        let library = self
            .conn
            .query_row(
                "SELECT id, user_id, name FROM libraries WHERE id = ?1;",
                [id],
                library_from_row,
            )
            .optional()?;
        Ok(library)
    }

    fn find_library(&self, user_id: &str, name: &str) -> RepoResult<Option<Library>> {
        let library = self
            .conn
            .query_row(
                "SELECT id, user_id, name
                 FROM libraries
                 WHERE user_id = ?1 AND name = ?2;",
                params![user_id, name],
                library_from_row,
            )
            .optional()?;
        Ok(library)
    }
}

fn library_from_row(row: &Row<'_>) -> rusqlite::Result<Library> {
    Ok(Library {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
    })
}
