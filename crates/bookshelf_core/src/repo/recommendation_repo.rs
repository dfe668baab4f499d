//! Recommendation store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `recommendations`, keyed by the 4-tuple key.
//! - Provide the atomic "insert while under the per-book limit" write.
//!
//! # Invariants
//! - `insert_within_limit` counts, checks the key and inserts under one
//!   `BEGIN IMMEDIATE` transaction; concurrent writers on other connections
//!   wait on the database write lock instead of interleaving.
//! - Key columns are never updated.
//! - Listing order is insertion order (`created_at`, then `rowid`).

use crate::model::catalog::{BookId, LibraryId};
use crate::model::recommendation::{Recommendation, RecommendationKey};
use crate::repo::{count_to_u32, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const RECOMMENDATION_SELECT_SQL: &str = "SELECT
    user_id,
    library_id,
    book_read_id,
    book_suggested_id,
    comment,
    created_at
FROM recommendations";

/// Result of the conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Record persisted; carries the store-assigned `created_at`.
    Inserted(Recommendation),
    /// The user already gave `existing >= limit` recommendations for the
    /// book read, summed across all libraries.
    LimitReached { existing: u32 },
    /// A record with the exact same key already exists.
    DuplicateKey,
}

/// Repository interface for recommendation records.
pub trait RecommendationRepository {
    /// Inserts `recommendation` only if its user has fewer than `limit`
    /// recommendations for the same book read and the key is free.
    fn insert_within_limit(
        &self,
        recommendation: &Recommendation,
        limit: u32,
    ) -> RepoResult<InsertOutcome>;
    /// Counts recommendations by `user_id` for `book_read_id` across libraries.
    fn count_by_user_and_book_read(&self, user_id: &str, book_read_id: BookId) -> RepoResult<u32>;
    fn get(&self, key: &RecommendationKey) -> RepoResult<Option<Recommendation>>;
    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Recommendation>>;
    fn list_by_library_and_book_read(
        &self,
        library_id: LibraryId,
        book_read_id: BookId,
    ) -> RepoResult<Vec<Recommendation>>;
    fn list_by_book_read(&self, book_read_id: BookId) -> RepoResult<Vec<Recommendation>>;
    /// Replaces the comment. Returns `false` when the key does not exist.
    fn update_comment(&self, key: &RecommendationKey, comment: Option<&str>) -> RepoResult<bool>;
    /// Removes the record. Returns `false` when the key does not exist.
    fn delete(&self, key: &RecommendationKey) -> RepoResult<bool>;
}

/// SQLite-backed recommendation repository.
#[derive(Clone, Copy)]
pub struct SqliteRecommendationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecommendationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecommendationRepository for SqliteRecommendationRepository<'_> {
    fn insert_within_limit(
        &self,
        recommendation: &Recommendation,
        limit: u32,
    ) -> RepoResult<InsertOutcome> {
        let key = &recommendation.key;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let existing = count_for_user_and_book_read(&tx, &key.user_id, key.book_read_id)?;
        if existing >= limit {
            return Ok(InsertOutcome::LimitReached { existing });
        }

        if key_exists(&tx, key)? {
            return Ok(InsertOutcome::DuplicateKey);
        }

        let created_at: i64 = tx.query_row(
            "INSERT INTO recommendations (
                user_id,
                library_id,
                book_read_id,
                book_suggested_id,
                comment
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING created_at;",
            params![
                key.user_id.as_str(),
                key.library_id,
                key.book_read_id,
                key.book_suggested_id,
                recommendation.comment.as_deref(),
            ],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(InsertOutcome::Inserted(Recommendation {
            key: key.clone(),
            comment: recommendation.comment.clone(),
            created_at: Some(created_at),
        }))
    }

    fn count_by_user_and_book_read(&self, user_id: &str, book_read_id: BookId) -> RepoResult<u32> {
        count_for_user_and_book_read(self.conn, user_id, book_read_id)
    }

    fn get(&self, key: &RecommendationKey) -> RepoResult<Option<Recommendation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECOMMENDATION_SELECT_SQL}
             WHERE user_id = ?1
               AND library_id = ?2
               AND book_read_id = ?3
               AND book_suggested_id = ?4;"
        ))?;

        let mut rows = stmt.query(key_params(key))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_recommendation_row(row)?));
        }

        Ok(None)
    }

    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Recommendation>> {
        self.query_list("WHERE user_id = ?1", params![user_id])
    }

    fn list_by_library_and_book_read(
        &self,
        library_id: LibraryId,
        book_read_id: BookId,
    ) -> RepoResult<Vec<Recommendation>> {
        self.query_list(
            "WHERE library_id = ?1 AND book_read_id = ?2",
            params![library_id, book_read_id],
        )
    }

    fn list_by_book_read(&self, book_read_id: BookId) -> RepoResult<Vec<Recommendation>> {
        self.query_list("WHERE book_read_id = ?1", params![book_read_id])
    }

    fn update_comment(&self, key: &RecommendationKey, comment: Option<&str>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE recommendations
             SET comment = ?5
             WHERE user_id = ?1
               AND library_id = ?2
               AND book_read_id = ?3
               AND book_suggested_id = ?4;",
            params![
                key.user_id.as_str(),
                key.library_id,
                key.book_read_id,
                key.book_suggested_id,
                comment,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, key: &RecommendationKey) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM recommendations
             WHERE user_id = ?1
               AND library_id = ?2
               AND book_read_id = ?3
               AND book_suggested_id = ?4;",
            key_params(key),
        )?;
        Ok(changed > 0)
    }
}

impl SqliteRecommendationRepository<'_> {
    fn query_list(
        &self,
        filter: &str,
        bind: impl rusqlite::Params,
    ) -> RepoResult<Vec<Recommendation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECOMMENDATION_SELECT_SQL} {filter} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(bind)?;
        let mut recommendations = Vec::new();
        while let Some(row) = rows.next()? {
            recommendations.push(parse_recommendation_row(row)?);
        }
        Ok(recommendations)
    }
}

fn count_for_user_and_book_read(
    conn: &Connection,
    user_id: &str,
    book_read_id: BookId,
) -> RepoResult<u32> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM recommendations
         WHERE user_id = ?1
           AND book_read_id = ?2;",
        params![user_id, book_read_id],
        |row| row.get(0),
    )?;
    count_to_u32("recommendations", count)
}

fn key_params(key: &RecommendationKey) -> (&str, LibraryId, BookId, BookId) {
    (
        key.user_id.as_str(),
        key.library_id,
        key.book_read_id,
        key.book_suggested_id,
    )
}

fn parse_recommendation_row(row: &Row<'_>) -> RepoResult<Recommendation> {
    let key = RecommendationKey {
        user_id: row.get("user_id")?,
        library_id: row.get("library_id")?,
        book_read_id: row.get("book_read_id")?,
        book_suggested_id: row.get("book_suggested_id")?,
    };
    key.validate()
        .map_err(|err| RepoError::InvalidData(format!("recommendation key `{key}`: {err}")))?;
    if key.is_self_recommendation() {
        return Err(RepoError::InvalidData(format!(
            "recommendation `{key}` suggests the book that was read"
        )));
    }

    Ok(Recommendation {
        key,
        comment: row.get("comment")?,
        created_at: row.get::<_, Option<i64>>("created_at")?,
    })
}

fn key_exists(conn: &Connection, key: &RecommendationKey) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1
             FROM recommendations
             WHERE user_id = ?1
               AND library_id = ?2
               AND book_read_id = ?3
               AND book_suggested_id = ?4;",
            key_params(key),
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}
