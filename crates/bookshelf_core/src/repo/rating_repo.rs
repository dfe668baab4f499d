//! Rating store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `ratings`, keyed by `(user_id, book_id)`.
//!
//! # Invariants
//! - `insert_if_absent` is a single conflict-aware statement: an existing key
//!   is never overwritten and two racing inserts cannot both succeed.
//! - `update` never touches key columns, `library_name` or `recorded_at`.

use crate::model::catalog::BookId;
use crate::model::rating::{CriterionScore, CriterionScores, Rating, RatingKey};
use crate::repo::{count_to_u32, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RATING_SELECT_SQL: &str = "SELECT
    user_id,
    book_id,
    library_name,
    style_score,
    style_note,
    content_score,
    content_note,
    pleasantness_score,
    pleasantness_note,
    originality_score,
    originality_note,
    edition_score,
    edition_note,
    overall_score,
    final_comment,
    recorded_at
FROM ratings";

/// Repository interface for rating records.
pub trait RatingRepository {
    fn exists(&self, key: &RatingKey) -> RepoResult<bool>;
    /// Inserts `rating` unless its key is taken.
    ///
    /// Returns the stored record (with `recorded_at`) or `None` when a rating
    /// for the same `(user, book)` already exists.
    fn insert_if_absent(&self, rating: &Rating) -> RepoResult<Option<Rating>>;
    fn get(&self, key: &RatingKey) -> RepoResult<Option<Rating>>;
    fn list_by_book(&self, book_id: BookId) -> RepoResult<Vec<Rating>>;
    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Rating>>;
    fn count_by_book(&self, book_id: BookId) -> RepoResult<u32>;
    /// Replaces scores, notes, overall score and final comment.
    /// Returns `false` when the key does not exist.
    fn update(&self, rating: &Rating) -> RepoResult<bool>;
    /// Returns `false` when the key does not exist.
    fn delete(&self, key: &RatingKey) -> RepoResult<bool>;
}

/// SQLite-backed rating repository.
#[derive(Clone, Copy)]
pub struct SqliteRatingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRatingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RatingRepository for SqliteRatingRepository<'_> {
    fn exists(&self, key: &RatingKey) -> RepoResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM ratings WHERE user_id = ?1 AND book_id = ?2
            );",
            params![key.user_id.as_str(), key.book_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert_if_absent(&self, rating: &Rating) -> RepoResult<Option<Rating>> {
        let scores = &rating.scores;
        let recorded_at: Option<i64> = self
            .conn
            .query_row(
                "INSERT INTO ratings (
                    user_id,
                    book_id,
                    library_name,
                    style_score,
                    style_note,
                    content_score,
                    content_note,
                    pleasantness_score,
                    pleasantness_note,
                    originality_score,
                    originality_note,
                    edition_score,
                    edition_note,
                    overall_score,
                    final_comment
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                ON CONFLICT (user_id, book_id) DO NOTHING
                RETURNING recorded_at;",
                params![
                    rating.key.user_id.as_str(),
                    rating.key.book_id,
                    rating.library_name.as_str(),
                    scores.style.score,
                    scores.style.note.as_deref(),
                    scores.content.score,
                    scores.content.note.as_deref(),
                    scores.pleasantness.score,
                    scores.pleasantness.note.as_deref(),
                    scores.originality.score,
                    scores.originality.note.as_deref(),
                    scores.edition.score,
                    scores.edition.note.as_deref(),
                    rating.overall_score,
                    rating.final_comment.as_deref(),
                ],
                |row| row.get(0),
            )
            .optional()?;

        Ok(recorded_at.map(|recorded_at| Rating {
            recorded_at: Some(recorded_at),
            ..rating.clone()
        }))
    }

    fn get(&self, key: &RatingKey) -> RepoResult<Option<Rating>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RATING_SELECT_SQL} WHERE user_id = ?1 AND book_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![key.user_id.as_str(), key.book_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_rating_row(row)?));
        }
        Ok(None)
    }

    fn list_by_book(&self, book_id: BookId) -> RepoResult<Vec<Rating>> {
        self.query_list("WHERE book_id = ?1", params![book_id])
    }

    fn list_by_user(&self, user_id: &str) -> RepoResult<Vec<Rating>> {
        self.query_list("WHERE user_id = ?1", params![user_id])
    }

    fn count_by_book(&self, book_id: BookId) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ratings WHERE book_id = ?1;",
            [book_id],
            |row| row.get(0),
        )?;
        count_to_u32("ratings", count)
    }

    fn update(&self, rating: &Rating) -> RepoResult<bool> {
        let scores = &rating.scores;
        let changed = self.conn.execute(
            "UPDATE ratings
             SET
                style_score = ?3,
                style_note = ?4,
                content_score = ?5,
                content_note = ?6,
                pleasantness_score = ?7,
                pleasantness_note = ?8,
                originality_score = ?9,
                originality_note = ?10,
                edition_score = ?11,
                edition_note = ?12,
                overall_score = ?13,
                final_comment = ?14
             WHERE user_id = ?1
               AND book_id = ?2;",
            params![
                rating.key.user_id.as_str(),
                rating.key.book_id,
                scores.style.score,
                scores.style.note.as_deref(),
                scores.content.score,
                scores.content.note.as_deref(),
                scores.pleasantness.score,
                scores.pleasantness.note.as_deref(),
                scores.originality.score,
                scores.originality.note.as_deref(),
                scores.edition.score,
                scores.edition.note.as_deref(),
                rating.overall_score,
                rating.final_comment.as_deref(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, key: &RatingKey) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM ratings WHERE user_id = ?1 AND book_id = ?2;",
            params![key.user_id.as_str(), key.book_id],
        )?;
        Ok(changed > 0)
    }
}

impl SqliteRatingRepository<'_> {
    fn query_list(&self, filter: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Rating>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RATING_SELECT_SQL} {filter} ORDER BY recorded_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(bind)?;
        let mut ratings = Vec::new();
        while let Some(row) = rows.next()? {
            ratings.push(parse_rating_row(row)?);
        }
        Ok(ratings)
    }
}

fn parse_rating_row(row: &Row<'_>) -> RepoResult<Rating> {
    let key = RatingKey {
        user_id: row.get("user_id")?,
        book_id: row.get("book_id")?,
    };
    key.validate()
        .map_err(|err| RepoError::InvalidData(format!("rating key `{key}`: {err}")))?;

    let scores = CriterionScores {
        style: parse_score(row, "style_score", "style_note")?,
        content: parse_score(row, "content_score", "content_note")?,
        pleasantness: parse_score(row, "pleasantness_score", "pleasantness_note")?,
        originality: parse_score(row, "originality_score", "originality_note")?,
        edition: parse_score(row, "edition_score", "edition_note")?,
    };
    if let Some((criterion, score)) = scores.first_out_of_range() {
        return Err(RepoError::InvalidData(format!(
            "rating `{key}` has {criterion} score {score} outside 1..=5"
        )));
    }

    Ok(Rating {
        key,
        library_name: row.get("library_name")?,
        scores,
        overall_score: row.get("overall_score")?,
        final_comment: row.get("final_comment")?,
        recorded_at: row.get::<_, Option<i64>>("recorded_at")?,
    })
}

fn parse_score(row: &Row<'_>, score_column: &str, note_column: &str) -> RepoResult<CriterionScore> {
    Ok(CriterionScore {
        score: row.get(score_column)?,
        note: row.get(note_column)?,
    })
}
