//! Rating domain model.
//!
//! # Responsibility
//! - Define the five-criterion evaluation record and its `(user, book)` key.
//! - Provide score range checks and the caller-side overall mean.
//!
//! # Invariants
//! - At most one rating per `(user, book)`.
//! - Each criterion score lies in `[MIN_SCORE, MAX_SCORE]` once persisted.
//! - Key fields and `library_name` never change after insert.

use crate::model::catalog::{Book, BookId};
use crate::model::validation::{require_non_blank, require_positive_id, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// Rating criteria, in persisted column/field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Style,
    Content,
    Pleasantness,
    Originality,
    Edition,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Style,
        Criterion::Content,
        Criterion::Pleasantness,
        Criterion::Originality,
        Criterion::Edition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Content => "content",
            Self::Pleasantness => "pleasantness",
            Self::Originality => "originality",
            Self::Edition => "edition",
        }
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One criterion score with its optional free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: i32,
    pub note: Option<String>,
}

impl CriterionScore {
    pub fn new(score: i32) -> Self {
        Self { score, note: None }
    }

    pub fn with_note(score: i32, note: impl Into<String>) -> Self {
        Self {
            score,
            note: Some(note.into()),
        }
    }

    pub fn in_range(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.score)
    }
}

/// The five criterion scores of one rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScores {
    pub style: CriterionScore,
    pub content: CriterionScore,
    pub pleasantness: CriterionScore,
    pub originality: CriterionScore,
    pub edition: CriterionScore,
}

impl CriterionScores {
    /// Builds scores without notes, in `Criterion::ALL` order.
    pub fn from_values(values: [i32; 5]) -> Self {
        let [style, content, pleasantness, originality, edition] = values;
        Self {
            style: CriterionScore::new(style),
            content: CriterionScore::new(content),
            pleasantness: CriterionScore::new(pleasantness),
            originality: CriterionScore::new(originality),
            edition: CriterionScore::new(edition),
        }
    }

    pub fn get(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::Style => &self.style,
            Criterion::Content => &self.content,
            Criterion::Pleasantness => &self.pleasantness,
            Criterion::Originality => &self.originality,
            Criterion::Edition => &self.edition,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &CriterionScore)> + '_ {
        Criterion::ALL
            .into_iter()
            .map(move |criterion| (criterion, self.get(criterion)))
    }

    /// Returns the first criterion whose score falls outside the valid range.
    pub fn first_out_of_range(&self) -> Option<(Criterion, i32)> {
        self.iter()
            .find(|(_, entry)| !entry.in_range())
            .map(|(criterion, entry)| (criterion, entry.score))
    }

    /// Arithmetic mean of the five scores; what callers pass as overall score.
    pub fn mean(&self) -> f64 {
        let total: i32 = self.iter().map(|(_, entry)| entry.score).sum();
        f64::from(total) / Criterion::ALL.len() as f64
    }
}

/// Composite key `(user, book)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RatingKey {
    pub user_id: String,
    pub book_id: BookId,
}

impl RatingKey {
    pub fn new(user_id: impl Into<String>, book_id: BookId) -> Self {
        Self {
            user_id: user_id.into(),
            book_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("user_id", &self.user_id)?;
        require_positive_id("book_id", self.book_id)?;
        Ok(())
    }
}

impl Display for RatingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "user={} book={}", self.user_id, self.book_id)
    }
}

/// Persisted rating record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub key: RatingKey,
    /// Name of the library the book was rated from; informational only.
    pub library_name: String,
    pub scores: CriterionScores,
    /// Caller-computed mean of the five criteria.
    pub overall_score: f64,
    pub final_comment: Option<String>,
    /// Epoch milliseconds, assigned by the store on insert.
    pub recorded_at: Option<i64>,
}

impl Rating {
    /// Creates a not-yet-persisted rating whose overall score is the mean of
    /// `scores`.
    pub fn new(key: RatingKey, library_name: impl Into<String>, scores: CriterionScores) -> Self {
        let overall_score = scores.mean();
        Self {
            key,
            library_name: library_name.into(),
            scores,
            overall_score,
            final_comment: None,
            recorded_at: None,
        }
    }
}

/// Rating enriched with the rated book's catalog metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDetail {
    pub rating: Rating,
    pub book: Option<Book>,
}

/// Aggregated view over every rating of one book.
///
/// All averages are `0.0` when `count == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub book_id: BookId,
    pub count: u32,
    pub overall_average: f64,
    pub style_average: f64,
    pub content_average: f64,
    pub pleasantness_average: f64,
    pub originality_average: f64,
    pub edition_average: f64,
}

impl RatingSummary {
    pub fn average(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Style => self.style_average,
            Criterion::Content => self.content_average,
            Criterion::Pleasantness => self.pleasantness_average,
            Criterion::Originality => self.originality_average,
            Criterion::Edition => self.edition_average,
        }
    }
}
