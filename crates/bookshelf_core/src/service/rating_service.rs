//! Rating use-case service.
//!
//! # Responsibility
//! - Validate five-criterion ratings before they reach the store.
//! - Serve per-book aggregates (averages, counts) and per-user listings.
//!
//! # Invariants
//! - At most one rating per `(user, book)`; a second `save` returns
//!   `Ok(false)` and leaves the stored record untouched.
//! - Averages over a book with no ratings are `0.0`.
//! - `update` and `delete` report a missing key as `Ok(false)`.

use crate::model::catalog::BookId;
use crate::model::rating::{Criterion, Rating, RatingDetail, RatingKey, RatingSummary};
use crate::model::validation::{require_non_blank, require_positive_id, ValidationError};
use crate::repo::catalog_repo::BookCatalog;
use crate::repo::rating_repo::RatingRepository;
use crate::service::aggregate::{summarize_ratings, BookResolver};
use crate::service::error::{BusinessRule, ServiceResult};
use crate::service::{traced, traced_mutation};

/// Rating service over a store and the book catalog.
pub struct RatingService<R: RatingRepository, C: BookCatalog> {
    repo: R,
    books: C,
}

impl<R: RatingRepository, C: BookCatalog> RatingService<R, C> {
    pub fn new(repo: R, books: C) -> Self {
        Self { repo, books }
    }

    /// Returns whether `user_id` already rated `book_id`.
    pub fn is_already_rated(&self, book_id: BookId, user_id: &str) -> ServiceResult<bool> {
        let key = RatingKey::new(user_id, book_id);
        traced("rating_exists", &key.to_string(), || {
            key.validate()?;
            Ok(self.repo.exists(&key)?)
        })
    }

    /// Stores a new rating; `recorded_at` on the input is ignored.
    ///
    /// Returns `Ok(false)` when the user already rated this book.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank user, a non-positive book id or a
    ///   non-finite overall score.
    /// - `BusinessRuleViolation` when any criterion score is outside 1..=5.
    pub fn save(&self, rating: &Rating) -> ServiceResult<bool> {
        traced_mutation("rating_save", &rating.key.to_string(), || {
            validate_rating(rating)?;
            Ok(self.repo.insert_if_absent(rating)?.is_some())
        })
    }

    /// Every rating recorded for `book_id`.
    pub fn load_ratings(&self, book_id: BookId) -> ServiceResult<Vec<Rating>> {
        traced("rating_load", &format!("book={book_id}"), || {
            require_positive_id("book_id", book_id)?;
            Ok(self.repo.list_by_book(book_id)?)
        })
    }

    /// Count and all averages for `book_id`, computed in one pass.
    pub fn summarize(&self, book_id: BookId) -> ServiceResult<RatingSummary> {
        traced("rating_summarize", &format!("book={book_id}"), || {
            self.load_summary(book_id)
        })
    }

    /// Mean overall score of `book_id`, or `0.0` without ratings.
    pub fn compute_average_overall(&self, book_id: BookId) -> ServiceResult<f64> {
        traced("rating_average_overall", &format!("book={book_id}"), || {
            Ok(self.load_summary(book_id)?.overall_average)
        })
    }

    /// Mean score of one criterion for `book_id`, or `0.0` without ratings.
    pub fn average_for(&self, book_id: BookId, criterion: Criterion) -> ServiceResult<f64> {
        traced(&average_event(criterion), &format!("book={book_id}"), || {
            Ok(self.load_summary(book_id)?.average(criterion))
        })
    }

    pub fn average_style(&self, book_id: BookId) -> ServiceResult<f64> {
        self.average_for(book_id, Criterion::Style)
    }

    pub fn average_content(&self, book_id: BookId) -> ServiceResult<f64> {
        self.average_for(book_id, Criterion::Content)
    }

    pub fn average_pleasantness(&self, book_id: BookId) -> ServiceResult<f64> {
        self.average_for(book_id, Criterion::Pleasantness)
    }

    pub fn average_originality(&self, book_id: BookId) -> ServiceResult<f64> {
        self.average_for(book_id, Criterion::Originality)
    }

    pub fn average_edition(&self, book_id: BookId) -> ServiceResult<f64> {
        self.average_for(book_id, Criterion::Edition)
    }

    /// Number of ratings recorded for `book_id`.
    pub fn count_ratings(&self, book_id: BookId) -> ServiceResult<u32> {
        traced("rating_count", &format!("book={book_id}"), || {
            require_positive_id("book_id", book_id)?;
            Ok(self.repo.count_by_book(book_id)?)
        })
    }

    /// Ratings given by `user_id`, each with the rated book's metadata.
    pub fn list_detailed_by_user(&self, user_id: &str) -> ServiceResult<Vec<RatingDetail>> {
        traced("rating_list_detailed_by_user", &format!("user={user_id}"), || {
            require_non_blank("user_id", user_id)?;

            let ratings = self.repo.list_by_user(user_id)?;
            let mut resolver = BookResolver::new(&self.books);
            let mut details = Vec::with_capacity(ratings.len());
            for rating in ratings {
                details.push(RatingDetail {
                    book: resolver.resolve(rating.key.book_id)?,
                    rating,
                });
            }
            Ok(details)
        })
    }

    /// Replaces scores, notes, overall score and final comment of the rating
    /// keyed by `rating.key`. `library_name` and `recorded_at` are kept.
    ///
    /// Returns `Ok(false)` when no such rating exists.
    pub fn update(&self, rating: &Rating) -> ServiceResult<bool> {
        traced_mutation("rating_update", &rating.key.to_string(), || {
            validate_rating(rating)?;
            Ok(self.repo.update(rating)?)
        })
    }

    /// Removes the rating keyed by `(user_id, book_id)`.
    ///
    /// Returns `Ok(false)` when no such rating exists.
    pub fn delete(&self, user_id: &str, book_id: BookId) -> ServiceResult<bool> {
        let key = RatingKey::new(user_id, book_id);
        traced_mutation("rating_delete", &key.to_string(), || {
            key.validate()?;
            Ok(self.repo.delete(&key)?)
        })
    }

    fn load_summary(&self, book_id: BookId) -> ServiceResult<RatingSummary> {
        require_positive_id("book_id", book_id)?;
        let ratings = self.repo.list_by_book(book_id)?;
        Ok(summarize_ratings(book_id, &ratings))
    }
}

fn validate_rating(rating: &Rating) -> ServiceResult<()> {
    rating.key.validate()?;
    if !rating.overall_score.is_finite() {
        return Err(ValidationError::NonFiniteScore(rating.overall_score).into());
    }
    if let Some((criterion, score)) = rating.scores.first_out_of_range() {
        return Err(BusinessRule::ScoreOutOfRange { criterion, score }.into());
    }
    Ok(())
}

fn average_event(criterion: Criterion) -> String {
    format!("rating_average_{criterion}")
}

#[cfg(test)]
mod tests {
    use super::average_event;
    use crate::model::rating::Criterion;

    #[test]
    fn each_criterion_average_logs_under_its_own_event() {
        let events: Vec<String> = Criterion::ALL.into_iter().map(average_event).collect();
        assert_eq!(
            events,
            [
                "rating_average_style",
                "rating_average_content",
                "rating_average_pleasantness",
                "rating_average_originality",
                "rating_average_edition",
            ]
        );
    }
}
