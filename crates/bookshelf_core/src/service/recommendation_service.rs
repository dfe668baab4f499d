//! Recommendation use-case service.
//!
//! # Responsibility
//! - Validate recommendation keys and business rules before insert.
//! - Serve suggested-book lists, count rankings and per-user listings.
//!
//! # Invariants
//! - A user gives at most `RECOMMENDATION_LIMIT` recommendations per book
//!   read, summed across all of their libraries. The limit check and the
//!   insert are one store operation.
//! - A book is never suggested as a follow-up to itself.
//! - Comment updates and deletes address exactly one key and report a
//!   missing key as `Ok(false)`.

use crate::model::catalog::{Book, BookId, LibraryId};
use crate::model::recommendation::{
    Recommendation, RecommendationDetail, RecommendationKey, SuggestedBookCount,
};
use crate::model::validation::{require_non_blank, require_positive_id};
use crate::repo::catalog_repo::{BookCatalog, LibraryDirectory};
use crate::repo::recommendation_repo::{InsertOutcome, RecommendationRepository};
use crate::service::aggregate::{
    count_by_suggested_book, distinct_suggested_books, BookResolver, LibraryResolver,
};
use crate::service::error::{BusinessRule, ServiceError, ServiceResult};
use crate::service::{normalize_text, traced, traced_mutation};

/// Maximum recommendations one user may give for one book read.
pub const RECOMMENDATION_LIMIT: u32 = 3;

/// Recommendation service over a store and the catalog collaborators.
pub struct RecommendationService<R, C, L>
where
    R: RecommendationRepository,
    C: BookCatalog,
    L: LibraryDirectory,
{
    repo: R,
    books: C,
    libraries: L,
}

impl<R, C, L> RecommendationService<R, C, L>
where
    R: RecommendationRepository,
    C: BookCatalog,
    L: LibraryDirectory,
{
    pub fn new(repo: R, books: C, libraries: L) -> Self {
        Self {
            repo,
            books,
            libraries,
        }
    }

    /// Records that `key.user_id`, having read `key.book_read_id`, suggests
    /// `key.book_suggested_id` within `key.library_id`.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank user or a non-positive id.
    /// - `BusinessRuleViolation` for a self-recommendation or when the user
    ///   already reached the per-book limit.
    /// - `DuplicateKey` when the exact key is already recorded.
    pub fn add(
        &self,
        key: &RecommendationKey,
        comment: Option<&str>,
    ) -> ServiceResult<Recommendation> {
        traced("recommendation_add", &key.to_string(), || {
            key.validate()?;
            if key.is_self_recommendation() {
                return Err(BusinessRule::SelfRecommendation {
                    book_id: key.book_read_id,
                }
                .into());
            }

            let candidate = Recommendation::new(key.clone(), normalize_text(comment));
            match self
                .repo
                .insert_within_limit(&candidate, RECOMMENDATION_LIMIT)?
            {
                InsertOutcome::Inserted(stored) => Ok(stored),
                InsertOutcome::LimitReached { existing } => {
                    Err(BusinessRule::RecommendationLimitReached {
                        book_read_id: key.book_read_id,
                        existing,
                        limit: RECOMMENDATION_LIMIT,
                    }
                    .into())
                }
                InsertOutcome::DuplicateKey => Err(ServiceError::DuplicateKey(key.to_string())),
            }
        })
    }

    /// Books suggested after `book_read_id` inside one library.
    ///
    /// Each book appears once; books unknown to the catalog are skipped.
    pub fn recommended_books(
        &self,
        library_id: LibraryId,
        book_read_id: BookId,
    ) -> ServiceResult<Vec<Book>> {
        let subject = format!("library={library_id} book_read={book_read_id}");
        traced("recommended_books", &subject, || {
            require_positive_id("library_id", library_id)?;
            require_positive_id("book_read_id", book_read_id)?;

            let records = self
                .repo
                .list_by_library_and_book_read(library_id, book_read_id)?;
            let mut resolver = BookResolver::new(&self.books);
            let mut books = Vec::new();
            for book_id in distinct_suggested_books(&records) {
                if let Some(book) = resolver.resolve(book_id)? {
                    books.push(book);
                }
            }
            Ok(books)
        })
    }

    /// Suggested books with their recommendation counts inside one library,
    /// highest count first.
    pub fn recommended_with_count(
        &self,
        library_id: LibraryId,
        book_read_id: BookId,
    ) -> ServiceResult<Vec<SuggestedBookCount>> {
        let subject = format!("library={library_id} book_read={book_read_id}");
        traced("recommended_with_count", &subject, || {
            require_positive_id("library_id", library_id)?;
            require_positive_id("book_read_id", book_read_id)?;

            let records = self
                .repo
                .list_by_library_and_book_read(library_id, book_read_id)?;
            self.rank(&records)
        })
    }

    /// Same ranking as [`Self::recommended_with_count`], pooled across every
    /// library.
    pub fn recommended_with_count_global(
        &self,
        book_read_id: BookId,
    ) -> ServiceResult<Vec<SuggestedBookCount>> {
        let subject = format!("book_read={book_read_id}");
        traced("recommended_with_count_global", &subject, || {
            require_positive_id("book_read_id", book_read_id)?;

            let records = self.repo.list_by_book_read(book_read_id)?;
            self.rank(&records)
        })
    }

    /// Raw recommendation records given by `user_id`.
    pub fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Recommendation>> {
        traced("recommendation_list_by_user", &format!("user={user_id}"), || {
            require_non_blank("user_id", user_id)?;
            Ok(self.repo.list_by_user(user_id)?)
        })
    }

    /// Recommendations given by `user_id` with library name and both books
    /// resolved for display.
    pub fn list_detailed_by_user(&self, user_id: &str) -> ServiceResult<Vec<RecommendationDetail>> {
        traced(
            "recommendation_list_detailed_by_user",
            &format!("user={user_id}"),
            || {
                require_non_blank("user_id", user_id)?;

                let records = self.repo.list_by_user(user_id)?;
                let mut books = BookResolver::new(&self.books);
                let mut libraries = LibraryResolver::new(&self.libraries);
                let mut details = Vec::with_capacity(records.len());
                for record in records {
                    details.push(RecommendationDetail {
                        library_name: libraries.name_of(record.key.library_id)?,
                        book_read: books.resolve(record.key.book_read_id)?,
                        book_suggested: books.resolve(record.key.book_suggested_id)?,
                        key: record.key,
                        comment: record.comment,
                        created_at: record.created_at,
                    });
                }
                Ok(details)
            },
        )
    }

    /// Replaces the comment of the recommendation with exactly `key`.
    ///
    /// Returns `Ok(false)` when no such recommendation exists.
    pub fn update_comment(
        &self,
        key: &RecommendationKey,
        new_comment: Option<&str>,
    ) -> ServiceResult<bool> {
        traced_mutation("recommendation_update_comment", &key.to_string(), || {
            key.validate()?;
            let comment = normalize_text(new_comment);
            Ok(self.repo.update_comment(key, comment.as_deref())?)
        })
    }

    /// Removes the recommendation with exactly `key`.
    ///
    /// Returns `Ok(false)` when no such recommendation exists.
    pub fn delete(&self, key: &RecommendationKey) -> ServiceResult<bool> {
        traced_mutation("recommendation_delete", &key.to_string(), || {
            key.validate()?;
            Ok(self.repo.delete(key)?)
        })
    }

    fn rank(&self, records: &[Recommendation]) -> ServiceResult<Vec<SuggestedBookCount>> {
        let mut resolver = BookResolver::new(&self.books);
        let mut ranked = Vec::new();
        for (book_id, count) in count_by_suggested_book(records) {
            ranked.push(SuggestedBookCount {
                book_id,
                book: resolver.resolve(book_id)?,
                count,
            });
        }
        Ok(ranked)
    }
}
