//! Grouping, averaging and enrichment helpers for read paths.
//!
//! # Invariants
//! - Every aggregation is one pass over the loaded candidate set.
//! - Count rankings are sorted by count descending; equal counts keep the
//!   order in which their book first appeared in the input, which callers
//!   must not rely on.
//! - Averages over an empty set are `0.0`.

use crate::model::catalog::{Book, BookId, LibraryId};
use crate::model::rating::{Criterion, Rating, RatingSummary};
use crate::model::recommendation::Recommendation;
use crate::repo::catalog_repo::{BookCatalog, LibraryDirectory};
use crate::repo::RepoResult;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Counts recommendations per suggested book, highest count first.
pub fn count_by_suggested_book(recommendations: &[Recommendation]) -> Vec<(BookId, u32)> {
    let mut position: HashMap<BookId, usize> = HashMap::new();
    let mut counts: Vec<(BookId, u32)> = Vec::new();

    for recommendation in recommendations {
        let book_id = recommendation.key.book_suggested_id;
        match position.get(&book_id) {
            Some(&index) => counts[index].1 += 1,
            None => {
                position.insert(book_id, counts.len());
                counts.push((book_id, 1));
            }
        }
    }

    counts.sort_by(|left, right| right.1.cmp(&left.1));
    counts
}

/// Suggested book ids in first-appearance order, without repeats.
pub fn distinct_suggested_books(recommendations: &[Recommendation]) -> Vec<BookId> {
    let mut seen = HashSet::new();
    recommendations
        .iter()
        .map(|recommendation| recommendation.key.book_suggested_id)
        .filter(|book_id| seen.insert(*book_id))
        .collect()
}

/// Builds count and per-criterion averages for one book in a single pass.
pub fn summarize_ratings(book_id: BookId, ratings: &[Rating]) -> RatingSummary {
    let mut overall_sum = 0.0;
    let mut criterion_sums = [0_i64; 5];

    for rating in ratings {
        overall_sum += rating.overall_score;
        for (index, criterion) in Criterion::ALL.into_iter().enumerate() {
            criterion_sums[index] += i64::from(rating.scores.get(criterion).score);
        }
    }

    let count = ratings.len();
    let mean = |sum: f64| if count == 0 { 0.0 } else { sum / count as f64 };
    let [style, content, pleasantness, originality, edition] = criterion_sums;

    RatingSummary {
        book_id,
        count: u32::try_from(count).unwrap_or(u32::MAX),
        overall_average: mean(overall_sum),
        style_average: mean(style as f64),
        content_average: mean(content as f64),
        pleasantness_average: mean(pleasantness as f64),
        originality_average: mean(originality as f64),
        edition_average: mean(edition as f64),
    }
}

/// Memoizing per-call book lookup; each id hits the catalog at most once.
pub(crate) struct BookResolver<'a, C: BookCatalog> {
    catalog: &'a C,
    resolved: HashMap<BookId, Option<Book>>,
}

impl<'a, C: BookCatalog> BookResolver<'a, C> {
    pub(crate) fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            resolved: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, id: BookId) -> RepoResult<Option<Book>> {
        if let Some(book) = self.resolved.get(&id) {
            return Ok(book.clone());
        }
        let book = self.catalog.book_by_id(id)?;
        if book.is_none() {
            warn!("event=catalog_lookup module=service status=miss book_id={id}");
        }
        self.resolved.insert(id, book.clone());
        Ok(book)
    }
}

/// Memoizing per-call library-name lookup.
pub(crate) struct LibraryResolver<'a, L: LibraryDirectory> {
    directory: &'a L,
    resolved: HashMap<LibraryId, Option<String>>,
}

impl<'a, L: LibraryDirectory> LibraryResolver<'a, L> {
    pub(crate) fn new(directory: &'a L) -> Self {
        Self {
            directory,
            resolved: HashMap::new(),
        }
    }

    pub(crate) fn name_of(&mut self, id: LibraryId) -> RepoResult<Option<String>> {
        if let Some(name) = self.resolved.get(&id) {
            return Ok(name.clone());
        }
        let name = self
            .directory
            .library_by_id(id)?
            .map(|library| library.name);
        if name.is_none() {
            warn!("event=library_lookup module=service status=miss library_id={id}");
        }
        self.resolved.insert(id, name.clone());
        Ok(name)
    }
}
