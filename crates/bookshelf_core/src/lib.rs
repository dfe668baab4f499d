//! Core domain logic for the bookshelf: book recommendations between readers
//! and five-criterion ratings.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod legacy;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::catalog::{Book, BookId, Library, LibraryId};
pub use model::rating::{
    Criterion, CriterionScore, CriterionScores, Rating, RatingDetail, RatingKey, RatingSummary,
};
pub use model::recommendation::{
    Recommendation, RecommendationDetail, RecommendationKey, SuggestedBookCount,
};
pub use model::validation::ValidationError;
pub use repo::catalog_repo::{BookCatalog, LibraryDirectory, SqliteCatalog};
pub use repo::rating_repo::{RatingRepository, SqliteRatingRepository};
pub use repo::recommendation_repo::{
    InsertOutcome, RecommendationRepository, SqliteRecommendationRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::error::{BusinessRule, ServiceError, ServiceResult};
pub use service::rating_service::RatingService;
pub use service::recommendation_service::{RecommendationService, RECOMMENDATION_LIMIT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
