//! Failure taxonomy shared by the recommendation and rating services.

use crate::model::catalog::BookId;
use crate::model::rating::Criterion;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A business rule rejected the request after consulting the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusinessRule {
    #[error("book {book_id} cannot be recommended as a follow-up to itself")]
    SelfRecommendation { book_id: BookId },
    #[error(
        "recommendation limit reached for book read {book_read_id}: {existing} of {limit} already given"
    )]
    RecommendationLimitReached {
        book_read_id: BookId,
        existing: u32,
        limit: u32,
    },
    #[error("{criterion} score {score} is outside 1..=5")]
    ScoreOutOfRange { criterion: Criterion, score: i32 },
}

/// Service-level error; one variant per failure kind.
///
/// "Not found" on update/delete is not an error: those operations return
/// `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),
    #[error("business rule violation: {0}")]
    BusinessRuleViolation(BusinessRule),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("store communication failure: {0}")]
    Communication(#[from] RepoError),
}

impl ServiceError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::BusinessRuleViolation(_) => "business_rule_violation",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::Communication(_) => "communication_failure",
        }
    }

    /// Whether the caller's request was refused, as opposed to the store
    /// failing.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Communication(_))
    }
}

impl From<BusinessRule> for ServiceError {
    fn from(value: BusinessRule) -> Self {
        Self::BusinessRuleViolation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{BusinessRule, ServiceError};
    use crate::model::rating::Criterion;
    use crate::model::validation::ValidationError;
    use crate::repo::RepoError;

    #[test]
    fn only_store_failures_are_not_rejections() {
        let invalid = ServiceError::from(ValidationError::Blank { field: "user_id" });
        let rule = ServiceError::from(BusinessRule::SelfRecommendation { book_id: 4 });
        let store = ServiceError::from(RepoError::InvalidData("broken".to_string()));

        assert!(invalid.is_rejection());
        assert!(rule.is_rejection());
        assert!(!store.is_rejection());
        assert_eq!(store.code(), "communication_failure");
    }

    #[test]
    fn score_violation_message_names_the_criterion() {
        let err = ServiceError::from(BusinessRule::ScoreOutOfRange {
            criterion: Criterion::Originality,
            score: 6,
        });
        assert_eq!(
            err.to_string(),
            "business rule violation: originality score 6 is outside 1..=5"
        );
    }
}
