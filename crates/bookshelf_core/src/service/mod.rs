//! Use-case services over the recommendation and rating stores.
//!
//! # Responsibility
//! - Validate arguments and business rules before any store mutation.
//! - Aggregate and enrich store output for read paths.
//! - Log intent and outcome of every operation.
//!
//! # Invariants
//! - Services hold no mutable state; one instance may serve any number of
//!   sequential calls, and concurrent workers each build their own over
//!   their own connection.
//! - Store errors reach callers only as `ServiceError::Communication`.

use log::{error, info, warn};
use std::time::Instant;

pub mod aggregate;
pub mod error;
pub mod rating_service;
pub mod recommendation_service;

use error::ServiceResult;

/// Runs `op` between `status=start` and outcome log events.
pub(crate) fn traced<T>(
    event: &str,
    subject: &str,
    op: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    let started_at = Instant::now();
    info!("event={event} module=service status=start {subject}");
    let result = op();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event={event} module=service status=ok {subject} duration_ms={duration_ms}"),
        Err(err) if err.is_rejection() => warn!(
            "event={event} module=service status=rejected {subject} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=service status=error {subject} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
    result
}

/// Like [`traced`], but distinguishes a `false` result as `status=not_found`.
pub(crate) fn traced_mutation(
    event: &str,
    subject: &str,
    op: impl FnOnce() -> ServiceResult<bool>,
) -> ServiceResult<bool> {
    let result = traced(event, subject, op);
    if let Ok(false) = result {
        info!("event={event} module=service status=not_found {subject}");
    }
    result
}

/// Trims free text and maps empty input to `None`.
pub(crate) fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
