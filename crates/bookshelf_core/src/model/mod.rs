//! Domain model for recommendations, ratings and catalog references.
//!
//! # Responsibility
//! - Define canonical record shapes used by stores and services.
//! - Give every record an explicit composite key type.
//!
//! # Invariants
//! - Key fields are immutable once a record is persisted.
//! - Store-assigned timestamps are `None` before persistence.

pub mod catalog;
pub mod rating;
pub mod recommendation;
pub mod validation;
