//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! One handler invocation is one error scope: validation and precondition
//! checks run before any database call, and the first remote failure aborts
//! the remaining steps of the operation.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message; raised before any side effect
    Validation(String),
    /// A precondition was violated (e.g. deleting the Uncategorized sale
    /// type); raised before any destructive call
    Precondition(String),
    /// Database/persistence error
    Database(String),
    /// A destructive cascade needs explicit confirmation; carries the number
    /// of dependent sales that would be removed
    ConfirmationRequired(u64),
    /// A step of a multi-step cascade failed; later steps were not run
    Cascade {
        step: &'static str,
        entity_id: i32,
        message: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Precondition(msg) => write!(f, "Precondition failed: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::ConfirmationRequired(count) => {
                write!(f, "Confirmation required: {} dependent sales", count)
            }
            DomainError::Cascade {
                step,
                entity_id,
                message,
            } => write!(
                f,
                "Cascade delete failed at step '{}' for id {}: {}",
                step, entity_id, message
            ),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
