//! The module contains the errors the engine can throw.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A field on an incoming value is malformed or out of range.
    #[error("invalid value: {0}")]
    Validation(String),
    /// A referenced entity is absent, or soft-deleted where an active
    /// instance was required.
    #[error("\"{0}\" not found")]
    NotFound(String),
    /// Uniqueness violation, duplicate association, hierarchy cycle, or a
    /// delete blocked by dependent records.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A cross-entity invariant does not hold (kind or family mismatch).
    #[error("integrity mismatch: {0}")]
    IntegrityMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::IntegrityMismatch(a), Self::IntegrityMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
