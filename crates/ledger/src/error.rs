//! The module contains the error the ledger can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a referenced record does not exist.
//! - [`AlreadyExists`] thrown when a name collides with an existing record.
//! - [`InUse`] thrown when a delete is refused because transactions still
//!   reference the record.
//!
//! [`NotFound`]: LedgerError::NotFound
//! [`AlreadyExists`]: LedgerError::AlreadyExists
//! [`InUse`]: LedgerError::InUse
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("\"{0}\" already exists")]
    AlreadyExists(String),
    #[error("{0} still has transactions")]
    InUse(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Kind mismatch: {0}")]
    KindMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidColor(a), Self::InvalidColor(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (Self::KindMismatch(a), Self::KindMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
