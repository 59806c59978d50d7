//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a request field is missing or malformed.
//! - [`Aggregator`] / [`Payment`] thrown when a third-party call fails.
//! - [`NotFound`] thrown when a lookup misses.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Aggregator`]: EngineError::Aggregator
//!  [`Payment`]: EngineError::Payment
//!  [`NotFound`]: EngineError::NotFound
use sea_orm::DbErr;
use thiserror::Error;

use crate::gateway::{AggregatorError, PaymentError};

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid request - {0}")]
    Validation(String),
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("no records found: {0}")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("engine misconfigured: missing {0}")]
    MissingDependency(&'static str),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Aggregator(a), Self::Aggregator(b)) => a == b,
            (Self::Payment(a), Self::Payment(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::MissingDependency(a), Self::MissingDependency(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
