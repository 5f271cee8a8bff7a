//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a car or a record is not found for the user.
//! - [`ExistingKey`] thrown when a car name is already taken.
//! - [`InvalidAmount`] thrown when a refuel carries a bad quantity or price.
//!
//! Statistics never produce errors: degenerate aggregates are reported as
//! [`Measure::NoData`] instead.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Measure::NoData`]: super::statistics::Measure::NoData
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Store unavailable: {0}")]
    Store(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
