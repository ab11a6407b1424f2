//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`MissingRate`] thrown when the rate table has no usable entry for a
//!   currency the computation needs.
//! - [`InvalidExpense`] thrown when an expense record violates its invariants.
//! - [`InvalidSettlement`] thrown on settlement lifecycle misuse or malformed
//!   settlement data.
//! - [`InvalidRecord`] thrown when a stored field (currency code, member
//!   role) cannot be parsed.
//!
//!  [`MissingRate`]: EngineError::MissingRate
//!  [`InvalidExpense`]: EngineError::InvalidExpense
//!  [`InvalidSettlement`]: EngineError::InvalidSettlement
//!  [`InvalidRecord`]: EngineError::InvalidRecord
use thiserror::Error;
use uuid::Uuid;

use crate::Currency;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The named currency cannot be converted with the current snapshot.
    ///
    /// Callers decide how to degrade: the computation itself never guesses a
    /// rate.
    #[error("no exchange rate for {0}")]
    MissingRate(Currency),
    #[error("invalid expense {expense}: {reason}")]
    InvalidExpense { expense: Uuid, reason: String },
    #[error("invalid settlement: {0}")]
    InvalidSettlement(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
