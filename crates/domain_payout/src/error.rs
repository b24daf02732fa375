//! Payout domain errors

use core_kernel::{MoneyError, TemporalError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the payout domain
#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("Invalid period: {start} must be before {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Revenue share percentage out of range [0, 100]: {0}")]
    ShareOutOfRange(Decimal),

    #[error("Minimum guarantee must not be negative")]
    NegativeGuarantee,

    #[error("Gross revenue must not be negative")]
    NegativeRevenue,

    /// Usually signals a data problem, never a zero payout
    #[error("No active contract for owner {0} covering the period")]
    NoActiveContract(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Payout approval task is not pending")]
    TaskNotPending,

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),
}
