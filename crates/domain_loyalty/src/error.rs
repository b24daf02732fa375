//! Loyalty domain errors

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the loyalty domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoyaltyError {
    #[error("Points must be a positive integer")]
    NonPositivePoints,

    #[error("Insufficient points: required {required}, balance {balance}")]
    InsufficientPoints { required: i64, balance: i64 },

    #[error("Points overflow")]
    PointsOverflow,

    #[error("Reward is not active")]
    RewardInactive,

    #[error("Reward is outside its validity window on {0}")]
    RewardOutsideWindow(NaiveDate),

    #[error("Reward has no remaining redemptions")]
    RewardExhausted,

    #[error("Redemption is not in a redeemable state")]
    InvalidRedemptionState,
}
