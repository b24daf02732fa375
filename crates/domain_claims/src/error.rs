//! Claims domain errors

use core_kernel::Money;
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Approved amount {approved} exceeds claim amount {claim}")]
    ApprovedAmountExceedsClaim { approved: Money, claim: Money },

    #[error("Claim amount must be positive")]
    NonPositiveAmount,

    #[error("Invoice {0} already has an active claim")]
    ActiveClaimExists(String),

    #[error("Invoice {0} has no insurer share to claim")]
    NothingToClaim(String),

    #[error("Claim has no approved amount to pay")]
    NoApprovedAmount,
}
