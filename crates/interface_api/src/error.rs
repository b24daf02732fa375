//! API error handling
//!
//! Maps the error taxonomy onto HTTP statuses: malformed input is 422,
//! invariant violations and invalid state transitions are 409, unknown
//! targets are 404, lock contention is a retryable 409, and external
//! dependency failures are 502.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_billing::error::BillingError;
use domain_claims::error::ClaimError;
use domain_loyalty::error::LoyaltyError;
use domain_payout::error::PayoutError;
use infra_db::{
    ClaimProcessError, DatabaseError, LoyaltyProcessError, PayoutProcessError, PaymentProcessError,
};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The row was locked by a concurrent operation; safe to retry
    #[error("Contention: {0}")]
    Contention(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External dependency failed: {0}")]
    ExternalDependency(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, retryable) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None)
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            ApiError::Contention(msg) => {
                (StatusCode::CONFLICT, "contention", msg.clone(), Some(true))
            }
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
                None,
            ),
            ApiError::ExternalDependency(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_dependency",
                msg.clone(),
                Some(true),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::LockContention(msg) => ApiError::Contention(msg),
            DatabaseError::DuplicateEntry(msg)
            | DatabaseError::ForeignKeyViolation(msg)
            | DatabaseError::ConstraintViolation(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match &err {
            BillingError::EmptyLineItems
            | BillingError::InvalidQuantity { .. }
            | BillingError::NegativeUnitPrice { .. }
            | BillingError::PercentageOutOfRange { .. }
            | BillingError::NonPositivePaymentAmount
            | BillingError::Money(_) => ApiError::Validation(err.to_string()),
            BillingError::Overpayment { .. }
            | BillingError::InvoiceNotPayable { .. }
            | BillingError::NotCancellable { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match &err {
            ClaimError::NonPositiveAmount => ApiError::Validation(err.to_string()),
            ClaimError::InvalidStatusTransition { .. }
            | ClaimError::ApprovedAmountExceedsClaim { .. }
            | ClaimError::ActiveClaimExists(_)
            | ClaimError::NothingToClaim(_)
            | ClaimError::NoApprovedAmount => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        match &err {
            PayoutError::InvalidPeriod { .. }
            | PayoutError::ShareOutOfRange(_)
            | PayoutError::NegativeGuarantee
            | PayoutError::NegativeRevenue
            | PayoutError::Money(_)
            | PayoutError::Temporal(_) => ApiError::Validation(err.to_string()),
            PayoutError::NoActiveContract(_)
            | PayoutError::InvalidStatusTransition { .. }
            | PayoutError::TaskNotPending => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<LoyaltyError> for ApiError {
    fn from(err: LoyaltyError) -> Self {
        match &err {
            LoyaltyError::NonPositivePoints | LoyaltyError::PointsOverflow => {
                ApiError::Validation(err.to_string())
            }
            LoyaltyError::InsufficientPoints { .. }
            | LoyaltyError::RewardInactive
            | LoyaltyError::RewardOutsideWindow(_)
            | LoyaltyError::RewardExhausted
            | LoyaltyError::InvalidRedemptionState => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<PaymentProcessError> for ApiError {
    fn from(err: PaymentProcessError) -> Self {
        match err {
            PaymentProcessError::Billing(e) => e.into(),
            PaymentProcessError::Database(e) => e.into(),
        }
    }
}

impl From<ClaimProcessError> for ApiError {
    fn from(err: ClaimProcessError) -> Self {
        match err {
            ClaimProcessError::Claim(e) => e.into(),
            ClaimProcessError::Billing(e) => e.into(),
            ClaimProcessError::Database(e) => e.into(),
        }
    }
}

impl From<PayoutProcessError> for ApiError {
    fn from(err: PayoutProcessError) -> Self {
        match err {
            PayoutProcessError::Payout(e) => e.into(),
            PayoutProcessError::Database(e) => e.into(),
        }
    }
}

impl From<LoyaltyProcessError> for ApiError {
    fn from(err: LoyaltyProcessError) -> Self {
        match err {
            LoyaltyProcessError::Loyalty(e) => e.into(),
            LoyaltyProcessError::Database(e) => e.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_transient() {
            ApiError::ExternalDependency(err.to_string())
        } else if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::BadRequest(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
