//! Billing domain errors

use core_kernel::{Money, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// An invoice must carry at least one line item
    #[error("Invoice has no line items")]
    EmptyLineItems,

    /// Line item quantity must be a positive integer
    #[error("Invalid quantity {quantity} for line item '{description}'")]
    InvalidQuantity { description: String, quantity: i64 },

    /// Line item unit price must not be negative
    #[error("Negative unit price for line item '{description}'")]
    NegativeUnitPrice { description: String },

    /// A percentage field fell outside [0, 100]
    #[error("{field} must be within [0, 100], got {value}")]
    PercentageOutOfRange { field: &'static str, value: Decimal },

    /// Payment amounts must be strictly positive
    #[error("Payment amount must be positive")]
    NonPositivePaymentAmount,

    /// The payment would push cumulative completed payments past the total
    #[error("Payment of {attempted} exceeds outstanding balance of {outstanding}")]
    Overpayment {
        attempted: Money,
        outstanding: Money,
    },

    /// The invoice is in a state that cannot accept payments
    #[error("Invoice in status '{status}' cannot accept payments")]
    InvoiceNotPayable { status: InvoiceStatus },

    /// Cancellation is only allowed before any payment has completed
    #[error("Invoice in status '{status}' cannot be cancelled")]
    NotCancellable { status: InvoiceStatus },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
