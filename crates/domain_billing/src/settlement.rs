//! Settlement rules
//!
//! Invoice status is a pure function of "the completed payments for this
//! invoice", never an independent counter. The functions here are evaluated
//! against a freshly read payment sum inside the same transaction that
//! records a new payment, so a crash between the insert and the status
//! update leaves the invoice re-derivable.

use core_kernel::Money;

use crate::error::BillingError;
use crate::invoice::InvoiceStatus;
use crate::payment::{Payment, PaymentStatus};

/// Sums the completed payments for an invoice
pub fn completed_total(payments: &[Payment], zero: Money) -> Result<Money, BillingError> {
    let mut total = zero;
    for payment in payments {
        if payment.status == PaymentStatus::Completed {
            total = total.checked_add(&payment.amount)?;
        }
    }
    Ok(total)
}

/// Validates a payment against the freshly read authoritative state
///
/// Rejects non-positive amounts, payments against non-payable invoices, and
/// any amount that would push the cumulative completed total past the
/// invoice total.
pub fn validate_payment(
    status: InvoiceStatus,
    total_amount: Money,
    completed_total: Money,
    amount: Money,
) -> Result<(), BillingError> {
    if matches!(status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
        return Err(BillingError::InvoiceNotPayable { status });
    }
    if !amount.is_positive() {
        return Err(BillingError::NonPositivePaymentAmount);
    }
    let outstanding = total_amount.checked_sub(&completed_total)?;
    if amount > outstanding {
        return Err(BillingError::Overpayment {
            attempted: amount,
            outstanding,
        });
    }
    Ok(())
}

/// Derives the invoice status from the completed-payment total
///
/// `paid` when the sum equals the total, `partial` when strictly between
/// zero and the total, otherwise the current status is kept (pending and
/// overdue are not downgraded by a zero sum).
pub fn derive_status(
    current: InvoiceStatus,
    total_amount: Money,
    completed_total: Money,
) -> InvoiceStatus {
    if completed_total == total_amount && completed_total.is_positive() {
        InvoiceStatus::Paid
    } else if completed_total.is_positive() && completed_total < total_amount {
        InvoiceStatus::Partial
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, InvoiceId, Money};
    use crate::payment::PaymentMethod;

    fn ngn(minor: i64) -> Money {
        Money::from_minor(minor, Currency::NGN)
    }

    #[test]
    fn completed_total_ignores_failed_payments() {
        let invoice_id = InvoiceId::new();
        let payments = vec![
            Payment::completed(invoice_id, ngn(500), PaymentMethod::Cash, None),
            Payment::failed(invoice_id, ngn(900), PaymentMethod::Card, None),
            Payment::completed(invoice_id, ngn(250), PaymentMethod::Card, None),
        ];

        let total = completed_total(&payments, Money::zero(Currency::NGN)).unwrap();
        assert_eq!(total, ngn(750));
    }

    #[test]
    fn validate_rejects_overpayment() {
        let result = validate_payment(InvoiceStatus::Partial, ngn(1000), ngn(800), ngn(300));
        assert!(matches!(result, Err(BillingError::Overpayment { .. })));
    }

    #[test]
    fn validate_rejects_cancelled_invoice() {
        let result = validate_payment(InvoiceStatus::Cancelled, ngn(1000), ngn(0), ngn(100));
        assert!(matches!(result, Err(BillingError::InvoiceNotPayable { .. })));
    }

    #[test]
    fn status_is_paid_only_at_exact_total() {
        assert_eq!(
            derive_status(InvoiceStatus::Pending, ngn(1000), ngn(1000)),
            InvoiceStatus::Paid
        );
        assert_eq!(
            derive_status(InvoiceStatus::Pending, ngn(1000), ngn(999)),
            InvoiceStatus::Partial
        );
        assert_eq!(
            derive_status(InvoiceStatus::Pending, ngn(1000), ngn(0)),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn overdue_stays_overdue_until_money_arrives() {
        assert_eq!(
            derive_status(InvoiceStatus::Overdue, ngn(1000), ngn(0)),
            InvoiceStatus::Overdue
        );
        assert_eq!(
            derive_status(InvoiceStatus::Overdue, ngn(1000), ngn(400)),
            InvoiceStatus::Partial
        );
    }
}
