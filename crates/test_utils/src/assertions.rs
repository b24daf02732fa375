//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types with meaningful failure
//! messages.

use core_kernel::Money;
use domain_billing::invoice::Invoice;
use domain_loyalty::ledger;
use domain_loyalty::transaction::LoyaltyTransaction;

/// Asserts that two Money values differ by at most `tolerance_minor` units
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance_minor: i64) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.minor_units() - expected.minor_units()).abs();
    assert!(
        diff <= tolerance_minor,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={} minor units",
        actual,
        expected,
        diff
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that money values sum to a total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts.iter().fold(Money::zero(total.currency()), |acc, m| {
        acc.checked_add(m).expect("Currency mismatch in sum")
    });

    assert_eq!(
        sum.minor_units(),
        total.minor_units(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum,
        total
    );
}

/// Asserts both invoice balance identities:
/// `total = subtotal + tax - discount` and
/// `insurer share + patient share = total`
pub fn assert_invoice_balances(invoice: &Invoice) {
    let recomputed = invoice
        .subtotal
        .checked_add(&invoice.tax_amount)
        .and_then(|m| m.checked_sub(&invoice.discount_amount))
        .expect("Invoice money fields share a currency");
    assert_money_approx_eq(&invoice.total_amount, &recomputed, 1);

    let split = invoice
        .insurer_share
        .checked_add(&invoice.patient_share)
        .expect("Invoice shares share a currency");
    assert_money_approx_eq(&split, &invoice.total_amount, 1);
}

/// Asserts the loyalty ledger reconciliation rule
pub fn assert_ledger_reconciles(points_balance: i64, transactions: &[LoyaltyTransaction]) {
    assert!(
        ledger::reconcile(points_balance, transactions),
        "Ledger does not reconcile: balance={}, transaction sum={}",
        points_balance,
        transactions.iter().map(|t| t.points).sum::<i64>()
    );
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TestInvoiceBuilder;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assert_money_approx_eq_passes_within_tolerance() {
        let a = Money::from_minor(1000, Currency::NGN);
        let b = Money::from_minor(1001, Currency::NGN);
        assert_money_approx_eq(&a, &b, 1);
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_assert_money_approx_eq_currency_mismatch() {
        let a = Money::from_minor(1000, Currency::NGN);
        let b = Money::from_minor(1000, Currency::USD);
        assert_money_approx_eq(&a, &b, 1);
    }

    #[test]
    fn test_assert_invoice_balances_on_split_invoice() {
        let invoice = TestInvoiceBuilder::new()
            .with_coverage(dec!(33.33))
            .with_discount(dec!(10))
            .build();
        assert_invoice_balances(&invoice);
    }

    #[test]
    fn test_assert_money_sum_equals() {
        let parts = vec![
            Money::from_minor(3334, Currency::NGN),
            Money::from_minor(3333, Currency::NGN),
            Money::from_minor(3333, Currency::NGN),
        ];
        let total = Money::from_minor(10_000, Currency::NGN);
        assert_money_sum_equals(&parts, &total);
    }
}
