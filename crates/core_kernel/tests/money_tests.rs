//! Money type tests

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

#[test]
fn from_minor_and_amount_round_trip() {
    let m = Money::from_minor(1_075_000, Currency::NGN);
    assert_eq!(m.amount(), dec!(10750.00));
    assert_eq!(m.minor_units(), 1_075_000);
}

#[test]
fn zero_is_neither_positive_nor_negative() {
    let zero = Money::zero(Currency::NGN);
    assert!(zero.is_zero());
    assert!(!zero.is_positive());
    assert!(!zero.is_negative());
}

#[test]
fn checked_mul_scales_by_quantity() {
    let unit_price = Money::from_minor(250_000, Currency::NGN);
    let line_total = unit_price.checked_mul(4).unwrap();
    assert_eq!(line_total.minor_units(), 1_000_000);
}

#[test]
fn checked_mul_detects_overflow() {
    let m = Money::from_minor(i64::MAX, Currency::NGN);
    assert_eq!(m.checked_mul(2), Err(MoneyError::Overflow));
}

#[test]
fn tax_discount_and_split_scenario() {
    // Invoice scenario: subtotal ₦10,000, tax 7.5%, no discount, coverage 80%
    let subtotal = Money::from_major(10_000, Currency::NGN);
    let tax = subtotal.percentage(dec!(7.5)).unwrap();
    let total = subtotal.checked_add(&tax).unwrap();

    assert_eq!(total, Money::from_major(10_750, Currency::NGN));

    let (insurer_share, patient_share) = total.split_percentage(dec!(80)).unwrap();
    assert_eq!(insurer_share, Money::from_major(8_600, Currency::NGN));
    assert_eq!(patient_share, Money::from_major(2_150, Currency::NGN));
}

#[test]
fn split_with_odd_minor_units_never_loses_a_unit() {
    // 33.33% of 1001 kobo rounds; the remainder absorbs the difference
    let total = Money::from_minor(1001, Currency::NGN);
    let (share, remainder) = total.split_percentage(dec!(33.33)).unwrap();
    assert_eq!(share.minor_units() + remainder.minor_units(), 1001);
}

#[test]
fn rate_percentage_round_trip() {
    let rate = Rate::from_percentage(dec!(7.5));
    assert_eq!(rate.as_decimal(), dec!(0.075));
    assert_eq!(rate.as_percentage(), dec!(7.5));
}

#[test]
fn negative_amounts_behave_symmetrically() {
    let debit = -Money::from_minor(500, Currency::NGN);
    assert!(debit.is_negative());
    assert_eq!(debit.abs().minor_units(), 500);
}
