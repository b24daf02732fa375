//! Property-Based Test Generators
//!
//! Proptest strategies for generating random test data that maintains
//! domain invariants.

use chrono::NaiveDate;
use core_kernel::{ClaimId, Currency, HospitalId, InvoiceId, Money, PatientId};
use domain_billing::invoice::ServiceCategory;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::NGN),
        Just(Currency::USD),
        Just(Currency::GBP),
        Just(Currency::EUR),
        Just(Currency::GHS),
        Just(Currency::KES),
        Just(Currency::ZAR),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive NGN Money values
pub fn ngn_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::NGN))
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(minor, currency)| Money::from_minor(minor, currency))
}

/// Strategy for generating percentages within [0, 100] at 2dp
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10_000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

/// Strategy for generating line-item quantities
pub fn quantity_strategy() -> impl Strategy<Value = i64> {
    1i64..100i64
}

/// Strategy for generating service categories
pub fn category_strategy() -> impl Strategy<Value = ServiceCategory> {
    prop_oneof![
        Just(ServiceCategory::Consultation),
        Just(ServiceCategory::Procedure),
        Just(ServiceCategory::Laboratory),
        Just(ServiceCategory::Imaging),
        Just(ServiceCategory::Pharmacy),
        Just(ServiceCategory::Admission),
        Just(ServiceCategory::Other),
    ]
}

/// Strategy for generating a line item (description, category, quantity,
/// unit price) tuple in NGN
pub fn line_item_strategy() -> impl Strategy<Value = (String, ServiceCategory, i64, Money)> {
    (
        "[A-Za-z ]{3,40}",
        category_strategy(),
        quantity_strategy(),
        (1i64..10_000_000i64).prop_map(|m| Money::from_minor(m, Currency::NGN)),
    )
}

/// Strategy for generating loyalty point accruals
pub fn points_strategy() -> impl Strategy<Value = i64> {
    1i64..20_000i64
}

/// Strategy for generating dates inside 2025
pub fn date_2025_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u32..365u32).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(offset as u64)
    })
}

/// Strategy for generating InvoiceId
pub fn invoice_id_strategy() -> impl Strategy<Value = InvoiceId> {
    any::<[u8; 16]>().prop_map(|bytes| InvoiceId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating ClaimId
pub fn claim_id_strategy() -> impl Strategy<Value = ClaimId> {
    any::<[u8; 16]>().prop_map(|bytes| ClaimId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating PatientId
pub fn patient_id_strategy() -> impl Strategy<Value = PatientId> {
    any::<[u8; 16]>().prop_map(|bytes| PatientId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating HospitalId
pub fn hospital_id_strategy() -> impl Strategy<Value = HospitalId> {
    any::<[u8; 16]>().prop_map(|bytes| HospitalId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}
