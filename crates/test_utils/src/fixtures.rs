//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities. Fixtures are consistent and
//! predictable so unit tests can assert exact values.

use chrono::NaiveDate;
use core_kernel::{
    ClaimId, Currency, DateRange, HospitalId, InvoiceId, Money, OwnerId, PatientId, RewardId,
};
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// ₦10,000.00 — the standard encounter subtotal
    pub fn ngn_10_000() -> Money {
        Money::from_major(10_000, Currency::NGN)
    }

    /// ₦10,750.00 — the subtotal above after 7.5% tax
    pub fn ngn_10_750() -> Money {
        Money::from_major(10_750, Currency::NGN)
    }

    /// ₦8,600.00 — the insurer share at 80% coverage
    pub fn ngn_8_600() -> Money {
        Money::from_major(8_600, Currency::NGN)
    }

    /// A consultation fee
    pub fn consultation_fee() -> Money {
        Money::from_minor(500_000, Currency::NGN)
    }

    /// A minimum guarantee for contracts
    pub fn minimum_guarantee() -> Money {
        Money::from_minor(25_000_000, Currency::NGN)
    }

    /// Zero naira
    pub fn ngn_zero() -> Money {
        Money::zero(Currency::NGN)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::from_major(100, Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// First day of the standard settlement month (March 2025)
    pub fn period_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    /// Day after the standard settlement month ends
    pub fn period_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    /// A date inside the standard settlement month
    pub fn mid_period() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    /// Contract validity window covering 2025
    pub fn contract_year() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap()
    }

    /// Reward validity window that is comfortably open
    pub fn open_reward_window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        )
        .unwrap()
    }

    /// A due date in the past, for overdue tests
    pub fn past_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic invoice ID for testing
    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic claim ID for testing
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic patient ID for testing
    pub fn patient_id() -> PatientId {
        PatientId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic hospital ID for testing
    pub fn hospital_id() -> HospitalId {
        HospitalId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic owner ID for testing
    pub fn owner_id() -> OwnerId {
        OwnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }

    /// Creates a deterministic reward ID for testing
    pub fn reward_id() -> RewardId {
        RewardId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440006").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard insurer/HMO provider name
    pub fn provider() -> &'static str {
        "Sterling HMO"
    }

    /// Standard policy number
    pub fn policy_number() -> &'static str {
        "PLC-91-0042"
    }

    /// Standard payment reference
    pub fn payment_reference() -> &'static str {
        "TXN-2025-000173"
    }

    /// Standard remittance reference for claim settlements
    pub fn remittance_reference() -> &'static str {
        "REM-2025-000044"
    }

    /// Standard reward name
    pub fn reward_name() -> &'static str {
        "Free follow-up consultation"
    }

    /// Standard accrual reason
    pub fn accrual_reason() -> &'static str {
        "completed_booking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_fixtures_are_consistent() {
        let subtotal = MoneyFixtures::ngn_10_000();
        let tax = subtotal.percentage(rust_decimal_macros::dec!(7.5)).unwrap();
        assert_eq!(
            subtotal.checked_add(&tax).unwrap(),
            MoneyFixtures::ngn_10_750()
        );
    }

    #[test]
    fn test_temporal_fixtures_ordering() {
        assert!(TemporalFixtures::period_start() < TemporalFixtures::mid_period());
        assert!(TemporalFixtures::mid_period() < TemporalFixtures::period_end());
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::invoice_id(), IdFixtures::invoice_id());
        assert_eq!(IdFixtures::patient_id(), IdFixtures::patient_id());
    }
}
