//! Comprehensive tests for domain_payout

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DateRange, HospitalId, Money, OwnerId, PayoutId};

use domain_payout::calculator::{self, PayoutOutcome, PayoutRunReport};
use domain_payout::contract::{ContractStatus, OwnerContract};
use domain_payout::error::PayoutError;
use domain_payout::payout::{ApprovalTask, OwnerPayout, PayoutPeriod, PayoutStatus, TaskStatus};

fn ngn(minor: i64) -> Money {
    Money::from_minor(minor, Currency::NGN)
}

fn year_2025() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    )
    .unwrap()
}

fn active_contract(share: rust_decimal::Decimal, guarantee_minor: i64) -> OwnerContract {
    OwnerContract::new(
        HospitalId::new(),
        OwnerId::new(),
        share,
        ngn(guarantee_minor),
        year_2025(),
        ContractStatus::Active,
    )
    .unwrap()
}

// ============================================================================
// Period Tests
// ============================================================================

mod period_tests {
    use super::*;

    #[test]
    fn test_month_constructor() {
        let march = PayoutPeriod::month(2025, 3).unwrap();
        assert_eq!(march.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(march.end, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert!(march.is_calendar_month());
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let december = PayoutPeriod::month(2025, 12).unwrap();
        assert_eq!(december.end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_period_is_half_open() {
        let march = PayoutPeriod::month(2025, 3).unwrap();
        assert!(march.contains(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        assert!(march.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
        assert!(!march.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
    }

    #[test]
    fn test_adjacent_months_do_not_overlap() {
        let march = PayoutPeriod::month(2025, 3).unwrap();
        let april = PayoutPeriod::month(2025, 4).unwrap();
        assert!(!march.overlaps(&april));
    }

    #[test]
    fn test_inverted_period_rejected() {
        let result = PayoutPeriod::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        assert!(matches!(result, Err(PayoutError::InvalidPeriod { .. })));
    }
}

// ============================================================================
// Contract Tests
// ============================================================================

mod contract_tests {
    use super::*;

    #[test]
    fn test_share_out_of_range_rejected() {
        let result = OwnerContract::new(
            HospitalId::new(),
            OwnerId::new(),
            dec!(120),
            ngn(0),
            year_2025(),
            ContractStatus::Active,
        );
        assert!(matches!(result, Err(PayoutError::ShareOutOfRange(_))));
    }

    #[test]
    fn test_negative_guarantee_rejected() {
        let result = OwnerContract::new(
            HospitalId::new(),
            OwnerId::new(),
            dec!(20),
            ngn(-1),
            year_2025(),
            ContractStatus::Active,
        );
        assert!(matches!(result, Err(PayoutError::NegativeGuarantee)));
    }

    #[test]
    fn test_active_during_overlapping_period() {
        let contract = active_contract(dec!(20), 0);
        let march = PayoutPeriod::month(2025, 3).unwrap();
        assert!(contract.is_active_during(&march));

        let next_year = PayoutPeriod::month(2026, 3).unwrap();
        assert!(!contract.is_active_during(&next_year));
    }

    #[test]
    fn test_inactive_statuses_never_govern_a_period() {
        let march = PayoutPeriod::month(2025, 3).unwrap();
        for status in [
            ContractStatus::Draft,
            ContractStatus::Expired,
            ContractStatus::Terminated,
        ] {
            let mut contract = active_contract(dec!(20), 0);
            contract.status = status;
            assert!(!contract.is_active_during(&march));
        }
    }
}

// ============================================================================
// Calculator Tests
// ============================================================================

mod calculator_tests {
    use super::*;

    #[test]
    fn test_share_above_guarantee() {
        // 20% of ₦5,000,000 = ₦1,000,000 > guarantee ₦250,000
        let contract = active_contract(dec!(20), 25_000_000);
        let computation =
            calculator::compute(Money::from_major(5_000_000, Currency::NGN), &contract).unwrap();

        assert_eq!(
            computation.calculated_amount,
            Money::from_major(1_000_000, Currency::NGN)
        );
        assert_eq!(computation.final_amount, computation.calculated_amount);
    }

    #[test]
    fn test_guarantee_floors_low_revenue() {
        // 20% of ₦1,000 = ₦200 < guarantee ₦2,500
        let contract = active_contract(dec!(20), 250_000);
        let computation = calculator::compute(Money::from_major(1_000, Currency::NGN), &contract)
            .unwrap();

        assert_eq!(computation.calculated_amount, ngn(20_000));
        assert_eq!(computation.final_amount, ngn(250_000));
    }

    #[test]
    fn test_zero_revenue_pays_the_guarantee() {
        let contract = active_contract(dec!(20), 100_000);
        let computation = calculator::compute(ngn(0), &contract).unwrap();

        assert!(computation.calculated_amount.is_zero());
        assert_eq!(computation.final_amount, ngn(100_000));
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let contract = active_contract(dec!(20), 0);
        let result = calculator::compute(ngn(-1), &contract);
        assert!(matches!(result, Err(PayoutError::NegativeRevenue)));
    }

    #[test]
    fn test_run_report_counts() {
        let period = PayoutPeriod::month(2025, 3).unwrap();
        let mut report = PayoutRunReport::new(period);

        report.push(PayoutOutcome::Created {
            owner_id: OwnerId::new(),
            payout_id: PayoutId::new(),
            final_amount_minor: 100,
        });
        report.push(PayoutOutcome::SkippedDuplicate {
            owner_id: OwnerId::new(),
        });
        report.push(PayoutOutcome::Failed {
            owner_id: OwnerId::new(),
            reason: "no active contract".to_string(),
        });

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }
}

// ============================================================================
// Approval Workflow Tests
// ============================================================================

mod workflow_tests {
    use super::*;

    fn pending_payout() -> OwnerPayout {
        let contract = active_contract(dec!(20), 0);
        let period = PayoutPeriod::month(2025, 3).unwrap();
        let computation =
            calculator::compute(Money::from_major(1_000_000, Currency::NGN), &contract).unwrap();
        OwnerPayout::from_computation(
            contract.owner_id,
            contract.hospital_id,
            contract.id,
            period,
            computation,
        )
    }

    #[test]
    fn test_payout_lifecycle() {
        let mut payout = pending_payout();
        assert_eq!(payout.status, PayoutStatus::Pending);

        payout.approve("finance-admin-1").unwrap();
        assert_eq!(payout.status, PayoutStatus::Approved);
        assert!(payout.approved_at.is_some());

        payout.mark_paid("TRF-2291").unwrap();
        assert_eq!(payout.status, PayoutStatus::Paid);
        assert_eq!(payout.payment_reference.as_deref(), Some("TRF-2291"));
    }

    #[test]
    fn test_cannot_pay_before_approval() {
        let mut payout = pending_payout();
        let err = payout.mark_paid("TRF-1").unwrap_err();
        assert!(matches!(err, PayoutError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_cancel_only_from_pending() {
        let mut payout = pending_payout();
        payout.approve("finance-admin-1").unwrap();
        assert!(payout.cancel().is_err());
    }

    #[test]
    fn test_approval_task_completes_once() {
        let mut task = ApprovalTask::for_payout(PayoutId::new());
        assert_eq!(task.status, TaskStatus::Pending);

        task.complete("finance-admin-1").unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_by.as_deref(), Some("finance-admin-1"));

        let err = task.complete("finance-admin-2").unwrap_err();
        assert!(matches!(err, PayoutError::TaskNotPending));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod calculator_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn final_amount_never_below_guarantee_or_share(
            gross in 0i64..1_000_000_000i64,
            share in 0u32..=10_000u32,
            guarantee in 0i64..10_000_000i64
        ) {
            let contract = active_contract(
                rust_decimal::Decimal::new(share as i64, 2),
                guarantee,
            );
            let computation = calculator::compute(ngn(gross), &contract).unwrap();

            prop_assert!(computation.final_amount >= computation.calculated_amount);
            prop_assert!(computation.final_amount >= computation.minimum_guarantee);
            prop_assert!(
                computation.final_amount == computation.calculated_amount
                    || computation.final_amount == computation.minimum_guarantee
            );
        }
    }
}
