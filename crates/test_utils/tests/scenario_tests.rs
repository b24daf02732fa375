//! Cross-domain scenario tests
//!
//! Verify the end-to-end money flows at the domain level: invoice
//! construction feeds claims, claim settlement feeds payments, completed
//! payments feed payouts, and the loyalty ledger runs alongside.

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_billing::invoice::{InvoiceStatus, ServiceCategory};
use domain_billing::payment::{Payment, PaymentMethod};
use domain_billing::receipt::Receipt;
use domain_billing::settlement;
use domain_claims::claim::ClaimStatus;
use domain_loyalty::account::{LoyaltyAccount, Tier};
use domain_loyalty::ledger;
use domain_loyalty::transaction::LoyaltyTransaction;
use domain_payout::calculator;
use domain_payout::payout::{OwnerPayout, PayoutPeriod, PayoutStatus};

use test_utils::assertions::*;
use test_utils::builders::*;
use test_utils::fixtures::*;

fn ngn(minor: i64) -> Money {
    Money::from_minor(minor, Currency::NGN)
}

mod billing_to_claims {
    use super::*;

    /// The canonical encounter: ₦10,000 subtotal, 7.5% tax, 80% coverage,
    /// claim approved at ₦7,000 and settled, patient pays the remainder.
    #[test]
    fn test_partial_claim_settlement_workflow() {
        // 1. Invoice: total ₦10,750; insurer ₦8,600; patient ₦2,150
        let invoice = TestInvoiceBuilder::new().with_coverage(dec!(80)).build();
        assert_invoice_balances(&invoice);
        assert_eq!(invoice.total_amount, MoneyFixtures::ngn_10_750());
        assert_eq!(invoice.insurer_share, MoneyFixtures::ngn_8_600());
        assert_eq!(invoice.patient_share, Money::from_major(2_150, Currency::NGN));

        // 2. Claim for the insurer share, approved at ₦7,000
        let mut claim = TestClaimBuilder::new().for_invoice(&invoice).build_processing();
        claim.approve(Money::from_major(7_000, Currency::NGN)).unwrap();
        assert_eq!(
            claim.approval_gap(),
            Some(Money::from_major(1_600, Currency::NGN))
        );

        // 3. Settlement creates an insurance payment for the approved amount
        let approved = claim
            .mark_paid(StringFixtures::remittance_reference())
            .unwrap();
        let insurer_payment = Payment::completed(
            invoice.id,
            approved,
            PaymentMethod::Insurance,
            Some(StringFixtures::remittance_reference().to_string()),
        );
        let receipt = Receipt::for_payment(&insurer_payment);
        assert_eq!(receipt.amount, Money::from_major(7_000, Currency::NGN));

        // 4. Invoice is partial: ₦7,000 of ₦10,750 paid
        let mut payments = vec![insurer_payment];
        let completed =
            settlement::completed_total(&payments, Money::zero(Currency::NGN)).unwrap();
        let status =
            settlement::derive_status(invoice.status, invoice.total_amount, completed);
        assert_eq!(status, InvoiceStatus::Partial);
        assert_eq!(
            invoice.balance_due(completed).unwrap(),
            Money::from_major(3_750, Currency::NGN)
        );

        // 5. Patient settles the remaining ₦3,750
        payments.push(Payment::completed(
            invoice.id,
            Money::from_major(3_750, Currency::NGN),
            PaymentMethod::Card,
            Some(StringFixtures::payment_reference().to_string()),
        ));
        let completed =
            settlement::completed_total(&payments, Money::zero(Currency::NGN)).unwrap();
        let status = settlement::derive_status(status, invoice.total_amount, completed);
        assert_eq!(status, InvoiceStatus::Paid);
        assert_eq!(claim.status, ClaimStatus::Paid);
    }

    #[test]
    fn test_denied_claim_leaves_whole_total_on_the_patient() {
        let invoice = TestInvoiceBuilder::new().with_coverage(dec!(80)).build();
        let mut claim = TestClaimBuilder::new().for_invoice(&invoice).build_processing();
        claim.deny("Policy lapsed").unwrap();

        // nothing was paid; patient share plus the denied insurer share is
        // still the full total
        assert_money_sum_equals(
            &[invoice.insurer_share, invoice.patient_share],
            &invoice.total_amount,
        );
        assert!(claim.status.is_terminal());
    }

    #[test]
    fn test_cumulative_payments_never_exceed_total() {
        let invoice = TestInvoiceBuilder::new().build();
        let total = invoice.total_amount;

        // apply payments one by one, re-validating against fresh sums
        let mut completed = Money::zero(Currency::NGN);
        for amount in [ngn(500_000), ngn(500_000), ngn(75_000)] {
            settlement::validate_payment(InvoiceStatus::Partial, total, completed, amount)
                .unwrap();
            completed = completed.checked_add(&amount).unwrap();
        }
        assert_eq!(completed, total);

        // one more kobo must be refused
        let result =
            settlement::validate_payment(InvoiceStatus::Partial, total, completed, ngn(1));
        assert!(result.is_err());
    }
}

mod payments_to_payouts {
    use super::*;

    #[test]
    fn test_collected_revenue_flows_into_payout() {
        let contract = TestContractBuilder::new()
            .with_share(dec!(20))
            .with_guarantee(MoneyFixtures::ngn_zero())
            .build();

        // two settled invoices worth ₦21,500 of collected revenue
        let gross = MoneyFixtures::ngn_10_750()
            .checked_add(&MoneyFixtures::ngn_10_750())
            .unwrap();
        let computation = calculator::compute(gross, &contract).unwrap();
        assert_eq!(
            computation.calculated_amount,
            Money::from_major(4_300, Currency::NGN)
        );
        assert_eq!(computation.final_amount, computation.calculated_amount);

        let period = PayoutPeriod::month(2025, 3).unwrap();
        let mut payout = OwnerPayout::from_computation(
            contract.owner_id,
            contract.hospital_id,
            contract.id,
            period,
            computation,
        );
        assert_eq!(payout.status, PayoutStatus::Pending);

        // single human approval gates disbursement
        payout.approve("finance-admin-1").unwrap();
        payout.mark_paid("TRF-1001").unwrap();
        assert_eq!(payout.status, PayoutStatus::Paid);
    }

    #[test]
    fn test_guarantee_applies_in_a_quiet_month() {
        let contract = TestContractBuilder::new()
            .with_share(dec!(20))
            .with_guarantee(MoneyFixtures::minimum_guarantee())
            .build();

        let computation = calculator::compute(MoneyFixtures::ngn_zero(), &contract).unwrap();
        assert_eq!(computation.final_amount, MoneyFixtures::minimum_guarantee());
    }
}

mod loyalty_flows {
    use super::*;

    #[test]
    fn test_award_and_redeem_keeps_ledger_reconciled() {
        let patient = IdFixtures::patient_id();
        let hospital = IdFixtures::hospital_id();
        let mut account = LoyaltyAccount::open(patient, hospital);
        let mut log: Vec<LoyaltyTransaction> = Vec::new();

        // bookings and feedback accrue points
        for points in [800, 700, 600] {
            ledger::apply_accrual(&mut account, points).unwrap();
            log.push(LoyaltyTransaction::earned(
                patient,
                hospital,
                points,
                Some(StringFixtures::accrual_reason().to_string()),
            ));
        }
        assert_eq!(account.tier, Tier::Silver);

        // redeem a reward
        let reward = TestRewardBuilder::new()
            .with_hospital(hospital)
            .with_points_required(400)
            .build();
        let today = Utc::now().date_naive();
        reward.validate_redeemable(today).unwrap();
        ledger::apply_redemption(&mut account, reward.points_required).unwrap();
        log.push(LoyaltyTransaction::redeemed(
            patient,
            hospital,
            reward.points_required,
            None,
        ));

        assert_eq!(account.points_balance, 1_700);
        assert_eq!(account.lifetime_points, 2_100);
        assert_ledger_reconciles(account.points_balance, &log);
    }

    #[test]
    fn test_invoice_settlement_can_trigger_tier_upgrade() {
        // settling a large invoice awards one point per ₦100 spent
        let invoice = TestInvoiceBuilder::new()
            .with_items(vec![(
                "Surgery package".to_string(),
                ServiceCategory::Procedure,
                1,
                Money::from_major(200_000, Currency::NGN),
            )])
            .build();

        let points = invoice.total_amount.minor_units() / 10_000;
        let mut account = LoyaltyAccount::open(invoice.patient_id, invoice.hospital_id);
        let change = ledger::apply_accrual(&mut account, points).unwrap().unwrap();

        assert_eq!(change.from, Tier::Bronze);
        assert_eq!(change.to, Tier::Silver);
        assert_eq!(account.lifetime_points, 2_150);
    }
}
