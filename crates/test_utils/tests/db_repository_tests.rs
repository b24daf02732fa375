//! Repository integration tests
//!
//! These tests exercise the transactional units of work against a real
//! PostgreSQL instance in a container. They need a local Docker daemon, so
//! every test is `#[ignore]`; run them with `cargo test -- --ignored`.

use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, Timezone};
use domain_billing::invoice::InvoiceStatus;
use domain_billing::payment::PaymentMethod;
use domain_claims::claim::{ClaimStatus, InsuranceClaim};
use domain_loyalty::error::LoyaltyError;
use domain_payout::calculator::PayoutOutcome;
use domain_payout::payout::{PayoutPeriod, PayoutStatus};

use infra_db::{
    ClaimProcessError, ClaimRepository, DatabaseError, InvoiceRepository, LoyaltyProcessError,
    LoyaltyRepository, PaymentProcessError, PaymentRepository, PayoutRepository,
};
use test_utils::builders::*;
use test_utils::database::get_shared_test_database;
use test_utils::fixtures::*;

fn claim_for(invoice: &domain_billing::invoice::Invoice) -> InsuranceClaim {
    TestClaimBuilder::new().for_invoice(invoice).build()
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn invoice_round_trip_with_auto_claim() {
    let db = get_shared_test_database().await;
    let invoices = InvoiceRepository::new(db.pool().clone());

    let invoice = TestInvoiceBuilder::new().with_coverage(dec!(80)).build();
    let claim = claim_for(&invoice);
    invoices.create_with_claim(&invoice, Some(&claim)).await.unwrap();

    let loaded = invoices.fetch(invoice.id).await.unwrap();
    assert_eq!(loaded.total_amount, invoice.total_amount);
    assert_eq!(loaded.insurer_share, invoice.insurer_share);
    assert_eq!(loaded.items.len(), invoice.items.len());
    assert_eq!(loaded.status, InvoiceStatus::Pending);

    let stored_claim = ClaimRepository::new(db.pool().clone())
        .fetch(claim.id)
        .await
        .unwrap();
    assert_eq!(stored_claim.claim_amount, invoice.insurer_share);
    assert_eq!(stored_claim.status, ClaimStatus::Submitted);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn payment_application_enforces_the_total() {
    let db = get_shared_test_database().await;
    let invoices = InvoiceRepository::new(db.pool().clone());
    let payments = PaymentRepository::new(db.pool().clone());

    let invoice = TestInvoiceBuilder::new().build();
    invoices.create_with_claim(&invoice, None).await.unwrap();
    let total = invoice.total_amount.minor_units();

    // partial payment
    let applied = payments
        .apply_payment(invoice.id, total / 2, PaymentMethod::Card, None)
        .await
        .unwrap();
    assert_eq!(applied.new_status, InvoiceStatus::Partial);
    assert!(applied.receipt.receipt_number.starts_with("RCT-"));

    // overpayment is rejected against the freshly read sum
    let err = payments
        .apply_payment(invoice.id, total, PaymentMethod::Card, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentProcessError::Billing(_)));

    // exact remainder settles the invoice
    let applied = payments
        .apply_payment(invoice.id, total - total / 2, PaymentMethod::Cash, None)
        .await
        .unwrap();
    assert_eq!(applied.new_status, InvoiceStatus::Paid);

    let stored = payments.list_for_invoice(invoice.id).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn claim_settlement_reuses_the_payment_path() {
    let db = get_shared_test_database().await;
    let invoices = InvoiceRepository::new(db.pool().clone());
    let claims = ClaimRepository::new(db.pool().clone());

    let invoice = TestInvoiceBuilder::new().with_coverage(dec!(80)).build();
    let claim = claim_for(&invoice);
    invoices.create_with_claim(&invoice, Some(&claim)).await.unwrap();

    claims.begin_processing(claim.id, None).await.unwrap();
    let (approved, gap) = claims.approve(claim.id, 700_000, None).await.unwrap();
    assert_eq!(approved.status, ClaimStatus::Approved);
    assert!(gap.is_some());

    let settlement = claims
        .pay(claim.id, StringFixtures::remittance_reference().to_string(), None)
        .await
        .unwrap();
    assert_eq!(settlement.claim.status, ClaimStatus::Paid);
    assert_eq!(settlement.payment.payment.method, PaymentMethod::Insurance);
    assert_eq!(settlement.payment.new_status, InvoiceStatus::Partial);

    // settling again must conflict, never double-pay
    let err = claims
        .pay(claim.id, StringFixtures::remittance_reference().to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimProcessError::Claim(_)));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn process_period_is_idempotent() {
    let db = get_shared_test_database().await;
    let invoices = InvoiceRepository::new(db.pool().clone());
    let payments = PaymentRepository::new(db.pool().clone());
    let payouts = PayoutRepository::new(db.pool().clone(), Timezone::default());

    let contract = TestContractBuilder::new()
        .with_share(dec!(20))
        .with_guarantee(Money::zero(Currency::NGN))
        .build();
    payouts.create_contract(&contract).await.unwrap();

    // revenue inside the period
    let invoice = TestInvoiceBuilder::new()
        .with_hospital(contract.hospital_id)
        .build();
    invoices.create_with_claim(&invoice, None).await.unwrap();
    payments
        .apply_payment(
            invoice.id,
            invoice.total_amount.minor_units(),
            PaymentMethod::BankTransfer,
            None,
        )
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let period = PayoutPeriod::month(today.year(), today.month()).unwrap();

    let first = payouts.process_period(contract.owner_id, period).await.unwrap();
    let payout_id = match first {
        PayoutOutcome::Created {
            payout_id,
            final_amount_minor,
            ..
        } => {
            // 20% of the collected ₦10,750
            assert_eq!(final_amount_minor, 215_000);
            payout_id
        }
        other => panic!("Expected Created, got {:?}", other),
    };

    // second run is a no-op, not an error and not a duplicate
    let second = payouts.process_period(contract.owner_id, period).await.unwrap();
    assert!(matches!(second, PayoutOutcome::SkippedDuplicate { .. }));

    // approval workflow gates disbursement
    let approved = payouts
        .approve(payout_id, "finance-admin-1".to_string())
        .await
        .unwrap();
    assert_eq!(approved.status, PayoutStatus::Approved);
    let paid = payouts
        .mark_paid(payout_id, "TRF-9".to_string())
        .await
        .unwrap();
    assert_eq!(paid.status, PayoutStatus::Paid);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn missing_contract_is_a_hard_error() {
    let db = get_shared_test_database().await;
    let payouts = PayoutRepository::new(db.pool().clone(), Timezone::default());

    let period = PayoutPeriod::month(2025, 3).unwrap();
    let err = payouts
        .process_period(core_kernel::OwnerId::new(), period)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No active contract"));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn loyalty_award_and_redeem_reconcile() {
    let db = get_shared_test_database().await;
    let loyalty = LoyaltyRepository::new(db.pool().clone());

    let patient = core_kernel::PatientId::new();
    let reward = TestRewardBuilder::new().with_points_required(400).build();
    loyalty.create_reward(&reward).await.unwrap();

    let outcome = loyalty
        .award_points(patient, reward.hospital_id, 2_000, None)
        .await
        .unwrap();
    assert_eq!(outcome.account.points_balance, 2_000);
    assert!(outcome.tier_change.is_some());

    let redemption = loyalty.redeem_points(patient, reward.id).await.unwrap();
    assert_eq!(redemption.account.points_balance, 1_600);
    assert!(redemption.redemption.redemption_code.starts_with("RDM-"));

    assert!(loyalty
        .reconcile_account(patient, reward.hospital_id)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn concurrent_redemptions_cannot_double_spend() {
    let db = get_shared_test_database().await;
    let loyalty = LoyaltyRepository::new(db.pool().clone());

    let patient = core_kernel::PatientId::new();
    let reward = TestRewardBuilder::new().with_points_required(60).build();
    loyalty.create_reward(&reward).await.unwrap();
    loyalty
        .award_points(patient, reward.hospital_id, 100, None)
        .await
        .unwrap();

    // Two concurrent redemptions of 60 points against a 100-point balance.
    let (a, b) = tokio::join!(
        loyalty.redeem_points(patient, reward.id),
        loyalty.redeem_points(patient, reward.id),
    );

    let mut successes = 0;
    for result in [a, b] {
        match result {
            Ok(_) => successes += 1,
            // the loser either saw the debited balance...
            Err(LoyaltyProcessError::Loyalty(LoyaltyError::InsufficientPoints {
                required: 60,
                balance: 40,
            })) => {}
            // ...or was denied the row lock; retrying hits the balance check
            Err(LoyaltyProcessError::Database(DatabaseError::LockContention(_))) => {
                let retry = loyalty.redeem_points(patient, reward.id).await;
                assert!(matches!(
                    retry,
                    Err(LoyaltyProcessError::Loyalty(
                        LoyaltyError::InsufficientPoints { .. }
                    ))
                ));
            }
            Err(other) => panic!("Unexpected failure: {:?}", other),
        }
    }
    assert_eq!(successes, 1, "exactly one redemption must win");

    let account = loyalty.account(patient, reward.hospital_id).await.unwrap();
    assert_eq!(account.points_balance, 40);
    assert!(loyalty
        .reconcile_account(patient, reward.hospital_id)
        .await
        .unwrap());
}
