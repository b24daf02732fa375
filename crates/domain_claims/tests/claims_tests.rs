//! Comprehensive tests for domain_claims

use core_kernel::{ClaimId, Currency, InvoiceId, Money, PatientId};

use domain_claims::claim::{ClaimStatus, InsuranceClaim};
use domain_claims::error::ClaimError;
use domain_claims::lifecycle::{ReconciliationGap, StatusChange};

fn ngn(minor: i64) -> Money {
    Money::from_minor(minor, Currency::NGN)
}

fn submitted_claim(amount_minor: i64) -> InsuranceClaim {
    InsuranceClaim::submit(
        InvoiceId::new(),
        PatientId::new(),
        "Sterling HMO",
        "PLC-91-0042",
        ngn(amount_minor),
    )
    .unwrap()
}

// ============================================================================
// State Machine Tests
// ============================================================================

mod state_machine {
    use super::*;

    #[test]
    fn test_happy_path_to_paid() {
        let mut claim = submitted_claim(860_000);
        assert_eq!(claim.status, ClaimStatus::Submitted);

        claim.begin_processing().unwrap();
        assert_eq!(claim.status, ClaimStatus::Processing);

        claim.approve(ngn(860_000)).unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);

        let paid = claim.mark_paid("REM-778").unwrap();
        assert_eq!(paid, ngn(860_000));
        assert_eq!(claim.status, ClaimStatus::Paid);
        assert!(claim.payment_date.is_some());
        assert_eq!(claim.payment_reference.as_deref(), Some("REM-778"));
    }

    #[test]
    fn test_denial_is_terminal() {
        let mut claim = submitted_claim(500_000);
        claim.begin_processing().unwrap();
        claim.deny("Policy lapsed").unwrap();

        assert_eq!(claim.status, ClaimStatus::Denied);
        assert!(claim.status.is_terminal());
        assert!(claim.begin_processing().is_err());
        assert!(claim.approve(ngn(100)).is_err());
        assert!(claim.mark_paid("X").is_err());
    }

    #[test]
    fn test_paid_is_terminal() {
        let mut claim = submitted_claim(500_000);
        claim.begin_processing().unwrap();
        claim.approve(ngn(500_000)).unwrap();
        claim.mark_paid("REM-1").unwrap();

        assert!(claim.status.is_terminal());
        let err = claim.mark_paid("REM-1").unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_cannot_approve_without_processing() {
        let mut claim = submitted_claim(500_000);
        let err = claim.approve(ngn(100_000)).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_cannot_pay_unapproved_claim() {
        let mut claim = submitted_claim(500_000);
        claim.begin_processing().unwrap();
        // denied claim cannot be paid
        claim.deny("Excluded procedure").unwrap();
        assert!(claim.mark_paid("REM-2").is_err());
    }

    #[test]
    fn test_transitions_are_one_directional() {
        let mut claim = submitted_claim(500_000);
        claim.begin_processing().unwrap();
        claim.approve(ngn(500_000)).unwrap();

        // no way back to processing
        let err = claim.begin_processing().unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStatusTransition { .. }));
    }
}

// ============================================================================
// Adjudication Tests
// ============================================================================

mod adjudication {
    use super::*;

    #[test]
    fn test_submit_requires_positive_amount() {
        let result = InsuranceClaim::submit(
            InvoiceId::new(),
            PatientId::new(),
            "HMO",
            "P-1",
            ngn(0),
        );
        assert!(matches!(result, Err(ClaimError::NonPositiveAmount)));
    }

    #[test]
    fn test_partial_approval_records_gap() {
        // claim ₦8,600 approved at ₦7,000 leaves a ₦1,600 gap
        let mut claim = submitted_claim(860_000);
        claim.begin_processing().unwrap();
        claim.approve(ngn(700_000)).unwrap();

        assert_eq!(claim.approval_gap(), Some(ngn(160_000)));

        let gap = ReconciliationGap::from_claim(&claim).unwrap();
        assert_eq!(gap.claim_id, claim.id);
        assert_eq!(gap.invoice_id, claim.invoice_id);
        assert_eq!(gap.gap, ngn(160_000));
    }

    #[test]
    fn test_full_approval_has_no_gap() {
        let mut claim = submitted_claim(860_000);
        claim.begin_processing().unwrap();
        claim.approve(ngn(860_000)).unwrap();

        assert_eq!(claim.approval_gap(), None);
        assert!(ReconciliationGap::from_claim(&claim).is_none());
    }

    #[test]
    fn test_approval_cannot_exceed_claim_amount() {
        let mut claim = submitted_claim(860_000);
        claim.begin_processing().unwrap();

        let err = claim.approve(ngn(860_001)).unwrap_err();
        assert!(matches!(err, ClaimError::ApprovedAmountExceedsClaim { .. }));
        // the failed approval must not advance the status
        assert_eq!(claim.status, ClaimStatus::Processing);
    }

    #[test]
    fn test_partial_approval_still_progresses_to_paid() {
        let mut claim = submitted_claim(860_000);
        claim.begin_processing().unwrap();
        claim.approve(ngn(700_000)).unwrap();

        let paid = claim.mark_paid("REM-9").unwrap();
        assert_eq!(paid, ngn(700_000));
        assert_eq!(claim.status, ClaimStatus::Paid);
        // the gap survives settlement for manual reconciliation
        assert_eq!(claim.approval_gap(), Some(ngn(160_000)));
    }
}

// ============================================================================
// History Tests
// ============================================================================

mod history {
    use super::*;

    #[test]
    fn test_status_change_record() {
        let claim_id = ClaimId::new();
        let change = StatusChange::record(
            claim_id,
            Some(ClaimStatus::Processing),
            ClaimStatus::Denied,
            Some("Policy lapsed".to_string()),
            Some("adjudicator-7".to_string()),
        );

        assert_eq!(change.claim_id, claim_id);
        assert_eq!(change.from, Some(ClaimStatus::Processing));
        assert_eq!(change.to, ClaimStatus::Denied);
    }

    #[test]
    fn test_resubmission_is_a_new_claim() {
        let invoice_id = InvoiceId::new();
        let patient_id = PatientId::new();

        let mut first =
            InsuranceClaim::submit(invoice_id, patient_id, "HMO", "P-1", ngn(500_000)).unwrap();
        first.begin_processing().unwrap();
        first.deny("Missing documentation").unwrap();

        let second =
            InsuranceClaim::submit(invoice_id, patient_id, "HMO", "P-1", ngn(500_000)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.status, ClaimStatus::Submitted);
        // denied attempt retains its audit trail
        assert_eq!(first.denial_reason.as_deref(), Some("Missing documentation"));
    }
}
