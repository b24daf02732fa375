//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, InvoiceId, Money, PatientId};

use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Sent to the insurer
    Submitted,
    /// Under adjudication by the insurer
    Processing,
    /// Approved for payment (possibly partially)
    Approved,
    /// Denied; terminal
    Denied,
    /// Settled against the invoice; terminal
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::Processing => "processing",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Paid => "paid",
        }
    }

    /// Returns true when no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Denied | ClaimStatus::Paid)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(ClaimStatus::Submitted),
            "processing" => Ok(ClaimStatus::Processing),
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            "paid" => Ok(ClaimStatus::Paid),
            other => Err(format!("Unknown claim status: {}", other)),
        }
    }
}

/// A claim against an insurer for the insurer share of an invoice
///
/// At most one active (non-denied) claim exists per invoice. Re-submission
/// after denial is a new claim with a new id; the denied attempt keeps its
/// full audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceClaim {
    /// Unique identifier
    pub id: ClaimId,
    /// Originating invoice
    pub invoice_id: InvoiceId,
    /// Patient the claim concerns
    pub patient_id: PatientId,
    /// Insurer identity (opaque to the core)
    pub provider: String,
    /// Policy number (opaque to the core)
    pub policy_number: String,
    /// Claimed amount (= invoice insurer share)
    pub claim_amount: Money,
    /// Amount approved by the insurer, once adjudicated
    pub approved_amount: Option<Money>,
    /// Denial reason, once denied
    pub denial_reason: Option<String>,
    /// Status
    pub status: ClaimStatus,
    /// When the claim was submitted
    pub submission_date: DateTime<Utc>,
    /// When the claim was settled
    pub payment_date: Option<DateTime<Utc>>,
    /// Settlement reference from the insurer
    pub payment_reference: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl InsuranceClaim {
    /// Submits a new claim for the insurer share of an invoice
    pub fn submit(
        invoice_id: InvoiceId,
        patient_id: PatientId,
        provider: impl Into<String>,
        policy_number: impl Into<String>,
        claim_amount: Money,
    ) -> Result<Self, ClaimError> {
        if !claim_amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount);
        }
        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new_v7(),
            invoice_id,
            patient_id,
            provider: provider.into(),
            policy_number: policy_number.into(),
            claim_amount,
            approved_amount: None,
            denial_reason: None,
            status: ClaimStatus::Submitted,
            submission_date: now,
            payment_date: None,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves the claim into adjudication
    pub fn begin_processing(&mut self) -> Result<(), ClaimError> {
        self.transition_to(ClaimStatus::Processing)
    }

    /// Approves the claim for the given amount
    ///
    /// Partial approval (`approved_amount < claim_amount`) is legal; the gap
    /// is recorded and surfaced, not written off.
    pub fn approve(&mut self, approved_amount: Money) -> Result<(), ClaimError> {
        if !approved_amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount);
        }
        if approved_amount > self.claim_amount {
            return Err(ClaimError::ApprovedAmountExceedsClaim {
                approved: approved_amount,
                claim: self.claim_amount,
            });
        }
        self.transition_to(ClaimStatus::Approved)?;
        self.approved_amount = Some(approved_amount);
        Ok(())
    }

    /// Denies the claim; terminal
    pub fn deny(&mut self, reason: impl Into<String>) -> Result<(), ClaimError> {
        self.transition_to(ClaimStatus::Denied)?;
        self.denial_reason = Some(reason.into());
        Ok(())
    }

    /// Marks the claim settled
    ///
    /// Valid only from `approved`, which also makes repeated settlement
    /// attempts with the same reference a conflict rather than a double-pay.
    pub fn mark_paid(&mut self, reference: impl Into<String>) -> Result<Money, ClaimError> {
        let approved = self.approved_amount.ok_or(ClaimError::NoApprovedAmount)?;
        self.transition_to(ClaimStatus::Paid)?;
        self.payment_date = Some(Utc::now());
        self.payment_reference = Some(reference.into());
        Ok(approved)
    }

    /// Returns the unreimbursed remainder of a partial approval
    pub fn approval_gap(&self) -> Option<Money> {
        let approved = self.approved_amount?;
        let gap = self.claim_amount.checked_sub(&approved).ok()?;
        gap.is_positive().then_some(gap)
    }

    fn transition_to(&mut self, target: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(target) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Submitted, Processing) | (Processing, Approved) | (Processing, Denied) | (Approved, Paid)
        )
    }
}
