//! Claim lifecycle records
//!
//! Status changes are appended to an audit history, and partial approvals
//! leave a recorded reconciliation gap for manual follow-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{ClaimId, InvoiceId, Money};

use crate::claim::{ClaimStatus, InsuranceClaim};

/// An audit record of a claim status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: Uuid,
    pub claim_id: ClaimId,
    pub from: Option<ClaimStatus>,
    pub to: ClaimStatus,
    pub reason: Option<String>,
    pub changed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    /// Records a transition
    pub fn record(
        claim_id: ClaimId,
        from: Option<ClaimStatus>,
        to: ClaimStatus,
        reason: Option<String>,
        changed_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            claim_id,
            from,
            to,
            reason,
            changed_by,
            changed_at: Utc::now(),
        }
    }
}

/// The unreimbursed remainder of a partially approved claim
///
/// The gap is not auto-written-off and no patient rebill is generated; it is
/// surfaced for manual financial reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationGap {
    pub claim_id: ClaimId,
    pub invoice_id: InvoiceId,
    pub gap: Money,
    pub recorded_at: DateTime<Utc>,
}

impl ReconciliationGap {
    /// Extracts the gap from a partially approved claim, if any
    pub fn from_claim(claim: &InsuranceClaim) -> Option<Self> {
        claim.approval_gap().map(|gap| Self {
            claim_id: claim.id,
            invoice_id: claim.invoice_id,
            gap,
            recorded_at: Utc::now(),
        })
    }
}
