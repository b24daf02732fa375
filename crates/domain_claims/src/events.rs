//! Claims domain events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, InvoiceId};

/// Events emitted by the claims domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClaimEvent {
    /// Claim approved, possibly partially
    ClaimApproved {
        claim_id: ClaimId,
        invoice_id: InvoiceId,
        approved_minor: i64,
        gap_minor: i64,
        timestamp: DateTime<Utc>,
    },

    /// Claim denied; terminal
    ClaimDenied {
        claim_id: ClaimId,
        invoice_id: InvoiceId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Claim settled against the invoice
    ClaimPaid {
        claim_id: ClaimId,
        invoice_id: InvoiceId,
        paid_minor: i64,
        timestamp: DateTime<Utc>,
    },
}

impl ClaimEvent {
    /// Returns the event type name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimApproved { .. } => "claim.approved",
            ClaimEvent::ClaimDenied { .. } => "claim.denied",
            ClaimEvent::ClaimPaid { .. } => "claim.paid",
        }
    }

    /// Serializes the event payload
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
