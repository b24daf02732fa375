//! Payout domain events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{OwnerId, PayoutId};

/// Events emitted by the payout domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PayoutEvent {
    /// A payout was computed and awaits approval
    PayoutReady {
        payout_id: PayoutId,
        owner_id: OwnerId,
        final_amount_minor: i64,
        timestamp: DateTime<Utc>,
    },

    /// A payout was disbursed
    PayoutPaid {
        payout_id: PayoutId,
        owner_id: OwnerId,
        final_amount_minor: i64,
        timestamp: DateTime<Utc>,
    },
}

impl PayoutEvent {
    /// Returns the event type name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            PayoutEvent::PayoutReady { .. } => "payout.ready",
            PayoutEvent::PayoutPaid { .. } => "payout.paid",
        }
    }

    /// Serializes the event payload
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
