//! Loyalty domain events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{HospitalId, PatientId};

use crate::account::Tier;

/// Events emitted by the loyalty domain
///
/// Tier upgrades are handed to the communication collaborator; the ledger
/// write itself never depends on the notification succeeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoyaltyEvent {
    TierUpgraded {
        patient_id: PatientId,
        hospital_id: HospitalId,
        from: Tier,
        to: Tier,
        lifetime_points: i64,
        timestamp: DateTime<Utc>,
    },
}

impl LoyaltyEvent {
    /// Returns the event type name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            LoyaltyEvent::TierUpgraded { .. } => "loyalty.tier_upgraded",
        }
    }

    /// Serializes the event payload
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
