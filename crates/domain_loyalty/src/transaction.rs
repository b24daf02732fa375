//! Loyalty transactions
//!
//! The transaction log is append-only; its signed sum equals the account
//! balance at all times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::{HospitalId, LoyaltyTransactionId, PatientId};

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Earned,
    Redeemed,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earned => "earned",
            TransactionKind::Redeemed => "redeemed",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earned" => Ok(TransactionKind::Earned),
            "redeemed" => Ok(TransactionKind::Redeemed),
            other => Err(format!("Unknown transaction kind: {}", other)),
        }
    }
}

/// An append-only loyalty ledger entry with signed points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub id: LoyaltyTransactionId,
    pub patient_id: PatientId,
    pub hospital_id: HospitalId,
    /// Positive for accruals, negative for redemptions
    pub points: i64,
    pub kind: TransactionKind,
    /// What triggered the entry (booking, feedback, payment, redemption id)
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LoyaltyTransaction {
    /// Records an accrual of `points` (positive)
    pub fn earned(
        patient_id: PatientId,
        hospital_id: HospitalId,
        points: i64,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: LoyaltyTransactionId::new_v7(),
            patient_id,
            hospital_id,
            points,
            kind: TransactionKind::Earned,
            reference,
            created_at: Utc::now(),
        }
    }

    /// Records a redemption of `points` (stored negated)
    pub fn redeemed(
        patient_id: PatientId,
        hospital_id: HospitalId,
        points: i64,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: LoyaltyTransactionId::new_v7(),
            patient_id,
            hospital_id,
            points: -points,
            kind: TransactionKind::Redeemed,
            reference,
            created_at: Utc::now(),
        }
    }
}
