//! Loyalty accounts and tiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{HospitalId, PatientId};

/// Loyalty tier, derived deterministically from lifetime points
///
/// Lifetime points never decrease, so a tier can only advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const SILVER_THRESHOLD: i64 = 2_000;
    pub const GOLD_THRESHOLD: i64 = 5_000;
    pub const PLATINUM_THRESHOLD: i64 = 10_000;

    /// Derives the tier for a lifetime points total
    pub fn for_lifetime_points(lifetime_points: i64) -> Tier {
        if lifetime_points >= Self::PLATINUM_THRESHOLD {
            Tier::Platinum
        } else if lifetime_points >= Self::GOLD_THRESHOLD {
            Tier::Gold
        } else if lifetime_points >= Self::SILVER_THRESHOLD {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(Tier::Bronze),
            "silver" => Ok(Tier::Silver),
            "gold" => Ok(Tier::Gold),
            "platinum" => Ok(Tier::Platinum),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// A patient's loyalty account at one hospital
///
/// Keyed by (patient, hospital). `points_balance` never drops below zero and
/// `lifetime_points` is monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub patient_id: PatientId,
    pub hospital_id: HospitalId,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    /// Opens a fresh account with zero balances
    pub fn open(patient_id: PatientId, hospital_id: HospitalId) -> Self {
        let now = Utc::now();
        Self {
            patient_id,
            hospital_id,
            points_balance: 0,
            lifetime_points: 0,
            tier: Tier::Bronze,
            created_at: now,
            updated_at: now,
        }
    }
}
