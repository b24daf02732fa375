//! Rewards and redemptions

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{DateRange, HospitalId, PatientId, RedemptionId, RewardId};

use crate::error::LoyaltyError;

/// How long an issued redemption can be presented
pub const REDEMPTION_VALIDITY_DAYS: u64 = 30;

/// A redeemable reward in a hospital's catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub hospital_id: HospitalId,
    pub name: String,
    pub description: Option<String>,
    pub points_required: i64,
    /// Total redemptions allowed; None means uncapped
    pub total_available: Option<i64>,
    pub redeemed_count: i64,
    pub validity: DateRange,
    pub is_active: bool,
}

impl Reward {
    /// Checks that the reward can be redeemed today
    pub fn validate_redeemable(&self, today: NaiveDate) -> Result<(), LoyaltyError> {
        if !self.is_active {
            return Err(LoyaltyError::RewardInactive);
        }
        if !self.validity.contains(today) {
            return Err(LoyaltyError::RewardOutsideWindow(today));
        }
        if let Some(cap) = self.total_available {
            if self.redeemed_count >= cap {
                return Err(LoyaltyError::RewardExhausted);
            }
        }
        Ok(())
    }
}

/// Redemption status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    /// Issued and presentable until expiry
    Issued,
    /// Presented and consumed
    Used,
    /// Lapsed unpresented
    Expired,
    Cancelled,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Issued => "issued",
            RedemptionStatus::Used => "used",
            RedemptionStatus::Expired => "expired",
            RedemptionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RedemptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(RedemptionStatus::Issued),
            "used" => Ok(RedemptionStatus::Used),
            "expired" => Ok(RedemptionStatus::Expired),
            "cancelled" => Ok(RedemptionStatus::Cancelled),
            other => Err(format!("Unknown redemption status: {}", other)),
        }
    }
}

/// An issued reward redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRedemption {
    pub id: RedemptionId,
    pub reward_id: RewardId,
    pub patient_id: PatientId,
    pub hospital_id: HospitalId,
    pub points_used: i64,
    pub status: RedemptionStatus,
    pub redemption_code: String,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl RewardRedemption {
    /// Issues a redemption for the reward with a unique code and 30-day expiry
    pub fn issue(reward: &Reward, patient_id: PatientId, today: NaiveDate) -> Self {
        Self {
            id: RedemptionId::new_v7(),
            reward_id: reward.id,
            patient_id,
            hospital_id: reward.hospital_id,
            points_used: reward.points_required,
            status: RedemptionStatus::Issued,
            redemption_code: generate_redemption_code(),
            expiry_date: today + Days::new(REDEMPTION_VALIDITY_DAYS),
            created_at: Utc::now(),
        }
    }

    /// Returns true once the presentation window has lapsed
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }

    /// Consumes the redemption at presentation
    pub fn mark_used(&mut self, today: NaiveDate) -> Result<(), LoyaltyError> {
        if self.status != RedemptionStatus::Issued || self.is_expired(today) {
            return Err(LoyaltyError::InvalidRedemptionState);
        }
        self.status = RedemptionStatus::Used;
        Ok(())
    }
}

fn generate_redemption_code() -> String {
    format!("RDM-{}", Uuid::new_v4().simple().to_string()[..12].to_uppercase())
}
