//! Loyalty DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_loyalty::account::LoyaltyAccount;
use domain_loyalty::reward::RewardRedemption;
use domain_loyalty::transaction::LoyaltyTransaction;

#[derive(Debug, Deserialize, Validate)]
pub struct AwardPointsRequest {
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    pub points: i64,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemPointsRequest {
    pub patient_id: Uuid,
    pub reward_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRewardRequest {
    pub hospital_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub points_required: i64,
    pub total_available: Option<i64>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    pub points_balance: i64,
    pub lifetime_points: i64,
    pub tier: String,
    /// Set when the triggering accrual crossed a tier threshold
    pub tier_upgraded_from: Option<String>,
}

impl AccountResponse {
    pub fn from_account(account: &LoyaltyAccount, upgraded_from: Option<String>) -> Self {
        Self {
            patient_id: account.patient_id.into(),
            hospital_id: account.hospital_id.into(),
            points_balance: account.points_balance,
            lifetime_points: account.lifetime_points,
            tier: account.tier.as_str().to_string(),
            tier_upgraded_from: upgraded_from,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub points: i64,
    pub kind: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&LoyaltyTransaction> for TransactionResponse {
    fn from(txn: &LoyaltyTransaction) -> Self {
        Self {
            id: txn.id.into(),
            points: txn.points,
            kind: txn.kind.as_str().to_string(),
            reference: txn.reference.clone(),
            created_at: txn.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedemptionResponse {
    pub id: Uuid,
    pub reward_id: Uuid,
    pub patient_id: Uuid,
    pub points_used: i64,
    pub redemption_code: String,
    pub expiry_date: NaiveDate,
    pub remaining_balance: i64,
}

impl RedemptionResponse {
    pub fn from_outcome(redemption: &RewardRedemption, remaining_balance: i64) -> Self {
        Self {
            id: redemption.id.into(),
            reward_id: redemption.reward_id.into(),
            patient_id: redemption.patient_id.into(),
            points_used: redemption.points_used,
            redemption_code: redemption.redemption_code.clone(),
            expiry_date: redemption.expiry_date,
            remaining_balance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub points_required: i64,
}
