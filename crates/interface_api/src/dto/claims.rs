//! Claims DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::claim::InsuranceClaim;

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveClaimRequest {
    pub approved_amount_minor: i64,
    #[validate(length(max = 120))]
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DenyClaimRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(length(max = 120))]
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayClaimRequest {
    #[validate(length(min = 1, max = 120))]
    pub reference: String,
    #[validate(length(max = 120))]
    pub actor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResubmitClaimRequest {
    pub invoice_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub patient_id: Uuid,
    pub provider: String,
    pub policy_number: String,
    pub claim_amount_minor: i64,
    pub approved_amount_minor: Option<i64>,
    pub gap_minor: Option<i64>,
    pub denial_reason: Option<String>,
    pub status: String,
    pub submission_date: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
}

impl From<&InsuranceClaim> for ClaimResponse {
    fn from(claim: &InsuranceClaim) -> Self {
        Self {
            id: claim.id.into(),
            invoice_id: claim.invoice_id.into(),
            patient_id: claim.patient_id.into(),
            provider: claim.provider.clone(),
            policy_number: claim.policy_number.clone(),
            claim_amount_minor: claim.claim_amount.minor_units(),
            approved_amount_minor: claim.approved_amount.map(|m| m.minor_units()),
            gap_minor: claim.approval_gap().map(|m| m.minor_units()),
            denial_reason: claim.denial_reason.clone(),
            status: claim.status.as_str().to_string(),
            submission_date: claim.submission_date,
            payment_date: claim.payment_date,
            payment_reference: claim.payment_reference.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GatewayForwardResponse {
    pub claim_id: Uuid,
    pub accepted: bool,
    pub gateway_reference: String,
}
