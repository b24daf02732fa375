//! Payout DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_payout::calculator::{PayoutOutcome, PayoutRunReport};
use domain_payout::payout::OwnerPayout;

#[derive(Debug, Deserialize)]
pub struct ProcessPeriodRequest {
    pub owner_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct RunMonthRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApprovePayoutRequest {
    #[validate(length(min = 1, max = 120))]
    pub approver: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayPayoutRequest {
    #[validate(length(min = 1, max = 120))]
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub hospital_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_revenue_minor: i64,
    pub calculated_amount_minor: i64,
    pub minimum_guarantee_minor: i64,
    pub final_amount_minor: i64,
    pub status: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
}

impl From<&OwnerPayout> for PayoutResponse {
    fn from(payout: &OwnerPayout) -> Self {
        Self {
            id: payout.id.into(),
            owner_id: payout.owner_id.into(),
            hospital_id: payout.hospital_id.into(),
            period_start: payout.period.start,
            period_end: payout.period.end,
            gross_revenue_minor: payout.gross_revenue.minor_units(),
            calculated_amount_minor: payout.calculated_amount.minor_units(),
            minimum_guarantee_minor: payout.minimum_guarantee.minor_units(),
            final_amount_minor: payout.final_amount.minor_units(),
            status: payout.status.as_str().to_string(),
            approved_by: payout.approved_by.clone(),
            approved_at: payout.approved_at,
            paid_at: payout.paid_at,
            payment_reference: payout.payment_reference.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProcessPeriodResponse {
    pub outcome: PayoutOutcome,
}

#[derive(Debug, Serialize)]
pub struct RunMonthResponse {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<PayoutOutcome>,
}

impl From<PayoutRunReport> for RunMonthResponse {
    fn from(report: PayoutRunReport) -> Self {
        Self {
            period_start: report.period.start,
            period_end: report.period.end,
            created: report.created_count(),
            skipped: report.skipped_count(),
            failed: report.failed_count(),
            outcomes: report.outcomes,
        }
    }
}
