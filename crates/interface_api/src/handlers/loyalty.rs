//! Loyalty handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{DateRange, NotificationPort as _};
use domain_loyalty::events::LoyaltyEvent;
use domain_loyalty::reward::Reward;
use infra_db::LoyaltyRepository;

use crate::dto::loyalty::*;
use crate::error::ApiError;
use crate::AppState;

/// Credits points to a patient's account
///
/// A tier upgrade emits a notification event; the ledger write does not
/// depend on its delivery.
pub async fn award_points(
    State(state): State<AppState>,
    Json(request): Json<AwardPointsRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    request.validate()?;

    let outcome = LoyaltyRepository::new(state.pool.clone())
        .award_points(
            request.patient_id.into(),
            request.hospital_id.into(),
            request.points,
            Some(request.reason),
        )
        .await?;

    if let Some(change) = outcome.tier_change {
        let event = LoyaltyEvent::TierUpgraded {
            patient_id: outcome.account.patient_id,
            hospital_id: outcome.account.hospital_id,
            from: change.from,
            to: change.to,
            lifetime_points: outcome.account.lifetime_points,
            timestamp: Utc::now(),
        };
        state.notifier.publish(event.event_type(), event.payload()).await;
    }

    let upgraded_from = outcome.tier_change.map(|c| c.from.as_str().to_string());
    Ok(Json(AccountResponse::from_account(
        &outcome.account,
        upgraded_from,
    )))
}

/// Redeems a reward against the patient's balance
pub async fn redeem_points(
    State(state): State<AppState>,
    Json(request): Json<RedeemPointsRequest>,
) -> Result<(StatusCode, Json<RedemptionResponse>), ApiError> {
    let outcome = LoyaltyRepository::new(state.pool.clone())
        .redeem_points(request.patient_id.into(), request.reward_id.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RedemptionResponse::from_outcome(
            &outcome.redemption,
            outcome.account.points_balance,
        )),
    ))
}

/// Gets a patient's account at a hospital
pub async fn get_account(
    State(state): State<AppState>,
    Path((patient_id, hospital_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = LoyaltyRepository::new(state.pool.clone())
        .account(patient_id.into(), hospital_id.into())
        .await?;
    Ok(Json(AccountResponse::from_account(&account, None)))
}

/// Lists a patient's loyalty transactions at a hospital
pub async fn list_transactions(
    State(state): State<AppState>,
    Path((patient_id, hospital_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let transactions = LoyaltyRepository::new(state.pool.clone())
        .transactions(patient_id.into(), hospital_id.into())
        .await?;
    Ok(Json(
        transactions.iter().map(TransactionResponse::from).collect(),
    ))
}

/// Adds a reward to a hospital's catalogue
pub async fn create_reward(
    State(state): State<AppState>,
    Json(request): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<RewardResponse>), ApiError> {
    request.validate()?;
    if request.points_required <= 0 {
        return Err(ApiError::Validation(
            "points_required must be positive".to_string(),
        ));
    }
    let validity = DateRange::new(request.valid_from, request.valid_to)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let reward = Reward {
        id: core_kernel::RewardId::new_v7(),
        hospital_id: request.hospital_id.into(),
        name: request.name,
        description: request.description,
        points_required: request.points_required,
        total_available: request.total_available,
        redeemed_count: 0,
        validity,
        is_active: true,
    };

    LoyaltyRepository::new(state.pool.clone())
        .create_reward(&reward)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RewardResponse {
            id: reward.id.into(),
            hospital_id: reward.hospital_id.into(),
            name: reward.name,
            points_required: reward.points_required,
        }),
    ))
}
