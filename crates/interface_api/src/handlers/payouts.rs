//! Payout handlers
//!
//! Period processing is idempotent and batch runs report every per-owner
//! outcome; both are triggered by an external scheduler.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{NotificationPort as _, PayoutId};
use domain_payout::calculator::PayoutOutcome;
use domain_payout::events::PayoutEvent;
use domain_payout::payout::PayoutPeriod;
use infra_db::PayoutRepository;

use crate::dto::payouts::*;
use crate::error::ApiError;
use crate::AppState;

fn repository(state: &AppState) -> PayoutRepository {
    PayoutRepository::new(state.pool.clone(), state.config.payout_timezone())
}

/// Computes the payout for one (owner, period); re-runs are no-ops
pub async fn process_period(
    State(state): State<AppState>,
    Json(request): Json<ProcessPeriodRequest>,
) -> Result<(StatusCode, Json<ProcessPeriodResponse>), ApiError> {
    let period = PayoutPeriod::new(request.period_start, request.period_end)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let outcome = repository(&state)
        .process_period(request.owner_id.into(), period)
        .await?;

    if let PayoutOutcome::Created {
        payout_id,
        owner_id,
        final_amount_minor,
    } = &outcome
    {
        let event = PayoutEvent::PayoutReady {
            payout_id: *payout_id,
            owner_id: *owner_id,
            final_amount_minor: *final_amount_minor,
            timestamp: Utc::now(),
        };
        state.notifier.publish(event.event_type(), event.payload()).await;
    }

    let status = match &outcome {
        PayoutOutcome::Created { .. } => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(ProcessPeriodResponse { outcome })))
}

/// Processes a calendar month for every owner with an active contract
pub async fn run_month(
    State(state): State<AppState>,
    Json(request): Json<RunMonthRequest>,
) -> Result<Json<RunMonthResponse>, ApiError> {
    let report = repository(&state)
        .process_month(request.year, request.month)
        .await?;

    for outcome in &report.outcomes {
        if let PayoutOutcome::Created {
            payout_id,
            owner_id,
            final_amount_minor,
        } = outcome
        {
            let event = PayoutEvent::PayoutReady {
                payout_id: *payout_id,
                owner_id: *owner_id,
                final_amount_minor: *final_amount_minor,
                timestamp: Utc::now(),
            };
            state.notifier.publish(event.event_type(), event.payload()).await;
        }
    }

    Ok(Json(RunMonthResponse::from(report)))
}

/// Gets a payout by ID
pub async fn get_payout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let payout = repository(&state).fetch(PayoutId::from(id)).await?;
    Ok(Json(PayoutResponse::from(&payout)))
}

/// Applies the single human approval
pub async fn approve_payout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApprovePayoutRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    request.validate()?;
    let payout = repository(&state)
        .approve(PayoutId::from(id), request.approver)
        .await?;
    Ok(Json(PayoutResponse::from(&payout)))
}

/// Marks an approved payout as disbursed
pub async fn pay_payout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayPayoutRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    request.validate()?;
    let payout = repository(&state)
        .mark_paid(PayoutId::from(id), request.reference)
        .await?;

    let event = PayoutEvent::PayoutPaid {
        payout_id: payout.id,
        owner_id: payout.owner_id,
        final_amount_minor: payout.final_amount.minor_units(),
        timestamp: Utc::now(),
    };
    state.notifier.publish(event.event_type(), event.payload()).await;

    Ok(Json(PayoutResponse::from(&payout)))
}
