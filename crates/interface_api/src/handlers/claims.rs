//! Claims handlers
//!
//! The inbound contract for the insurer gateway: submission happens
//! automatically at invoice creation (or explicitly via resubmission after a
//! denial); adjudication and settlement arrive through these endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClaimId, NotificationPort as _};
use domain_claims::events::ClaimEvent;
use domain_claims::ports::{ClaimSubmission, InsurerGatewayPort as _};
use infra_db::ClaimRepository;

use crate::dto::claims::*;
use crate::error::ApiError;
use crate::AppState;

/// Lists claims
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = ClaimRepository::new(state.pool.clone())
        .list(
            query.limit.unwrap_or(50).clamp(1, 500),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(claims.iter().map(ClaimResponse::from).collect()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = ClaimRepository::new(state.pool.clone())
        .fetch(ClaimId::from(id))
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Moves a submitted claim into adjudication
pub async fn begin_processing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = ClaimRepository::new(state.pool.clone())
        .begin_processing(ClaimId::from(id), None)
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Approves a claim, possibly partially
pub async fn approve_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;

    let (claim, gap) = ClaimRepository::new(state.pool.clone())
        .approve(ClaimId::from(id), request.approved_amount_minor, request.actor)
        .await?;

    let event = ClaimEvent::ClaimApproved {
        claim_id: claim.id,
        invoice_id: claim.invoice_id,
        approved_minor: request.approved_amount_minor,
        gap_minor: gap.map(|g| g.gap.minor_units()).unwrap_or(0),
        timestamp: Utc::now(),
    };
    state.notifier.publish(event.event_type(), event.payload()).await;

    Ok(Json(ClaimResponse::from(&claim)))
}

/// Denies a claim; terminal
pub async fn deny_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DenyClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;

    let claim = ClaimRepository::new(state.pool.clone())
        .deny(ClaimId::from(id), request.reason.clone(), request.actor)
        .await?;

    let event = ClaimEvent::ClaimDenied {
        claim_id: claim.id,
        invoice_id: claim.invoice_id,
        reason: request.reason,
        timestamp: Utc::now(),
    };
    state.notifier.publish(event.event_type(), event.payload()).await;

    Ok(Json(ClaimResponse::from(&claim)))
}

/// Settles an approved claim against its invoice
///
/// Produces a Payment with method `insurance` through the same atomic
/// recomputation as patient payments.
pub async fn pay_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;

    let settlement = ClaimRepository::new(state.pool.clone())
        .pay(ClaimId::from(id), request.reference, request.actor)
        .await?;

    let event = ClaimEvent::ClaimPaid {
        claim_id: settlement.claim.id,
        invoice_id: settlement.claim.invoice_id,
        paid_minor: settlement.payment.payment.amount.minor_units(),
        timestamp: Utc::now(),
    };
    state.notifier.publish(event.event_type(), event.payload()).await;

    if settlement.payment.new_status == domain_billing::invoice::InvoiceStatus::Paid {
        let paid = domain_billing::events::BillingEvent::InvoicePaid {
            invoice_id: settlement.claim.invoice_id,
            patient_id: settlement.payment.patient_id,
            hospital_id: settlement.payment.hospital_id,
            total_minor: settlement.payment.total_amount.minor_units(),
            timestamp: Utc::now(),
        };
        state.notifier.publish(paid.event_type(), paid.payload()).await;
    }

    Ok(Json(ClaimResponse::from(&settlement.claim)))
}

/// Raises a fresh claim for an invoice whose previous claim was denied
pub async fn resubmit_claim(
    State(state): State<AppState>,
    Json(request): Json<ResubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let claim = ClaimRepository::new(state.pool.clone())
        .resubmit(request.invoice_id.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ClaimResponse::from(&claim))))
}

/// Forwards a claim to the insurer gateway
///
/// Transient gateway failures surface as 502 and are retried by the caller;
/// they are never treated as success.
pub async fn forward_to_gateway(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GatewayForwardResponse>, ApiError> {
    let claim = ClaimRepository::new(state.pool.clone())
        .fetch(ClaimId::from(id))
        .await?;

    let submission = ClaimSubmission {
        claim_id: claim.id,
        provider: claim.provider.clone(),
        policy_number: claim.policy_number.clone(),
        amount_minor: claim.claim_amount.minor_units(),
        currency: claim.claim_amount.currency().code().to_string(),
    };
    let ack = state.gateway.submit_claim(&submission).await?;

    Ok(Json(GatewayForwardResponse {
        claim_id: claim.id.into(),
        accepted: ack.accepted,
        gateway_reference: ack.gateway_reference,
    }))
}
