//! Invoice and payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, InvoiceId, Money, NotificationPort as _};
use domain_billing::engine::InvoiceDraft;
use domain_billing::events::BillingEvent;
use domain_billing::invoice::ServiceCategory;
use domain_billing::payment::PaymentMethod;
use domain_claims::claim::InsuranceClaim;
use infra_db::{InvoiceRepository, PaymentRepository};

use crate::dto::invoices::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates an invoice from encounter line items
///
/// All validation happens before any persistence; the invoice, its items and
/// the auto-raised claim (when an insurer covers part of the total) are
/// stored in one transaction.
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;

    let currency = match &request.currency {
        Some(code) => {
            Currency::from_str(code).map_err(|e| ApiError::Validation(e.to_string()))?
        }
        None => Currency::NGN,
    };

    let mut draft = InvoiceDraft::new(
        request.patient_id.into(),
        request.hospital_id.into(),
        currency,
    );
    for item in &request.items {
        let category = ServiceCategory::from_str(&item.category).map_err(ApiError::Validation)?;
        draft = draft.item(
            item.description.clone(),
            category,
            item.quantity,
            Money::from_minor(item.unit_price_minor, currency),
        );
    }
    if let Some(rate) = request.tax_rate_percent {
        draft = draft.tax_rate_percent(rate);
    }
    if let Some(discount) = request.discount_percent {
        draft = draft.discount_percent(discount);
    }
    if let Some(insurer) = &request.insurer {
        draft = draft.insurer(
            insurer.provider.clone(),
            insurer.policy_number.clone(),
            insurer.coverage_percent,
        );
    }
    if let Some(due_date) = request.due_date {
        draft = draft.due_date(due_date);
    }
    if let Some(method) = &request.payment_method {
        draft = draft.payment_method(PaymentMethod::from_str(method).map_err(ApiError::Validation)?);
    }

    let invoice = draft.build()?;

    let claim = match &invoice.insurer {
        Some(details) if invoice.insurer_share.is_positive() => Some(InsuranceClaim::submit(
            invoice.id,
            invoice.patient_id,
            details.provider.clone(),
            details.policy_number.clone(),
            invoice.insurer_share,
        )?),
        _ => None,
    };

    InvoiceRepository::new(state.pool.clone())
        .create_with_claim(&invoice, claim.as_ref())
        .await?;

    let claim_id = claim.map(|c| Uuid::from(c.id));
    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from_invoice(&invoice, claim_id)),
    ))
}

/// Gets an invoice by ID
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = InvoiceRepository::new(state.pool.clone())
        .fetch(InvoiceId::from(id))
        .await?;
    Ok(Json(InvoiceResponse::from_invoice(&invoice, None)))
}

/// Lists a hospital's invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let invoices = InvoiceRepository::new(state.pool.clone())
        .list_for_hospital(
            query.hospital_id.into(),
            query.limit.unwrap_or(50).clamp(1, 500),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;
    Ok(Json(
        invoices
            .iter()
            .map(|i| InvoiceResponse::from_invoice(i, None))
            .collect(),
    ))
}

/// Applies a payment to an invoice
pub async fn apply_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    request.validate()?;
    let method = PaymentMethod::from_str(&request.method).map_err(ApiError::Validation)?;

    let applied = PaymentRepository::new(state.pool.clone())
        .apply_payment(
            InvoiceId::from(id),
            request.amount_minor,
            method,
            request.reference.clone(),
        )
        .await?;

    let recorded = BillingEvent::PaymentRecorded {
        invoice_id: applied.payment.invoice_id,
        payment_id: applied.payment.id,
        amount_minor: applied.payment.amount.minor_units(),
        method: applied.payment.method.as_str().to_string(),
        timestamp: Utc::now(),
    };
    state
        .notifier
        .publish(recorded.event_type(), recorded.payload())
        .await;

    if applied.new_status == domain_billing::invoice::InvoiceStatus::Paid {
        let paid = BillingEvent::InvoicePaid {
            invoice_id: applied.payment.invoice_id,
            patient_id: applied.patient_id,
            hospital_id: applied.hospital_id,
            total_minor: applied.total_amount.minor_units(),
            timestamp: Utc::now(),
        };
        state.notifier.publish(paid.event_type(), paid.payload()).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            payment_id: applied.payment.id.into(),
            invoice_id: applied.payment.invoice_id.into(),
            amount_minor: applied.payment.amount.minor_units(),
            method: applied.payment.method.as_str().to_string(),
            receipt_number: applied.receipt.receipt_number.clone(),
            invoice_status: applied.new_status.as_str().to_string(),
            created_at: applied.payment.created_at,
        }),
    ))
}

/// Moves past-due invoices to `overdue`; triggered by an external scheduler
pub async fn sweep_overdue(
    State(state): State<AppState>,
) -> Result<Json<SweepOverdueResponse>, ApiError> {
    let transitioned = InvoiceRepository::new(state.pool.clone())
        .sweep_overdue(Utc::now().date_naive())
        .await?;
    Ok(Json(SweepOverdueResponse { transitioned }))
}
