//! Claim repository
//!
//! Every transition locks the claim row, applies the domain state machine,
//! and appends a status-history row in the same transaction. Settling an
//! approved claim reuses the payment path (`apply_payment_minor_tx`) inside that
//! transaction — the single integration point between claims and billing.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, InvoiceId, Money};
use domain_billing::error::BillingError;
use domain_billing::payment::PaymentMethod;
use domain_claims::claim::{ClaimStatus, InsuranceClaim};
use domain_claims::error::ClaimError;
use domain_claims::lifecycle::{ReconciliationGap, StatusChange};

use crate::error::DatabaseError;
use crate::repositories::parse_column;
use crate::repositories::payments::{apply_payment_minor_tx, PaymentApplied, PaymentProcessError};

/// Errors from claim processing
#[derive(Debug, Error)]
pub enum ClaimProcessError {
    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ClaimProcessError {
    fn from(error: sqlx::Error) -> Self {
        ClaimProcessError::Database(error.into())
    }
}

impl From<PaymentProcessError> for ClaimProcessError {
    fn from(error: PaymentProcessError) -> Self {
        match error {
            PaymentProcessError::Billing(e) => ClaimProcessError::Billing(e),
            PaymentProcessError::Database(e) => ClaimProcessError::Database(e),
        }
    }
}

/// Result of settling an approved claim
#[derive(Debug, Clone)]
pub struct ClaimSettlement {
    pub claim: InsuranceClaim,
    pub payment: PaymentApplied,
    /// Present when the approval was partial; surfaced, never written off
    pub gap: Option<ReconciliationGap>,
}

/// Repository for insurance claims
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a claim
    pub async fn fetch(&self, id: ClaimId) -> Result<InsuranceClaim, DatabaseError> {
        let row = sqlx::query_as::<_, ClaimRow>("SELECT * FROM insurance_claims WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))?;
        row.into_domain()
    }

    /// Lists claims, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<InsuranceClaim>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(
            "SELECT * FROM insurance_claims ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(ClaimRow::into_domain).collect()
    }

    /// Moves a submitted claim into adjudication
    pub async fn begin_processing(
        &self,
        id: ClaimId,
        actor: Option<String>,
    ) -> Result<InsuranceClaim, ClaimProcessError> {
        self.transition(id, actor, None, |claim| claim.begin_processing())
            .await
    }

    /// Approves a claim, possibly partially
    pub async fn approve(
        &self,
        id: ClaimId,
        approved_amount_minor: i64,
        actor: Option<String>,
    ) -> Result<(InsuranceClaim, Option<ReconciliationGap>), ClaimProcessError> {
        let claim = self
            .transition(id, actor, None, |claim| {
                let amount = Money::from_minor(approved_amount_minor, claim.claim_amount.currency());
                claim.approve(amount)
            })
            .await?;

        let gap = ReconciliationGap::from_claim(&claim);
        if let Some(gap) = &gap {
            warn!(
                claim_id = %gap.claim_id,
                invoice_id = %gap.invoice_id,
                gap = %gap.gap,
                "Partial claim approval left a gap for manual reconciliation"
            );
        }
        Ok((claim, gap))
    }

    /// Denies a claim; terminal
    pub async fn deny(
        &self,
        id: ClaimId,
        reason: String,
        actor: Option<String>,
    ) -> Result<InsuranceClaim, ClaimProcessError> {
        self.transition(id, actor, Some(reason.clone()), move |claim| {
            claim.deny(reason.clone())
        })
        .await
    }

    /// Settles an approved claim against its invoice
    ///
    /// The claim row is locked first, then the invoice inside
    /// `apply_payment_minor_tx` (always in that order). The `approved`-only
    /// guard
    /// under the claim lock makes re-invocation a conflict, never a second
    /// payment.
    pub async fn pay(
        &self,
        id: ClaimId,
        reference: String,
        actor: Option<String>,
    ) -> Result<ClaimSettlement, ClaimProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = lock_claim(&mut tx, id).await?;
        let previous = row.status.clone();
        let mut claim = row.into_domain()?;

        let approved = claim.mark_paid(reference.clone())?;
        let payment = apply_payment_minor_tx(
            &mut tx,
            claim.invoice_id,
            approved.minor_units(),
            PaymentMethod::Insurance,
            Some(reference),
        )
        .await?;

        update_claim_row(&mut tx, &claim).await?;
        insert_history_tx(
            &mut tx,
            &StatusChange::record(
                claim.id,
                Some(parse_column(&previous, "claim status")?),
                claim.status,
                None,
                actor,
            ),
        )
        .await?;

        let gap = ReconciliationGap::from_claim(&claim);
        if let Some(gap) = &gap {
            warn!(
                claim_id = %gap.claim_id,
                invoice_id = %gap.invoice_id,
                gap = %gap.gap,
                "Claim settled below claimed amount; gap requires manual reconciliation"
            );
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(ClaimSettlement {
            claim,
            payment,
            gap,
        })
    }

    /// Raises a fresh claim for an invoice whose previous claim was denied
    pub async fn resubmit(&self, invoice_id: InvoiceId) -> Result<InsuranceClaim, ClaimProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let invoice = sqlx::query_as::<_, ClaimSourceRow>(
            r#"
            SELECT id, patient_id, currency, insurer_provider, insurer_policy_number,
                   insurer_share_minor
            FROM invoices WHERE id = $1 FOR UPDATE NOWAIT
            "#,
        )
        .bind(Uuid::from(invoice_id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Invoice", invoice_id))?;

        let active_claims = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM insurance_claims WHERE invoice_id = $1 AND status <> 'denied'",
        )
        .bind(Uuid::from(invoice_id))
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;
        if active_claims > 0 {
            return Err(ClaimError::ActiveClaimExists(invoice_id.to_string()).into());
        }

        let (provider, policy_number) =
            match (invoice.insurer_provider, invoice.insurer_policy_number) {
                (Some(p), Some(n)) => (p, n),
                _ => return Err(ClaimError::NothingToClaim(invoice_id.to_string()).into()),
            };
        if invoice.insurer_share_minor <= 0 {
            return Err(ClaimError::NothingToClaim(invoice_id.to_string()).into());
        }
        let currency: Currency = parse_column(&invoice.currency, "currency")?;

        let claim = InsuranceClaim::submit(
            invoice_id,
            invoice.patient_id.into(),
            provider,
            policy_number,
            Money::from_minor(invoice.insurer_share_minor, currency),
        )?;

        insert_claim_tx(&mut tx, &claim).await?;
        insert_history_tx(
            &mut tx,
            &StatusChange::record(claim.id, None, claim.status, None, None),
        )
        .await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(claim)
    }

    /// Shared lock-transition-record step for simple status changes
    async fn transition<F>(
        &self,
        id: ClaimId,
        actor: Option<String>,
        reason: Option<String>,
        apply: F,
    ) -> Result<InsuranceClaim, ClaimProcessError>
    where
        F: FnOnce(&mut InsuranceClaim) -> Result<(), ClaimError>,
    {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = lock_claim(&mut tx, id).await?;
        let previous = row.status.clone();
        let mut claim = row.into_domain()?;

        apply(&mut claim)?;

        update_claim_row(&mut tx, &claim).await?;
        insert_history_tx(
            &mut tx,
            &StatusChange::record(
                claim.id,
                Some(parse_column(&previous, "claim status")?),
                claim.status,
                reason,
                actor,
            ),
        )
        .await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(claim)
    }
}

async fn lock_claim(
    tx: &mut Transaction<'_, Postgres>,
    id: ClaimId,
) -> Result<ClaimRow, ClaimProcessError> {
    let row = sqlx::query_as::<_, ClaimRow>(
        "SELECT * FROM insurance_claims WHERE id = $1 FOR UPDATE NOWAIT",
    )
    .bind(Uuid::from(id))
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| DatabaseError::not_found("Claim", id))?;
    Ok(row)
}

async fn update_claim_row(
    tx: &mut Transaction<'_, Postgres>,
    claim: &InsuranceClaim,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        UPDATE insurance_claims
        SET status = $1, approved_amount_minor = $2, denial_reason = $3,
            payment_date = $4, payment_reference = $5, updated_at = $6
        WHERE id = $7
        "#,
    )
    .bind(claim.status.as_str())
    .bind(claim.approved_amount.map(|m| m.minor_units()))
    .bind(claim.denial_reason.clone())
    .bind(claim.payment_date)
    .bind(claim.payment_reference.clone())
    .bind(claim.updated_at)
    .bind(Uuid::from(claim.id))
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

pub(crate) async fn insert_claim_tx(
    tx: &mut Transaction<'_, Postgres>,
    claim: &InsuranceClaim,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO insurance_claims (
            id, invoice_id, patient_id, provider, policy_number,
            claim_amount_minor, currency, approved_amount_minor, denial_reason,
            status, submission_date, payment_date, payment_reference,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(Uuid::from(claim.id))
    .bind(Uuid::from(claim.invoice_id))
    .bind(Uuid::from(claim.patient_id))
    .bind(&claim.provider)
    .bind(&claim.policy_number)
    .bind(claim.claim_amount.minor_units())
    .bind(claim.claim_amount.currency().code())
    .bind(claim.approved_amount.map(|m| m.minor_units()))
    .bind(claim.denial_reason.clone())
    .bind(claim.status.as_str())
    .bind(claim.submission_date)
    .bind(claim.payment_date)
    .bind(claim.payment_reference.clone())
    .bind(claim.created_at)
    .bind(claim.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

pub(crate) async fn insert_history_tx(
    tx: &mut Transaction<'_, Postgres>,
    change: &StatusChange,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO claim_status_history (id, claim_id, from_status, to_status, reason, changed_by, changed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(change.id)
    .bind(Uuid::from(change.claim_id))
    .bind(change.from.map(|s| s.as_str()))
    .bind(change.to.as_str())
    .bind(change.reason.clone())
    .bind(change.changed_by.clone())
    .bind(change.changed_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ClaimRow {
    id: Uuid,
    invoice_id: Uuid,
    patient_id: Uuid,
    provider: String,
    policy_number: String,
    claim_amount_minor: i64,
    currency: String,
    approved_amount_minor: Option<i64>,
    denial_reason: Option<String>,
    status: String,
    submission_date: DateTime<Utc>,
    payment_date: Option<DateTime<Utc>>,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ClaimSourceRow {
    #[allow(dead_code)]
    id: Uuid,
    patient_id: Uuid,
    currency: String,
    insurer_provider: Option<String>,
    insurer_policy_number: Option<String>,
    insurer_share_minor: i64,
}

impl ClaimRow {
    fn into_domain(self) -> Result<InsuranceClaim, DatabaseError> {
        let currency: Currency = parse_column(&self.currency, "currency")?;
        let status: ClaimStatus = parse_column(&self.status, "claim status")?;
        Ok(InsuranceClaim {
            id: self.id.into(),
            invoice_id: self.invoice_id.into(),
            patient_id: self.patient_id.into(),
            provider: self.provider,
            policy_number: self.policy_number,
            claim_amount: Money::from_minor(self.claim_amount_minor, currency),
            approved_amount: self
                .approved_amount_minor
                .map(|m| Money::from_minor(m, currency)),
            denial_reason: self.denial_reason,
            status,
            submission_date: self.submission_date,
            payment_date: self.payment_date,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
