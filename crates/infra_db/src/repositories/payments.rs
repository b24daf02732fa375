//! Payment repository
//!
//! `apply_payment` is the atomic unit at the heart of settlement: it locks
//! the invoice row, re-reads the completed-payment total, validates against
//! that fresh value, and writes the payment, its receipt and the re-derived
//! invoice status in one transaction. A crash between any two of those
//! writes rolls the whole unit back, leaving the invoice in its prior
//! consistent state.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{Currency, HospitalId, InvoiceId, Money, PatientId};
use domain_billing::error::BillingError;
use domain_billing::invoice::InvoiceStatus;
use domain_billing::payment::{Payment, PaymentMethod};
use domain_billing::receipt::Receipt;
use domain_billing::settlement;

use crate::error::DatabaseError;
use crate::repositories::parse_column;

/// Errors from payment processing
#[derive(Debug, Error)]
pub enum PaymentProcessError {
    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for PaymentProcessError {
    fn from(error: sqlx::Error) -> Self {
        PaymentProcessError::Database(error.into())
    }
}

/// Result of a successfully applied payment
#[derive(Debug, Clone)]
pub struct PaymentApplied {
    pub payment: Payment,
    pub receipt: Receipt,
    pub previous_status: InvoiceStatus,
    pub new_status: InvoiceStatus,
    pub patient_id: PatientId,
    pub hospital_id: HospitalId,
    pub total_amount: Money,
}

/// Repository for payments and receipts
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies a payment to an invoice as one atomic unit
    ///
    /// The amount is taken in minor units; its currency is the invoice's.
    pub async fn apply_payment(
        &self,
        invoice_id: InvoiceId,
        amount_minor: i64,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<PaymentApplied, PaymentProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        let applied =
            apply_payment_minor_tx(&mut tx, invoice_id, amount_minor, method, reference).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(applied)
    }

    /// Lists the payments recorded against an invoice, oldest first
    pub async fn list_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT p.id, p.invoice_id, p.amount_minor, p.method, p.reference,
                   p.status, p.created_at, i.currency
            FROM payments p
            JOIN invoices i ON i.id = p.invoice_id
            WHERE p.invoice_id = $1
            ORDER BY p.created_at
            "#,
        )
        .bind(Uuid::from(invoice_id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }
}

/// The shared read-validate-write step, usable inside a larger transaction
///
/// Claim settlement reuses this exact function so that insurer payments flow
/// through the same validation and status recomputation as patient payments.
pub(crate) async fn apply_payment_minor_tx(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
    amount_minor: i64,
    method: PaymentMethod,
    reference: Option<String>,
) -> Result<PaymentApplied, PaymentProcessError> {
    // Lock the invoice; deny-fast instead of queueing behind a writer.
    let locked = sqlx::query_as::<_, LockedInvoiceRow>(
        r#"
        SELECT id, patient_id, hospital_id, currency, total_amount_minor, status
        FROM invoices WHERE id = $1 FOR UPDATE NOWAIT
        "#,
    )
    .bind(Uuid::from(invoice_id))
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| DatabaseError::not_found("Invoice", invoice_id))?;

    let currency: Currency = parse_column(&locked.currency, "currency")?;
    let status: InvoiceStatus = parse_column(&locked.status, "invoice status")?;
    let total = Money::from_minor(locked.total_amount_minor, currency);
    let amount = Money::from_minor(amount_minor, currency);

    let completed_minor = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(amount_minor), 0)::BIGINT
        FROM payments
        WHERE invoice_id = $1 AND status = 'completed'
        "#,
    )
    .bind(Uuid::from(invoice_id))
    .fetch_one(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    let completed = Money::from_minor(completed_minor, currency);

    settlement::validate_payment(status, total, completed, amount)?;

    let payment = Payment::completed(invoice_id, amount, method, reference);
    sqlx::query(
        r#"
        INSERT INTO payments (id, invoice_id, amount_minor, method, reference, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::from(payment.id))
    .bind(Uuid::from(payment.invoice_id))
    .bind(payment.amount.minor_units())
    .bind(payment.method.as_str())
    .bind(payment.reference.clone())
    .bind(payment.status.as_str())
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    let receipt = Receipt::for_payment(&payment);
    sqlx::query(
        r#"
        INSERT INTO receipts (id, receipt_number, payment_id, invoice_id, amount_minor, method, issued_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::from(receipt.id))
    .bind(&receipt.receipt_number)
    .bind(Uuid::from(receipt.payment_id))
    .bind(Uuid::from(receipt.invoice_id))
    .bind(receipt.amount.minor_units())
    .bind(receipt.method.as_str())
    .bind(receipt.issued_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    let new_completed = completed.checked_add(&amount).map_err(BillingError::from)?;
    let new_status = settlement::derive_status(status, total, new_completed);
    if new_status != status {
        sqlx::query("UPDATE invoices SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_status.as_str())
            .bind(Uuid::from(invoice_id))
            .execute(&mut **tx)
            .await
            .map_err(DatabaseError::from)?;
    }

    Ok(PaymentApplied {
        payment,
        receipt,
        previous_status: status,
        new_status,
        patient_id: locked.patient_id.into(),
        hospital_id: locked.hospital_id.into(),
        total_amount: total,
    })
}

#[derive(Debug, sqlx::FromRow)]
struct LockedInvoiceRow {
    #[allow(dead_code)]
    id: Uuid,
    patient_id: Uuid,
    hospital_id: Uuid,
    currency: String,
    total_amount_minor: i64,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    invoice_id: Uuid,
    amount_minor: i64,
    method: String,
    reference: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    currency: String,
}

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, DatabaseError> {
        let currency: Currency = parse_column(&self.currency, "currency")?;
        Ok(Payment {
            id: self.id.into(),
            invoice_id: self.invoice_id.into(),
            amount: Money::from_minor(self.amount_minor, currency),
            method: parse_column(&self.method, "payment method")?,
            reference: self.reference,
            status: parse_column(&self.status, "payment status")?,
            created_at: self.created_at,
        })
    }
}
