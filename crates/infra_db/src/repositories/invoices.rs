//! Invoice repository
//!
//! Invoice creation is all-or-nothing: the invoice, its line items and the
//! automatically raised insurance claim (when the insurer share is positive)
//! are inserted in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{Currency, HospitalId, InvoiceId, Money};
use domain_billing::invoice::{InsurerDetails, Invoice, InvoiceItem, InvoiceStatus};
use domain_claims::claim::InsuranceClaim;
use domain_claims::lifecycle::StatusChange;

use crate::error::DatabaseError;
use crate::repositories::{claims, parse_column};

/// Repository for invoice aggregates
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a new invoice with its items and optional auto-created claim
    ///
    /// Everything is inserted in a single transaction; a rejected draft never
    /// reaches this method.
    pub async fn create_with_claim(
        &self,
        invoice: &Invoice,
        claim: Option<&InsuranceClaim>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, patient_id, hospital_id, currency,
                subtotal_minor, tax_rate_percent, tax_amount_minor,
                discount_percent, discount_amount_minor, total_amount_minor,
                insurer_provider, insurer_policy_number, coverage_percent,
                insurer_share_minor, patient_share_minor,
                payment_method, status, due_date, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            "#,
        )
        .bind(Uuid::from(invoice.id))
        .bind(&invoice.invoice_number)
        .bind(Uuid::from(invoice.patient_id))
        .bind(Uuid::from(invoice.hospital_id))
        .bind(invoice.currency.code())
        .bind(invoice.subtotal.minor_units())
        .bind(invoice.tax_rate_percent)
        .bind(invoice.tax_amount.minor_units())
        .bind(invoice.discount_percent)
        .bind(invoice.discount_amount.minor_units())
        .bind(invoice.total_amount.minor_units())
        .bind(invoice.insurer.as_ref().map(|i| i.provider.clone()))
        .bind(invoice.insurer.as_ref().map(|i| i.policy_number.clone()))
        .bind(invoice.insurer.as_ref().map(|i| i.coverage_percent))
        .bind(invoice.insurer_share.minor_units())
        .bind(invoice.patient_share.minor_units())
        .bind(invoice.payment_method.map(|m| m.as_str()))
        .bind(invoice.status.as_str())
        .bind(invoice.due_date)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        for item in &invoice.items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, description, category,
                    quantity, unit_price_minor, line_total_minor
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::from(item.id))
            .bind(Uuid::from(invoice.id))
            .bind(&item.description)
            .bind(item.category.as_str())
            .bind(item.quantity)
            .bind(item.unit_price.minor_units())
            .bind(item.line_total.minor_units())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        }

        if let Some(claim) = claim {
            claims::insert_claim_tx(&mut tx, claim).await?;
            claims::insert_history_tx(
                &mut tx,
                &StatusChange::record(claim.id, None, claim.status, None, None),
            )
            .await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Loads an invoice with its line items
    pub async fn fetch(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>("SELECT * FROM invoices WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("Invoice", id))?;

        let items = sqlx::query_as::<_, InvoiceItemRow>(
            "SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY description",
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.into_domain(items)
    }

    /// Lists a hospital's invoices, newest first
    pub async fn list_for_hospital(
        &self,
        hospital_id: HospitalId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT * FROM invoices
            WHERE hospital_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(Uuid::from(hospital_id))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, InvoiceItemRow>(
            "SELECT * FROM invoice_items WHERE invoice_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| {
                let items = item_rows
                    .iter()
                    .filter(|i| i.invoice_id == row.id)
                    .cloned()
                    .collect();
                row.into_domain(items)
            })
            .collect()
    }

    /// Moves past-due pending/partial invoices to `overdue`
    ///
    /// Triggered externally (cron-style); returns the number of invoices
    /// transitioned.
    pub async fn sweep_overdue(&self, today: NaiveDate) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'overdue', updated_at = NOW()
            WHERE due_date < $1 AND status IN ('pending', 'partial')
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct InvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    pub currency: String,
    pub subtotal_minor: i64,
    pub tax_rate_percent: Decimal,
    pub tax_amount_minor: i64,
    pub discount_percent: Decimal,
    pub discount_amount_minor: i64,
    pub total_amount_minor: i64,
    pub insurer_provider: Option<String>,
    pub insurer_policy_number: Option<String>,
    pub coverage_percent: Option<Decimal>,
    pub insurer_share_minor: i64,
    pub patient_share_minor: i64,
    pub payment_method: Option<String>,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct InvoiceItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price_minor: i64,
    pub line_total_minor: i64,
}

impl InvoiceRow {
    pub(crate) fn currency(&self) -> Result<Currency, DatabaseError> {
        parse_column(&self.currency, "currency")
    }

    pub(crate) fn into_domain(
        self,
        item_rows: Vec<InvoiceItemRow>,
    ) -> Result<Invoice, DatabaseError> {
        let currency = self.currency()?;
        let status: InvoiceStatus = parse_column(&self.status, "invoice status")?;
        let payment_method = self
            .payment_method
            .as_deref()
            .map(|m| parse_column(m, "payment method"))
            .transpose()?;

        let insurer = match (&self.insurer_provider, &self.insurer_policy_number) {
            (Some(provider), Some(policy_number)) => Some(InsurerDetails {
                provider: provider.clone(),
                policy_number: policy_number.clone(),
                coverage_percent: self.coverage_percent.unwrap_or(Decimal::ZERO),
            }),
            _ => None,
        };

        let items = item_rows
            .into_iter()
            .map(|row| {
                Ok(InvoiceItem {
                    id: row.id.into(),
                    description: row.description,
                    category: parse_column(&row.category, "service category")?,
                    quantity: row.quantity,
                    unit_price: Money::from_minor(row.unit_price_minor, currency),
                    line_total: Money::from_minor(row.line_total_minor, currency),
                })
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?;

        Ok(Invoice {
            id: self.id.into(),
            invoice_number: self.invoice_number,
            patient_id: self.patient_id.into(),
            hospital_id: self.hospital_id.into(),
            currency,
            items,
            subtotal: Money::from_minor(self.subtotal_minor, currency),
            tax_rate_percent: self.tax_rate_percent,
            tax_amount: Money::from_minor(self.tax_amount_minor, currency),
            discount_percent: self.discount_percent,
            discount_amount: Money::from_minor(self.discount_amount_minor, currency),
            total_amount: Money::from_minor(self.total_amount_minor, currency),
            insurer,
            insurer_share: Money::from_minor(self.insurer_share_minor, currency),
            patient_share: Money::from_minor(self.patient_share_minor, currency),
            payment_method,
            status,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
