//! Payout repository
//!
//! `process_period` is idempotent through the UNIQUE
//! `(owner_id, period_start, period_end)` constraint with insert-or-ignore
//! semantics; there is no SELECT-then-INSERT race. Batch runs isolate
//! per-owner failures and report every outcome.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use core_kernel::{Currency, DateRange, Money, OwnerId, PayoutId, Timezone};
use domain_payout::calculator::{self, PayoutOutcome, PayoutRunReport};
use domain_payout::contract::{ContractStatus, OwnerContract};
use domain_payout::error::PayoutError;
use domain_payout::payout::{ApprovalTask, OwnerPayout, PayoutPeriod, PayoutStatus, TaskStatus};

use crate::error::DatabaseError;
use crate::repositories::parse_column;

/// Errors from payout processing
#[derive(Debug, Error)]
pub enum PayoutProcessError {
    #[error(transparent)]
    Payout(#[from] PayoutError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for PayoutProcessError {
    fn from(error: sqlx::Error) -> Self {
        PayoutProcessError::Database(error.into())
    }
}

/// Repository for owner contracts and payouts
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: PgPool,
    /// Hospital-local timezone used for period day boundaries
    timezone: Timezone,
}

impl PayoutRepository {
    pub fn new(pool: PgPool, timezone: Timezone) -> Self {
        Self { pool, timezone }
    }

    /// Persists a contract (owner contracts are administered out of band)
    pub async fn create_contract(&self, contract: &OwnerContract) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO owner_contracts (
                id, hospital_id, owner_id, revenue_share_percent,
                minimum_guarantee_minor, currency, valid_from, valid_to, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::from(contract.id))
        .bind(Uuid::from(contract.hospital_id))
        .bind(Uuid::from(contract.owner_id))
        .bind(contract.revenue_share_percent)
        .bind(contract.minimum_guarantee.minor_units())
        .bind(contract.minimum_guarantee.currency().code())
        .bind(contract.validity.start)
        .bind(contract.validity.end)
        .bind(contract.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Computes and persists the payout for one (owner, period)
    ///
    /// Re-running for an existing (owner, period) is a no-op reported as
    /// `SkippedDuplicate`, so batch re-runs are safe. A missing active
    /// contract is a hard error — it usually signals a data problem, never a
    /// zero payout.
    pub async fn process_period(
        &self,
        owner_id: OwnerId,
        period: PayoutPeriod,
    ) -> Result<PayoutOutcome, PayoutProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let contract = self
            .resolve_active_contract(&mut tx, owner_id, &period)
            .await?
            .ok_or_else(|| PayoutError::NoActiveContract(owner_id.to_string()))?;

        let period_start = self
            .timezone
            .start_of_day(period.start)
            .map_err(PayoutError::from)?;
        let period_end = self
            .timezone
            .start_of_day(period.end)
            .map_err(PayoutError::from)?;

        let gross_minor = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(p.amount_minor), 0)::BIGINT
            FROM payments p
            JOIN invoices i ON i.id = p.invoice_id
            WHERE i.hospital_id = $1
              AND p.status = 'completed'
              AND p.created_at >= $2
              AND p.created_at < $3
            "#,
        )
        .bind(Uuid::from(contract.hospital_id))
        .bind(period_start)
        .bind(period_end)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let currency = contract.minimum_guarantee.currency();
        let computation =
            calculator::compute(Money::from_minor(gross_minor, currency), &contract)?;
        let payout = OwnerPayout::from_computation(
            owner_id,
            contract.hospital_id,
            contract.id,
            period,
            computation,
        );

        let inserted = sqlx::query(
            r#"
            INSERT INTO owner_payouts (
                id, owner_id, hospital_id, contract_id, period_start, period_end,
                currency, gross_revenue_minor, calculated_amount_minor,
                minimum_guarantee_minor, final_amount_minor, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (owner_id, period_start, period_end) DO NOTHING
            "#,
        )
        .bind(Uuid::from(payout.id))
        .bind(Uuid::from(payout.owner_id))
        .bind(Uuid::from(payout.hospital_id))
        .bind(Uuid::from(payout.contract_id))
        .bind(payout.period.start)
        .bind(payout.period.end)
        .bind(currency.code())
        .bind(payout.gross_revenue.minor_units())
        .bind(payout.calculated_amount.minor_units())
        .bind(payout.minimum_guarantee.minor_units())
        .bind(payout.final_amount.minor_units())
        .bind(payout.status.as_str())
        .bind(payout.created_at)
        .bind(payout.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Ok(PayoutOutcome::SkippedDuplicate { owner_id });
        }

        let task = ApprovalTask::for_payout(payout.id);
        sqlx::query(
            r#"
            INSERT INTO payout_approval_tasks (
                id, payout_id, assigned_role, status, completed_by, completed_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(task.id))
        .bind(Uuid::from(task.payout_id))
        .bind(&task.assigned_role)
        .bind(task.status.as_str())
        .bind(task.completed_by.clone())
        .bind(task.completed_at)
        .bind(task.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            owner_id = %owner_id,
            period = %period,
            final_amount = %payout.final_amount,
            "Created pending payout"
        );

        Ok(PayoutOutcome::Created {
            owner_id,
            payout_id: payout.id,
            final_amount_minor: payout.final_amount.minor_units(),
        })
    }

    /// Processes a calendar month for every owner with an active contract
    ///
    /// Individual failures never abort the batch; each owner's outcome is
    /// collected into the report.
    pub async fn process_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<PayoutRunReport, PayoutProcessError> {
        let period = PayoutPeriod::month(year, month).map_err(PayoutProcessError::from)?;
        let mut report = PayoutRunReport::new(period);

        let owners = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT owner_id FROM owner_contracts
            WHERE status = 'active' AND valid_from < $1 AND valid_to >= $2
            ORDER BY owner_id
            "#,
        )
        .bind(period.end)
        .bind(period.start)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        for owner in owners {
            let owner_id = OwnerId::from(owner);
            match self.process_period(owner_id, period).await {
                Ok(outcome) => report.push(outcome),
                Err(e) => report.push(PayoutOutcome::Failed {
                    owner_id,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    /// Loads a payout
    pub async fn fetch(&self, id: PayoutId) -> Result<OwnerPayout, DatabaseError> {
        let row = sqlx::query_as::<_, PayoutRow>("SELECT * FROM owner_payouts WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("Payout", id))?;
        row.into_domain().map_err(|e| match e {
            PayoutProcessError::Database(db) => db,
            PayoutProcessError::Payout(p) => DatabaseError::SerializationError(p.to_string()),
        })
    }

    /// Applies the single human approval and moves the payout to `approved`
    pub async fn approve(
        &self,
        id: PayoutId,
        approver: String,
    ) -> Result<OwnerPayout, PayoutProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = lock_payout(&mut tx, id).await?;
        let mut payout = row.into_domain()?;

        let task_row = sqlx::query_as::<_, TaskRow>(
            "SELECT * FROM payout_approval_tasks WHERE payout_id = $1 FOR UPDATE NOWAIT",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Approval task for payout", id))?;
        let mut task = task_row.into_domain()?;

        task.complete(approver.clone())?;
        payout.approve(approver)?;

        sqlx::query(
            "UPDATE payout_approval_tasks SET status = $1, completed_by = $2, completed_at = $3 WHERE id = $4",
        )
        .bind(task.status.as_str())
        .bind(task.completed_by.clone())
        .bind(task.completed_at)
        .bind(Uuid::from(task.id))
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        update_payout_row(&mut tx, &payout).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(payout)
    }

    /// Marks an approved payout as disbursed
    pub async fn mark_paid(
        &self,
        id: PayoutId,
        reference: String,
    ) -> Result<OwnerPayout, PayoutProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = lock_payout(&mut tx, id).await?;
        let mut payout = row.into_domain()?;
        payout.mark_paid(reference)?;

        update_payout_row(&mut tx, &payout).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(payout)
    }

    /// Resolves the contract governing the period; latest start date wins
    async fn resolve_active_contract(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner_id: OwnerId,
        period: &PayoutPeriod,
    ) -> Result<Option<OwnerContract>, PayoutProcessError> {
        let row = sqlx::query_as::<_, ContractRow>(
            r#"
            SELECT * FROM owner_contracts
            WHERE owner_id = $1 AND status = 'active'
              AND valid_from < $2 AND valid_to >= $3
            ORDER BY valid_from DESC
            LIMIT 1
            "#,
        )
        .bind(Uuid::from(owner_id))
        .bind(period.end)
        .bind(period.start)
        .fetch_optional(&mut **tx)
        .await
        .map_err(DatabaseError::from)?;

        row.map(ContractRow::into_domain).transpose()
    }
}

async fn lock_payout(
    tx: &mut Transaction<'_, Postgres>,
    id: PayoutId,
) -> Result<PayoutRow, PayoutProcessError> {
    let row = sqlx::query_as::<_, PayoutRow>(
        "SELECT * FROM owner_payouts WHERE id = $1 FOR UPDATE NOWAIT",
    )
    .bind(Uuid::from(id))
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::from)?
    .ok_or_else(|| DatabaseError::not_found("Payout", id))?;
    Ok(row)
}

async fn update_payout_row(
    tx: &mut Transaction<'_, Postgres>,
    payout: &OwnerPayout,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        UPDATE owner_payouts
        SET status = $1, approved_by = $2, approved_at = $3,
            paid_at = $4, payment_reference = $5, updated_at = $6
        WHERE id = $7
        "#,
    )
    .bind(payout.status.as_str())
    .bind(payout.approved_by.clone())
    .bind(payout.approved_at)
    .bind(payout.paid_at)
    .bind(payout.payment_reference.clone())
    .bind(payout.updated_at)
    .bind(Uuid::from(payout.id))
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct ContractRow {
    id: Uuid,
    hospital_id: Uuid,
    owner_id: Uuid,
    revenue_share_percent: Decimal,
    minimum_guarantee_minor: i64,
    currency: String,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
    status: String,
}

impl ContractRow {
    fn into_domain(self) -> Result<OwnerContract, PayoutProcessError> {
        let currency: Currency = parse_column(&self.currency, "currency")?;
        let status: ContractStatus = parse_column(&self.status, "contract status")?;
        let validity = DateRange::new(self.valid_from, self.valid_to)
            .map_err(PayoutError::from)?;
        let mut contract = OwnerContract::new(
            self.hospital_id.into(),
            self.owner_id.into(),
            self.revenue_share_percent,
            Money::from_minor(self.minimum_guarantee_minor, currency),
            validity,
            status,
        )?;
        contract.id = self.id.into();
        Ok(contract)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PayoutRow {
    id: Uuid,
    owner_id: Uuid,
    hospital_id: Uuid,
    contract_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
    currency: String,
    gross_revenue_minor: i64,
    calculated_amount_minor: i64,
    minimum_guarantee_minor: i64,
    final_amount_minor: i64,
    status: String,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PayoutRow {
    fn into_domain(self) -> Result<OwnerPayout, PayoutProcessError> {
        let currency: Currency = parse_column(&self.currency, "currency")?;
        let status: PayoutStatus = parse_column(&self.status, "payout status")?;
        let period = PayoutPeriod::new(self.period_start, self.period_end)?;
        Ok(OwnerPayout {
            id: self.id.into(),
            owner_id: self.owner_id.into(),
            hospital_id: self.hospital_id.into(),
            contract_id: self.contract_id.into(),
            period,
            gross_revenue: Money::from_minor(self.gross_revenue_minor, currency),
            calculated_amount: Money::from_minor(self.calculated_amount_minor, currency),
            minimum_guarantee: Money::from_minor(self.minimum_guarantee_minor, currency),
            final_amount: Money::from_minor(self.final_amount_minor, currency),
            status,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            paid_at: self.paid_at,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    payout_id: Uuid,
    assigned_role: String,
    status: String,
    completed_by: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_domain(self) -> Result<ApprovalTask, PayoutProcessError> {
        let status: TaskStatus = parse_column(&self.status, "task status")?;
        Ok(ApprovalTask {
            id: self.id.into(),
            payout_id: self.payout_id.into(),
            assigned_role: self.assigned_role,
            status,
            completed_by: self.completed_by,
            completed_at: self.completed_at,
            created_at: self.created_at,
        })
    }
}
