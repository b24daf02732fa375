//! Loyalty repository
//!
//! Accruals and redemptions are single transactions over the locked account
//! row. Account creation uses `ON CONFLICT DO NOTHING` (first-write-wins, no
//! duplicate accounts per patient/hospital). Redemption re-checks the
//! balance inside the same transaction that debits it, closing the
//! double-spend race between concurrent redemptions.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::{DateRange, HospitalId, PatientId, RewardId};
use domain_loyalty::account::LoyaltyAccount;
use domain_loyalty::error::LoyaltyError;
use domain_loyalty::ledger::{self, TierChange};
use domain_loyalty::reward::{Reward, RewardRedemption};
use domain_loyalty::transaction::LoyaltyTransaction;

use crate::error::DatabaseError;
use crate::repositories::parse_column;

/// Errors from loyalty processing
#[derive(Debug, Error)]
pub enum LoyaltyProcessError {
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for LoyaltyProcessError {
    fn from(error: sqlx::Error) -> Self {
        LoyaltyProcessError::Database(error.into())
    }
}

/// Result of a points accrual
#[derive(Debug, Clone)]
pub struct AwardOutcome {
    pub account: LoyaltyAccount,
    pub transaction: LoyaltyTransaction,
    pub tier_change: Option<TierChange>,
}

/// Result of a reward redemption
#[derive(Debug, Clone)]
pub struct RedemptionOutcome {
    pub account: LoyaltyAccount,
    pub redemption: RewardRedemption,
    pub transaction: LoyaltyTransaction,
}

/// Repository for loyalty accounts, transactions and rewards
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: PgPool,
}

impl LoyaltyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Credits points to the (patient, hospital) account
    ///
    /// Creates the account with zero balances if absent, then locks it and
    /// applies the accrual and transaction row in one unit.
    pub async fn award_points(
        &self,
        patient_id: PatientId,
        hospital_id: HospitalId,
        points: i64,
        reference: Option<String>,
    ) -> Result<AwardOutcome, LoyaltyProcessError> {
        if points <= 0 {
            return Err(LoyaltyError::NonPositivePoints.into());
        }

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let fresh = LoyaltyAccount::open(patient_id, hospital_id);
        sqlx::query(
            r#"
            INSERT INTO loyalty_accounts (
                patient_id, hospital_id, points_balance, lifetime_points,
                tier, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (patient_id, hospital_id) DO NOTHING
            "#,
        )
        .bind(Uuid::from(fresh.patient_id))
        .bind(Uuid::from(fresh.hospital_id))
        .bind(fresh.points_balance)
        .bind(fresh.lifetime_points)
        .bind(fresh.tier.as_str())
        .bind(fresh.created_at)
        .bind(fresh.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let mut account = lock_account(&mut tx, patient_id, hospital_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Loyalty account", patient_id))?;

        let tier_change = ledger::apply_accrual(&mut account, points)?;
        let transaction = LoyaltyTransaction::earned(patient_id, hospital_id, points, reference);

        insert_transaction_tx(&mut tx, &transaction).await?;
        update_account_tx(&mut tx, &account).await?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(AwardOutcome {
            account,
            transaction,
            tier_change,
        })
    }

    /// Redeems a reward for the patient
    ///
    /// One transaction: lock the reward (active, in window, under cap), lock
    /// the account, re-check the balance, append the transaction row, debit
    /// the balance, insert the redemption, and bump the reward counter.
    pub async fn redeem_points(
        &self,
        patient_id: PatientId,
        reward_id: RewardId,
    ) -> Result<RedemptionOutcome, LoyaltyProcessError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        let today = Utc::now().date_naive();

        let reward_row =
            sqlx::query_as::<_, RewardRow>("SELECT * FROM rewards WHERE id = $1 FOR UPDATE NOWAIT")
                .bind(Uuid::from(reward_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::from)?
                .ok_or_else(|| DatabaseError::not_found("Reward", reward_id))?;
        let reward = reward_row.into_domain()?;

        reward.validate_redeemable(today)?;

        let mut account = lock_account(&mut tx, patient_id, reward.hospital_id)
            .await?
            .ok_or(LoyaltyError::InsufficientPoints {
                required: reward.points_required,
                balance: 0,
            })?;

        ledger::apply_redemption(&mut account, reward.points_required)?;

        let redemption = RewardRedemption::issue(&reward, patient_id, today);
        let transaction = LoyaltyTransaction::redeemed(
            patient_id,
            reward.hospital_id,
            reward.points_required,
            Some(redemption.redemption_code.clone()),
        );

        insert_transaction_tx(&mut tx, &transaction).await?;
        update_account_tx(&mut tx, &account).await?;

        sqlx::query(
            r#"
            INSERT INTO reward_redemptions (
                id, reward_id, patient_id, hospital_id, points_used,
                status, redemption_code, expiry_date, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::from(redemption.id))
        .bind(Uuid::from(redemption.reward_id))
        .bind(Uuid::from(redemption.patient_id))
        .bind(Uuid::from(redemption.hospital_id))
        .bind(redemption.points_used)
        .bind(redemption.status.as_str())
        .bind(&redemption.redemption_code)
        .bind(redemption.expiry_date)
        .bind(redemption.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        sqlx::query("UPDATE rewards SET redeemed_count = redeemed_count + 1 WHERE id = $1")
            .bind(Uuid::from(reward.id))
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(RedemptionOutcome {
            account,
            redemption,
            transaction,
        })
    }

    /// Loads an account
    pub async fn account(
        &self,
        patient_id: PatientId,
        hospital_id: HospitalId,
    ) -> Result<LoyaltyAccount, DatabaseError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM loyalty_accounts WHERE patient_id = $1 AND hospital_id = $2",
        )
        .bind(Uuid::from(patient_id))
        .bind(Uuid::from(hospital_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("Loyalty account", patient_id))?;
        row.into_domain()
    }

    /// Lists an account's transactions, oldest first
    pub async fn transactions(
        &self,
        patient_id: PatientId,
        hospital_id: HospitalId,
    ) -> Result<Vec<LoyaltyTransaction>, DatabaseError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM loyalty_transactions
            WHERE patient_id = $1 AND hospital_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(Uuid::from(patient_id))
        .bind(Uuid::from(hospital_id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    /// Checks the ledger reconciliation rule against stored state
    pub async fn reconcile_account(
        &self,
        patient_id: PatientId,
        hospital_id: HospitalId,
    ) -> Result<bool, DatabaseError> {
        let account = self.account(patient_id, hospital_id).await?;
        let transactions = self.transactions(patient_id, hospital_id).await?;
        Ok(ledger::reconcile(account.points_balance, &transactions))
    }

    /// Persists a reward (catalogue administration is out of band)
    pub async fn create_reward(&self, reward: &Reward) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO rewards (
                id, hospital_id, name, description, points_required,
                total_available, redeemed_count, valid_from, valid_to, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::from(reward.id))
        .bind(Uuid::from(reward.hospital_id))
        .bind(&reward.name)
        .bind(reward.description.clone())
        .bind(reward.points_required)
        .bind(reward.total_available)
        .bind(reward.redeemed_count)
        .bind(reward.validity.start)
        .bind(reward.validity.end)
        .bind(reward.is_active)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }
}

async fn lock_account(
    tx: &mut Transaction<'_, Postgres>,
    patient_id: PatientId,
    hospital_id: HospitalId,
) -> Result<Option<LoyaltyAccount>, LoyaltyProcessError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT * FROM loyalty_accounts
        WHERE patient_id = $1 AND hospital_id = $2
        FOR UPDATE NOWAIT
        "#,
    )
    .bind(Uuid::from(patient_id))
    .bind(Uuid::from(hospital_id))
    .fetch_optional(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;

    row.map(AccountRow::into_domain)
        .transpose()
        .map_err(LoyaltyProcessError::from)
}

async fn insert_transaction_tx(
    tx: &mut Transaction<'_, Postgres>,
    transaction: &LoyaltyTransaction,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO loyalty_transactions (
            id, patient_id, hospital_id, points, kind, reference, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::from(transaction.id))
    .bind(Uuid::from(transaction.patient_id))
    .bind(Uuid::from(transaction.hospital_id))
    .bind(transaction.points)
    .bind(transaction.kind.as_str())
    .bind(transaction.reference.clone())
    .bind(transaction.created_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

async fn update_account_tx(
    tx: &mut Transaction<'_, Postgres>,
    account: &LoyaltyAccount,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        UPDATE loyalty_accounts
        SET points_balance = $1, lifetime_points = $2, tier = $3, updated_at = $4
        WHERE patient_id = $5 AND hospital_id = $6
        "#,
    )
    .bind(account.points_balance)
    .bind(account.lifetime_points)
    .bind(account.tier.as_str())
    .bind(account.updated_at)
    .bind(Uuid::from(account.patient_id))
    .bind(Uuid::from(account.hospital_id))
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from)?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    patient_id: Uuid,
    hospital_id: Uuid,
    points_balance: i64,
    lifetime_points: i64,
    tier: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_domain(self) -> Result<LoyaltyAccount, DatabaseError> {
        Ok(LoyaltyAccount {
            patient_id: self.patient_id.into(),
            hospital_id: self.hospital_id.into(),
            points_balance: self.points_balance,
            lifetime_points: self.lifetime_points,
            tier: parse_column(&self.tier, "tier")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    patient_id: Uuid,
    hospital_id: Uuid,
    points: i64,
    kind: String,
    reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> Result<LoyaltyTransaction, DatabaseError> {
        Ok(LoyaltyTransaction {
            id: self.id.into(),
            patient_id: self.patient_id.into(),
            hospital_id: self.hospital_id.into(),
            points: self.points,
            kind: parse_column(&self.kind, "transaction kind")?,
            reference: self.reference,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RewardRow {
    id: Uuid,
    hospital_id: Uuid,
    name: String,
    description: Option<String>,
    points_required: i64,
    total_available: Option<i64>,
    redeemed_count: i64,
    valid_from: chrono::NaiveDate,
    valid_to: chrono::NaiveDate,
    is_active: bool,
}

impl RewardRow {
    fn into_domain(self) -> Result<Reward, DatabaseError> {
        let validity = DateRange::new(self.valid_from, self.valid_to)
            .map_err(|e| DatabaseError::SerializationError(format!("Invalid reward window: {}", e)))?;
        Ok(Reward {
            id: self.id.into(),
            hospital_id: self.hospital_id.into(),
            name: self.name,
            description: self.description,
            points_required: self.points_required,
            total_available: self.total_available,
            redeemed_count: self.redeemed_count,
            validity,
            is_active: self.is_active,
        })
    }
}
