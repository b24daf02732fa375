//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the hospital revenue
//! core, implemented with SQLx using the repository pattern.
//!
//! # Atomic units of work
//!
//! Every mutating operation runs inside a single transaction that
//! (a) reads the current authoritative balance/status under a row lock,
//! (b) validates invariants against that freshly read value, and
//! (c) writes the new state. Locks are taken with `FOR UPDATE NOWAIT`; if
//! the store cannot grant the lock promptly the operation fails with a
//! retryable contention error instead of blocking.
//!
//! # Money columns
//!
//! All money columns are `BIGINT` minor units; percentages are `NUMERIC`.
//! The schema lives in `migrations/` and encodes the balance identities and
//! uniqueness rules as CHECK and UNIQUE constraints.

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::invoices::InvoiceRepository;
pub use repositories::payments::{PaymentApplied, PaymentProcessError, PaymentRepository};
pub use repositories::claims::{ClaimProcessError, ClaimRepository, ClaimSettlement};
pub use repositories::payouts::{PayoutProcessError, PayoutRepository};
pub use repositories::loyalty::{
    AwardOutcome, LoyaltyProcessError, LoyaltyRepository, RedemptionOutcome,
};
