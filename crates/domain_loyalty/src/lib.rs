//! Loyalty Domain - Patient Points Ledger
//!
//! Patients accrue points per (patient, hospital) account. The transaction
//! log is append-only and always reconciles with the balance:
//! `points_balance == Σ(transaction points)`. Lifetime points never decrease,
//! and the tier is a pure function of lifetime points, so tiers only advance.
//!
//! Redemption debits the balance and issues a coded reward redemption in one
//! atomic unit; the balance is re-checked inside that unit so two concurrent
//! redemptions can never both spend the same points.

pub mod account;
pub mod transaction;
pub mod reward;
pub mod ledger;
pub mod events;
pub mod error;

pub use account::{LoyaltyAccount, Tier};
pub use transaction::{LoyaltyTransaction, TransactionKind};
pub use reward::{RedemptionStatus, Reward, RewardRedemption, REDEMPTION_VALIDITY_DAYS};
pub use ledger::{apply_accrual, apply_redemption, reconcile, TierChange};
pub use events::LoyaltyEvent;
pub use error::LoyaltyError;
