//! Payout Domain - Owner Revenue Distribution
//!
//! Hospital owners are paid a contractual share of their hospital's collected
//! revenue per settlement period, floored by a minimum guarantee:
//!
//! `final_amount = max(gross_revenue × share%, minimum_guarantee)`
//!
//! One payout exists per (owner, period) pair; creation is idempotent so
//! batch re-runs are safe. A payout requires a single human approval before
//! it may move `pending → approved → paid`.

pub mod contract;
pub mod payout;
pub mod calculator;
pub mod events;
pub mod error;

pub use contract::{ContractStatus, OwnerContract};
pub use payout::{ApprovalTask, OwnerPayout, PayoutPeriod, PayoutStatus, TaskStatus};
pub use calculator::{compute, PayoutComputation, PayoutOutcome, PayoutRunReport};
pub use events::PayoutEvent;
pub use error::PayoutError;
