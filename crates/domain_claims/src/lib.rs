//! Claims Domain - Insurance Claim Lifecycle
//!
//! A claim is raised for the insurer share of an invoice and moves through a
//! one-directional state machine:
//!
//! ```text
//! submitted → processing → approved → paid
//!                        ↘ denied
//! ```
//!
//! `denied` and `paid` are terminal. Partial approval
//! (`approved_amount < claim_amount`) is a valid outcome whose gap is
//! surfaced for manual reconciliation, never auto-written-off. Paying an
//! approved claim produces a Payment against the originating invoice with
//! method `insurance` — the single integration point with the billing domain.

pub mod claim;
pub mod lifecycle;
pub mod ports;
pub mod adapters;
pub mod events;
pub mod error;

pub use claim::{ClaimStatus, InsuranceClaim};
pub use lifecycle::{ReconciliationGap, StatusChange};
pub use ports::{ClaimSubmission, GatewayAcknowledgement, InsurerGatewayPort};
pub use events::ClaimEvent;
pub use error::ClaimError;
