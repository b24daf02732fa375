//! Core Kernel - Foundational types and utilities for the hospital revenue system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types stored in integer minor currency units
//! - Temporal types for validity windows and settlement periods
//! - Common identifiers and value objects
//! - Port primitives for external collaborators

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{ValidPeriod, DateRange, Timezone, TemporalError};
pub use identifiers::{
    InvoiceId, InvoiceItemId, PaymentId, ReceiptId, ClaimId,
    ContractId, PayoutId, ApprovalTaskId,
    RewardId, RedemptionId, LoyaltyTransactionId,
    PatientId, HospitalId, OwnerId, AuditEventId,
};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, NotificationPort, OutboundRequest, AuthStrategy};
