//! Billing Domain - Invoices, Payments and Receipts
//!
//! This crate implements invoice construction with patient/insurer cost
//! splitting, and payment application against invoices.
//!
//! # Money rules
//!
//! All monetary values are integer minor units (`core_kernel::Money`).
//! An invoice always satisfies:
//! - `total_amount = subtotal + tax_amount - discount_amount`
//! - `insurer_share + patient_share = total_amount`
//!
//! # Status rules
//!
//! Invoice status is a pure function of the completed payments recorded
//! against it (`settlement::derive_status`), re-derivable at any time. The
//! sum of completed payments never exceeds the invoice total.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{InvoiceDraft, LineItemInput, ServiceCategory};
//!
//! let invoice = InvoiceDraft::new(patient_id, hospital_id, Currency::NGN)
//!     .item("Consultation", ServiceCategory::Consultation, 1, fee)
//!     .insurer("Sterling HMO", "PLC-91", dec!(80))
//!     .build()?;
//! ```

pub mod invoice;
pub mod engine;
pub mod payment;
pub mod receipt;
pub mod settlement;
pub mod events;
pub mod error;

pub use invoice::{Invoice, InvoiceItem, InvoiceStatus, InsurerDetails, ServiceCategory};
pub use engine::{InvoiceDraft, LineItemInput, DEFAULT_TAX_RATE_PERCENT};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use receipt::Receipt;
pub use events::BillingEvent;
pub use error::BillingError;
