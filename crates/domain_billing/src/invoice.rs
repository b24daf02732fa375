//! Invoice aggregate
//!
//! An invoice is created once per billable encounter and afterwards mutated
//! only by status transitions driven by payments. Invoices are never deleted;
//! `cancelled` is a soft state.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Currency, HospitalId, InvoiceId, InvoiceItemId, Money, PatientId};

use crate::error::BillingError;
use crate::payment::PaymentMethod;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Issued, no completed payment yet
    Pending,
    /// Partially settled
    Partial,
    /// Fully settled
    Paid,
    /// Past due date without full settlement
    Overdue,
    /// Voided before settlement
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("Unknown invoice status: {}", other)),
        }
    }
}

/// Clinical service categories for line items
///
/// The core does not validate clinical correctness, only monetary fields;
/// the category is carried for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Consultation,
    Procedure,
    Laboratory,
    Imaging,
    Pharmacy,
    Admission,
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Consultation => "consultation",
            ServiceCategory::Procedure => "procedure",
            ServiceCategory::Laboratory => "laboratory",
            ServiceCategory::Imaging => "imaging",
            ServiceCategory::Pharmacy => "pharmacy",
            ServiceCategory::Admission => "admission",
            ServiceCategory::Other => "other",
        }
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consultation" => Ok(ServiceCategory::Consultation),
            "procedure" => Ok(ServiceCategory::Procedure),
            "laboratory" => Ok(ServiceCategory::Laboratory),
            "imaging" => Ok(ServiceCategory::Imaging),
            "pharmacy" => Ok(ServiceCategory::Pharmacy),
            "admission" => Ok(ServiceCategory::Admission),
            "other" => Ok(ServiceCategory::Other),
            other => Err(format!("Unknown service category: {}", other)),
        }
    }
}

/// Insurer identity attached to an invoice
///
/// Provider identity and policy number are opaque strings owned by the
/// insurer gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurerDetails {
    pub provider: String,
    pub policy_number: String,
    /// Coverage percentage within [0, 100]
    pub coverage_percent: Decimal,
}

/// A line item on an invoice, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub description: String,
    pub category: ServiceCategory,
    pub quantity: i64,
    pub unit_price: Money,
    /// quantity × unit_price
    pub line_total: Money,
}

impl InvoiceItem {
    /// Creates a line item, validating its monetary fields
    pub fn new(
        description: impl Into<String>,
        category: ServiceCategory,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, BillingError> {
        let description = description.into();
        if quantity <= 0 {
            return Err(BillingError::InvalidQuantity {
                description,
                quantity,
            });
        }
        if unit_price.is_negative() {
            return Err(BillingError::NegativeUnitPrice { description });
        }
        let line_total = unit_price.checked_mul(quantity)?;
        Ok(Self {
            id: InvoiceItemId::new_v7(),
            description,
            category,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// An invoice for a patient encounter, split between patient and insurer
/// liability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable)
    pub invoice_number: String,
    /// Billed patient
    pub patient_id: PatientId,
    /// Billing hospital
    pub hospital_id: HospitalId,
    /// Currency for every monetary field
    pub currency: Currency,
    /// Line items
    pub items: Vec<InvoiceItem>,
    /// Sum of line totals
    pub subtotal: Money,
    /// Tax rate as a percentage
    pub tax_rate_percent: Decimal,
    /// subtotal × tax rate
    pub tax_amount: Money,
    /// Discount as a percentage of the subtotal
    pub discount_percent: Decimal,
    /// subtotal × discount percentage
    pub discount_amount: Money,
    /// subtotal + tax - discount
    pub total_amount: Money,
    /// Insurer identity, if covered
    pub insurer: Option<InsurerDetails>,
    /// Insurer's liability
    pub insurer_share: Money,
    /// Patient's liability
    pub patient_share: Money,
    /// Expected settlement method, if known at creation
    pub payment_method: Option<PaymentMethod>,
    /// Status
    pub status: InvoiceStatus,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns true if the invoice is past due and not yet settled or voided
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date
            && !matches!(
                self.status,
                InvoiceStatus::Paid | InvoiceStatus::Cancelled
            )
    }

    /// Returns the outstanding balance given the completed-payment total
    pub fn balance_due(&self, completed_total: Money) -> Result<Money, BillingError> {
        Ok(self.total_amount.checked_sub(&completed_total)?)
    }

    /// Voids the invoice
    ///
    /// Only invoices without any completed payment may be cancelled.
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        match self.status {
            InvoiceStatus::Pending | InvoiceStatus::Overdue => {
                self.status = InvoiceStatus::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
            status => Err(BillingError::NotCancellable { status }),
        }
    }
}

/// Generates a unique invoice number
pub(crate) fn generate_invoice_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("INV-{}", duration.as_millis() % 10_000_000_000)
}
