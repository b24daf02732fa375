//! Billing domain events
//!
//! Emitted to the communication collaborator after a successful write. The
//! emitting operation never depends on delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{HospitalId, InvoiceId, PatientId, PaymentId};

/// Events emitted by the billing domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingEvent {
    /// Invoice fully settled
    InvoicePaid {
        invoice_id: InvoiceId,
        patient_id: PatientId,
        hospital_id: HospitalId,
        total_minor: i64,
        timestamp: DateTime<Utc>,
    },

    /// A payment completed against an invoice
    PaymentRecorded {
        invoice_id: InvoiceId,
        payment_id: PaymentId,
        amount_minor: i64,
        method: String,
        timestamp: DateTime<Utc>,
    },
}

impl BillingEvent {
    /// Returns the event type name used on the wire
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::InvoicePaid { .. } => "invoice.paid",
            BillingEvent::PaymentRecorded { .. } => "payment.recorded",
        }
    }

    /// Serializes the event payload
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
