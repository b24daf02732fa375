//! Payment receipts
//!
//! Receipts are append-only; one is produced for every successful payment in
//! the same unit of work that records the payment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PaymentId, ReceiptId};

use crate::payment::{Payment, PaymentMethod};

/// An audit receipt for a completed payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    /// Receipt number (human-readable)
    pub receipt_number: String,
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Issues a receipt for a payment
    pub fn for_payment(payment: &Payment) -> Self {
        Self {
            id: ReceiptId::new_v7(),
            receipt_number: generate_receipt_number(),
            payment_id: payment.id,
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            method: payment.method,
            issued_at: Utc::now(),
        }
    }
}

fn generate_receipt_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("RCT-{}", duration.as_millis() % 10_000_000_000)
}
