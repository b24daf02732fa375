//! Invoice DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::invoice::Invoice;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    /// ISO 4217 code; defaults to NGN
    pub currency: Option<String>,
    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub items: Vec<LineItemRequest>,
    pub tax_rate_percent: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    #[validate(nested)]
    pub insurer: Option<InsurerRequest>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price_minor: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InsurerRequest {
    #[validate(length(min = 1, max = 120))]
    pub provider: String,
    #[validate(length(min = 1, max = 120))]
    pub policy_number: String,
    pub coverage_percent: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub hospital_id: Uuid,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyPaymentRequest {
    pub amount_minor: i64,
    pub method: String,
    #[validate(length(max = 120))]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub description: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price_minor: i64,
    pub line_total_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub patient_id: Uuid,
    pub hospital_id: Uuid,
    pub currency: String,
    pub items: Vec<InvoiceItemResponse>,
    pub subtotal_minor: i64,
    pub tax_rate_percent: Decimal,
    pub tax_amount_minor: i64,
    pub discount_percent: Decimal,
    pub discount_amount_minor: i64,
    pub total_amount_minor: i64,
    pub insurer_provider: Option<String>,
    pub insurer_share_minor: i64,
    pub patient_share_minor: i64,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Claim raised automatically for the insurer share, when present
    pub claim_id: Option<Uuid>,
}

impl InvoiceResponse {
    pub fn from_invoice(invoice: &Invoice, claim_id: Option<Uuid>) -> Self {
        Self {
            id: invoice.id.into(),
            invoice_number: invoice.invoice_number.clone(),
            patient_id: invoice.patient_id.into(),
            hospital_id: invoice.hospital_id.into(),
            currency: invoice.currency.code().to_string(),
            items: invoice
                .items
                .iter()
                .map(|item| InvoiceItemResponse {
                    id: item.id.into(),
                    description: item.description.clone(),
                    category: item.category.as_str().to_string(),
                    quantity: item.quantity,
                    unit_price_minor: item.unit_price.minor_units(),
                    line_total_minor: item.line_total.minor_units(),
                })
                .collect(),
            subtotal_minor: invoice.subtotal.minor_units(),
            tax_rate_percent: invoice.tax_rate_percent,
            tax_amount_minor: invoice.tax_amount.minor_units(),
            discount_percent: invoice.discount_percent,
            discount_amount_minor: invoice.discount_amount.minor_units(),
            total_amount_minor: invoice.total_amount.minor_units(),
            insurer_provider: invoice.insurer.as_ref().map(|i| i.provider.clone()),
            insurer_share_minor: invoice.insurer_share.minor_units(),
            patient_share_minor: invoice.patient_share.minor_units(),
            status: invoice.status.as_str().to_string(),
            due_date: invoice.due_date,
            created_at: invoice.created_at,
            claim_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub invoice_id: Uuid,
    pub amount_minor: i64,
    pub method: String,
    pub receipt_number: String,
    pub invoice_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SweepOverdueResponse {
    pub transitioned: u64,
}
