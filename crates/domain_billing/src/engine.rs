//! Invoice construction
//!
//! `InvoiceDraft` validates its inputs completely before producing an
//! `Invoice`; creation is all-or-nothing and nothing is persisted for a
//! rejected draft.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, HospitalId, InvoiceId, Money, PatientId};

use crate::error::BillingError;
use crate::invoice::{
    generate_invoice_number, InsurerDetails, Invoice, InvoiceItem, InvoiceStatus, ServiceCategory,
};
use crate::payment::PaymentMethod;

/// Default tax rate applied when the draft does not override it
pub const DEFAULT_TAX_RATE_PERCENT: Decimal = dec!(7.5);

const DEFAULT_DUE_DAYS: u64 = 30;

/// A raw line item supplied by the encounter service
#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub description: String,
    pub category: ServiceCategory,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Builder for a new invoice
///
/// Computes, in integer minor units:
/// `subtotal = Σ(quantity × unit_price)`,
/// `tax = subtotal × tax_rate`, `discount = subtotal × discount%`,
/// `total = subtotal + tax - discount`, and the insurer/patient split.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    patient_id: PatientId,
    hospital_id: HospitalId,
    currency: Currency,
    items: Vec<LineItemInput>,
    tax_rate_percent: Decimal,
    discount_percent: Decimal,
    insurer: Option<InsurerDetails>,
    due_date: Option<NaiveDate>,
    payment_method: Option<PaymentMethod>,
}

impl InvoiceDraft {
    pub fn new(patient_id: PatientId, hospital_id: HospitalId, currency: Currency) -> Self {
        Self {
            patient_id,
            hospital_id,
            currency,
            items: Vec::new(),
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            discount_percent: Decimal::ZERO,
            insurer: None,
            due_date: None,
            payment_method: None,
        }
    }

    /// Adds a line item
    pub fn item(
        mut self,
        description: impl Into<String>,
        category: ServiceCategory,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        self.items.push(LineItemInput {
            description: description.into(),
            category,
            quantity,
            unit_price,
        });
        self
    }

    /// Adds a batch of line items
    pub fn items(mut self, items: impl IntoIterator<Item = LineItemInput>) -> Self {
        self.items.extend(items);
        self
    }

    /// Overrides the default tax rate
    pub fn tax_rate_percent(mut self, rate: Decimal) -> Self {
        self.tax_rate_percent = rate;
        self
    }

    /// Sets a discount percentage on the subtotal
    pub fn discount_percent(mut self, discount: Decimal) -> Self {
        self.discount_percent = discount;
        self
    }

    /// Attaches an insurer with a coverage percentage
    pub fn insurer(
        mut self,
        provider: impl Into<String>,
        policy_number: impl Into<String>,
        coverage_percent: Decimal,
    ) -> Self {
        self.insurer = Some(InsurerDetails {
            provider: provider.into(),
            policy_number: policy_number.into(),
            coverage_percent,
        });
        self
    }

    /// Sets the payment due date (defaults to 30 days from creation)
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Records the expected settlement method
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Validates the draft and produces a pending invoice
    pub fn build(self) -> Result<Invoice, BillingError> {
        if self.items.is_empty() {
            return Err(BillingError::EmptyLineItems);
        }
        validate_percent("tax_rate", self.tax_rate_percent)?;
        validate_percent("discount_percentage", self.discount_percent)?;
        if let Some(insurer) = &self.insurer {
            validate_percent("coverage_percentage", insurer.coverage_percent)?;
        }

        let mut items = Vec::with_capacity(self.items.len());
        let mut subtotal = Money::zero(self.currency);
        for input in self.items {
            let item = InvoiceItem::new(
                input.description,
                input.category,
                input.quantity,
                input.unit_price,
            )?;
            subtotal = subtotal.checked_add(&item.line_total)?;
            items.push(item);
        }

        let tax_amount = subtotal.percentage(self.tax_rate_percent)?;
        let discount_amount = subtotal.percentage(self.discount_percent)?;
        let total_amount = subtotal
            .checked_add(&tax_amount)?
            .checked_sub(&discount_amount)?;

        let (insurer_share, patient_share) = match &self.insurer {
            Some(insurer) => total_amount.split_percentage(insurer.coverage_percent)?,
            None => (Money::zero(self.currency), total_amount),
        };

        let now = Utc::now();
        let due_date = self
            .due_date
            .unwrap_or_else(|| now.date_naive() + Days::new(DEFAULT_DUE_DAYS));

        Ok(Invoice {
            id: InvoiceId::new_v7(),
            invoice_number: generate_invoice_number(),
            patient_id: self.patient_id,
            hospital_id: self.hospital_id,
            currency: self.currency,
            items,
            subtotal,
            tax_rate_percent: self.tax_rate_percent,
            tax_amount,
            discount_percent: self.discount_percent,
            discount_amount,
            total_amount,
            insurer: self.insurer,
            insurer_share,
            patient_share,
            payment_method: self.payment_method,
            status: InvoiceStatus::Pending,
            due_date,
            created_at: now,
            updated_at: now,
        })
    }
}

fn validate_percent(field: &'static str, value: Decimal) -> Result<(), BillingError> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(BillingError::PercentageOutOfRange { field, value });
    }
    Ok(())
}
