//! Test Data Builders
//!
//! Builder patterns for constructing domain aggregates with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, DateRange, HospitalId, Money, OwnerId, PatientId, RewardId};
use domain_billing::engine::InvoiceDraft;
use domain_billing::invoice::{Invoice, ServiceCategory};
use domain_claims::claim::InsuranceClaim;
use domain_loyalty::reward::Reward;
use domain_payout::contract::{ContractStatus, OwnerContract};

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test invoices
///
/// Defaults to the standard scenario: one ₦10,000 line item, 7.5% tax, no
/// discount, no insurer.
pub struct TestInvoiceBuilder {
    patient_id: PatientId,
    hospital_id: HospitalId,
    currency: Currency,
    items: Vec<(String, ServiceCategory, i64, Money)>,
    tax_rate_percent: Decimal,
    discount_percent: Decimal,
    coverage: Option<(String, String, Decimal)>,
    due_date: Option<NaiveDate>,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new(),
            hospital_id: HospitalId::new(),
            currency: Currency::NGN,
            items: vec![(
                "Encounter".to_string(),
                ServiceCategory::Consultation,
                1,
                MoneyFixtures::ngn_10_000(),
            )],
            tax_rate_percent: dec!(7.5),
            discount_percent: Decimal::ZERO,
            coverage: None,
            due_date: None,
        }
    }

    /// Sets the patient
    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    /// Sets the hospital
    pub fn with_hospital(mut self, hospital_id: HospitalId) -> Self {
        self.hospital_id = hospital_id;
        self
    }

    /// Replaces the line items
    pub fn with_items(mut self, items: Vec<(String, ServiceCategory, i64, Money)>) -> Self {
        self.items = items;
        self
    }

    /// Adds a line item
    pub fn with_item(
        mut self,
        description: impl Into<String>,
        category: ServiceCategory,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        self.items
            .push((description.into(), category, quantity, unit_price));
        self
    }

    /// Sets the tax rate percentage
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate_percent = rate;
        self
    }

    /// Sets the discount percentage
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount_percent = discount;
        self
    }

    /// Attaches the standard insurer with the given coverage
    pub fn with_coverage(mut self, coverage_percent: Decimal) -> Self {
        self.coverage = Some((
            StringFixtures::provider().to_string(),
            StringFixtures::policy_number().to_string(),
            coverage_percent,
        ));
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Builds the invoice
    pub fn build(self) -> Invoice {
        let mut draft = InvoiceDraft::new(self.patient_id, self.hospital_id, self.currency)
            .tax_rate_percent(self.tax_rate_percent)
            .discount_percent(self.discount_percent);
        for (description, category, quantity, unit_price) in self.items {
            draft = draft.item(description, category, quantity, unit_price);
        }
        if let Some((provider, policy_number, coverage)) = self.coverage {
            draft = draft.insurer(provider, policy_number, coverage);
        }
        if let Some(due_date) = self.due_date {
            draft = draft.due_date(due_date);
        }
        draft.build().expect("Test invoice draft must be valid")
    }
}

/// Builder for constructing test claims
pub struct TestClaimBuilder {
    invoice: Option<Invoice>,
    claim_amount: Money,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            invoice: None,
            claim_amount: MoneyFixtures::ngn_8_600(),
        }
    }

    /// Derives the claim from an invoice's insurer share
    pub fn for_invoice(mut self, invoice: &Invoice) -> Self {
        self.claim_amount = invoice.insurer_share;
        self.invoice = Some(invoice.clone());
        self
    }

    /// Sets the claim amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.claim_amount = amount;
        self
    }

    /// Builds a submitted claim
    pub fn build(self) -> InsuranceClaim {
        let (invoice_id, patient_id) = match &self.invoice {
            Some(invoice) => (invoice.id, invoice.patient_id),
            None => (core_kernel::InvoiceId::new(), PatientId::new()),
        };
        InsuranceClaim::submit(
            invoice_id,
            patient_id,
            StringFixtures::provider(),
            StringFixtures::policy_number(),
            self.claim_amount,
        )
        .expect("Test claim must be valid")
    }

    /// Builds a claim already moved into adjudication
    pub fn build_processing(self) -> InsuranceClaim {
        let mut claim = self.build();
        claim.begin_processing().expect("submitted claim can process");
        claim
    }
}

/// Builder for constructing test owner contracts
pub struct TestContractBuilder {
    hospital_id: HospitalId,
    owner_id: OwnerId,
    revenue_share_percent: Decimal,
    minimum_guarantee: Money,
    validity: DateRange,
    status: ContractStatus,
}

impl Default for TestContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContractBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            hospital_id: HospitalId::new(),
            owner_id: OwnerId::new(),
            revenue_share_percent: dec!(20),
            minimum_guarantee: MoneyFixtures::minimum_guarantee(),
            validity: TemporalFixtures::contract_year(),
            status: ContractStatus::Active,
        }
    }

    /// Sets the hospital
    pub fn with_hospital(mut self, hospital_id: HospitalId) -> Self {
        self.hospital_id = hospital_id;
        self
    }

    /// Sets the owner
    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Sets the revenue share percentage
    pub fn with_share(mut self, share: Decimal) -> Self {
        self.revenue_share_percent = share;
        self
    }

    /// Sets the minimum guarantee
    pub fn with_guarantee(mut self, guarantee: Money) -> Self {
        self.minimum_guarantee = guarantee;
        self
    }

    /// Sets the validity window
    pub fn with_validity(mut self, validity: DateRange) -> Self {
        self.validity = validity;
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: ContractStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the contract
    pub fn build(self) -> OwnerContract {
        OwnerContract::new(
            self.hospital_id,
            self.owner_id,
            self.revenue_share_percent,
            self.minimum_guarantee,
            self.validity,
            self.status,
        )
        .expect("Test contract must be valid")
    }
}

/// Builder for constructing test rewards
pub struct TestRewardBuilder {
    hospital_id: HospitalId,
    points_required: i64,
    total_available: Option<i64>,
    validity: DateRange,
    is_active: bool,
}

impl Default for TestRewardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRewardBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            hospital_id: HospitalId::new(),
            points_required: 400,
            total_available: Some(100),
            validity: TemporalFixtures::open_reward_window(),
            is_active: true,
        }
    }

    /// Sets the hospital
    pub fn with_hospital(mut self, hospital_id: HospitalId) -> Self {
        self.hospital_id = hospital_id;
        self
    }

    /// Sets the points required
    pub fn with_points_required(mut self, points: i64) -> Self {
        self.points_required = points;
        self
    }

    /// Sets the redemption cap
    pub fn with_cap(mut self, cap: Option<i64>) -> Self {
        self.total_available = cap;
        self
    }

    /// Sets the validity window
    pub fn with_validity(mut self, validity: DateRange) -> Self {
        self.validity = validity;
        self
    }

    /// Deactivates the reward
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Builds the reward
    pub fn build(self) -> Reward {
        Reward {
            id: RewardId::new(),
            hospital_id: self.hospital_id,
            name: StringFixtures::reward_name().to_string(),
            description: None,
            points_required: self.points_required,
            total_available: self.total_available,
            redeemed_count: 0,
            validity: self.validity,
            is_active: self.is_active,
        }
    }
}
