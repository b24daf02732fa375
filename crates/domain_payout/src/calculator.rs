//! Payout calculation
//!
//! Pure computation of a period payout from aggregated revenue and the
//! governing contract, plus the report types for batch runs. Batch
//! processing isolates per-owner failures; each owner's outcome is collected
//! and returned, never silently swallowed.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, OwnerId, PayoutId};

use crate::contract::OwnerContract;
use crate::error::PayoutError;
use crate::payout::PayoutPeriod;

/// The result of applying a contract to a period's gross revenue
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PayoutComputation {
    pub gross_revenue: Money,
    pub calculated_amount: Money,
    pub minimum_guarantee: Money,
    pub final_amount: Money,
}

/// Computes `calculated = gross × share%` and
/// `final = max(calculated, minimum_guarantee)`
pub fn compute(
    gross_revenue: Money,
    contract: &OwnerContract,
) -> Result<PayoutComputation, PayoutError> {
    if gross_revenue.is_negative() {
        return Err(PayoutError::NegativeRevenue);
    }
    let calculated_amount = gross_revenue.percentage(contract.revenue_share_percent)?;
    let final_amount = if contract.minimum_guarantee > calculated_amount {
        contract.minimum_guarantee
    } else {
        calculated_amount
    };
    Ok(PayoutComputation {
        gross_revenue,
        calculated_amount,
        minimum_guarantee: contract.minimum_guarantee,
        final_amount,
    })
}

/// Per-owner outcome of a batch payout run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayoutOutcome {
    /// A new pending payout was created
    Created {
        owner_id: OwnerId,
        payout_id: PayoutId,
        final_amount_minor: i64,
    },
    /// A payout already existed for this (owner, period); no-op
    SkippedDuplicate { owner_id: OwnerId },
    /// Processing failed for this owner; the batch continued
    Failed { owner_id: OwnerId, reason: String },
}

/// Report of a batch payout run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRunReport {
    pub period: PayoutPeriod,
    pub outcomes: Vec<PayoutOutcome>,
}

impl PayoutRunReport {
    pub fn new(period: PayoutPeriod) -> Self {
        Self {
            period,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: PayoutOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn created_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PayoutOutcome::Created { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PayoutOutcome::SkippedDuplicate { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PayoutOutcome::Failed { .. }))
            .count()
    }
}
