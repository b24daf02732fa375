//! Owner revenue-share contracts

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ContractId, DateRange, HospitalId, Money, OwnerId};

use crate::error::PayoutError;
use crate::payout::PayoutPeriod;

/// Contract status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Expired,
    Terminated,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Expired => "expired",
            ContractStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContractStatus::Draft),
            "active" => Ok(ContractStatus::Active),
            "expired" => Ok(ContractStatus::Expired),
            "terminated" => Ok(ContractStatus::Terminated),
            other => Err(format!("Unknown contract status: {}", other)),
        }
    }
}

/// A revenue-share contract between the platform and a hospital owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerContract {
    pub id: ContractId,
    pub hospital_id: HospitalId,
    pub owner_id: OwnerId,
    /// Share of collected revenue owed to the owner, within [0, 100]
    pub revenue_share_percent: Decimal,
    /// Floor payout per period regardless of computed share
    pub minimum_guarantee: Money,
    /// Inclusive validity window
    pub validity: DateRange,
    pub status: ContractStatus,
}

impl OwnerContract {
    pub fn new(
        hospital_id: HospitalId,
        owner_id: OwnerId,
        revenue_share_percent: Decimal,
        minimum_guarantee: Money,
        validity: DateRange,
        status: ContractStatus,
    ) -> Result<Self, PayoutError> {
        if revenue_share_percent < Decimal::ZERO || revenue_share_percent > dec!(100) {
            return Err(PayoutError::ShareOutOfRange(revenue_share_percent));
        }
        if minimum_guarantee.is_negative() {
            return Err(PayoutError::NegativeGuarantee);
        }
        Ok(Self {
            id: ContractId::new_v7(),
            hospital_id,
            owner_id,
            revenue_share_percent,
            minimum_guarantee,
            validity,
            status,
        })
    }

    /// Returns true when this contract governs the given settlement period
    ///
    /// The contract must be active and its validity window must overlap the
    /// half-open period.
    pub fn is_active_during(&self, period: &PayoutPeriod) -> bool {
        self.status == ContractStatus::Active
            && self.validity.start < period.end
            && self.validity.end >= period.start
    }
}
