//! Payout aggregate and approval workflow

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ApprovalTaskId, ContractId, HospitalId, Money, OwnerId, PayoutId};

use crate::calculator::PayoutComputation;
use crate::error::PayoutError;

/// A half-open settlement period `[start, end)`
///
/// Periods for one owner never overlap; the repository enforces uniqueness
/// per (owner, period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayoutPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PayoutError> {
        if start >= end {
            return Err(PayoutError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The calendar month beginning on the first of `month`
    pub fn month(year: i32, month: u32) -> Result<Self, PayoutError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(PayoutError::InvalidPeriod {
            start: format!("{}-{:02}-01", year, month),
            end: String::new(),
        })?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(PayoutError::InvalidPeriod {
            start: start.to_string(),
            end: String::new(),
        })?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn overlaps(&self, other: &PayoutPeriod) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Last day inside the period
    pub fn last_day(&self) -> NaiveDate {
        self.end - Days::new(1)
    }

    /// Returns true if the period covers exactly one calendar month
    pub fn is_calendar_month(&self) -> bool {
        self.start.day() == 1
            && self.end.day() == 1
            && PayoutPeriod::month(self.start.year(), self.start.month())
                .map(|p| p == *self)
                .unwrap_or(false)
    }
}

impl fmt::Display for PayoutPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Payout status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Awaiting human approval
    Pending,
    /// Approved for disbursement
    Approved,
    /// Disbursed
    Paid,
    /// Withdrawn before approval
    Cancelled,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Approved => "approved",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PayoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayoutStatus::Pending),
            "approved" => Ok(PayoutStatus::Approved),
            "paid" => Ok(PayoutStatus::Paid),
            "cancelled" => Ok(PayoutStatus::Cancelled),
            other => Err(format!("Unknown payout status: {}", other)),
        }
    }
}

/// A periodic revenue-share payout to a hospital owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerPayout {
    pub id: PayoutId,
    pub owner_id: OwnerId,
    pub hospital_id: HospitalId,
    pub contract_id: ContractId,
    pub period: PayoutPeriod,
    /// Sum of completed payments for the hospital inside the period
    pub gross_revenue: Money,
    /// gross_revenue × share%
    pub calculated_amount: Money,
    /// Contractual floor
    pub minimum_guarantee: Money,
    /// max(calculated_amount, minimum_guarantee)
    pub final_amount: Money,
    pub status: PayoutStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnerPayout {
    /// Creates a pending payout from a computation
    pub fn from_computation(
        owner_id: OwnerId,
        hospital_id: HospitalId,
        contract_id: ContractId,
        period: PayoutPeriod,
        computation: PayoutComputation,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PayoutId::new_v7(),
            owner_id,
            hospital_id,
            contract_id,
            period,
            gross_revenue: computation.gross_revenue,
            calculated_amount: computation.calculated_amount,
            minimum_guarantee: computation.minimum_guarantee,
            final_amount: computation.final_amount,
            status: PayoutStatus::Pending,
            approved_by: None,
            approved_at: None,
            paid_at: None,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approves the payout; requires the single human approval
    pub fn approve(&mut self, approver: impl Into<String>) -> Result<(), PayoutError> {
        self.transition(PayoutStatus::Pending, PayoutStatus::Approved)?;
        self.approved_by = Some(approver.into());
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the payout as disbursed
    pub fn mark_paid(&mut self, reference: impl Into<String>) -> Result<(), PayoutError> {
        self.transition(PayoutStatus::Approved, PayoutStatus::Paid)?;
        self.paid_at = Some(Utc::now());
        self.payment_reference = Some(reference.into());
        Ok(())
    }

    /// Withdraws a pending payout
    pub fn cancel(&mut self) -> Result<(), PayoutError> {
        self.transition(PayoutStatus::Pending, PayoutStatus::Cancelled)
    }

    fn transition(&mut self, expected: PayoutStatus, target: PayoutStatus) -> Result<(), PayoutError> {
        if self.status != expected {
            return Err(PayoutError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Approval task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("Unknown task status: {}", other)),
        }
    }
}

/// The single human approval gating a payout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalTask {
    pub id: ApprovalTaskId,
    pub payout_id: PayoutId,
    pub assigned_role: String,
    pub status: TaskStatus,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApprovalTask {
    /// Creates the approval task attached to a new payout
    pub fn for_payout(payout_id: PayoutId) -> Self {
        Self {
            id: ApprovalTaskId::new(),
            payout_id,
            assigned_role: "finance_admin".to_string(),
            status: TaskStatus::Pending,
            completed_by: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the task completed by the named approver
    pub fn complete(&mut self, by: impl Into<String>) -> Result<(), PayoutError> {
        if self.status != TaskStatus::Pending {
            return Err(PayoutError::TaskNotPending);
        }
        self.status = TaskStatus::Completed;
        self.completed_by = Some(by.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
