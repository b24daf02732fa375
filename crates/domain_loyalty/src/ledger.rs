//! Ledger operations
//!
//! Pure read-validate-write steps applied to an account that was freshly
//! loaded under a row lock. The repository wraps each of these in a single
//! transaction together with the matching `LoyaltyTransaction` row, so the
//! balance and the transaction log can never diverge.

use crate::account::{LoyaltyAccount, Tier};
use crate::error::LoyaltyError;
use crate::transaction::LoyaltyTransaction;

/// A tier advance triggered by an accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChange {
    pub from: Tier,
    pub to: Tier,
}

/// Credits `points` to the account and recomputes the tier
///
/// Increments both `points_balance` and `lifetime_points`. Returns the tier
/// change, if the accrual crossed a threshold.
pub fn apply_accrual(
    account: &mut LoyaltyAccount,
    points: i64,
) -> Result<Option<TierChange>, LoyaltyError> {
    if points <= 0 {
        return Err(LoyaltyError::NonPositivePoints);
    }
    let balance = account
        .points_balance
        .checked_add(points)
        .ok_or(LoyaltyError::PointsOverflow)?;
    let lifetime = account
        .lifetime_points
        .checked_add(points)
        .ok_or(LoyaltyError::PointsOverflow)?;

    account.points_balance = balance;
    account.lifetime_points = lifetime;
    account.updated_at = chrono::Utc::now();

    let previous = account.tier;
    let current = Tier::for_lifetime_points(lifetime);
    account.tier = current;

    Ok((current > previous).then_some(TierChange {
        from: previous,
        to: current,
    }))
}

/// Debits `points` from the account balance
///
/// The balance is validated against the freshly read value; a shortfall
/// fails with `InsufficientPoints` and leaves the account untouched. Tier
/// and lifetime points are unaffected by redemptions.
pub fn apply_redemption(account: &mut LoyaltyAccount, points: i64) -> Result<(), LoyaltyError> {
    if points <= 0 {
        return Err(LoyaltyError::NonPositivePoints);
    }
    if points > account.points_balance {
        return Err(LoyaltyError::InsufficientPoints {
            required: points,
            balance: account.points_balance,
        });
    }
    account.points_balance -= points;
    account.updated_at = chrono::Utc::now();
    Ok(())
}

/// Checks the ledger reconciliation rule:
/// `points_balance == Σ(transaction points)`
pub fn reconcile(points_balance: i64, transactions: &[LoyaltyTransaction]) -> bool {
    let sum: i64 = transactions.iter().map(|t| t.points).sum();
    sum == points_balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{HospitalId, PatientId};

    fn account() -> LoyaltyAccount {
        LoyaltyAccount::open(PatientId::new(), HospitalId::new())
    }

    #[test]
    fn accrual_increments_both_balances() {
        let mut acct = account();
        apply_accrual(&mut acct, 150).unwrap();

        assert_eq!(acct.points_balance, 150);
        assert_eq!(acct.lifetime_points, 150);
        assert_eq!(acct.tier, Tier::Bronze);
    }

    #[test]
    fn accrual_rejects_non_positive_points() {
        let mut acct = account();
        assert_eq!(apply_accrual(&mut acct, 0), Err(LoyaltyError::NonPositivePoints));
        assert_eq!(apply_accrual(&mut acct, -5), Err(LoyaltyError::NonPositivePoints));
        assert_eq!(acct.points_balance, 0);
    }

    #[test]
    fn redemption_keeps_lifetime_points() {
        let mut acct = account();
        apply_accrual(&mut acct, 2_500).unwrap();
        apply_redemption(&mut acct, 2_000).unwrap();

        assert_eq!(acct.points_balance, 500);
        assert_eq!(acct.lifetime_points, 2_500);
        // tier derives from lifetime points, so spending cannot demote
        assert_eq!(acct.tier, Tier::Silver);
    }

    #[test]
    fn redemption_shortfall_leaves_account_untouched() {
        let mut acct = account();
        apply_accrual(&mut acct, 100).unwrap();

        let err = apply_redemption(&mut acct, 101).unwrap_err();
        assert_eq!(
            err,
            LoyaltyError::InsufficientPoints {
                required: 101,
                balance: 100
            }
        );
        assert_eq!(acct.points_balance, 100);
    }
}
