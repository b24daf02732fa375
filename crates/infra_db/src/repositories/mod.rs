//! Repository implementations
//!
//! One repository per aggregate. Each mutating method is a single
//! transaction touching one aggregate plus its directly dependent child
//! rows; there are no cross-aggregate distributed transactions.

pub mod invoices;
pub mod payments;
pub mod claims;
pub mod payouts;
pub mod loyalty;

use std::str::FromStr;

use crate::error::DatabaseError;

/// Parses a stored enum column, mapping failures to serialization errors
pub(crate) fn parse_column<T>(value: &str, what: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value)
        .map_err(|e| DatabaseError::SerializationError(format!("Invalid {}: {}", what, e)))
}
