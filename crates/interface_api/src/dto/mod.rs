//! Request/Response data transfer objects

pub mod invoices;
pub mod claims;
pub mod payouts;
pub mod loyalty;
