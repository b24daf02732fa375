//! Adapters implementing the claims domain ports

pub mod sandbox_gateway;

pub use sandbox_gateway::{SandboxGatewayConfig, SandboxInsurerGateway};
