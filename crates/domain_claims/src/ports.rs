//! Claims Domain Ports
//!
//! The insurer/HMO gateway is an external collaborator reached through the
//! `InsurerGatewayPort` trait. The production adapter speaks the insurer's
//! API; this repo ships a sandbox adapter (`adapters::SandboxInsurerGateway`)
//! with the same contract. Provider identity and policy numbers are opaque
//! strings end to end.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, PortError};

/// Wire payload for submitting a claim to the insurer gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub claim_id: ClaimId,
    pub provider: String,
    pub policy_number: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Gateway response to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayAcknowledgement {
    pub accepted: bool,
    pub gateway_reference: String,
    pub received_at: DateTime<Utc>,
}

/// Outbound contract to the insurer/HMO gateway
///
/// Adjudication results arrive asynchronously through the inbound claim
/// operations (`approve`, `deny`, `pay`); this port only covers submission.
/// Transient failures (`PortError::is_transient`) are retried by the caller,
/// never treated as success.
#[async_trait]
pub trait InsurerGatewayPort: DomainPort {
    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<GatewayAcknowledgement, PortError>;
}
