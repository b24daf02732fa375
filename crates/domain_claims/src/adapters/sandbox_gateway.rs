//! Sandbox insurer gateway
//!
//! Implements `InsurerGatewayPort` without a real insurer on the other end:
//! requests are built and signed exactly as the production adapter would,
//! then acknowledged locally. Access tokens live in an injected TTL cache
//! keyed by client id — token state is never held in module-level globals.

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use core_kernel::{AuthStrategy, DomainPort, OutboundRequest, PortError};

use crate::ports::{ClaimSubmission, GatewayAcknowledgement, InsurerGatewayPort};

/// Configuration for the sandbox gateway
#[derive(Debug, Clone)]
pub struct SandboxGatewayConfig {
    /// Base URL the production adapter would call
    pub base_url: String,
    /// OAuth2 client id used to key the token cache
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
}

impl Default for SandboxGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.insurer.example/api/v1".to_string(),
            client_id: "sandbox-client".to_string(),
            client_secret: "sandbox-secret".to_string(),
            token_ttl_secs: 300,
        }
    }
}

/// Token cache shared by gateway instances; owned by the caller and injected
pub type TokenCache = Cache<String, String>;

/// Builds a token cache with the given TTL
pub fn token_cache(ttl_secs: u64, max_entries: u64) -> TokenCache {
    Cache::builder()
        .max_capacity(max_entries)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// The mocked insurer/HMO gateway
pub struct SandboxInsurerGateway {
    config: SandboxGatewayConfig,
    tokens: TokenCache,
}

impl SandboxInsurerGateway {
    pub fn new(config: SandboxGatewayConfig, tokens: TokenCache) -> Self {
        Self { config, tokens }
    }

    /// Resolves an access token, reusing the cached one while it lives
    async fn resolve_token(&self) -> String {
        if let Some(token) = self.tokens.get(&self.config.client_id).await {
            return token;
        }
        // The production adapter exchanges client credentials here; the
        // sandbox mints a token locally.
        let token = format!("sandbox-{}-{}", self.config.client_id, Uuid::new_v4());
        self.tokens
            .insert(self.config.client_id.clone(), token.clone())
            .await;
        debug!(client_id = %self.config.client_id, "Issued sandbox gateway token");
        token
    }
}

impl DomainPort for SandboxInsurerGateway {}

#[async_trait]
impl InsurerGatewayPort for SandboxInsurerGateway {
    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<GatewayAcknowledgement, PortError> {
        if submission.policy_number.trim().is_empty() {
            return Err(PortError::validation("Policy number must not be empty"));
        }
        if submission.amount_minor <= 0 {
            return Err(PortError::validation("Claim amount must be positive"));
        }

        let body = serde_json::to_string(submission).map_err(|e| PortError::Internal {
            message: format!("Failed to encode claim submission: {}", e),
            source: None,
        })?;

        let token = self.resolve_token().await;
        let auth = AuthStrategy::OAuth2 {
            access_token: token,
        };
        let mut request =
            OutboundRequest::new("POST", format!("{}/claims", self.config.base_url)).with_body(body);
        auth.sign(&mut request)?;

        if request.header("Authorization").is_none() {
            warn!(claim_id = %submission.claim_id, "Gateway request left unsigned");
            return Err(PortError::Unauthorized {
                message: "Request signing produced no credentials".to_string(),
            });
        }

        debug!(
            claim_id = %submission.claim_id,
            provider = %submission.provider,
            "Submitted claim to sandbox gateway"
        );

        Ok(GatewayAcknowledgement {
            accepted: true,
            gateway_reference: format!("SBX-{}", Uuid::new_v4()),
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ClaimId;

    fn submission() -> ClaimSubmission {
        ClaimSubmission {
            claim_id: ClaimId::new(),
            provider: "Sterling HMO".to_string(),
            policy_number: "PLC-91-0042".to_string(),
            amount_minor: 860_000,
            currency: "NGN".to_string(),
        }
    }

    #[tokio::test]
    async fn accepts_well_formed_submission() {
        let gateway =
            SandboxInsurerGateway::new(SandboxGatewayConfig::default(), token_cache(300, 64));

        let ack = gateway.submit_claim(&submission()).await.unwrap();
        assert!(ack.accepted);
        assert!(ack.gateway_reference.starts_with("SBX-"));
    }

    #[tokio::test]
    async fn rejects_empty_policy_number() {
        let gateway =
            SandboxInsurerGateway::new(SandboxGatewayConfig::default(), token_cache(300, 64));

        let mut bad = submission();
        bad.policy_number = "  ".to_string();
        let err = gateway.submit_claim(&bad).await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn token_is_reused_within_ttl() {
        let cache = token_cache(300, 64);
        let gateway = SandboxInsurerGateway::new(SandboxGatewayConfig::default(), cache.clone());

        gateway.submit_claim(&submission()).await.unwrap();
        let first = cache.get("sandbox-client").await.unwrap();

        gateway.submit_claim(&submission()).await.unwrap();
        let second = cache.get("sandbox-client").await.unwrap();

        assert_eq!(first, second);
    }
}
