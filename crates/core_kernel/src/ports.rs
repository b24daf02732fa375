//! Ports for external collaborators
//!
//! The core consumes the encounter/EMR service, the insurer gateway and the
//! notification service strictly through port traits defined against the
//! types in this module. Adapters (database, sandbox gateway, mocks) live in
//! the infrastructure and adapter crates.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across internal and external adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Authentication or authorization failed
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Rate limit exceeded for external API
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may
    /// succeed on retry
    ///
    /// Callers must retry transient failures rather than treating them as
    /// success.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Fire-and-forget event sink for the communication collaborator
///
/// The core emits events (`invoice.paid`, `claim.denied`, `payout.ready`,
/// `loyalty.tier_upgraded`) through this port. Correctness of the emitting
/// operation never depends on delivery, so publishing is infallible from the
/// caller's point of view; implementations log failures internally.
#[async_trait::async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, event_type: &'static str, payload: serde_json::Value);
}

/// An outbound HTTP-shaped request to an external collaborator
///
/// Adapters construct one of these, sign it with an [`AuthStrategy`], and
/// hand it to their transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Authentication strategy for outbound requests
///
/// Each provider authentication scheme is a tagged variant implementing a
/// single `sign` capability, replacing dispatch on auth-method strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthStrategy {
    /// OAuth2 bearer usage; the access token is resolved (and cached) by the
    /// adapter before signing
    OAuth2 {
        #[serde(skip_serializing)]
        access_token: String,
    },
    /// Keyed SHA-256 request signature over method, path and body
    Hmac {
        key_id: String,
        #[serde(skip_serializing)]
        secret: String,
    },
    /// Self-minted JWT with issuer claims
    Jwt {
        issuer: String,
        #[serde(skip_serializing)]
        signing_key: String,
        ttl_secs: u64,
    },
    /// Static API key in a named header
    ApiKey {
        header_name: String,
        #[serde(skip_serializing)]
        key: String,
    },
    /// Pre-shared bearer token
    Bearer {
        #[serde(skip_serializing)]
        token: String,
    },
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    iat: i64,
    exp: i64,
}

impl AuthStrategy {
    /// Signs the request in place
    pub fn sign(&self, request: &mut OutboundRequest) -> Result<(), PortError> {
        match self {
            AuthStrategy::OAuth2 { access_token } => {
                request
                    .headers
                    .insert("Authorization".into(), format!("Bearer {}", access_token));
            }
            AuthStrategy::Hmac { key_id, secret } => {
                let mut hasher = Sha256::new();
                hasher.update(secret.as_bytes());
                hasher.update(request.method.as_bytes());
                hasher.update(request.path.as_bytes());
                if let Some(body) = &request.body {
                    hasher.update(body.as_bytes());
                }
                let signature = hex::encode(hasher.finalize());
                request
                    .headers
                    .insert("X-Signature-Key-Id".into(), key_id.clone());
                request.headers.insert("X-Signature".into(), signature);
            }
            AuthStrategy::Jwt {
                issuer,
                signing_key,
                ttl_secs,
            } => {
                let now = chrono::Utc::now().timestamp();
                let claims = JwtClaims {
                    iss: issuer.clone(),
                    iat: now,
                    exp: now + *ttl_secs as i64,
                };
                let token = jsonwebtoken::encode(
                    &jsonwebtoken::Header::default(),
                    &claims,
                    &jsonwebtoken::EncodingKey::from_secret(signing_key.as_bytes()),
                )
                .map_err(|e| PortError::Internal {
                    message: format!("JWT signing failed: {}", e),
                    source: None,
                })?;
                request
                    .headers
                    .insert("Authorization".into(), format!("Bearer {}", token));
            }
            AuthStrategy::ApiKey { header_name, key } => {
                request.headers.insert(header_name.clone(), key.clone());
            }
            AuthStrategy::Bearer { token } => {
                request
                    .headers
                    .insert("Authorization".into(), format!("Bearer {}", token));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Claim", "CLM-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Claim"));
        assert!(error.to_string().contains("CLM-123"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "submit_claim".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());

        let rate_limited = PortError::RateLimited {
            retry_after_secs: 60,
        };
        assert!(rate_limited.is_transient());

        let validation = PortError::validation("Invalid policy number");
        assert!(!validation.is_transient());
    }

    #[test]
    fn test_api_key_signing() {
        let strategy = AuthStrategy::ApiKey {
            header_name: "X-Api-Key".to_string(),
            key: "secret-key".to_string(),
        };
        let mut request = OutboundRequest::new("POST", "/claims");
        strategy.sign(&mut request).unwrap();

        assert_eq!(request.header("X-Api-Key"), Some("secret-key"));
    }

    #[test]
    fn test_bearer_signing() {
        let strategy = AuthStrategy::Bearer {
            token: "tok".to_string(),
        };
        let mut request = OutboundRequest::new("GET", "/claims/1");
        strategy.sign(&mut request).unwrap();

        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_hmac_signing_is_deterministic() {
        let strategy = AuthStrategy::Hmac {
            key_id: "k1".to_string(),
            secret: "shh".to_string(),
        };
        let mut a = OutboundRequest::new("POST", "/claims").with_body("{}");
        let mut b = OutboundRequest::new("POST", "/claims").with_body("{}");
        strategy.sign(&mut a).unwrap();
        strategy.sign(&mut b).unwrap();

        assert_eq!(a.header("X-Signature"), b.header("X-Signature"));
        assert_eq!(a.header("X-Signature-Key-Id"), Some("k1"));
    }

    #[test]
    fn test_hmac_signature_varies_with_body() {
        let strategy = AuthStrategy::Hmac {
            key_id: "k1".to_string(),
            secret: "shh".to_string(),
        };
        let mut a = OutboundRequest::new("POST", "/claims").with_body("{\"a\":1}");
        let mut b = OutboundRequest::new("POST", "/claims").with_body("{\"a\":2}");
        strategy.sign(&mut a).unwrap();
        strategy.sign(&mut b).unwrap();

        assert_ne!(a.header("X-Signature"), b.header("X-Signature"));
    }

    #[test]
    fn test_jwt_signing_sets_bearer() {
        let strategy = AuthStrategy::Jwt {
            issuer: "billing-core".to_string(),
            signing_key: "secret".to_string(),
            ttl_secs: 300,
        };
        let mut request = OutboundRequest::new("POST", "/claims");
        strategy.sign(&mut request).unwrap();

        let header = request.header("Authorization").unwrap();
        assert!(header.starts_with("Bearer "));
    }
}
