//! HTTP API Layer
//!
//! This crate provides the REST API for the hospital revenue core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Authentication, audit logging, tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses per the error taxonomy
//! - **Notifications**: Fire-and-forget event dispatch to the communication
//!   collaborator
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod notify;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::NotificationPort;
use domain_claims::adapters::sandbox_gateway::{token_cache, SandboxGatewayConfig, SandboxInsurerGateway};
use domain_claims::ports::InsurerGatewayPort;

use crate::config::ApiConfig;
use crate::handlers::{claims, health, invoices, loyalty, payouts};
use crate::middleware::{audit_middleware, auth_middleware};
use crate::notify::TracingNotifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub notifier: Arc<dyn NotificationPort>,
    pub gateway: Arc<dyn InsurerGatewayPort>,
}

/// Creates the main API router with default collaborators
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let gateway_config = SandboxGatewayConfig::default();
    let tokens = token_cache(gateway_config.token_ttl_secs, 64);
    create_router_with(
        pool,
        config,
        Arc::new(TracingNotifier),
        Arc::new(SandboxInsurerGateway::new(gateway_config, tokens)),
    )
}

/// Creates the API router with injected collaborators (used by tests)
pub fn create_router_with(
    pool: PgPool,
    config: ApiConfig,
    notifier: Arc<dyn NotificationPort>,
    gateway: Arc<dyn InsurerGatewayPort>,
) -> Router {
    let state = AppState {
        pool,
        config,
        notifier,
        gateway,
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice))
        .route("/", get(invoices::list_invoices))
        .route("/sweep-overdue", post(invoices::sweep_overdue))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id/payments", post(invoices::apply_payment));

    // Claims routes
    let claims_routes = Router::new()
        .route("/", get(claims::list_claims))
        .route("/resubmit", post(claims::resubmit_claim))
        .route("/:id", get(claims::get_claim))
        .route("/:id/process", post(claims::begin_processing))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/deny", post(claims::deny_claim))
        .route("/:id/pay", post(claims::pay_claim))
        .route("/:id/forward", post(claims::forward_to_gateway));

    // Payout routes
    let payout_routes = Router::new()
        .route("/process-period", post(payouts::process_period))
        .route("/run-month", post(payouts::run_month))
        .route("/:id", get(payouts::get_payout))
        .route("/:id/approve", post(payouts::approve_payout))
        .route("/:id/pay", post(payouts::pay_payout));

    // Loyalty routes
    let loyalty_routes = Router::new()
        .route("/award", post(loyalty::award_points))
        .route("/redeem", post(loyalty::redeem_points))
        .route("/rewards", post(loyalty::create_reward))
        .route("/:patient_id/:hospital_id", get(loyalty::get_account))
        .route(
            "/:patient_id/:hospital_id/transactions",
            get(loyalty::list_transactions),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .nest("/claims", claims_routes)
        .nest("/payouts", payout_routes)
        .nest("/loyalty", loyalty_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
