//! Evergreen Equity lead intake library
//!
//! Backs the website's lead form: validates and normalizes a submission,
//! emails it to the team and forwards it to the CRM.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `crm_client`: CRM connector (single-call and two-call variants).
//! - `email_client`: Transactional email client.
//! - `errors`: Error handling types.
//! - `form`: Browser-side form state.
//! - `handlers`: HTTP request handlers.
//! - `models`: Lead data models.
//! - `normalize`: Phone, email and name normalization.
//! - `notification`: Lead note and email rendering.
//! - `validation`: Field rules.

pub mod config;
pub mod crm_client;
pub mod email_client;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod notification;
pub mod validation;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::errors::json_error_envelope;
use crate::handlers::AppState;

/// Largest accepted lead payload. The form is a handful of short fields.
pub const MAX_LEAD_BODY_BYTES: usize = 64 * 1024;

/// Lead intake routes, without state or outer middleware.
pub fn lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/lead", post(handlers::submit_lead))
        .layer(RequestBodyLimitLayer::new(MAX_LEAD_BODY_BYTES))
}

/// Application router around the given lead routes.
///
/// The binary passes [`lead_routes`] wrapped in its rate limiter; the health
/// check is never rate limited. Tracing and CORS are added by the binary.
pub fn app(state: Arc<AppState>, lead_routes: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(lead_routes)
        .with_state(state)
        .layer(middleware::map_response(json_error_envelope))
}

/// Complete application router (health check + lead intake), unthrottled.
pub fn router(state: Arc<AppState>) -> Router {
    app(state, lead_routes())
}
