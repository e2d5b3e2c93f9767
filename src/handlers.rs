use crate::config::{Config, EmailFailurePolicy};
use crate::crm_client::{CrmCapability, CrmConnector};
use crate::email_client::EmailClient;
use crate::errors::{AppError, ResultExt};
use crate::models::{LeadResponse, LeadSubmission, NormalizedLead};
use crate::notification::build_lead_note;
use crate::validation::{validate, ValidationMode};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Email provider client; `None` when no credential is configured.
    pub email_client: Option<EmailClient>,
    /// CRM forwarding, when a credential is configured.
    pub crm: CrmCapability,
}

impl AppState {
    /// Builds the outbound clients described by the configuration.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let email_client = EmailClient::from_settings(&config.email, config.outbound_timeout)?;
        let crm = CrmCapability::from_settings(&config.crm, config.outbound_timeout)?;

        Ok(Self {
            config,
            email_client,
            crm,
        })
    }
}

/// Health check endpoint.
///
/// Returns the service status and version.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/lead
///
/// Flow:
/// 1. Parse and validate the submission (server rules).
/// 2. Normalize phone and split the name.
/// 3. Render the inquiry note.
/// 4. Send the notification email (mandatory).
/// 5. Forward to the CRM if enabled (best-effort, failures only logged).
///
/// # Returns
///
/// * `Result<Json<LeadResponse>, AppError>` - `{ok: true}` with the email
///   provider's answer, or an error response.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<Json<LeadResponse>, AppError> {
    let Json(submission) = payload.map_err(|rejection| {
        AppError::BadRequest(format!("Invalid lead payload: {}", rejection.body_text()))
    })?;

    let submission_id = Uuid::new_v4();
    tracing::info!("📨 Lead submission {} received", submission_id);

    // Step 1: Server-side validation (never trust the form)
    let errors = validate(&submission, ValidationMode::Server);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Step 2: Normalize
    let lead = NormalizedLead::from_submission(&submission, submission_id);
    if lead.phone.is_none() && !submission.phone.trim().is_empty() {
        tracing::debug!(
            "Phone for {} is not a 10-digit US number, omitting it",
            submission_id
        );
    }

    // Step 3: Render the note
    let note = build_lead_note(&lead);

    // Step 4: Email is mandatory
    let email_client = state.email_client.as_ref().ok_or_else(|| {
        AppError::Configuration("EMAIL_API_KEY not configured (required)".to_string())
    })?;

    let echo = match email_client.send_lead_notification(&lead, &note).await {
        Ok(echo) => echo,
        Err(e) => {
            if state.config.email_failure_policy == EmailFailurePolicy::AttemptCrm {
                forward_to_crm(&state.crm, &lead, &note).await;
            }
            return Err(e).with_context(|| format!("Lead {} notification failed", submission_id));
        }
    };

    // Step 5: CRM is best-effort
    forward_to_crm(&state.crm, &lead, &note).await;

    tracing::info!("✅ Lead submission {} delivered", submission_id);
    Ok(Json(LeadResponse::delivered(echo)))
}

/// Best-effort CRM forwarding. Failures are logged and never returned.
async fn forward_to_crm(crm: &CrmCapability, lead: &NormalizedLead, note: &str) {
    let CrmCapability::Enabled(connector) = crm else {
        tracing::debug!("CRM disabled, skipping lead {}", lead.submission_id);
        return;
    };

    match connector.push_lead(lead, note).await {
        Ok(receipt) => tracing::info!(
            "✓ Lead {} forwarded to CRM (person {})",
            lead.submission_id,
            receipt
                .person_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        ),
        Err(e) => tracing::error!(
            "⚠️  CRM forwarding failed for lead {}: {}",
            lead.submission_id,
            e
        ),
    }
}
