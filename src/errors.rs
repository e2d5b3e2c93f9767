use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::validation::ValidationErrors;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Submission failed one or more field rules.
    Validation(ValidationErrors),
    /// Bad request error (unreadable or malformed body).
    BadRequest(String),
    /// A required server credential or setting is missing.
    Configuration(String),
    /// Error reaching an external API (transport failure or timeout).
    ExternalApiError(String),
    /// An external API answered with a non-success status.
    ProviderRejected {
        /// Which collaborator rejected the call ("email", "crm").
        provider: &'static str,
        /// HTTP status returned by the provider.
        status: u16,
        /// Raw response body returned by the provider.
        body: String,
    },
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ProviderRejected { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors.summary()),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::ProviderRejected {
                provider,
                status,
                body,
            } => write!(f, "{} provider returned {}: {}", provider, status, body),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Every body carries `ok: false` and an `error` message. Validation
    /// failures add the per-field messages; provider rejections echo what the
    /// provider answered.
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation(errors) => {
                tracing::warn!("Lead rejected: {}", errors.summary());
                json!({
                    "ok": false,
                    "error": errors.summary(),
                    "fields": errors,
                })
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                json!({ "ok": false, "error": msg })
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                json!({ "ok": false, "error": "Server configuration error" })
            }
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                json!({ "ok": false, "error": "External service error" })
            }
            AppError::ProviderRejected {
                provider,
                status: provider_status,
                body,
            } => {
                tracing::error!("{} provider error: {} {}", provider, provider_status, body);
                json!({
                    "ok": false,
                    "error": format!("{} provider request failed", provider),
                    "providerStatus": provider_status,
                    "providerBody": body,
                })
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "ok": false, "error": "Internal server error" })
            }
            AppError::WithContext { source, context } => {
                // Log full context chain, then answer as the underlying error
                tracing::error!("Error with context: {} -> {}", context, source);
                return (*source).into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Rewrites plain-text rejections produced by middleware (body size limit,
/// rate limiter) into the `{ok: false, error}` body every handler error uses.
///
/// Other headers, such as the rate limiter's `retry-after`, are kept.
pub async fn json_error_envelope(response: Response) -> Response {
    let status = response.status();
    let message = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Lead payload too large",
        StatusCode::TOO_MANY_REQUESTS => "Too many requests, please try again shortly",
        _ => return response,
    };

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    tracing::warn!("Request rejected by middleware: {}", status);

    let (parts, _) = response.into_parts();
    let mut rewritten = (status, Json(json!({ "ok": false, "error": message }))).into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ExternalApiError(format!("request timed out: {}", err))
        } else {
            AppError::ExternalApiError(err.to_string())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

/// Extension for reqwest::Error to add context
impl<T> ResultExt<T> for Result<T, reqwest::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: f(),
        })
    }
}
