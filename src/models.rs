use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::normalize::{normalize_phone, split_full_name};

// ============ Lead Form Models ============

/// Loan product the visitor is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum LoanType {
    #[default]
    #[serde(rename = "DSCR")]
    Dscr,
    Commercial,
    Unsure,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Dscr => "DSCR",
            LoanType::Commercial => "Commercial",
            LoanType::Unsure => "Unsure",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How soon the visitor wants to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Timeline {
    #[default]
    #[serde(rename = "ASAP")]
    Asap,
    #[serde(rename = "30-60 days")]
    ThirtyToSixtyDays,
    #[serde(rename = "60+ days")]
    SixtyPlusDays,
}

impl Timeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::Asap => "ASAP",
            Timeline::ThirtyToSixtyDays => "30-60 days",
            Timeline::SixtyPlusDays => "60+ days",
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw lead form payload as posted to `POST /api/lead`.
///
/// Every field is optional on the wire: absent or `null` strings become empty
/// and a missing `consent` becomes `false`, so incomplete submissions reach
/// the validator and come back as field errors instead of parse failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    pub loan_type: LoanType,
    #[serde(deserialize_with = "null_as_default")]
    pub loan_amount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub property_state: String,
    pub timeline: Timeline,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub consent: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Server-side view of a lead that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLead {
    /// Per-request id used to correlate log lines.
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Exactly 10 digits, or `None` when the submitted phone could not be normalized.
    pub phone: Option<String>,
    pub loan_type: LoanType,
    pub loan_amount: String,
    pub property_state: String,
    pub timeline: Timeline,
    pub message: String,
}

impl NormalizedLead {
    pub fn from_submission(submission: &LeadSubmission, submission_id: Uuid) -> Self {
        let (first_name, last_name) = split_full_name(&submission.full_name);

        Self {
            submission_id,
            submitted_at: Utc::now(),
            first_name,
            last_name,
            email: submission.email.trim().to_string(),
            phone: normalize_phone(&submission.phone),
            loan_type: submission.loan_type,
            loan_amount: submission.loan_amount.trim().to_string(),
            property_state: submission.property_state.trim().to_string(),
            timeline: submission.timeline,
            message: submission.message.trim().to_string(),
        }
    }

    /// First and last name joined back together.
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

// ============ Response Models ============

/// Echo of an outbound provider call, returned to the form on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderEcho {
    pub ok: bool,
    pub status: u16,
    /// Parsed JSON body when the provider returned JSON, raw text otherwise.
    pub response: Value,
}

impl ProviderEcho {
    /// Builds an echo from a raw response body, keeping it as text when it is not JSON.
    pub fn from_body(status: u16, body: &str) -> Self {
        let response = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
        };

        Self {
            ok: true,
            status,
            response,
        }
    }
}

/// Successful `POST /api/lead` response body.
#[derive(Debug, Clone, Serialize)]
pub struct LeadResponse {
    pub ok: bool,
    pub email: ProviderEcho,
}

impl LeadResponse {
    pub fn delivered(email: ProviderEcho) -> Self {
        Self { ok: true, email }
    }
}
