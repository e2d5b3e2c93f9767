//! Field rules for lead submissions.
//!
//! The same rule set runs in the browser form (for UX) and on the server (for
//! integrity). The server never relies on the client having validated.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::LeadSubmission;
use crate::normalize::{digits_only, is_email_format, normalize_phone};

/// Form fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    Phone,
    PropertyState,
    Consent,
}

impl Field {
    /// JSON name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::PropertyState => "propertyState",
            Field::Consent => "consent",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the rules are being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Lead form in the browser: a malformed phone is reported to the user.
    Client,
    /// `POST /api/lead`: a malformed phone is dropped, not rejected.
    Server,
}

/// Field name to human-readable message. Empty means the submission is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Failing fields in a stable order.
    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }

    /// One-line description used as the `error` string of a 400 response.
    pub fn summary(&self) -> String {
        let fields: Vec<&str> = self.0.keys().map(Field::as_str).collect();
        format!("Invalid or missing fields: {}", fields.join(", "))
    }
}

/// Evaluate every rule against the submission.
///
/// Rules are independent, so several errors can come back together.
pub fn validate(submission: &LeadSubmission, mode: ValidationMode) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if submission.full_name.trim().is_empty() {
        errors.insert(Field::FullName, "Please enter your name.");
    }

    if !is_email_format(&submission.email) {
        errors.insert(Field::Email, "Please enter a valid email.");
    }

    if mode == ValidationMode::Client
        && !digits_only(&submission.phone).is_empty()
        && normalize_phone(&submission.phone).is_none()
    {
        errors.insert(
            Field::Phone,
            "Please enter a 10-digit phone number (or leave blank).",
        );
    }

    if submission.property_state.trim().is_empty() {
        errors.insert(Field::PropertyState, "Please enter the property state.");
    }

    if !submission.consent {
        errors.insert(Field::Consent, "Please confirm you consent to be contacted.");
    }

    errors
}
