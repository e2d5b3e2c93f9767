//! Lead form state as seen by the browser.
//!
//! The form is a plain value: each edit produces a new `FormState` through
//! [`FormState::update`], and submission moves it through
//! idle → sending → success | error.

use crate::models::{LeadSubmission, LoanType, Timeline};
use crate::normalize::format_phone_display;
use crate::validation::{validate, ValidationErrors, ValidationMode};

/// Progress of the most recent submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

/// A single edit to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FullName(String),
    Email(String),
    /// Raw keystrokes; stored in display format.
    Phone(String),
    LoanType(LoanType),
    LoanAmount(String),
    PropertyState(String),
    Timeline(Timeline),
    Message(String),
    Consent(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub fields: LeadSubmission,
    pub status: SubmissionStatus,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one field edit.
    pub fn update(self, update: FieldUpdate) -> Self {
        let mut fields = self.fields;

        match update {
            FieldUpdate::FullName(v) => fields.full_name = v,
            FieldUpdate::Email(v) => fields.email = v,
            FieldUpdate::Phone(v) => fields.phone = format_phone_display(&v),
            FieldUpdate::LoanType(v) => fields.loan_type = v,
            FieldUpdate::LoanAmount(v) => fields.loan_amount = v,
            FieldUpdate::PropertyState(v) => fields.property_state = v,
            FieldUpdate::Timeline(v) => fields.timeline = v,
            FieldUpdate::Message(v) => fields.message = v,
            FieldUpdate::Consent(v) => fields.consent = v,
        }

        Self { fields, ..self }
    }

    /// Client-side rule evaluation for inline error messages.
    pub fn errors(&self) -> ValidationErrors {
        validate(&self.fields, ValidationMode::Client)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Start a submit.
    ///
    /// Returns the payload to post when the form is valid; otherwise the
    /// state flips to `Error` and nothing should be sent.
    pub fn begin_submit(self) -> (Self, Option<LeadSubmission>) {
        if !self.is_valid() {
            return (
                Self {
                    status: SubmissionStatus::Error,
                    ..self
                },
                None,
            );
        }

        let payload = self.fields.clone();
        (
            Self {
                status: SubmissionStatus::Sending,
                ..self
            },
            Some(payload),
        )
    }

    /// Record the endpoint's answer. Any non-success is a generic error.
    ///
    /// A successful submit clears the fields; a failed one keeps them so the
    /// visitor can retry.
    pub fn finish_submit(self, succeeded: bool) -> Self {
        if succeeded {
            Self {
                fields: LeadSubmission::default(),
                status: SubmissionStatus::Success,
            }
        } else {
            Self {
                status: SubmissionStatus::Error,
                ..self
            }
        }
    }

    /// Dismiss the success banner.
    pub fn acknowledge(self) -> Self {
        match self.status {
            SubmissionStatus::Success => Self {
                status: SubmissionStatus::Idle,
                ..self
            },
            _ => self,
        }
    }
}
