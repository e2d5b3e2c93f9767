//! CRM forwarding (Follow Up Boss API shape).
//!
//! Two call shapes are supported behind one [`CrmConnector`] trait:
//! a single `/v1/events` call, or `/v1/people` followed by `/v1/notes`.
//! Every call authenticates with HTTP Basic, API key as the user name and
//! an empty password.

use crate::config::{CrmConfig, CrmMode, CrmSettings};
use crate::errors::{AppError, ResultExt};
use crate::models::NormalizedLead;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Tag attached to every contact created from the website form.
pub const WEBSITE_LEAD_TAG: &str = "Website Lead";

/// Contact id as the CRM returned it. Numeric ids stay numeric on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CrmId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CrmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmId::Number(id) => write!(f, "{}", id),
            CrmId::Text(id) => f.write_str(id),
        }
    }
}

/// What the CRM acknowledged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrmReceipt {
    /// Contact id, when the CRM returned one.
    pub person_id: Option<CrmId>,
}

/// Forwards a validated lead to the CRM.
pub trait CrmConnector: Send + Sync {
    /// Create or update the contact and attach the note to it.
    ///
    /// # Errors
    ///
    /// Returns error if any CRM call fails, times out, or answers non-2xx.
    fn push_lead(
        &self,
        lead: &NormalizedLead,
        note: &str,
    ) -> impl Future<Output = Result<CrmReceipt, AppError>> + Send;
}

/// Authenticated JSON poster shared by both call shapes.
#[derive(Clone)]
struct CrmHttp {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CrmHttp {
    fn new(config: &CrmConfig, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create CRM client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(""))
            .json(body)
            .send()
            .await
            .with_context(|| format!("CRM request to {} failed", path))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(AppError::ProviderRejected {
                provider: "crm",
                status: status.as_u16(),
                body: text,
            });
        }

        // The CRM does not always answer with JSON
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

/// Contact fields shared by both call shapes.
fn person_fields(lead: &NormalizedLead) -> serde_json::Map<String, Value> {
    let mut person = serde_json::Map::new();
    person.insert("firstName".to_string(), json!(lead.first_name));
    person.insert("lastName".to_string(), json!(lead.last_name));
    person.insert("emails".to_string(), json!([{ "value": lead.email }]));
    if let Some(phone) = &lead.phone {
        person.insert("phones".to_string(), json!([{ "value": phone }]));
    }
    person.insert(
        "tags".to_string(),
        json!([WEBSITE_LEAD_TAG, lead.loan_type.as_str()]),
    );
    person
}

/// Reads a contact id from a CRM response, accepting string or numeric ids.
fn extract_id(response: &Value) -> Option<CrmId> {
    let id = response
        .get("id")
        .or_else(|| response.get("person").and_then(|p| p.get("id")))?;

    match id {
        Value::String(s) if !s.is_empty() => Some(CrmId::Text(s.clone())),
        Value::Number(n) => n.as_i64().map(CrmId::Number),
        _ => None,
    }
}

/// Single-call variant: one lead event carrying the contact and the note.
#[derive(Clone)]
pub struct EventsConnector {
    http: CrmHttp,
    event_type: String,
    event_source: String,
}

impl EventsConnector {
    pub fn new(config: &CrmConfig, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            http: CrmHttp::new(config, timeout)?,
            event_type: config.event_type.clone(),
            event_source: config.event_source.clone(),
        })
    }

    pub fn event_payload(&self, lead: &NormalizedLead, note: &str) -> Value {
        json!({
            "type": self.event_type,
            "source": self.event_source,
            "person": person_fields(lead),
            "message": note,
        })
    }
}

impl CrmConnector for EventsConnector {
    async fn push_lead(&self, lead: &NormalizedLead, note: &str) -> Result<CrmReceipt, AppError> {
        tracing::info!("Sending lead event to CRM for {}", lead.submission_id);

        let response = self
            .http
            .post_json("/v1/events", &self.event_payload(lead, note))
            .await?;

        Ok(CrmReceipt {
            person_id: extract_id(&response),
        })
    }
}

/// Two-call variant: create the contact, then attach the note to the returned id.
#[derive(Clone)]
pub struct PeopleNotesConnector {
    http: CrmHttp,
    source: String,
}

impl PeopleNotesConnector {
    pub fn new(config: &CrmConfig, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            http: CrmHttp::new(config, timeout)?,
            source: config.event_source.clone(),
        })
    }

    pub fn person_payload(&self, lead: &NormalizedLead) -> Value {
        let mut person = person_fields(lead);
        person.insert("source".to_string(), json!(self.source));
        Value::Object(person)
    }

    pub fn note_payload(person_id: &CrmId, note: &str) -> Value {
        json!({
            "personId": person_id,
            "subject": "Website inquiry",
            "body": note,
        })
    }
}

impl CrmConnector for PeopleNotesConnector {
    async fn push_lead(&self, lead: &NormalizedLead, note: &str) -> Result<CrmReceipt, AppError> {
        tracing::info!("Creating CRM contact for {}", lead.submission_id);

        let created = self
            .http
            .post_json("/v1/people", &self.person_payload(lead))
            .await
            .context("CRM contact creation failed")?;

        let person_id = extract_id(&created).ok_or_else(|| {
            tracing::warn!("Unexpected CRM response format: {:?}", created);
            AppError::ExternalApiError("Contact creation response missing 'id' field".to_string())
        })?;

        self.http
            .post_json("/v1/notes", &Self::note_payload(&person_id, note))
            .await
            .with_context(|| format!("Attaching note to CRM contact {} failed", person_id))?;

        tracing::info!("✓ CRM contact {} created with note", person_id);
        Ok(CrmReceipt {
            person_id: Some(person_id),
        })
    }
}

/// The configured CRM call shape.
#[derive(Clone)]
pub enum CrmBackend {
    Events(EventsConnector),
    PeopleNotes(PeopleNotesConnector),
}

impl CrmBackend {
    pub fn from_config(config: &CrmConfig, timeout: Duration) -> Result<Self, AppError> {
        Ok(match config.mode {
            CrmMode::Events => CrmBackend::Events(EventsConnector::new(config, timeout)?),
            CrmMode::People => {
                CrmBackend::PeopleNotes(PeopleNotesConnector::new(config, timeout)?)
            }
        })
    }
}

impl CrmConnector for CrmBackend {
    async fn push_lead(&self, lead: &NormalizedLead, note: &str) -> Result<CrmReceipt, AppError> {
        match self {
            CrmBackend::Events(connector) => connector.push_lead(lead, note).await,
            CrmBackend::PeopleNotes(connector) => connector.push_lead(lead, note).await,
        }
    }
}

/// Whether CRM forwarding is available for this deployment.
#[derive(Clone)]
pub enum CrmCapability {
    Enabled(CrmBackend),
    Disabled,
}

impl CrmCapability {
    pub fn from_settings(settings: &CrmSettings, timeout: Duration) -> Result<Self, AppError> {
        match settings {
            CrmSettings::Enabled(config) => Ok(CrmCapability::Enabled(CrmBackend::from_config(
                config, timeout,
            )?)),
            CrmSettings::Disabled => Ok(CrmCapability::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, CrmCapability::Enabled(_))
    }
}
