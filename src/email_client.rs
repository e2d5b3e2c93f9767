use crate::config::EmailSettings;
use crate::errors::{AppError, ResultExt};
use crate::models::{NormalizedLead, ProviderEcho};
use crate::notification::{email_subject, render_email_html};
use serde::Serialize;
use std::time::Duration;

/// Payload accepted by the transactional email provider (Resend-compatible).
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    /// Replies go straight to the visitor.
    pub reply_to: String,
}

/// Client for the transactional email provider.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: Vec<String>,
}

impl EmailClient {
    /// Creates a new `EmailClient`.
    ///
    /// Returns `None` when no API key is configured.
    ///
    /// # Arguments
    ///
    /// * `settings` - Provider URL, key, sender and recipients.
    /// * `timeout` - Upper bound for each send.
    pub fn from_settings(
        settings: &EmailSettings,
        timeout: Duration,
    ) -> Result<Option<Self>, AppError> {
        let Some(api_key) = settings.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create email client: {}", e))
            })?;

        Ok(Some(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key,
            from: settings.from.clone(),
            to: settings.to.clone(),
        }))
    }

    /// Builds the notification for a lead.
    pub fn lead_notification(&self, lead: &NormalizedLead, note: &str) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: email_subject(lead),
            html: render_email_html(lead, note),
            reply_to: lead.email.clone(),
        }
    }

    /// Sends the lead notification email.
    ///
    /// # Arguments
    ///
    /// * `lead` - The validated, normalized lead.
    /// * `note` - Rendered inquiry summary.
    ///
    /// # Returns
    ///
    /// * `Result<ProviderEcho, AppError>` - The provider's answer, or an error.
    pub async fn send_lead_notification(
        &self,
        lead: &NormalizedLead,
        note: &str,
    ) -> Result<ProviderEcho, AppError> {
        let message = self.lead_notification(lead, note);
        self.send(&message).await
    }

    /// Posts one message to the provider.
    pub async fn send(&self, message: &EmailMessage) -> Result<ProviderEcho, AppError> {
        let url = format!("{}/emails", self.base_url);
        tracing::info!("Sending lead notification to {}", message.to.join(", "));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .context("Email provider request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(AppError::ProviderRejected {
                provider: "email",
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("✓ Lead notification accepted ({})", status);
        Ok(ProviderEcho::from_body(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadSubmission;
    use uuid::Uuid;

    fn settings(api_key: Option<&str>) -> EmailSettings {
        EmailSettings {
            api_key: api_key.map(String::from),
            base_url: "https://example.com".to_string(),
            from: "Leads <leads@example.com>".to_string(),
            to: vec!["owner@example.com".to_string()],
        }
    }

    #[test]
    fn test_missing_key_means_no_client() {
        let client = EmailClient::from_settings(&settings(None), Duration::from_secs(8)).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_notification_replies_to_visitor() {
        let client = EmailClient::from_settings(&settings(Some("re_key")), Duration::from_secs(8))
            .unwrap()
            .unwrap();
        let lead = NormalizedLead::from_submission(
            &LeadSubmission {
                full_name: "Chris Miller".into(),
                email: "chris@example.com".into(),
                property_state: "NY".into(),
                consent: true,
                ..Default::default()
            },
            Uuid::new_v4(),
        );

        let message = client.lead_notification(&lead, "Loan Type: DSCR");

        assert_eq!(message.reply_to, "chris@example.com");
        assert_eq!(message.to, vec!["owner@example.com"]);
        assert_eq!(message.subject, "New lead: Chris Miller (DSCR)");
        assert!(message.html.contains("Loan Type: DSCR"));
    }
}
