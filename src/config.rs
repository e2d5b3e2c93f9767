use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_EMAIL_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_EMAIL_FROM: &str = "Evergreen Equity <leads@evgequity.com>";
pub const DEFAULT_EMAIL_TO: &str = "chris@evgequity.com";
pub const DEFAULT_CRM_BASE_URL: &str = "https://api.followupboss.com";
pub const DEFAULT_CRM_EVENT_TYPE: &str = "Website Inquiry";
pub const DEFAULT_CRM_EVENT_SOURCE: &str = "Evergreen Equity Website";
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Upper bound for each outbound provider call.
    pub outbound_timeout: Duration,
    pub email: EmailSettings,
    pub crm: CrmSettings,
    pub email_failure_policy: EmailFailurePolicy,
}

/// Transactional email provider settings.
#[derive(Clone)]
pub struct EmailSettings {
    /// `None` keeps the server up but makes every submission fail with a 500.
    pub api_key: Option<String>,
    pub base_url: String,
    pub from: String,
    pub to: Vec<String>,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// CRM integration switch. A missing credential disables it entirely.
#[derive(Debug, Clone)]
pub enum CrmSettings {
    Enabled(CrmConfig),
    Disabled,
}

#[derive(Clone)]
pub struct CrmConfig {
    pub api_key: String,
    pub base_url: String,
    pub mode: CrmMode,
    pub event_type: String,
    pub event_source: String,
}

impl fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .field("event_type", &self.event_type)
            .field("event_source", &self.event_source)
            .finish()
    }
}

/// Which CRM call shape to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrmMode {
    /// One `/v1/events` call carrying the person and the note.
    #[default]
    Events,
    /// `/v1/people` to create the contact, then `/v1/notes` on the returned id.
    People,
}

impl FromStr for CrmMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" | "event" | "single" => Ok(CrmMode::Events),
            "people" | "two_call" | "two-call" => Ok(CrmMode::People),
            other => anyhow::bail!("CRM_MODE must be 'events' or 'people', got '{}'", other),
        }
    }
}

/// What happens to the CRM call when the notification email fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailFailurePolicy {
    /// Stop at the email failure; the CRM is not contacted.
    #[default]
    FailFast,
    /// Still forward to the CRM (best-effort) before failing the request.
    AttemptCrm,
}

impl FromStr for EmailFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(EmailFailurePolicy::FailFast),
            "attempt_crm" | "attempt-crm" => Ok(EmailFailurePolicy::AttemptCrm),
            other => anyhow::bail!(
                "EMAIL_FAILURE_POLICY must be 'fail_fast' or 'attempt_crm', got '{}'",
                other
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production).
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let timeout_secs: u64 = match var("OUTBOUND_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| anyhow::anyhow!("OUTBOUND_TIMEOUT_SECS must be a positive integer"))?,
            None => DEFAULT_OUTBOUND_TIMEOUT_SECS,
        };

        let email = EmailSettings {
            api_key: var("EMAIL_API_KEY"),
            base_url: http_url(
                "EMAIL_API_BASE_URL",
                var("EMAIL_API_BASE_URL").unwrap_or_else(|| DEFAULT_EMAIL_BASE_URL.to_string()),
            )?,
            from: var("LEAD_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            to: var("LEAD_EMAIL_TO")
                .unwrap_or_else(|| DEFAULT_EMAIL_TO.to_string())
                .split(',')
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(String::from)
                .collect(),
        };

        if email.to.is_empty() {
            anyhow::bail!("LEAD_EMAIL_TO must contain at least one address");
        }

        let crm = match var("CRM_API_KEY") {
            Some(api_key) => CrmSettings::Enabled(CrmConfig {
                api_key,
                base_url: http_url(
                    "CRM_API_BASE_URL",
                    var("CRM_API_BASE_URL").unwrap_or_else(|| DEFAULT_CRM_BASE_URL.to_string()),
                )?,
                mode: var("CRM_MODE")
                    .map(|m| m.parse::<CrmMode>())
                    .transpose()?
                    .unwrap_or_default(),
                event_type: var("CRM_EVENT_TYPE")
                    .unwrap_or_else(|| DEFAULT_CRM_EVENT_TYPE.to_string()),
                event_source: var("CRM_EVENT_SOURCE")
                    .unwrap_or_else(|| DEFAULT_CRM_EVENT_SOURCE.to_string()),
            }),
            None => CrmSettings::Disabled,
        };

        let email_failure_policy = var("EMAIL_FAILURE_POLICY")
            .map(|p| p.parse::<EmailFailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            port,
            outbound_timeout: Duration::from_secs(timeout_secs),
            email,
            crm,
            email_failure_policy,
        };

        // Log what was loaded (without sensitive values)
        tracing::debug!("Email provider: {}", config.email.base_url);
        tracing::debug!("Lead recipients: {}", config.email.to.join(", "));
        if config.email.api_key.is_none() {
            tracing::warn!("EMAIL_API_KEY not set - lead submissions will be rejected");
        }
        match &config.crm {
            CrmSettings::Enabled(crm) => {
                tracing::info!("CRM integration enabled ({:?} mode): {}", crm.mode, crm.base_url)
            }
            CrmSettings::Disabled => tracing::info!("CRM_API_KEY not set - CRM integration disabled"),
        }
        tracing::debug!("Email failure policy: {:?}", config.email_failure_policy);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn http_url(name: &str, raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.outbound_timeout, Duration::from_secs(8));
        assert!(config.email.api_key.is_none());
        assert_eq!(config.email.base_url, DEFAULT_EMAIL_BASE_URL);
        assert_eq!(config.email.to, vec![DEFAULT_EMAIL_TO.to_string()]);
        assert!(matches!(config.crm, CrmSettings::Disabled));
        assert_eq!(config.email_failure_policy, EmailFailurePolicy::FailFast);
    }

    #[test]
    fn test_blank_crm_key_disables_crm() {
        let config = load(&[("CRM_API_KEY", "   ")]).unwrap();
        assert!(matches!(config.crm, CrmSettings::Disabled));
    }

    #[test]
    fn test_crm_settings() {
        let config = load(&[
            ("CRM_API_KEY", "fub_key"),
            ("CRM_API_BASE_URL", "http://localhost:9000/"),
            ("CRM_MODE", "people"),
        ])
        .unwrap();

        match config.crm {
            CrmSettings::Enabled(crm) => {
                assert_eq!(crm.api_key, "fub_key");
                assert_eq!(crm.base_url, "http://localhost:9000");
                assert_eq!(crm.mode, CrmMode::People);
                assert_eq!(crm.event_type, DEFAULT_CRM_EVENT_TYPE);
            }
            CrmSettings::Disabled => panic!("CRM should be enabled"),
        }
    }

    #[test]
    fn test_recipient_list() {
        let config = load(&[("LEAD_EMAIL_TO", "a@x.com, b@x.com,")]).unwrap();
        assert_eq!(config.email.to, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("OUTBOUND_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("EMAIL_API_BASE_URL", "ftp://mail")]).is_err());
        assert!(load(&[("CRM_API_KEY", "k"), ("CRM_MODE", "batch")]).is_err());
        assert!(load(&[("EMAIL_FAILURE_POLICY", "retry")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[("EMAIL_API_KEY", "re_secret"), ("CRM_API_KEY", "fub_secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("re_secret"));
        assert!(!debug.contains("fub_secret"));
    }
}
