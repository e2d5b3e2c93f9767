/// Unit tests for normalization and validation rules
/// Tests phone/email/name normalization and the shared form rules
use evergreen_leads::models::LeadSubmission;
use evergreen_leads::normalize::{is_email_format, normalize_phone, split_full_name};
use evergreen_leads::validation::{validate, Field, ValidationMode};

#[cfg(test)]
mod email_format_tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_email_format("a@b.com"));
        assert!(is_email_format("user@example.com"));
        assert!(is_email_format("user+tag@example.co.uk"));
        assert!(is_email_format("  padded@example.com  "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_email_format("a@b"));
        assert!(!is_email_format("a b@c.com"));
        assert!(!is_email_format("user@exa mple.com"));
        assert!(!is_email_format("userexample.com"));
        assert!(!is_email_format("@example.com"));
        assert!(!is_email_format("user@"));
        assert!(!is_email_format("user@@example.com"));
        assert!(!is_email_format(""));
    }
}

#[cfg(test)]
mod phone_tests {
    use super::*;

    #[test]
    fn test_ten_digit_numbers() {
        assert_eq!(normalize_phone("5551234567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("(555) 123-4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("555 123 4567").as_deref(), Some("5551234567"));
    }

    #[test]
    fn test_us_country_code() {
        assert_eq!(normalize_phone("+1 (555) 123-4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("1-555-123-4567").as_deref(), Some("5551234567"));
    }

    #[test]
    fn test_unusable_numbers_are_absent() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("call me"), None);
        assert_eq!(normalize_phone("123"), None);
        assert_eq!(normalize_phone("+44 20 7946 0958"), None);
        assert_eq!(normalize_phone("555123456"), None);
    }
}

#[cfg(test)]
mod name_tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("Chris Miller"),
            ("Chris".to_string(), "Miller".to_string())
        );
        assert_eq!(
            split_full_name("José  de la  Cruz"),
            ("José".to_string(), "de la Cruz".to_string())
        );
        assert_eq!(split_full_name("Prince"), ("Prince".to_string(), String::new()));
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn submission() -> LeadSubmission {
        LeadSubmission {
            full_name: "Chris Miller".into(),
            email: "chris@example.com".into(),
            property_state: "NY".into(),
            consent: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_name_only_name_error() {
        let lead = LeadSubmission {
            full_name: String::new(),
            email: "x@y.com".into(),
            ..submission()
        };

        let errors = validate(&lead, ValidationMode::Server);
        assert_eq!(errors.fields(), vec![Field::FullName]);
        assert_eq!(errors.get(Field::FullName), Some("Please enter your name."));
    }

    #[test]
    fn test_no_consent_only_consent_error() {
        let lead = LeadSubmission {
            consent: false,
            ..submission()
        };

        let errors = validate(&lead, ValidationMode::Server);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Field::Consent));
    }

    #[test]
    fn test_bad_email_error() {
        let lead = LeadSubmission {
            email: "chris@example".into(),
            ..submission()
        };

        let errors = validate(&lead, ValidationMode::Client);
        assert_eq!(errors.fields(), vec![Field::Email]);
    }

    #[test]
    fn test_phone_rule_is_client_only() {
        let lead = LeadSubmission {
            phone: "(555) 123".into(),
            ..submission()
        };

        assert_eq!(
            validate(&lead, ValidationMode::Client).fields(),
            vec![Field::Phone]
        );
        assert!(validate(&lead, ValidationMode::Server).is_empty());
    }
}
