/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use evergreen_leads::models::LeadSubmission;
use evergreen_leads::normalize::{
    digits_only, format_phone_display, is_email_format, normalize_phone, split_full_name,
};
use evergreen_leads::validation::{validate, ValidationMode};
use proptest::prelude::*;

// Property: Phone normalization
proptest! {
    #[test]
    fn phone_normalization_never_panics(phone in "\\PC*") {
        let _ = normalize_phone(&phone);
    }

    #[test]
    fn ten_digits_survive_any_separators(
        digits in "[0-9]{10}",
        sep in prop::sample::select(vec!["", " ", "-", ".", ") "])
    ) {
        let formatted = format!("({}{}{}{}{}", &digits[..3], sep, &digits[3..6], sep, &digits[6..]);
        prop_assert_eq!(normalize_phone(&formatted), Some(digits.clone()));
        prop_assert_eq!(normalize_phone(&digits), Some(digits));
    }

    #[test]
    fn leading_one_is_stripped_from_eleven_digits(rest in "[0-9]{10}") {
        let phone = format!("1{}", rest);
        prop_assert_eq!(normalize_phone(&phone), Some(rest));
    }

    #[test]
    fn other_digit_counts_are_absent(digits in "[0-9]{0,20}") {
        prop_assume!(digits.len() != 10);
        prop_assume!(!(digits.len() == 11 && digits.starts_with('1')));
        prop_assert_eq!(normalize_phone(&digits), None);
    }

    #[test]
    fn normalized_phone_is_always_ten_ascii_digits(phone in "\\PC{0,30}") {
        if let Some(normalized) = normalize_phone(&phone) {
            prop_assert_eq!(normalized.len(), 10);
            prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_format_keeps_at_most_ten_digits(phone in "\\PC{0,30}") {
        let display = format_phone_display(&phone);
        prop_assert!(digits_only(&display).len() <= 10);
    }
}

// Property: Email format
proptest! {
    #[test]
    fn email_check_never_panics(email in "\\PC*") {
        let _ = is_email_format(&email);
    }

    #[test]
    fn simple_addresses_accepted(
        local in "[a-z0-9._+-]{1,20}",
        domain in "[a-z0-9-]{1,15}",
        tld in "[a-z]{2,6}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_email_format(&email), "rejected {}", email);
    }

    #[test]
    fn addresses_with_inner_whitespace_rejected(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
        domain in "[a-z]{1,10}"
    ) {
        let email = format!("{} {}@{}.com", a, b, domain);
        prop_assert!(!is_email_format(&email));
    }
}

// Property: Name splitting
proptest! {
    #[test]
    fn name_split_rejoins_to_collapsed_input(name in "[ a-zA-Z\\t]{0,40}") {
        let (first, last) = split_full_name(&name);
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
        let rejoined = if last.is_empty() { first.clone() } else { format!("{} {}", first, last) };
        prop_assert_eq!(rejoined, collapsed);
        prop_assert!(!first.contains(char::is_whitespace));
    }
}

// Property: Consent gates every submission
proptest! {
    #[test]
    fn unconsented_submissions_never_pass(
        name in "[a-zA-Z ]{0,20}",
        email in "\\PC{0,20}",
        state in "[A-Z]{0,2}"
    ) {
        let submission = LeadSubmission {
            full_name: name,
            email,
            property_state: state,
            consent: false,
            ..Default::default()
        };
        prop_assert!(!validate(&submission, ValidationMode::Server).is_empty());
    }
}
