//! Pure conversions from raw form input to canonical values.
//!
//! Nothing here fails: malformed input yields an empty or absent result.

use regex::Regex;
use std::sync::LazyLock;

/// `local@domain.tld` with no whitespace and a dot somewhere after the `@`.
static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email format regex is valid")
});

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a US phone number to exactly 10 digits.
///
/// Formatting characters are dropped and a leading country code `1` is
/// stripped from 11-digit input. Anything else that is not 10 digits is
/// reported as absent, since the phone field is optional.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits = digits_only(raw);

    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }

    (digits.len() == 10).then_some(digits)
}

/// Simple email shape check, applied to the trimmed value.
pub fn is_email_format(raw: &str) -> bool {
    EMAIL_FORMAT.is_match(raw.trim())
}

/// Split a full name into `(first, last)`.
///
/// The first whitespace-separated token is the first name; the remaining
/// tokens joined by single spaces form the last name.
pub fn split_full_name(raw: &str) -> (String, String) {
    let mut parts = raw.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// As-you-type US phone formatting used by the lead form.
///
/// `5551234567` renders as `(555) 123-4567`; partial input renders
/// progressively (`(555`, `(555) 123`). Input is capped at 10 digits after
/// dropping a leading country code.
pub fn format_phone_display(raw: &str) -> String {
    let mut digits = digits_only(raw);

    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }
    digits.truncate(10);

    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({}", digits),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}
