//! French phone number rules
//!
//! Mirrors the normalisation the verification service applies so the OTP
//! suite can tell which inputs the service will treat as the bypass number.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-.()]").expect("separator pattern is valid"));

static FRENCH_E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+33[1-9]\d{8}$").expect("E.164 pattern is valid"));

/// Normalise a French number to E.164 (`+33...`)
pub fn normalize(phone: &str) -> String {
    let cleaned = SEPARATORS.replace_all(phone, "");

    if cleaned.starts_with("+33") {
        cleaned.into_owned()
    } else if let Some(rest) = cleaned.strip_prefix("0033") {
        format!("+33{rest}")
    } else if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+33{rest}")
    } else if cleaned.starts_with("33") {
        format!("+{cleaned}")
    } else {
        format!("+33{cleaned}")
    }
}

/// Whether an already normalised number is a valid French number
pub fn is_valid_french(normalized: &str) -> bool {
    FRENCH_E164.is_match(normalized)
}

/// Whether `phone` designates the same line as `bypass`
pub fn is_bypass(phone: &str, bypass: &str) -> bool {
    normalize(phone) == normalize(bypass)
}
