//! Kenyan mobile phone numbers.
//!
//! Checkout validates phone numbers twice: each form step checks the
//! customer and M-Pesa numbers as they are entered, and order placement
//! re-checks the M-Pesa number just before submitting. The two checks accept
//! slightly different prefixes; both are kept as [`PhoneRule`] variants.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern used by the customer-info and payment form steps.
static STEP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|0)[17][0-9]{8}$").expect("Invalid regex"));

/// Pattern used when placing the order. Also accepts a bare `254` prefix.
static SUBMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|254|0)[17][0-9]{8}$").expect("Invalid regex"));

static DISPLAY_254: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^254(\d{3})(\d{3})(\d{3})$").expect("Invalid regex"));

static DISPLAY_LOCAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})(\d{3})(\d{3})$").expect("Invalid regex"));

/// Which validation pattern to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneRule {
    /// `^(\+254|0)[17]\d{8}$`, used by the checkout form steps.
    Step,
    /// `^(\+254|254|0)[17]\d{8}$`, used at order submission.
    Submit,
}

impl PhoneRule {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Step => &*STEP_PATTERN,
            Self::Submit => &*SUBMIT_PATTERN,
        }
    }
}

/// Errors that can occur when parsing a [`KenyanPhone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input is empty or only whitespace.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not a Kenyan mobile number.
    #[error("not a valid Kenyan phone number: {0}")]
    Invalid(String),
}

/// A Kenyan mobile number, stored with whitespace removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct KenyanPhone(String);

impl KenyanPhone {
    /// Parse a phone number under the given rule.
    ///
    /// All whitespace is stripped before matching.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` for blank input, `PhoneError::Invalid` if
    /// the number does not match the rule's pattern.
    pub fn parse(input: &str, rule: PhoneRule) -> Result<Self, PhoneError> {
        if input.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        let compact = strip_whitespace(input);
        if rule.pattern().is_match(&compact) {
            Ok(Self(compact))
        } else {
            Err(PhoneError::Invalid(input.to_string()))
        }
    }

    /// Returns `true` if `input` is valid under `rule`.
    #[must_use]
    pub fn is_valid(input: &str, rule: PhoneRule) -> bool {
        Self::parse(input, rule).is_ok()
    }

    /// The number with whitespace removed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formatted as `+254 XXX XXX XXX`.
    #[must_use]
    pub fn display(&self) -> String {
        format_for_display(&self.0)
    }
}

impl fmt::Display for KenyanPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KenyanPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format any phone-like string as `+254 XXX XXX XXX`.
///
/// Non-digits are dropped first. Numbers that are neither `254...` nor
/// `0...` with nine trailing digits are returned unchanged.
#[must_use]
pub fn format_for_display(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with("254") {
        return DISPLAY_254
            .replace(&digits, "+254 $1 $2 $3")
            .into_owned();
    }

    if let Some(local) = digits.strip_prefix('0') {
        return DISPLAY_LOCAL
            .replace(local, "+254 $1 $2 $3")
            .into_owned();
    }

    phone.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_step_rule_accepts_local_and_international() {
        assert!(KenyanPhone::is_valid("0712345678", PhoneRule::Step));
        assert!(KenyanPhone::is_valid("+254712345678", PhoneRule::Step));
        assert!(KenyanPhone::is_valid("0112345678", PhoneRule::Step));
    }

    #[test]
    fn test_step_rule_strips_whitespace() {
        let phone = KenyanPhone::parse("+254 712 345 678", PhoneRule::Step).unwrap();
        assert_eq!(phone.as_str(), "+254712345678");
    }

    #[test]
    fn test_step_rule_rejects_bare_254_prefix() {
        assert!(!KenyanPhone::is_valid("254712345678", PhoneRule::Step));
    }

    #[test]
    fn test_submit_rule_accepts_bare_254_prefix() {
        assert!(KenyanPhone::is_valid("254712345678", PhoneRule::Submit));
    }

    #[test]
    fn test_rejects_short_number() {
        assert!(!KenyanPhone::is_valid("25471234567", PhoneRule::Step));
        assert!(!KenyanPhone::is_valid("25471234567", PhoneRule::Submit));
    }

    #[test]
    fn test_rejects_invalid_network_prefix() {
        assert!(matches!(
            KenyanPhone::parse("0812345678", PhoneRule::Step),
            Err(PhoneError::Invalid(_))
        ));
        assert!(!KenyanPhone::is_valid("0812345678", PhoneRule::Submit));
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        let arabic_indic = "07\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}\u{668}";
        assert!(!KenyanPhone::is_valid(arabic_indic, PhoneRule::Step));
        assert!(!KenyanPhone::is_valid(arabic_indic, PhoneRule::Submit));

        let fullwidth = "+2547\u{ff11}\u{ff12}\u{ff13}\u{ff14}\u{ff15}\u{ff16}\u{ff17}\u{ff18}";
        assert!(!KenyanPhone::is_valid(fullwidth, PhoneRule::Step));
        assert!(!KenyanPhone::is_valid(fullwidth, PhoneRule::Submit));
    }

    #[test]
    fn test_empty() {
        assert_eq!(
            KenyanPhone::parse("   ", PhoneRule::Step),
            Err(PhoneError::Empty)
        );
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(format_for_display("0712345678"), "+254 712 345 678");
        assert_eq!(format_for_display("+254 712 345 678"), "+254 712 345 678");
        assert_eq!(format_for_display("254712345678"), "+254 712 345 678");
        assert_eq!(format_for_display("12345"), "12345");
    }
}
