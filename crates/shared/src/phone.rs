//! Phone-number identity canonicalization.
//!
//! Historic tables were seeded at different times and store the same person
//! either with or without the `57` country prefix. A [`PhoneKey`] carries both
//! canonical forms so lookups can always match with `celular IN (local, prefixed)`
//! instead of betting on a single form.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Country calling prefix used by the historic data set.
pub const COUNTRY_PREFIX: &str = "57";

/// Minimum digits a usable subscriber number can have.
const MIN_DIGITS: usize = 7;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"\D").expect("valid regex");
}

/// Error produced when an inbound identity string cannot be canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,

    #[error("phone number too short: {0} digits")]
    TooShort(usize),
}

/// Canonicalized phone identity in both historic forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneKey {
    local: String,
    prefixed: String,
}

impl PhoneKey {
    /// Parses an inbound identity string into its two canonical forms.
    ///
    /// All non-digit characters are stripped. If the digit string starts with
    /// the country prefix and is longer than a local subscriber number, the
    /// prefix is peeled off to obtain the local form; otherwise the digit
    /// string itself is the local form.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        let digits = NON_DIGITS.replace_all(raw, "").into_owned();
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if digits.len() < MIN_DIGITS {
            return Err(PhoneError::TooShort(digits.len()));
        }

        let local = if digits.starts_with(COUNTRY_PREFIX) && digits.len() > 10 {
            digits[COUNTRY_PREFIX.len()..].to_string()
        } else {
            digits
        };
        let prefixed = format!("{COUNTRY_PREFIX}{local}");

        Ok(Self { local, prefixed })
    }

    /// Digit-only form without the country prefix.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Digit-only form with the country prefix.
    pub fn prefixed(&self) -> &str {
        &self.prefixed
    }

    /// Returns true when `other` refers to the same identity in either form.
    pub fn matches(&self, other: &str) -> bool {
        let digits = NON_DIGITS.replace_all(other, "");
        digits == self.local || digits == self.prefixed
    }
}

impl std::fmt::Display for PhoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_number() {
        let key = PhoneKey::parse("3001234567").unwrap();
        assert_eq!(key.local(), "3001234567");
        assert_eq!(key.prefixed(), "573001234567");
    }

    #[test]
    fn test_parse_prefixed_number() {
        let key = PhoneKey::parse("573001234567").unwrap();
        assert_eq!(key.local(), "3001234567");
        assert_eq!(key.prefixed(), "573001234567");
    }

    #[test]
    fn test_parse_strips_formatting() {
        let key = PhoneKey::parse("+57 (300) 123-4567").unwrap();
        assert_eq!(key.local(), "3001234567");
        assert_eq!(key.prefixed(), "573001234567");
    }

    #[test]
    fn test_both_forms_resolve_to_same_key() {
        let a = PhoneKey::parse("3001234567").unwrap();
        let b = PhoneKey::parse("573001234567").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_number_starting_with_57_but_local_length() {
        // A 10-digit number that merely starts with 57 is a local number,
        // not a prefixed one.
        let key = PhoneKey::parse("5712345678").unwrap();
        assert_eq!(key.local(), "5712345678");
        assert_eq!(key.prefixed(), "575712345678");
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert_eq!(PhoneKey::parse(""), Err(PhoneError::Empty));
        assert_eq!(PhoneKey::parse("abc"), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_too_short_rejected() {
        assert_eq!(PhoneKey::parse("12345"), Err(PhoneError::TooShort(5)));
    }

    #[test]
    fn test_matches_either_form() {
        let key = PhoneKey::parse("3001234567").unwrap();
        assert!(key.matches("3001234567"));
        assert!(key.matches("573001234567"));
        assert!(key.matches("+57 300 123 4567"));
        assert!(!key.matches("3009999999"));
    }

    #[test]
    fn test_display_uses_prefixed_form() {
        let key = PhoneKey::parse("3001234567").unwrap();
        assert_eq!(key.to_string(), "573001234567");
    }
}
