//! # Field validation
//!
//! [`Validator`] checks individual form values against the rules in
//! [`ValidationConfig`] and reports the first problem with each value as a
//! [`FieldError`], whose `Display` text is the message shown next to the field.
//! Validators are total over `&str`: any input yields `Ok(())` or an error,
//! never a panic.
//!
//! | Method | Rule |
//! |--------|------|
//! | [`validate_email`](Validator::validate_email) | required, at most 254 chars, `local@domain.tld` |
//! | [`validate_password`](Validator::validate_password) | required, 8–128 chars, lower + upper + digit + symbol |
//! | [`validate_username`](Validator::validate_username) | required, 3–20 chars of `[A-Za-z0-9_]`, not reserved |
//! | [`validate_phone`](Validator::validate_phone) | optional; 10 digits with a known prefix |
//! | [`validate_name`](Validator::validate_name) | required, 2–50 letters or spaces |
//! | [`validate_confirm_password`](Validator::validate_confirm_password) | required, equal to the password |
//! | [`validate_required`](Validator::validate_required) | not blank |
//! | [`validate_card_number`](Validator::validate_card_number) | 13–19 digits |
//! | [`validate_expiry`](Validator::validate_expiry) | `MM/YY` with a real month |
//!
//! Whole forms are validated with [`Validator::validate_form`] against a
//! [`Schema`]; see the [`schema`] module.

pub mod schema;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use store::ValidationConfig;

pub use schema::{Form, Schema, ValidationErrors};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid regex"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}\s]+$").expect("Invalid regex"));
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("Invalid regex"));

const CARD_DIGITS_MIN: usize = 13;
const CARD_DIGITS_MAX: usize = 19;

/// A single field failing its rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(String),
    #[error("{label} must be at least {min} characters")]
    TooShort { label: String, min: usize },
    #[error("{label} must be no more than {max} characters")]
    TooLong { label: String, max: usize },
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must contain an uppercase letter, a lowercase letter, a number and one of {symbols}")]
    WeakPassword { symbols: String },
    #[error("Username can only contain letters, numbers and underscores")]
    InvalidUsername,
    #[error("This username is not allowed")]
    ReservedUsername,
    #[error("Phone number must be exactly {length} digits")]
    InvalidPhoneLength { length: usize },
    #[error("Phone number must start with {prefixes}")]
    InvalidPhonePrefix { prefixes: String },
    #[error("{0} can only contain letters and spaces")]
    InvalidName(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Card number must be between 13 and 19 digits")]
    InvalidCardNumber,
    #[error("Expiry date must be in MM/YY format")]
    InvalidExpiry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

/// Which strength criteria a password meets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthChecks {
    pub length: bool,
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub long_length: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub level: StrengthLevel,
    /// Number of satisfied checks, 0–6.
    pub score: u8,
    pub checks: StrengthChecks,
}

/// Progress against the complexity rule, for live checklists under the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_symbol: bool,
}

impl PasswordRequirements {
    fn complexity_met(&self) -> bool {
        self.has_lowercase && self.has_uppercase && self.has_number && self.has_symbol
    }
}

/// Rule-driven field validators.
///
/// Built once from configuration and shared by reference with every form
/// handler.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    rules: ValidationConfig,
}

impl Validator {
    pub fn new(rules: ValidationConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ValidationConfig {
        &self.rules
    }

    pub fn validate_email(&self, value: &str) -> Result<(), FieldError> {
        if value.is_empty() {
            return Err(FieldError::Required("Email".to_string()));
        }
        let max = self.rules.email.max_length;
        if value.chars().count() > max {
            return Err(FieldError::TooLong {
                label: "Email".to_string(),
                max,
            });
        }
        if !EMAIL_RE.is_match(value) {
            return Err(FieldError::InvalidEmail);
        }
        Ok(())
    }

    pub fn validate_password(&self, value: &str) -> Result<(), FieldError> {
        if value.is_empty() {
            return Err(FieldError::Required("Password".to_string()));
        }
        let rules = &self.rules.password;
        check_length("Password", value, rules.min_length, rules.max_length)?;
        if !self.password_requirements(value).complexity_met() {
            return Err(FieldError::WeakPassword {
                symbols: rules.symbols.clone(),
            });
        }
        Ok(())
    }

    /// Validates the trimmed username; the reserved-name check ignores case.
    pub fn validate_username(&self, value: &str) -> Result<(), FieldError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FieldError::Required("Username".to_string()));
        }
        let rules = &self.rules.username;
        check_length("Username", value, rules.min_length, rules.max_length)?;
        if !USERNAME_RE.is_match(value) {
            return Err(FieldError::InvalidUsername);
        }
        let lowered = value.to_lowercase();
        if rules.reserved.iter().any(|r| r.to_lowercase() == lowered) {
            return Err(FieldError::ReservedUsername);
        }
        Ok(())
    }

    /// Phone is optional: a blank value passes.
    pub fn validate_phone(&self, value: &str) -> Result<(), FieldError> {
        if value.trim().is_empty() {
            return Ok(());
        }
        let rules = &self.rules.phone;
        let digits = crate::format::clean_phone_number(value);
        if digits.len() != rules.length {
            return Err(FieldError::InvalidPhoneLength {
                length: rules.length,
            });
        }
        if !rules.prefixes.iter().any(|p| digits.starts_with(p.as_str())) {
            return Err(FieldError::InvalidPhonePrefix {
                prefixes: rules.prefixes.join(", "),
            });
        }
        Ok(())
    }

    pub fn validate_name(&self, value: &str, label: &str) -> Result<(), FieldError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FieldError::Required(label.to_string()));
        }
        let rules = &self.rules.name;
        check_length(label, value, rules.min_length, rules.max_length)?;
        if !NAME_RE.is_match(value) {
            return Err(FieldError::InvalidName(label.to_string()));
        }
        Ok(())
    }

    pub fn validate_confirm_password(&self, password: &str, confirm: &str) -> Result<(), FieldError> {
        if confirm.is_empty() {
            return Err(FieldError::Required("Password confirmation".to_string()));
        }
        if password != confirm {
            return Err(FieldError::PasswordMismatch);
        }
        Ok(())
    }

    pub fn validate_required(&self, value: &str, label: &str) -> Result<(), FieldError> {
        if value.trim().is_empty() {
            return Err(FieldError::Required(label.to_string()));
        }
        Ok(())
    }

    /// Digits with optional space or dash separators, 13 to 19 digits long.
    pub fn validate_card_number(&self, value: &str) -> Result<(), FieldError> {
        self.validate_required(value, "Card number")?;
        if !value
            .trim()
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        {
            return Err(FieldError::InvalidCardNumber);
        }
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !(CARD_DIGITS_MIN..=CARD_DIGITS_MAX).contains(&digits) {
            return Err(FieldError::InvalidCardNumber);
        }
        Ok(())
    }

    pub fn validate_expiry(&self, value: &str) -> Result<(), FieldError> {
        self.validate_required(value, "Expiry date")?;
        if !EXPIRY_RE.is_match(value.trim()) {
            return Err(FieldError::InvalidExpiry);
        }
        Ok(())
    }

    pub fn password_requirements(&self, value: &str) -> PasswordRequirements {
        let symbols = &self.rules.password.symbols;
        PasswordRequirements {
            min_length: value.chars().count() >= self.rules.password.min_length,
            has_lowercase: value.chars().any(|c| c.is_ascii_lowercase()),
            has_uppercase: value.chars().any(|c| c.is_ascii_uppercase()),
            has_number: value.chars().any(|c| c.is_ascii_digit()),
            has_symbol: value.chars().any(|c| symbols.contains(c)),
        }
    }

    /// Heuristic strength meter; independent of whether the password is valid.
    pub fn password_strength(&self, value: &str) -> PasswordStrength {
        let len = value.chars().count();
        let checks = StrengthChecks {
            length: len >= 8,
            lowercase: value.chars().any(|c| c.is_ascii_lowercase()),
            uppercase: value.chars().any(|c| c.is_ascii_uppercase()),
            numbers: value.chars().any(|c| c.is_ascii_digit()),
            symbols: value.chars().any(|c| !c.is_ascii_alphanumeric()),
            long_length: len >= 12,
        };
        let score = [
            checks.length,
            checks.lowercase,
            checks.uppercase,
            checks.numbers,
            checks.symbols,
            checks.long_length,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as u8;

        let level = match score {
            0..=2 => StrengthLevel::Weak,
            3..=4 => StrengthLevel::Medium,
            _ => StrengthLevel::Strong,
        };
        PasswordStrength {
            level,
            score,
            checks,
        }
    }
}

fn check_length(label: &str, value: &str, min: usize, max: usize) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len < min {
        return Err(FieldError::TooShort {
            label: label.to_string(),
            min,
        });
    }
    if len > max {
        return Err(FieldError::TooLong {
            label: label.to_string(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::default()
    }

    #[test]
    fn test_email() {
        let v = validator();
        assert!(v.validate_email("john@example.com").is_ok());
        assert_eq!(
            v.validate_email(""),
            Err(FieldError::Required("Email".to_string()))
        );
        assert_eq!(v.validate_email("john@example"), Err(FieldError::InvalidEmail));
        assert_eq!(v.validate_email("jo hn@example.com"), Err(FieldError::InvalidEmail));
        assert_eq!(v.validate_email("@example.com"), Err(FieldError::InvalidEmail));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(v.validate_email(&long), Err(FieldError::TooLong { max: 254, .. })));
    }

    #[test]
    fn test_password() {
        let v = validator();
        assert!(v.validate_password("Secur3!ty").is_ok());
        assert!(matches!(v.validate_password(""), Err(FieldError::Required(_))));
        assert!(matches!(
            v.validate_password("Sh0r!"),
            Err(FieldError::TooShort { min: 8, .. })
        ));
        assert!(matches!(
            v.validate_password(&format!("Aa1!{}", "x".repeat(130))),
            Err(FieldError::TooLong { max: 128, .. })
        ));
        // Each missing class on its own.
        for weak in ["secur3!ty", "SECUR3!TY", "Security!", "Secur3ity"] {
            assert!(
                matches!(v.validate_password(weak), Err(FieldError::WeakPassword { .. })),
                "{weak} should be weak"
            );
        }
        // '#' is not one of the accepted symbols.
        assert!(v.validate_password("Secur3#ty").is_err());
    }

    #[test]
    fn test_username() {
        let v = validator();
        assert!(v.validate_username("johndoe").is_ok());
        assert!(v.validate_username("John_Doe_99").is_ok());
        assert!(matches!(v.validate_username("  "), Err(FieldError::Required(_))));
        assert!(matches!(v.validate_username("jo"), Err(FieldError::TooShort { min: 3, .. })));
        assert!(matches!(
            v.validate_username(&"a".repeat(21)),
            Err(FieldError::TooLong { max: 20, .. })
        ));
        assert_eq!(v.validate_username("john.doe"), Err(FieldError::InvalidUsername));
        assert_eq!(v.validate_username("john-doe"), Err(FieldError::InvalidUsername));
    }

    #[test]
    fn test_reserved_username_ignores_case() {
        let v = validator();
        for name in ["admin", "Admin", "ADMIN", "root", "System", "administrator"] {
            assert_eq!(v.validate_username(name), Err(FieldError::ReservedUsername), "{name}");
        }
        assert_ne!(
            FieldError::ReservedUsername.to_string(),
            FieldError::InvalidUsername.to_string()
        );
        assert!(v.validate_username("admin2").is_ok());
    }

    #[test]
    fn test_phone() {
        let v = validator();
        assert!(v.validate_phone("").is_ok());
        assert!(v.validate_phone("0912345678").is_ok());
        assert!(v.validate_phone("091 234 5678").is_ok());
        assert!(v.validate_phone("(03) 1234-5678").is_ok());
        assert_eq!(
            v.validate_phone("091234567"),
            Err(FieldError::InvalidPhoneLength { length: 10 })
        );
        assert_eq!(
            v.validate_phone("0112345678"),
            Err(FieldError::InvalidPhonePrefix {
                prefixes: "03, 05, 07, 08, 09".to_string()
            })
        );
        assert!(v.validate_phone("abc").is_err());
    }

    #[test]
    fn test_name() {
        let v = validator();
        assert!(v.validate_name("John", "First name").is_ok());
        assert!(v.validate_name("Mary Ann", "First name").is_ok());
        assert!(v.validate_name("Nguyễn Đức", "Last name").is_ok());
        assert!(v.validate_name("José", "First name").is_ok());
        assert_eq!(
            v.validate_name("", "First name"),
            Err(FieldError::Required("First name".to_string()))
        );
        assert!(matches!(v.validate_name("J", "First name"), Err(FieldError::TooShort { .. })));
        assert!(matches!(
            v.validate_name(&"a".repeat(51), "First name"),
            Err(FieldError::TooLong { .. })
        ));
        assert_eq!(
            v.validate_name("R2D2", "First name"),
            Err(FieldError::InvalidName("First name".to_string()))
        );
        assert_eq!(
            FieldError::InvalidName("Last name".to_string()).to_string(),
            "Last name can only contain letters and spaces"
        );
    }

    #[test]
    fn test_confirm_password_and_required() {
        let v = validator();
        assert!(v.validate_confirm_password("Secur3!ty", "Secur3!ty").is_ok());
        assert!(matches!(
            v.validate_confirm_password("Secur3!ty", ""),
            Err(FieldError::Required(_))
        ));
        assert_eq!(
            v.validate_confirm_password("Secur3!ty", "secur3!ty"),
            Err(FieldError::PasswordMismatch)
        );

        assert!(v.validate_required("x", "City").is_ok());
        assert_eq!(
            v.validate_required(" \t", "City").unwrap_err().to_string(),
            "City is required"
        );
    }

    #[test]
    fn test_card_number_and_expiry() {
        let v = validator();
        assert!(v.validate_card_number("4242 4242 4242 4242").is_ok());
        assert!(v.validate_card_number("4242-4242-4242-4").is_ok());
        assert_eq!(v.validate_card_number("4242"), Err(FieldError::InvalidCardNumber));
        assert_eq!(
            v.validate_card_number("4242 4242 4242 42*2"),
            Err(FieldError::InvalidCardNumber)
        );
        assert!(matches!(v.validate_card_number(""), Err(FieldError::Required(_))));

        assert!(v.validate_expiry("12/27").is_ok());
        assert_eq!(v.validate_expiry("13/27"), Err(FieldError::InvalidExpiry));
        assert_eq!(v.validate_expiry("1227"), Err(FieldError::InvalidExpiry));
        assert_eq!(v.validate_expiry("00/27"), Err(FieldError::InvalidExpiry));
    }

    #[test]
    fn test_custom_rules() {
        let mut rules = ValidationConfig::default();
        rules.phone.prefixes = vec!["01".to_string()];
        rules.username.reserved.push("support".to_string());
        let v = Validator::new(rules);

        assert!(v.validate_phone("0112345678").is_ok());
        assert!(v.validate_phone("0912345678").is_err());
        assert_eq!(v.validate_username("Support"), Err(FieldError::ReservedUsername));
    }

    #[test]
    fn test_password_strength() {
        let v = validator();
        assert_eq!(v.password_strength("abc").level, StrengthLevel::Weak);

        let medium = v.password_strength("abcdefgH");
        assert_eq!(medium.score, 3);
        assert_eq!(medium.level, StrengthLevel::Medium);

        let strong = v.password_strength("Secur3!ty-long");
        assert_eq!(strong.score, 6);
        assert_eq!(strong.level, StrengthLevel::Strong);
        assert!(strong.checks.long_length);
    }

    #[test]
    fn test_password_requirements() {
        let v = validator();
        let reqs = v.password_requirements("abc1");
        assert!(!reqs.min_length);
        assert!(reqs.has_lowercase);
        assert!(reqs.has_number);
        assert!(!reqs.has_uppercase);
        assert!(!reqs.has_symbol);
    }

    #[test]
    fn test_validators_never_panic_on_odd_input() {
        let v = validator();
        let long = "x".repeat(10_000);
        for input in ["", " ", "\u{0}", "🙂🙂🙂", "é", "@@@", "/", "a\nb", long.as_str()] {
            let _ = v.validate_email(input);
            let _ = v.validate_password(input);
            let _ = v.validate_username(input);
            let _ = v.validate_phone(input);
            let _ = v.validate_name(input, "Name");
            let _ = v.validate_required(input, "Field");
            let _ = v.validate_card_number(input);
            let _ = v.validate_expiry(input);
            let _ = v.password_strength(input);
        }
    }
}
