//! Validation utilities for user input
//!
//! Single-field validators return a [`ValidationResult`]; forms collect them
//! into [`FieldErrors`] keyed by field name.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9\s\-()]{6,19}$").expect("valid phone regex"));
static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\- ]{2,9}$").expect("valid zip regex"));
static SORT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]{2,11}$").expect("valid sort code regex"));
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{1,10}$").expect("valid symbol regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Per-field validation messages, in the order the fields were checked.
///
/// Only the first failure for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if self.get(&field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    /// Record the result of a validator under `field`.
    pub fn check(&mut self, field: &str, result: ValidationResult) {
        if let Some(message) = result.error {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn remove(&mut self, field: &str) {
        self.entries.retain(|(f, _)| f != field);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.iter().next()
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Validate that a value is present (non-blank)
pub fn validate_required(value: &str, label: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::err(format!("{} is required", label));
    }
    ValidationResult::ok()
}

/// Validate a length range, counting characters of the trimmed value
pub fn validate_length(value: &str, label: &str, min: usize, max: usize) -> ValidationResult {
    let len = value.trim().chars().count();
    if len < min {
        return ValidationResult::err(format!("{} must be at least {} characters", label, min));
    }
    if len > max {
        return ValidationResult::err(format!("{} must be at most {} characters", label, max));
    }
    ValidationResult::ok()
}

/// Validate an email address: one `@`, a non-empty local part, a dotted domain
pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return ValidationResult::err("Email is required");
    }
    if email.chars().any(char::is_whitespace) {
        return ValidationResult::err("Email cannot contain spaces");
    }

    let Some((local, domain)) = email.split_once('@') else {
        return ValidationResult::err("Invalid email format");
    };
    if local.is_empty() {
        return ValidationResult::err("Email username cannot be empty");
    }
    if domain.contains('@') {
        return ValidationResult::err("Invalid email format");
    }
    let labels_ok = domain.split('.').all(|label| !label.is_empty());
    if !domain.contains('.') || !labels_ok {
        return ValidationResult::err("Invalid email domain");
    }

    ValidationResult::ok()
}

/// Validate a new password: at least 8 characters with upper, lower and a digit.
///
/// Only applied where a password is chosen; login accepts whatever was set before.
pub fn validate_new_password(password: &str, label: &str) -> ValidationResult {
    if password.is_empty() {
        return ValidationResult::err(format!("{} is required", label));
    }
    if password.chars().count() < 8 {
        return ValidationResult::err(format!("{} must be at least 8 characters", label));
    }

    let checks = [
        (password.chars().any(char::is_uppercase), "one uppercase letter"),
        (password.chars().any(char::is_lowercase), "one lowercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "one number"),
    ];
    if let Some((_, missing)) = checks.iter().find(|(present, _)| !present) {
        return ValidationResult::err(format!("{} must contain at least {}", label, missing));
    }

    ValidationResult::ok()
}

/// Validate a bank account number: digits only, 8 to 20 of them
pub fn validate_account_number(number: &str) -> ValidationResult {
    let number = number.trim();
    if number.is_empty() {
        return ValidationResult::err("Account number is required");
    }
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return ValidationResult::err("Account number must contain only digits");
    }
    if number.len() < 8 {
        return ValidationResult::err("Account number must be at least 8 digits");
    }
    if number.len() > 20 {
        return ValidationResult::err("Account number must be at most 20 digits");
    }
    ValidationResult::ok()
}

/// Validate a bank / sort code
pub fn validate_sort_code(code: &str) -> ValidationResult {
    if code.trim().is_empty() {
        return ValidationResult::err("Bank code is required");
    }
    if !SORT_CODE_RE.is_match(code.trim()) {
        return ValidationResult::err("Bank code must be 2-11 letters, digits or dashes");
    }
    ValidationResult::ok()
}

/// Validate an optional phone number
pub fn validate_phone(phone: &str) -> ValidationResult {
    if phone.trim().is_empty() || PHONE_RE.is_match(phone.trim()) {
        return ValidationResult::ok();
    }
    ValidationResult::err("Invalid phone number format")
}

/// Validate an optional postal code
pub fn validate_zip(zip: &str) -> ValidationResult {
    if zip.trim().is_empty() || ZIP_RE.is_match(zip.trim()) {
        return ValidationResult::ok();
    }
    ValidationResult::err("Invalid ZIP/postal code")
}

/// Validate an ISO 4217 currency code
pub fn validate_currency(currency: &str) -> ValidationResult {
    if currency.trim().is_empty() {
        return ValidationResult::err("Currency is required");
    }
    if !CURRENCY_RE.is_match(currency.trim()) {
        return ValidationResult::err("Currency must be a 3-letter code");
    }
    ValidationResult::ok()
}

/// Validate a ticker symbol
pub fn validate_symbol(symbol: &str) -> ValidationResult {
    if symbol.trim().is_empty() {
        return ValidationResult::err("Symbol is required");
    }
    if !SYMBOL_RE.is_match(symbol.trim()) {
        return ValidationResult::err("Symbol must be 1-10 uppercase letters or digits");
    }
    ValidationResult::ok()
}

/// Parse a decimal amount typed by the user
pub fn parse_amount(raw: &str, label: &str) -> Result<Decimal, String> {
    let raw = raw.trim().replace(',', "");
    if raw.is_empty() {
        return Err(format!("{} is required", label));
    }
    raw.parse::<Decimal>()
        .map_err(|_| format!("{} must be a valid number", label))
}

/// Validate that an amount is not negative
pub fn validate_non_negative(amount: Decimal, label: &str) -> ValidationResult {
    if amount.is_sign_negative() && !amount.is_zero() {
        return ValidationResult::err(format!("{} cannot be negative", label));
    }
    ValidationResult::ok()
}

/// Validate that an amount is strictly positive
pub fn validate_positive(amount: Decimal, label: &str) -> ValidationResult {
    if amount <= Decimal::ZERO {
        return ValidationResult::err(format!("{} must be greater than 0", label));
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_valid);
        assert!(validate_email(" user@domain.co.uk ").is_valid);
        assert_eq!(validate_email("").error.as_deref(), Some("Email is required"));
        assert!(!validate_email("invalid").is_valid);
        assert!(!validate_email("@example.com").is_valid);
        assert!(!validate_email("test@").is_valid);
        assert!(!validate_email("a@b@example.com").is_valid);
        assert!(!validate_email("jane@example.").is_valid);
        assert!(!validate_email("jane doe@example.com").is_valid);
    }

    #[test]
    fn test_new_password_validation() {
        assert!(validate_new_password("SecurePass123", "Password").is_valid);
        assert_eq!(
            validate_new_password("short", "Password").error.as_deref(),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(
            validate_new_password("nouppercase123", "New password").error.as_deref(),
            Some("New password must contain at least one uppercase letter")
        );
        assert!(!validate_new_password("NOLOWERCASE123", "Password").is_valid);
        assert_eq!(
            validate_new_password("NoDigitsHere", "Password").error.as_deref(),
            Some("Password must contain at least one number")
        );
    }

    #[test]
    fn test_account_number_validation() {
        assert!(validate_account_number("9876543210").is_valid);
        assert_eq!(
            validate_account_number("1234567").error.as_deref(),
            Some("Account number must be at least 8 digits")
        );
        assert!(!validate_account_number("12345abc9").is_valid);
        assert!(!validate_account_number("123456789012345678901").is_valid);
    }

    #[test]
    fn test_format_validators() {
        assert!(validate_sort_code("NB").is_valid);
        assert!(validate_sort_code("12-34-56").is_valid);
        assert!(!validate_sort_code("N").is_valid);
        assert!(validate_phone("+1 (555) 123-4567").is_valid);
        assert!(validate_phone("").is_valid);
        assert!(!validate_phone("call me").is_valid);
        assert!(validate_zip("SW1A 1AA").is_valid);
        assert!(validate_zip("94103").is_valid);
        assert!(!validate_zip("#").is_valid);
        assert!(validate_currency("USD").is_valid);
        assert!(!validate_currency("usd").is_valid);
        assert!(validate_symbol("GTEC").is_valid);
        assert!(validate_symbol("BRKB2").is_valid);
        assert!(!validate_symbol("BRK.B").is_valid);
        assert!(!validate_symbol("apple").is_valid);
        assert!(!validate_symbol("ABCDEFGHIJK").is_valid);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,000.50", "Amount"), Ok(dec!(1000.50)));
        assert_eq!(parse_amount(" ", "Amount"), Err("Amount is required".to_string()));
        assert_eq!(parse_amount("ten", "Amount"), Err("Amount must be a valid number".to_string()));
    }

    #[test]
    fn test_field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required("", "Name"));
        errors.check("name", validate_length("", "Name", 2, 10));
        errors.check("currency", validate_currency("USD"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.to_string(), "name: Name is required");
        assert!(errors.into_result().is_err());
    }
}
