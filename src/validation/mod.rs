use bigdecimal::BigDecimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const KENYAN_MSISDN_PREFIX: &str = "254";
pub const KENYAN_MSISDN_LEN: usize = 12;
pub const DONATION_MESSAGE_MAX_LEN: usize = 250;
pub const FULL_NAME_MAX_LEN: usize = 100;
pub const SCHOOL_NAME_MAX_LEN: usize = 100;
pub const ACADEMIC_LEVEL_MAX_LEN: usize = 50;
pub const STORY_MIN_LEN: usize = 50;
pub const PROFILE_IMAGE_MAX_LEN: usize = 200;
/// Money columns are `NUMERIC(14,2)`.
pub const MONEY_SCALE: i64 = 2;
pub const MONEY_MAX_EXCLUSIVE: i64 = 1_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Field-level errors collected over a whole input. Only the first error for
/// each field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.entry(error.field).or_insert(error.message);
    }

    /// Records the error of a failed check, if any.
    pub fn check(&mut self, result: ValidationResult) {
        if let Err(error) = result {
            self.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(error);
        errors
    }
}

/// Collapses whitespace runs (tabs and newlines included) into single spaces
/// and drops any remaining control characters.
pub fn sanitize_string(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| word.chars().filter(|ch| !ch.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_min_len(field: &'static str, value: &str, min_len: usize) -> ValidationResult {
    if value.chars().count() < min_len {
        return Err(ValidationError::new(
            field,
            format!("must be at least {} characters", min_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new(field, "Amount must be positive"));
    }

    Ok(())
}

/// A positive amount that fits a money column exactly: at most two decimal
/// places and below 10^12.
pub fn validate_money_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    validate_positive_amount(field, amount)?;

    if amount.with_scale(MONEY_SCALE) != *amount {
        return Err(ValidationError::new(
            field,
            "Amount must have at most 2 decimal places",
        ));
    }
    if amount >= &BigDecimal::from(MONEY_MAX_EXCLUSIVE) {
        return Err(ValidationError::new(field, "Amount is too large"));
    }

    Ok(())
}

/// Kenyan mobile number in international form without the plus sign:
/// `254` followed by nine digits.
pub fn validate_kenyan_msisdn(field: &'static str, phone_number: &str) -> ValidationResult {
    let well_formed = phone_number.len() == KENYAN_MSISDN_LEN
        && phone_number.starts_with(KENYAN_MSISDN_PREFIX)
        && phone_number.chars().all(|ch| ch.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::new(
            field,
            "Phone number must be in the format 254XXXXXXXXX",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        assert!(validate_max_len("field", "ñañ", 3).is_ok());
    }

    #[test]
    fn validates_min_len() {
        assert!(validate_min_len("story", &"a".repeat(50), STORY_MIN_LEN).is_ok());
        assert!(validate_min_len("story", &"a".repeat(49), STORY_MIN_LEN).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("payment_method", "mpesa", &["mpesa", "card"]).is_ok());
        assert!(validate_enum("payment_method", "cash", &["mpesa", "card"]).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
        assert_eq!(
            sanitize_string("Keep going\nwe believe\r\nin you"),
            "Keep going we believe in you"
        );
        assert_eq!(sanitize_string("a \u{0007} b"), "a b");
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount("amount", &positive).is_ok());
        assert!(validate_positive_amount("amount", &zero).is_err());
        assert!(validate_positive_amount("amount", &negative).is_err());
    }

    #[test]
    fn money_amount_fits_two_decimal_column() {
        let amount = |s: &str| BigDecimal::from_str(s).expect("valid decimal");

        assert!(validate_money_amount("amount", &amount("100.50")).is_ok());
        assert!(validate_money_amount("amount", &amount("100.500")).is_ok());
        assert!(validate_money_amount("amount", &amount("999999999999.99")).is_ok());

        let err = validate_money_amount("amount", &amount("0.001")).unwrap_err();
        assert_eq!(err.message, "Amount must have at most 2 decimal places");
        assert!(validate_money_amount("amount", &amount("100.005")).is_err());

        let err = validate_money_amount("amount", &amount("1000000000000")).unwrap_err();
        assert_eq!(err.message, "Amount is too large");

        let err = validate_money_amount("amount", &amount("0")).unwrap_err();
        assert_eq!(err.message, "Amount must be positive");
    }

    #[test]
    fn validates_kenyan_msisdn() {
        assert!(validate_kenyan_msisdn("phone_number", "254712345678").is_ok());
        assert!(validate_kenyan_msisdn("phone_number", "0712345678").is_err());
        assert!(validate_kenyan_msisdn("phone_number", "25471234567").is_err());
        assert!(validate_kenyan_msisdn("phone_number", "2547123456789").is_err());
        assert!(validate_kenyan_msisdn("phone_number", "+25471234567").is_err());
        assert!(validate_kenyan_msisdn("phone_number", "25471234567a").is_err());
    }

    #[test]
    fn collector_keeps_first_error_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::new("amount", "first"));
        errors.push(ValidationError::new("amount", "second"));
        errors.check(validate_required("bank", ""));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("amount"), Some("first"));
        assert_eq!(errors.get("bank"), Some("must not be empty"));
    }

    #[test]
    fn collector_serializes_as_field_map() {
        let errors = ValidationErrors::from(ValidationError::new("amount", "Amount must be positive"));
        let json = serde_json::to_value(&errors).expect("serializable");
        assert_eq!(json["amount"], "Amount must be positive");
    }
}
