//! Form Validation
//!
//! Field-level checks the presentation layer runs before raising an
//! intent. Messages are the ones shown next to the offending field.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::domain::{ItemDraft, OtherCostDraft, ValidationError};
use crate::money::parse_amount;

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// One message for one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl From<FieldError> for ValidationError {
    fn from(err: FieldError) -> Self {
        ValidationError::new(err.field, err.message)
    }
}

/// Every failing field, in form order
pub type FormResult<T> = Result<T, Vec<FieldError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
}

fn finish<T>(value: T, errors: Vec<FieldError>) -> FormResult<T> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> FormResult<Credentials> {
    let email = email.trim();
    let mut errors = Vec::new();

    check_email(email, &mut errors);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    finish(
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        },
        errors,
    )
}

pub fn validate_sign_up(email: &str, password: &str, confirm_password: &str) -> FormResult<Credentials> {
    let email = email.trim();
    let mut errors = Vec::new();

    check_email(email, &mut errors);

    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "Password must be at least 6 characters"));
    }

    if confirm_password.is_empty() {
        errors.push(FieldError::new("confirmPassword", "Please confirm your password"));
    } else if password != confirm_password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    finish(
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        },
        errors,
    )
}

/// Empty or `"0"` asks for a positive value; anything else must parse above zero
fn check_positive(
    field: &'static str,
    input: &str,
    missing: &str,
    invalid: &str,
    errors: &mut Vec<FieldError>,
) -> Decimal {
    let input = input.trim();
    if input.is_empty() || input == "0" {
        errors.push(FieldError::new(field, missing));
        return Decimal::ZERO;
    }
    match parse_amount(input) {
        Some(value) if value > Decimal::ZERO => value,
        _ => {
            errors.push(FieldError::new(field, invalid));
            Decimal::ZERO
        }
    }
}

pub fn parse_item_form(name: &str, cost: &str) -> FormResult<ItemDraft> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Item name is required"));
    }
    let cost = check_positive("cost", cost, "Cost must be greater than 0", "Please enter a valid cost", &mut errors);

    finish(ItemDraft::new(name, cost), errors)
}

pub fn parse_other_cost_form(description: &str, amount: &str) -> FormResult<OtherCostDraft> {
    let mut errors = Vec::new();

    let description = description.trim();
    if description.is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    let amount = check_positive(
        "amount",
        amount,
        "Amount must be greater than 0",
        "Please enter a valid amount",
        &mut errors,
    );

    finish(OtherCostDraft::new(description, amount), errors)
}
