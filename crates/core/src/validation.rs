//! Field-level validators.
//!
//! All validators here are pure and side-effect-free: given a raw field value
//! they return `Ok(())` or a [`ValidationError`] naming the field and the
//! reason. Structural checks (presence, JSON shape) happen earlier, at
//! deserialization; these functions carry the semantic rules.

use thiserror::Error;

/// Symbols accepted by the password strength policy.
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// A semantic field violation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{field} must not be empty")]
    Required {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field is shorter than its minimum length.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed length.
        min: usize,
    },

    /// A numeric field is below its minimum value.
    #[error("{field} must be at least {min}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: i64,
    },

    /// The password fails the strength policy.
    #[error(
        "password must be at least 8 characters long and contain at least one \
         lowercase letter, at least one uppercase letter, at least one digit, \
         and at least one special character"
    )]
    WeakPassword,
}

/// Result type for validation operations.
pub type ValidationResult = Result<(), ValidationError>;

/// Validate password strength.
///
/// Accepts iff the password is at least 8 characters and contains at least
/// one lowercase letter, one uppercase letter, one digit, and one symbol
/// from [`PASSWORD_SYMBOLS`].
///
/// # Errors
///
/// Returns [`ValidationError::WeakPassword`] when any requirement is unmet.
///
/// # Example
///
/// ```
/// use greengrocer_core::validation::validate_password;
///
/// assert!(validate_password("Abc12345!").is_ok());
/// assert!(validate_password("abc12345!").is_err()); // no uppercase
/// ```
pub fn validate_password(password: &str) -> ValidationResult {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

/// Validate a username: at least 3 characters.
///
/// # Errors
///
/// Returns [`ValidationError::TooShort`] for usernames under 3 characters.
pub fn validate_username(username: &str) -> ValidationResult {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort {
            field: "username",
            min: MIN_USERNAME_LENGTH,
        });
    }
    Ok(())
}

/// Validate a product name: non-empty.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for an empty name.
pub fn validate_product_name(name: &str) -> ValidationResult {
    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    Ok(())
}

/// Validate an order's customer reference: at least 1.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimum`] for ids below 1.
pub fn validate_customer_ref(customer_id: i32) -> ValidationResult {
    if customer_id < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "customer_id",
            min: 1,
        });
    }
    Ok(())
}

/// Validate a line-item quantity: at least 1.
///
/// # Errors
///
/// Returns [`ValidationError::BelowMinimum`] for quantities below 1.
pub fn validate_quantity(quantity: i32) -> ValidationResult {
    if quantity < 1 {
        return Err(ValidationError::BelowMinimum {
            field: "quantity",
            min: 1,
        });
    }
    Ok(())
}
