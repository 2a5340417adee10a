//! Local input validation.
//!
//! These checks run before any request is sent. They mirror the service's
//! rules but are not authoritative: the server may still reject input that
//! passes here. Lengths are counted in characters, not bytes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 100;
pub const PASSWORD_MIN: usize = 6;
pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 10;
pub const CONTENT_MAX: usize = 5000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Input field a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    Title,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Title => "Title",
            Field::Content => "Content",
        };
        f.write_str(label)
    }
}

/// Why a value was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(Field),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing(field)
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. } => *field,
            ValidationError::InvalidEmail => Field::Email,
        }
    }
}

fn check_length(
    field: Field,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::Missing(field));
    }
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if let Some(max) = max
        && len > max
    {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Display name for registration: 3–100 characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    check_length(Field::Name, name, NAME_MIN, Some(NAME_MAX))
}

/// Email syntax only. Used by login, where length is the server's concern.
pub fn validate_email_syntax(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Missing(Field::Email));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Email for registration: valid syntax and at most 100 characters.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    validate_email_syntax(email)?;
    if email.chars().count() > EMAIL_MAX {
        return Err(ValidationError::TooLong {
            field: Field::Email,
            max: EMAIL_MAX,
        });
    }
    Ok(())
}

/// Password for login: anything non-empty.
pub fn validate_login_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Missing(Field::Password));
    }
    Ok(())
}

/// Password for registration: at least 6 characters.
pub fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    check_length(Field::Password, password, PASSWORD_MIN, None)
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    check_length(Field::Title, title, TITLE_MIN, Some(TITLE_MAX))
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    check_length(Field::Content, content, CONTENT_MIN, Some(CONTENT_MAX))
}
