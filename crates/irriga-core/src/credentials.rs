//! Client-side checks for login and registration.

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// Minimum password length accepted by the auth service.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Login or registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Required when registering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub fn validate_email(email: &str) -> Result<(), CredentialError> {
    if email.is_empty() {
        return Err(CredentialError::EmailRequired);
    }
    if !is_email_shaped(email) {
        return Err(CredentialError::EmailInvalid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn validate_name(name: Option<&str>, register: bool) -> Result<(), CredentialError> {
    if register && name.map_or(true, |n| n.is_empty()) {
        return Err(CredentialError::NameRequired);
    }
    Ok(())
}

/// Run every check and collect all failures, in field order.
pub fn validate_credentials(
    credentials: &Credentials,
    register: bool,
) -> Result<(), Vec<CredentialError>> {
    let errors: Vec<CredentialError> = [
        validate_name(credentials.name.as_deref(), register),
        validate_email(&credentials.email),
        validate_password(&credentials.password),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Password strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Fraca,
    Media,
    Forte,
}

impl StrengthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fraca => "Fraca",
            Self::Media => "Média",
            Self::Forte => "Forte",
        }
    }
}

/// Password strength on a 0..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: StrengthLabel,
}

impl PasswordStrength {
    pub const MAX_SCORE: u8 = 5;

    /// Strength as a percentage of the maximum score.
    pub fn percent(&self) -> u8 {
        let pct = u16::from(self.score.min(Self::MAX_SCORE)) * 100 / u16::from(Self::MAX_SCORE);
        pct as u8
    }
}

/// Score a password. `None` for an empty password.
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }

    let len = password.chars().count();
    let checks = [
        len >= 6,
        len >= 8,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().filter(|ok| **ok).count() as u8;

    let label = match score {
        0..=2 => StrengthLabel::Fraca,
        3 => StrengthLabel::Media,
        _ => StrengthLabel::Forte,
    };

    Some(PasswordStrength { score, label })
}
