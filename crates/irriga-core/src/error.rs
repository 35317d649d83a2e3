//! Centralized error types for Irriga.

use thiserror::Error;

/// Failure of a call to the agents API.
///
/// Only owned strings are stored so the error can travel inside
/// outcomes and state snapshots.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport failure: connection refused, DNS, TLS, transport timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status with the message extracted from the body.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    /// Success status, but the declared content type is not JSON.
    #[error("{subject} não é JSON.")]
    NotJson {
        status: u16,
        subject: String,
        content_type: Option<String>,
    },

    /// JSON body could not be decoded into the expected shape.
    #[error("Resposta inválida: {0}")]
    Decode(String),

    /// Any other error with a message.
    #[error("{0}")]
    Other(String),

    /// Error without any usable description.
    #[error("Unknown error occurred")]
    Unknown,
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Create an HTTP error without details.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Create a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::NotJson { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Details reported by the server alongside the message.
    pub fn details(&self) -> &[String] {
        match self {
            Self::Http { details, .. } => details,
            _ => &[],
        }
    }
}

/// Rejected form input. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Umidade do solo deve estar entre {min}% e {max}%")]
    Moisture { min: f64, max: f64 },

    #[error("Chuva não pode ser negativa")]
    Rain,

    #[error("Temperatura deve estar entre {min}°C e {max}°C")]
    Temperature { min: f64, max: f64 },

    #[error("Umidade do ar deve estar entre {min}% e {max}%")]
    Humidity { min: f64, max: f64 },

    #[error("Tamanho do vaso deve ser maior que zero")]
    PotSize,

    #[error("Semana deve ser um número inteiro maior ou igual a {min}")]
    Week { min: u32 },

    #[error("Condutividade elétrica (EC) não pode ser negativa")]
    Ec,
}

/// Rejected login or registration input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Email é obrigatório")]
    EmailRequired,

    #[error("Email inválido")]
    EmailInvalid,

    #[error("Senha é obrigatória")]
    PasswordRequired,

    #[error("Senha deve ter no mínimo {min} caracteres")]
    PasswordTooShort { min: usize },

    #[error("Nome é obrigatório")]
    NameRequired,
}
