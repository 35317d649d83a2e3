//! Error classification.
//!
//! Maps any failure of an analysis cycle to an [`ErrorContext`]: a
//! coarse kind, a diagnostic message for the logs and a message for
//! the user. The mapping is a pure function of the error.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ValidationError};

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Server,
    Timeout,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Diagnostic message, logged but not shown.
    pub message: String,
    /// Message for display.
    pub user_message: String,
}

impl ErrorContext {
    fn new(kind: ErrorKind, message: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_message: user_message.into(),
        }
    }
}

impl From<&ValidationError> for ErrorContext {
    fn from(err: &ValidationError) -> Self {
        let msg = err.to_string();
        Self::new(ErrorKind::Validation, msg.clone(), msg)
    }
}

/// Classify an API error.
pub fn classify(error: &ApiError) -> ErrorContext {
    match error {
        ApiError::Network(_) => ErrorContext::new(
            ErrorKind::Network,
            "Network connection failed",
            "Erro de conexão. Verifique sua internet e tente novamente.",
        ),
        ApiError::Http { status, message, .. } => classify_status(*status, message),
        ApiError::NotJson { status, .. } => classify_status(*status, &error.to_string()),
        ApiError::Decode(_) | ApiError::Other(_) => {
            let msg = error.to_string();
            ErrorContext::new(ErrorKind::Unknown, msg.clone(), format!("Erro: {}", msg))
        }
        ApiError::Unknown => unknown(),
    }
}

/// Classify an arbitrary error chain, recognising [`ApiError`] anywhere in it.
pub fn classify_anyhow(error: &anyhow::Error) -> ErrorContext {
    if let Some(api) = error.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
        return classify(api);
    }
    let msg = error.to_string();
    if msg.is_empty() {
        return unknown();
    }
    ErrorContext::new(ErrorKind::Unknown, msg.clone(), format!("Erro: {}", msg))
}

fn classify_status(status: u16, message: &str) -> ErrorContext {
    match status {
        400 => ErrorContext::new(
            ErrorKind::Validation,
            message,
            format!("Erro de validação: {}", message),
        ),
        401 => ErrorContext::new(
            ErrorKind::Validation,
            "Unauthorized",
            "Acesso não autorizado. Verifique suas credenciais.",
        ),
        404 => ErrorContext::new(
            ErrorKind::Server,
            "Endpoint not found",
            "Serviço não encontrado. Entre em contato com o suporte.",
        ),
        422 => ErrorContext::new(
            ErrorKind::Validation,
            message,
            format!("Dados inválidos: {}", message),
        ),
        500 | 502 | 503 => ErrorContext::new(
            ErrorKind::Server,
            message,
            "Erro no servidor. Tente novamente em alguns instantes.",
        ),
        504 => ErrorContext::new(
            ErrorKind::Timeout,
            "Gateway timeout",
            "Tempo de resposta excedido. Tente novamente.",
        ),
        _ => ErrorContext::new(
            ErrorKind::Server,
            message,
            format!("Erro {}: {}", status, message),
        ),
    }
}

fn unknown() -> ErrorContext {
    ErrorContext::new(
        ErrorKind::Unknown,
        "Unknown error occurred",
        "Erro desconhecido. Por favor, tente novamente.",
    )
}
