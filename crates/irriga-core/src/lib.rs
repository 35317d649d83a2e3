//! Irriga Core Library
//!
//! Domain model, input validation, error classification and the
//! analysis workflow that compares the rule engine against the AI engine.

pub mod analysis;
pub mod classify;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod model;
pub mod ports;
pub mod validation;

pub use analysis::{AnalysisOutcome, Analyzer, FailureStage};
pub use classify::{classify, classify_anyhow, ErrorContext, ErrorKind};
pub use error::{ApiError, ApiResult, CredentialError, ValidationError};
pub use ports::AgentsApi;
pub use validation::validate_inputs;
