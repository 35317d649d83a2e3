//! # Irriga Client
//!
//! HTTP client for the agents API (field state and recommendations),
//! the rule-module admin API and the auth API.

pub mod admin;
pub mod auth;
pub mod client;
pub mod response;

pub use admin::{module_display_name, SaveReport};
pub use auth::{AuthSession, User};
pub use client::{AgentsClient, DEFAULT_REQUEST_TIMEOUT};
pub use response::{parse_error_body, ErrorBody, ErrorPayload};
