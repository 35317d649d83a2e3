//! Login and registration.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use irriga_core::credentials::Credentials;
use irriga_core::ApiResult;

use crate::client::AgentsClient;
use crate::response::{ensure_success, read_json};

const AUTH_FALLBACK: &str = "Falha na autenticação";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Token returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

impl AgentsClient {
    /// POST /auth/login
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthSession> {
        let path = "/auth/login";
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        };

        let builder = self.request(Method::POST, self.url(path), None).json(&body);
        let response = ensure_success(self.send(builder).await?, path, Some(AUTH_FALLBACK)).await?;
        let session: AuthSession = read_json(response, "Resposta de login").await?;

        info!(email = %credentials.email, "Logged in");
        Ok(session)
    }

    /// POST /auth/register. The account still has to log in afterwards.
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<()> {
        let path = "/auth/register";
        let body = RegisterRequest {
            email: &credentials.email,
            password: &credentials.password,
            name: credentials.name.as_deref().unwrap_or_default(),
        };

        let builder = self.request(Method::POST, self.url(path), None).json(&body);
        ensure_success(self.send(builder).await?, path, Some(AUTH_FALLBACK)).await?;

        info!(email = %credentials.email, "Registered");
        Ok(())
    }
}
