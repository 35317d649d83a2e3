//! HTTP client for the agents API.
//!
//! Every call returns a structured [`ApiError`] on failure: transport
//! problems, non-success statuses (with the message pulled out of the
//! body) and successful responses that are not JSON.

use std::time::Duration;

use async_trait::async_trait;
use irriga_core::model::{
    AdvancedParams, AiQuery, AiRecommendation, CropType, FieldContext, GrowthStage,
    PrologRecommendation, SensorReading,
};
use irriga_core::{AgentsApi, ApiError, ApiResult};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use tracing::debug;

use crate::response::{ensure_success, read_json, read_json_any, transport_error};

/// Request timeout used unless the caller picks another one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROLOG_SUBJECT: &str = "Resposta do Prolog";

/// Client for the agents, admin and auth endpoints of one backend.
#[derive(Clone)]
pub struct AgentsClient {
    base_url: String,
    client: reqwest::Client,
}

impl AgentsClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL made of `prefix` followed by the segments of `path`, each one
    /// percent-encoded on its own.
    pub(crate) fn url_with_segments(&self, prefix: &str, path: &str) -> ApiResult<Url> {
        let mut url = Url::parse(&self.url(prefix))
            .map_err(|e| ApiError::Other(format!("URL inválida: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("URL inválida: {}", self.base_url)))?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    pub(crate) fn request<U: reqwest::IntoUrl>(
        &self,
        method: Method,
        url: U,
        token: Option<&str>,
    ) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        builder.send().await.map_err(transport_error)
    }

    /// POST a JSON body and discard the response body on success.
    async fn post_update<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<()> {
        let url = self.url(path);
        debug!(url = %url, "POST update");

        let response = self
            .send(self.request(Method::POST, &url, None).json(body))
            .await?;
        ensure_success(response, path, None).await?;
        Ok(())
    }
}

#[async_trait]
impl AgentsApi for AgentsClient {
    async fn update_sensor(&self, reading: &SensorReading) -> ApiResult<()> {
        self.post_update("/agents/sensor", reading).await
    }

    async fn update_context(&self, context: &FieldContext) -> ApiResult<()> {
        self.post_update("/agents/context", context).await
    }

    async fn update_stage(&self, stage: &GrowthStage) -> ApiResult<()> {
        self.post_update("/agents/stage", stage).await
    }

    async fn update_advanced(&self, params: &AdvancedParams) -> ApiResult<()> {
        self.post_update("/agents/advanced", params).await
    }

    async fn fetch_prolog_recommendation(
        &self,
        crop: CropType,
        location: &str,
    ) -> ApiResult<PrologRecommendation> {
        let path = "/agents/recommendation";
        debug!(crop = %crop, location = %location, "Fetching rule engine recommendation");

        let builder = self
            .request(Method::GET, self.url(path), None)
            .query(&[("crop", crop.as_str()), ("location", location)]);
        let response = self.send(builder).await?;
        let response = ensure_success(response, path, None).await?;
        read_json(response, PROLOG_SUBJECT).await
    }

    async fn fetch_ai_recommendation(&self, query: &AiQuery) -> ApiResult<AiRecommendation> {
        let path = "/agents/ai-recommendation";
        let pairs = query.to_pairs();
        debug!(crop = %query.crop, params = pairs.len(), "Fetching AI recommendation");

        let builder = self
            .request(Method::GET, self.url(path), None)
            .query(&pairs);
        let response = self.send(builder).await?;
        let response = ensure_success(response, path, None).await?;
        // Only the rule engine response is held to its declared content type.
        read_json_any(response).await
    }
}
