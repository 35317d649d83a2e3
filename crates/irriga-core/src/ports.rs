//! Port for the agents API.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::{
    AdvancedParams, AiQuery, AiRecommendation, CropType, FieldContext, GrowthStage,
    PrologRecommendation, SensorReading,
};

/// Backend operations used by an analysis cycle.
///
/// Every call either succeeds or returns a structured [`ApiError`](crate::ApiError);
/// update calls never report a failure as success.
#[async_trait]
pub trait AgentsApi: Send + Sync {
    /// POST /agents/sensor
    async fn update_sensor(&self, reading: &SensorReading) -> ApiResult<()>;

    /// POST /agents/context
    async fn update_context(&self, context: &FieldContext) -> ApiResult<()>;

    /// POST /agents/stage
    async fn update_stage(&self, stage: &GrowthStage) -> ApiResult<()>;

    /// POST /agents/advanced
    async fn update_advanced(&self, params: &AdvancedParams) -> ApiResult<()>;

    /// GET /agents/recommendation
    async fn fetch_prolog_recommendation(
        &self,
        crop: CropType,
        location: &str,
    ) -> ApiResult<PrologRecommendation>;

    /// GET /agents/ai-recommendation
    async fn fetch_ai_recommendation(&self, query: &AiQuery) -> ApiResult<AiRecommendation>;
}
