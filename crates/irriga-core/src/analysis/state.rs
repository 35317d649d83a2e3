//! Snapshot of the analysis workflow, published to the presentation layer.

use uuid::Uuid;

use super::notification::{Notification, NotificationKind};
use crate::classify::ErrorContext;
use crate::model::{AiRecommendation, PrologRecommendation};

/// Where the current (or last) cycle is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Validating,
    Updating,
    Fetching,
    Succeeded,
    Failed,
}

impl AnalysisPhase {
    /// A cycle has started and not yet settled.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Validating | Self::Updating | Self::Fetching)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Reachability of the agents API as seen by the last cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiStatus {
    /// No cycle has reached the network yet.
    #[default]
    Unknown,
    Checking,
    Online,
    Offline,
}

impl ApiStatus {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Checking => Some("Verificando API..."),
            Self::Online => Some("API Online"),
            Self::Offline => Some("API Offline"),
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSnapshot {
    pub cycle_id: Option<Uuid>,
    pub phase: AnalysisPhase,
    pub prolog_loading: bool,
    pub ai_loading: bool,
    /// Last rule engine result; survives later cycles until replaced.
    pub recommendation: Option<PrologRecommendation>,
    /// Last AI result; survives later cycles until replaced.
    pub ai_recommendation: Option<AiRecommendation>,
    pub error: Option<Notification>,
    pub success: Option<Notification>,
    pub api_status: ApiStatus,
    pub last_error: Option<ErrorContext>,
}

impl AnalysisSnapshot {
    pub(crate) fn notification_mut(&mut self, kind: NotificationKind) -> &mut Option<Notification> {
        match kind {
            NotificationKind::Success => &mut self.success,
            NotificationKind::Error => &mut self.error,
        }
    }

    /// Either engine is still working.
    pub fn is_loading(&self) -> bool {
        self.prolog_loading || self.ai_loading
    }
}
