//! Analysis workflow.
//!
//! One cycle goes Validating → Updating → Fetching → Succeeded | Failed.
//! Validation is local. The update phase pushes the form to the backend
//! with every call in flight at once and stops at the first failure.
//! The fetch phase asks both engines concurrently; each engine's result
//! and loading flag are published as soon as that engine answers.
//!
//! State lives in a `watch` channel so a presentation layer can render
//! intermediate snapshots while the cycle runs.

pub mod notification;
pub mod state;

pub use notification::{Notification, NotificationKind};
pub use state::{AnalysisPhase, AnalysisSnapshot, ApiStatus};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::classify::{classify, ErrorContext};
use crate::constants::{NOTIFICATION_TIMEOUTS, SUCCESS_MESSAGE};
use crate::error::{ApiError, ApiResult, ValidationError};
use crate::model::{AiRecommendation, AnalysisInput, FieldForm, PrologRecommendation};
use crate::ports::AgentsApi;

/// Phase in which a cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Update,
    Fetch,
}

/// Result of one call to [`Analyzer::analyze`].
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Both engines answered.
    Success {
        prolog: PrologRecommendation,
        ai: AiRecommendation,
    },
    /// A network call failed. Any recommendation that did arrive is kept.
    Failure {
        error: ErrorContext,
        stage: FailureStage,
        prolog: Option<PrologRecommendation>,
        ai: Option<AiRecommendation>,
    },
    /// The form was rejected before any network call.
    Invalid(ValidationError),
    /// Another cycle is still running.
    Busy,
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Runs analysis cycles against an [`AgentsApi`] and owns their state.
///
/// At most one cycle runs at a time; overlapping calls get
/// [`AnalysisOutcome::Busy`].
pub struct Analyzer {
    api: Arc<dyn AgentsApi>,
    state: Arc<watch::Sender<AnalysisSnapshot>>,
    busy: AtomicBool,
    notification_seq: AtomicU64,
}

/// Clears the busy flag when the cycle ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Analyzer {
    pub fn new(api: Arc<dyn AgentsApi>) -> Self {
        let (tx, _rx) = watch::channel(AnalysisSnapshot::default());
        Self {
            api,
            state: Arc::new(tx),
            busy: AtomicBool::new(false),
            notification_seq: AtomicU64::new(0),
        }
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.state.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Close the error notification now.
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Run one analysis cycle for the given form.
    pub async fn analyze(&self, form: &FieldForm) -> AnalysisOutcome {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!(location = %form.location, "Analysis already in flight, rejecting request");
            return AnalysisOutcome::Busy;
        };

        let cycle_id = Uuid::new_v4();
        let span = info_span!(
            "analysis",
            cycle = %cycle_id,
            location = %form.location,
            crop = %form.crop
        );
        self.run_cycle(cycle_id, form).instrument(span).await
    }

    async fn run_cycle(&self, cycle_id: Uuid, form: &FieldForm) -> AnalysisOutcome {
        self.state.send_modify(|s| {
            s.cycle_id = Some(cycle_id);
            s.phase = AnalysisPhase::Validating;
        });

        let input = match form.validate() {
            Ok(input) => input,
            Err(err) => {
                debug!(error = %err, "Form rejected");
                self.state.send_modify(|s| {
                    s.phase = AnalysisPhase::Failed;
                    s.last_error = Some(ErrorContext::from(&err));
                });
                self.notify(
                    NotificationKind::Error,
                    err.to_string(),
                    NOTIFICATION_TIMEOUTS.validation_error,
                );
                return AnalysisOutcome::Invalid(err);
            }
        };

        self.state.send_modify(|s| {
            s.phase = AnalysisPhase::Updating;
            s.error = None;
            s.success = None;
            s.last_error = None;
            s.prolog_loading = true;
            s.ai_loading = true;
            s.api_status = ApiStatus::Checking;
        });

        if let Err(err) = self.push_updates(&input).await {
            return self.fail(FailureStage::Update, &err, None, None);
        }

        self.state.send_modify(|s| s.phase = AnalysisPhase::Fetching);

        match self.fetch_recommendations(&input).await {
            (Ok(prolog), Ok(ai)) => self.succeed(prolog, ai),
            (Err(err), ai) => self.fail(FailureStage::Fetch, &err, None, ai.ok()),
            (Ok(prolog), Err(err)) => self.fail(FailureStage::Fetch, &err, Some(prolog), None),
        }
    }

    /// Push sensors, context, stage and advanced parameters concurrently.
    async fn push_updates(&self, input: &AnalysisInput) -> ApiResult<()> {
        let context = input.field_context();
        let stage = input.growth_stage();
        let advanced = input.advanced_params();
        let readings = input.sensor_readings();

        debug!(calls = readings.len() + 3, "Pushing field state");

        tokio::try_join!(
            self.api.update_context(&context),
            self.api.update_stage(&stage),
            self.api.update_advanced(&advanced),
            try_join_all(readings.iter().map(|r| self.api.update_sensor(r))),
        )?;

        Ok(())
    }

    /// Ask both engines at once; each publishes its own result as it settles.
    async fn fetch_recommendations(
        &self,
        input: &AnalysisInput,
    ) -> (ApiResult<PrologRecommendation>, ApiResult<AiRecommendation>) {
        let query = input.ai_query();

        let prolog = async {
            let result = self
                .api
                .fetch_prolog_recommendation(input.crop, &input.location)
                .await;
            debug!(ok = result.is_ok(), "Rule engine settled");
            self.state.send_modify(|s| {
                s.prolog_loading = false;
                if let Ok(rec) = &result {
                    s.recommendation = Some(rec.clone());
                }
            });
            result
        };

        let ai = async {
            let result = self.api.fetch_ai_recommendation(&query).await;
            debug!(ok = result.is_ok(), "AI engine settled");
            self.state.send_modify(|s| {
                s.ai_loading = false;
                if let Ok(rec) = &result {
                    s.ai_recommendation = Some(rec.clone());
                }
            });
            result
        };

        tokio::join!(prolog, ai)
    }

    fn succeed(&self, prolog: PrologRecommendation, ai: AiRecommendation) -> AnalysisOutcome {
        info!(need = %prolog.need, score = prolog.score, ai = %ai.should_irrigate, "Analysis complete");
        self.state.send_modify(|s| {
            s.phase = AnalysisPhase::Succeeded;
            s.api_status = ApiStatus::Online;
        });
        self.notify(
            NotificationKind::Success,
            SUCCESS_MESSAGE,
            NOTIFICATION_TIMEOUTS.success,
        );
        AnalysisOutcome::Success { prolog, ai }
    }

    fn fail(
        &self,
        stage: FailureStage,
        err: &ApiError,
        prolog: Option<PrologRecommendation>,
        ai: Option<AiRecommendation>,
    ) -> AnalysisOutcome {
        let context = classify(err);
        error!(
            kind = %context.kind,
            status = ?err.status(),
            message = %context.message,
            details = ?err.details(),
            ?stage,
            "Analysis failed"
        );

        self.state.send_modify(|s| {
            s.phase = AnalysisPhase::Failed;
            s.api_status = ApiStatus::Offline;
            s.prolog_loading = false;
            s.ai_loading = false;
            s.last_error = Some(context.clone());
        });
        self.notify(
            NotificationKind::Error,
            context.user_message.clone(),
            NOTIFICATION_TIMEOUTS.error,
        );

        AnalysisOutcome::Failure {
            error: context,
            stage,
            prolog,
            ai,
        }
    }

    /// Show a notification and schedule its dismissal.
    fn notify(&self, kind: NotificationKind, message: impl Into<String>, ttl: Duration) {
        let id = self.notification_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let notification = Notification::new(id, kind, message, ttl);
        self.state
            .send_modify(|s| *s.notification_mut(kind) = Some(notification));

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // A newer notification keeps its own timer.
            state.send_if_modified(|s| {
                let slot = s.notification_mut(kind);
                if slot.as_ref().is_some_and(|n| n.id == id) {
                    *slot = None;
                    true
                } else {
                    false
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;
    use crate::model::{
        AdvancedParams, AiQuery, CropType, FieldContext, GrowthStage, Need, SensorReading, Volume,
    };
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct StubApi {
        context_error: Option<ApiError>,
        prolog_error: Option<ApiError>,
        ai_error: Option<ApiError>,
        ai_gate: Option<Arc<Notify>>,
        updates: AtomicUsize,
        prolog_fetches: AtomicUsize,
        ai_fetches: AtomicUsize,
    }

    impl StubApi {
        fn fetches(&self) -> usize {
            self.prolog_fetches.load(Ordering::SeqCst) + self.ai_fetches.load(Ordering::SeqCst)
        }

        fn calls(&self) -> usize {
            self.updates.load(Ordering::SeqCst) + self.fetches()
        }
    }

    fn prolog_rec() -> PrologRecommendation {
        PrologRecommendation {
            need: Need::Yes,
            score: 80,
            volume_l: Volume::Liters(2.5),
            advice: Some("Irrigar pela manhã".to_string()),
        }
    }

    fn ai_rec() -> AiRecommendation {
        AiRecommendation {
            should_irrigate: "SIM".to_string(),
            volume_l: Volume::Liters(2.0),
            advice: None,
            cached: Some(false),
        }
    }

    #[async_trait]
    impl AgentsApi for StubApi {
        async fn update_sensor(&self, _reading: &SensorReading) -> ApiResult<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn update_context(&self, _context: &FieldContext) -> ApiResult<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            match &self.context_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        async fn update_stage(&self, _stage: &GrowthStage) -> ApiResult<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn update_advanced(&self, _params: &AdvancedParams) -> ApiResult<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_prolog_recommendation(
            &self,
            _crop: CropType,
            _location: &str,
        ) -> ApiResult<PrologRecommendation> {
            self.prolog_fetches.fetch_add(1, Ordering::SeqCst);
            match &self.prolog_error {
                Some(err) => Err(err.clone()),
                None => Ok(prolog_rec()),
            }
        }

        async fn fetch_ai_recommendation(&self, _query: &AiQuery) -> ApiResult<AiRecommendation> {
            self.ai_fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.ai_gate {
                gate.notified().await;
            }
            match &self.ai_error {
                Some(err) => Err(err.clone()),
                None => Ok(ai_rec()),
            }
        }
    }

    fn invalid_moisture() -> FieldForm {
        FieldForm {
            moisture: "150".to_string(),
            ..FieldForm::default()
        }
    }

    #[tokio::test]
    async fn test_successful_cycle_publishes_both_results() {
        let stub = Arc::new(StubApi::default());
        let analyzer = Analyzer::new(stub.clone());

        let outcome = analyzer.analyze(&FieldForm::default()).await;
        assert!(outcome.is_success());

        let snap = analyzer.snapshot();
        assert_eq!(snap.phase, AnalysisPhase::Succeeded);
        assert_eq!(snap.api_status, ApiStatus::Online);
        assert_eq!(snap.recommendation, Some(prolog_rec()));
        assert_eq!(snap.ai_recommendation, Some(ai_rec()));
        assert!(!snap.prolog_loading);
        assert!(!snap.ai_loading);
        assert_eq!(
            snap.success.as_ref().map(|n| n.message.as_str()),
            Some(SUCCESS_MESSAGE)
        );
        assert!(snap.error.is_none());

        // Four sensors plus context, stage and advanced.
        assert_eq!(stub.updates.load(Ordering::SeqCst), 7);
        assert_eq!(stub.fetches(), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let stub = Arc::new(StubApi::default());
        let analyzer = Analyzer::new(stub.clone());

        let outcome = analyzer.analyze(&invalid_moisture()).await;
        match outcome {
            AnalysisOutcome::Invalid(err) => {
                assert_eq!(err.to_string(), "Umidade do solo deve estar entre 0% e 100%")
            }
            other => panic!("expected Invalid, got {:?}", other),
        }

        assert_eq!(stub.calls(), 0);
        let snap = analyzer.snapshot();
        assert_eq!(snap.phase, AnalysisPhase::Failed);
        assert_eq!(snap.api_status, ApiStatus::Unknown);
        assert_eq!(snap.last_error.as_ref().map(|e| e.kind), Some(ErrorKind::Validation));
        assert_eq!(
            snap.error.as_ref().map(|n| n.message.as_str()),
            Some("Umidade do solo deve estar entre 0% e 100%")
        );
    }

    #[tokio::test]
    async fn test_failed_update_aborts_before_fetching() {
        let stub = Arc::new(StubApi {
            context_error: Some(ApiError::http(500, "database unavailable")),
            ..StubApi::default()
        });
        let analyzer = Analyzer::new(stub.clone());

        let outcome = analyzer.analyze(&FieldForm::default()).await;
        match outcome {
            AnalysisOutcome::Failure { error, stage, .. } => {
                assert_eq!(error.kind, ErrorKind::Server);
                assert_eq!(stage, FailureStage::Update);
            }
            other => panic!("expected Failure, got {:?}", other),
        }

        assert_eq!(stub.fetches(), 0);
        let snap = analyzer.snapshot();
        assert_eq!(snap.api_status, ApiStatus::Offline);
        assert!(!snap.is_loading());
        assert_eq!(
            snap.error.as_ref().map(|n| n.message.as_str()),
            Some("Erro no servidor. Tente novamente em alguns instantes.")
        );
    }

    #[tokio::test]
    async fn test_ai_timeout_keeps_rule_engine_result() {
        let stub = Arc::new(StubApi {
            ai_error: Some(ApiError::http(504, "Gateway Timeout")),
            ..StubApi::default()
        });
        let analyzer = Analyzer::new(stub.clone());

        let outcome = analyzer.analyze(&FieldForm::default()).await;
        match outcome {
            AnalysisOutcome::Failure { error, stage, prolog, ai } => {
                assert_eq!(error.kind, ErrorKind::Timeout);
                assert_eq!(error.user_message, "Tempo de resposta excedido. Tente novamente.");
                assert_eq!(stage, FailureStage::Fetch);
                assert_eq!(prolog, Some(prolog_rec()));
                assert!(ai.is_none());
            }
            other => panic!("expected Failure, got {:?}", other),
        }

        let snap = analyzer.snapshot();
        assert_eq!(snap.recommendation, Some(prolog_rec()));
        assert_eq!(snap.api_status, ApiStatus::Offline);
        assert_eq!(snap.phase, AnalysisPhase::Failed);
    }

    #[tokio::test]
    async fn test_rule_engine_error_wins_when_both_fail() {
        let stub = Arc::new(StubApi {
            prolog_error: Some(ApiError::NotJson {
                status: 200,
                subject: "Resposta do Prolog".to_string(),
                content_type: Some("text/html".to_string()),
            }),
            ai_error: Some(ApiError::http(504, "Gateway Timeout")),
            ..StubApi::default()
        });
        let analyzer = Analyzer::new(stub.clone());

        match analyzer.analyze(&FieldForm::default()).await {
            AnalysisOutcome::Failure { error, .. } => {
                assert_eq!(error.kind, ErrorKind::Server);
                assert_eq!(error.user_message, "Erro 200: Resposta do Prolog não é JSON.");
            }
            other => panic!("expected Failure, got {:?}", other),
        }
        assert_eq!(stub.fetches(), 2);
    }

    #[tokio::test]
    async fn test_engines_settle_independently_and_overlap_is_rejected() {
        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubApi {
            ai_gate: Some(gate.clone()),
            ..StubApi::default()
        });
        let analyzer = Arc::new(Analyzer::new(stub.clone()));
        let mut rx = analyzer.subscribe();

        let task = {
            let analyzer = analyzer.clone();
            tokio::spawn(async move {
                let form = FieldForm::default();
                analyzer.analyze(&form).await
            })
        };

        let snap = rx
            .wait_for(|s| s.phase == AnalysisPhase::Fetching && !s.prolog_loading)
            .await
            .unwrap()
            .clone();
        assert!(snap.ai_loading);
        assert_eq!(snap.recommendation, Some(prolog_rec()));
        assert!(snap.ai_recommendation.is_none());

        assert!(analyzer.is_busy());
        let overlapping = analyzer.analyze(&FieldForm::default()).await;
        assert!(matches!(overlapping, AnalysisOutcome::Busy));
        assert_eq!(stub.prolog_fetches.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let outcome = task.await.unwrap();
        assert!(outcome.is_success());
        assert!(!analyzer.is_busy());

        let snap = analyzer.snapshot();
        assert!(!snap.prolog_loading);
        assert!(!snap.ai_loading);
        assert_eq!(snap.ai_recommendation, Some(ai_rec()));
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let stub = Arc::new(StubApi {
            context_error: Some(ApiError::network("connection refused")),
            ..StubApi::default()
        });
        let analyzer = Analyzer::new(stub.clone());

        assert!(!analyzer.analyze(&FieldForm::default()).await.is_success());
        assert!(!analyzer.is_busy());
        assert!(!matches!(
            analyzer.analyze(&FieldForm::default()).await,
            AnalysisOutcome::Busy
        ));
    }

    #[tokio::test]
    async fn test_new_cycle_keeps_previous_results_visible() {
        let stub = Arc::new(StubApi::default());
        let analyzer = Analyzer::new(stub.clone());
        analyzer.analyze(&FieldForm::default()).await;

        analyzer.analyze(&invalid_moisture()).await;
        let snap = analyzer.snapshot();
        assert_eq!(snap.recommendation, Some(prolog_rec()));
        assert_eq!(snap.ai_recommendation, Some(ai_rec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_error_auto_dismisses() {
        let analyzer = Analyzer::new(Arc::new(StubApi::default()));
        analyzer.analyze(&invalid_moisture()).await;
        assert!(analyzer.snapshot().error.is_some());

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(analyzer.snapshot().error.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(analyzer.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_dismiss_newer_notification() {
        let analyzer = Analyzer::new(Arc::new(StubApi::default()));
        analyzer.analyze(&invalid_moisture()).await;
        let first = analyzer.snapshot().error.unwrap().id;

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        analyzer.analyze(&invalid_moisture()).await;
        let second = analyzer.snapshot().error.unwrap().id;
        assert_ne!(first, second);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(analyzer.snapshot().error.map(|n| n.id), Some(second));

        tokio::time::sleep(Duration::from_millis(2_600)).await;
        assert!(analyzer.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let analyzer = Analyzer::new(Arc::new(StubApi::default()));
        analyzer.analyze(&invalid_moisture()).await;
        analyzer.dismiss_error();
        assert!(analyzer.snapshot().error.is_none());
    }
}
