// View Controller: the single owner of form state, the current result and the
// history. Presentation layers read through accessors and act through the
// action methods; nothing else mutates this state.

use crate::analysis::{AnalysisRequest, AnalysisResult, analyze};
use crate::categories::DEFAULT_CATEGORY_ID;
use crate::errors::AnalysisError;
use crate::history::{HistoryCache, HistoryEntry};
use crate::provider::AnalysisProvider;

pub const IDEA_REQUIRED_MESSAGE: &str = "Бизнесийн санаагаа оруулна уу.";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Шинжилгээ хийхэд алдаа гарлаа. Дахин оролдоно уу.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Success => "success",
            Phase::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Idea was blank; the controller moved to `Failed` with the validation message.
    IdeaRequired,
    /// A request from this controller is already in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(AnalysisResult),
    Failed(String),
    Rejected(SubmitRejected),
    /// The outcome belonged to a request that is no longer in flight; state untouched.
    Stale,
}

#[derive(Debug, Clone)]
pub struct ViewController {
    idea: String,
    category_id: String,
    phase: Phase,
    error: Option<String>,
    result: Option<AnalysisResult>,
    history: HistoryCache,
    last_ticket: u64,
    in_flight: Option<u64>,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_ID)
    }
}

impl ViewController {
    pub fn new(category_id: &str) -> Self {
        Self {
            idea: String::new(),
            category_id: category_id.to_string(),
            phase: Phase::Idle,
            error: None,
            result: None,
            history: HistoryCache::new(),
            last_ticket: 0,
            in_flight: None,
        }
    }

    // ------------------------------------------------------------------
    // Read-only state
    // ------------------------------------------------------------------

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn set_idea(&mut self, idea: impl Into<String>) {
        self.idea = idea.into();
    }

    pub fn set_category(&mut self, category_id: impl Into<String>) {
        self.category_id = category_id.into();
    }

    /// Guard and enter `Loading`. On success the caller owns the request and
    /// must hand the provider outcome back through [`ViewController::complete`].
    pub fn begin_submit(&mut self) -> Result<AnalysisRequest, SubmitRejected> {
        if self.phase == Phase::Loading {
            return Err(SubmitRejected::Busy);
        }

        match AnalysisRequest::new(&self.idea, &self.category_id) {
            Ok(mut request) => {
                self.last_ticket += 1;
                request.ticket = self.last_ticket;
                self.in_flight = Some(request.ticket);
                self.phase = Phase::Loading;
                self.error = None;
                Ok(request)
            }
            Err(_) => {
                self.phase = Phase::Failed;
                self.error = Some(IDEA_REQUIRED_MESSAGE.to_string());
                Err(SubmitRejected::IdeaRequired)
            }
        }
    }

    /// Apply the outcome of the request returned by `begin_submit`.
    pub fn complete(
        &mut self,
        request: &AnalysisRequest,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> SubmitOutcome {
        if self.in_flight != Some(request.ticket) {
            tracing::debug!(ticket = request.ticket, "dropping outcome of a stale request");
            return SubmitOutcome::Stale;
        }
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                let entry =
                    HistoryEntry::new(&request.idea_text, &request.category_id, result.clone());
                tracing::info!(
                    entry_id = %entry.id,
                    category = %entry.category_label,
                    score = result.feasibility_score,
                    "analysis stored"
                );
                self.history = self.history.prepend(entry);
                self.result = Some(result.clone());
                self.error = None;
                self.phase = Phase::Success;
                SubmitOutcome::Completed(result)
            }
            Err(err) => {
                if err.is_validation() {
                    tracing::warn!(error = %err, "analysis request rejected");
                } else {
                    tracing::error!(
                        error = %err,
                        category = %request.category_id,
                        "analysis failed"
                    );
                }
                self.result = None;
                self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                self.phase = Phase::Failed;
                SubmitOutcome::Failed(ANALYSIS_FAILED_MESSAGE.to_string())
            }
        }
    }

    pub async fn submit<P: AnalysisProvider>(&mut self, provider: &P) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(rejected) => return SubmitOutcome::Rejected(rejected),
        };
        let outcome = analyze(provider, &request.idea_text, &request.category_id).await;
        self.complete(&request, outcome)
    }

    /// Back to `Idle` with the category kept. Refused while a request is in flight.
    pub fn reset(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.idea.clear();
        self.result = None;
        self.error = None;
        self.phase = Phase::Idle;
        true
    }

    /// Show a past analysis again without calling the provider.
    pub fn select_history_entry(&mut self, index: usize) -> bool {
        if self.is_loading() {
            return false;
        }
        let Some(entry) = self.history.get(index) else {
            return false;
        };
        self.idea = entry.idea_text.clone();
        self.category_id = entry.category_id.clone();
        self.result = Some(entry.result.clone());
        self.error = None;
        self.phase = Phase::Success;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::sample_result;
    use crate::history::HISTORY_CAPACITY;
    use crate::provider::stub::StubProvider;

    fn ok_body(score: f64) -> String {
        serde_json::to_string(&sample_result(score)).unwrap()
    }

    #[tokio::test]
    async fn blank_idea_fails_without_calling_provider() {
        let provider = StubProvider::new();
        let mut vc = ViewController::default();

        for idea in ["", "   ", "\t\n"] {
            vc.set_idea(idea);
            let outcome = vc.submit(&provider).await;
            assert_eq!(outcome, SubmitOutcome::Rejected(SubmitRejected::IdeaRequired));
            assert_eq!(vc.phase(), Phase::Failed);
            assert_eq!(vc.error(), Some(IDEA_REQUIRED_MESSAGE));
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn fashion_scenario_prepends_labelled_entry() {
        let provider = StubProvider::new().reply_text(ok_body(7.0));
        let mut vc = ViewController::default();
        vc.set_idea("Монгол хээтэй гутал");
        vc.set_category("fashion");

        let outcome = vc.submit(&provider).await;

        assert!(matches!(outcome, SubmitOutcome::Completed(_)));
        assert_eq!(vc.phase(), Phase::Success);
        let score = vc.result().unwrap().feasibility_score;
        assert!((1.0..=10.0).contains(&score));
        assert_eq!(vc.history().len(), 1);
        let entry = vc.history().get(0).unwrap();
        assert_eq!(entry.category_label, "Хувцас загвар");
        assert_eq!(entry.idea_text, "Монгол хээтэй гутал");
        assert_eq!(provider.call_count(), 1);
        assert!(provider.prompts()[0].contains("Монгол хээтэй гутал"));
    }

    #[tokio::test]
    async fn history_is_bounded_and_newest_first() {
        let mut provider = StubProvider::new();
        for i in 0..13 {
            provider = provider.reply_text(ok_body(i as f64));
        }
        let mut vc = ViewController::default();
        for i in 0..13 {
            vc.set_idea(format!("санаа {i}"));
            vc.submit(&provider).await;
        }
        assert_eq!(vc.history().len(), HISTORY_CAPACITY);
        assert_eq!(vc.history().get(0).unwrap().idea_text, "санаа 12");
        assert_eq!(vc.history().get(9).unwrap().idea_text, "санаа 3");
    }

    #[tokio::test]
    async fn provider_failure_clears_result_and_keeps_history() {
        let provider = StubProvider::new()
            .reply_text(ok_body(8.0))
            .reply_error(AnalysisError::Provider("401".to_string()))
            .reply_text("{ not json");
        let mut vc = ViewController::default();
        vc.set_idea("Ноолуур");
        vc.submit(&provider).await;
        let before = vc.history().clone();

        for _ in 0..2 {
            let outcome = vc.submit(&provider).await;
            assert_eq!(outcome, SubmitOutcome::Failed(ANALYSIS_FAILED_MESSAGE.to_string()));
            assert_eq!(vc.phase(), Phase::Failed);
            assert!(vc.result().is_none());
            assert_eq!(vc.error(), Some(ANALYSIS_FAILED_MESSAGE));
            assert_eq!(vc.history(), &before);
        }
    }

    #[tokio::test]
    async fn selecting_history_restores_without_call() {
        let provider = StubProvider::new().reply_text(ok_body(6.0));
        let mut vc = ViewController::default();
        vc.set_idea("Кофе шоп");
        vc.set_category("retail");
        vc.submit(&provider).await;
        vc.reset();
        vc.set_category("tech");

        assert!(vc.select_history_entry(0));
        assert_eq!(vc.phase(), Phase::Success);
        assert_eq!(vc.idea(), "Кофе шоп");
        assert_eq!(vc.category_id(), "retail");
        assert_eq!(vc.result(), Some(&sample_result(6.0)));
        assert_eq!(provider.call_count(), 1);

        assert!(!vc.select_history_entry(5));
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut vc = ViewController::default();
        vc.set_idea("Гэр бүлийн зочид буудал");
        let request = vc.begin_submit().unwrap();
        assert!(vc.is_loading());
        assert_eq!(vc.begin_submit(), Err(SubmitRejected::Busy));

        vc.complete(&request, Ok(sample_result(5.0)));
        assert_eq!(vc.phase(), Phase::Success);
        assert!(vc.begin_submit().is_ok());
    }

    #[test]
    fn reset_returns_to_idle_and_keeps_category() {
        let mut vc = ViewController::new("household");
        vc.set_idea("Тавилга");
        let request = vc.begin_submit().unwrap();
        vc.complete(&request, Err(AnalysisError::EmptyResponse));
        vc.reset();

        assert_eq!(vc.phase(), Phase::Idle);
        assert_eq!(vc.idea(), "");
        assert!(vc.result().is_none());
        assert!(vc.error().is_none());
        assert!(!vc.is_loading());
        assert_eq!(vc.category_id(), "household");
    }

    #[test]
    fn reset_and_history_are_refused_while_loading() {
        let mut vc = ViewController::default();
        vc.set_idea("Ноолуур");
        let first = vc.begin_submit().unwrap();
        vc.complete(&first, Ok(sample_result(6.0)));

        vc.set_idea("Хүнс хүргэлт");
        let pending = vc.begin_submit().unwrap();
        assert!(!vc.reset());
        assert!(!vc.select_history_entry(0));
        assert_eq!(vc.phase(), Phase::Loading);
        assert_eq!(vc.idea(), "Хүнс хүргэлт");
        assert_eq!(vc.begin_submit(), Err(SubmitRejected::Busy));

        vc.complete(&pending, Err(AnalysisError::EmptyResponse));
        assert!(vc.reset());
    }

    #[test]
    fn stale_outcome_leaves_state_untouched() {
        let mut vc = ViewController::default();
        vc.set_idea("эхний");
        let first = vc.begin_submit().unwrap();
        vc.complete(&first, Err(AnalysisError::EmptyResponse));

        vc.set_idea("хоёр дахь");
        let second = vc.begin_submit().unwrap();
        assert_ne!(first.ticket, second.ticket);

        assert_eq!(vc.complete(&first, Ok(sample_result(9.0))), SubmitOutcome::Stale);
        assert_eq!(vc.phase(), Phase::Loading);
        assert!(vc.history().is_empty());
        assert!(vc.result().is_none());

        assert!(matches!(
            vc.complete(&second, Ok(sample_result(4.0))),
            SubmitOutcome::Completed(_)
        ));
        assert_eq!(vc.complete(&second, Ok(sample_result(4.0))), SubmitOutcome::Stale);
        assert_eq!(vc.history().len(), 1);
        assert_eq!(vc.history().get(0).unwrap().idea_text, "хоёр дахь");
    }
}
