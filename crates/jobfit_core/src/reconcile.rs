//! Cumulative merge of status-channel messages into one reconciled result.
//!
//! The two subtasks use different merge policies:
//! - jobfit output is captured from the first `processed` message and never changes afterwards;
//! - insights output is replaced by every `processed` message.
//!
//! Messages are applied strictly in arrival order. Nothing is buffered.

use jobfit_logging::{jobfit_debug, jobfit_info};
use serde::{Deserialize, Serialize};

use crate::event::{StreamEvent, StreamFailure};
use crate::model::{AgentProgressEntry, InsightsResult, JobfitResult, SubTaskStatus};

/// Read-only view of everything the status channel has told us so far.
///
/// Persisted under `analysisResult`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciledResult {
    pub jobfit: Option<JobfitResult>,
    pub insights: Option<InsightsResult>,
    pub jobfit_status: SubTaskStatus,
    pub insights_status: SubTaskStatus,
    pub agent_stage: String,
    pub agent_progress: Vec<AgentProgressEntry>,
    pub progress_message: String,
}

impl ReconciledResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of applying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// The reconciled result changed.
    pub changed: bool,
    /// Both subtasks have now reached `processed`. Reported once per session.
    pub completed: bool,
}

/// Sole owner and mutator of the [`ReconciledResult`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusReconciler {
    result: ReconciledResult,
    jobfit_reached: bool,
    insights_reached: bool,
    completion_emitted: bool,
}

impl StatusReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a reconciler from a persisted snapshot.
    ///
    /// `completed` marks sessions that already reached the results page, so the
    /// completion signal is not raised a second time.
    pub fn restore(result: ReconciledResult, completed: bool) -> Self {
        let jobfit_reached = result.jobfit.is_some() || result.jobfit_status.is_processed();
        let insights_reached = result.insights.is_some() || result.insights_status.is_processed();
        Self {
            result,
            jobfit_reached,
            insights_reached,
            completion_emitted: completed,
        }
    }

    pub fn result(&self) -> &ReconciledResult {
        &self.result
    }

    pub fn is_complete(&self) -> bool {
        self.completion_emitted
    }

    /// Applies one parsed message.
    pub fn apply_event(&mut self, event: &StreamEvent) -> Applied {
        let before = self.result.clone();

        if let Some(status) = &event.status {
            self.result.progress_message = status.clone();
        }
        if let Some(stage) = &event.agent_stage {
            self.result.agent_stage = stage.clone();
        }
        if let Some(progress) = &event.agent_progress {
            self.result.agent_progress = progress.clone();
        }

        if let Some(status) = event.jobfit_status {
            self.result.jobfit_status = status;
            if status.is_processed() {
                self.jobfit_reached = true;
                if self.result.jobfit.is_none() {
                    jobfit_info!("jobfit result captured (score {:?})", event.score);
                    self.result.jobfit = Some(jobfit_fields(event));
                }
            }
        }

        if let Some(status) = event.insights_status {
            self.result.insights_status = status;
            if status.is_processed() {
                self.insights_reached = true;
                self.result.insights = Some(insights_fields(event));
            }
        }

        let completed =
            !self.completion_emitted && self.jobfit_reached && self.insights_reached;
        if completed {
            jobfit_info!("both subtasks processed; signalling completion");
            self.completion_emitted = true;
        }

        let changed = before != self.result;
        if !changed {
            jobfit_debug!(
                "message left result unchanged (subscription {})",
                jobfit_logging::active_subscription()
            );
        }
        Applied { changed, completed }
    }

    /// Records a terminal channel failure as the progress message.
    pub fn record_failure(&mut self, failure: &StreamFailure) {
        self.result.progress_message = failure.status_text();
    }
}

fn jobfit_fields(event: &StreamEvent) -> JobfitResult {
    JobfitResult {
        score: event.score.unwrap_or_default(),
        narrative: event.result.clone().unwrap_or_default(),
        strengths: event.strengths.clone().unwrap_or_default(),
        weaknesses: event.weaknesses.clone().unwrap_or_default(),
        areas_for_improvement: event.areas_for_improvement.clone().unwrap_or_default(),
        optimization_suggestions: event.cv_optimization_suggestions.clone().unwrap_or_default(),
        matched_keywords: event.keywords_already_matched.clone().unwrap_or_default(),
        missing_keywords: event.missing_keywords_to_add.clone().unwrap_or_default(),
    }
}

fn insights_fields(event: &StreamEvent) -> InsightsResult {
    InsightsResult {
        company_insights: event.company_insights.clone().unwrap_or_default(),
        interview_prep: event.interview_prep.clone().unwrap_or_default(),
        web_research: event.web_research.clone().unwrap_or_default(),
    }
}
