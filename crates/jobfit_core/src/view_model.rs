use crate::model::{AgentProgressEntry, Page, ResultsTab, SubTaskStatus};
use crate::reconcile::ReconciledResult;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub page: Page,
    pub tab: ResultsTab,
    pub notice: Option<String>,
    pub submitting: bool,
    pub job_name: Option<String>,
    pub processing: ProcessingView,
    pub result: ReconciledResult,
    pub dirty: bool,
}

/// Everything the processing page shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingView {
    pub file_name: Option<String>,
    pub jobfit_label: String,
    pub insights_label: String,
    pub agent_stage: Option<String>,
    pub agent_rows: Vec<String>,
    pub progress_text: String,
}

impl ProcessingView {
    pub fn from_result(file_name: Option<&str>, result: &ReconciledResult) -> Self {
        let agent_stage = Some(result.agent_stage.clone()).filter(|stage| !stage.is_empty());
        let agent_rows = if agent_stage.is_some() && result.agent_progress.is_empty() {
            vec!["Collecting...".to_string()]
        } else {
            result.agent_progress.iter().map(agent_row).collect()
        };
        let progress_text = if result.progress_message.is_empty() {
            "Starting...".to_string()
        } else {
            result.progress_message.clone()
        };

        Self {
            file_name: file_name.map(ToOwned::to_owned),
            jobfit_label: status_label(result.jobfit_status, "Waiting"),
            insights_label: status_label(result.insights_status, "Queued"),
            agent_stage,
            agent_rows,
            progress_text,
        }
    }
}

fn status_label(status: SubTaskStatus, idle: &str) -> String {
    match status {
        SubTaskStatus::None => idle.to_string(),
        SubTaskStatus::Processed => "✅ Done".to_string(),
        SubTaskStatus::Error => "❌ Error".to_string(),
        other => format!("⏳ {other}"),
    }
}

fn agent_row(entry: &AgentProgressEntry) -> String {
    match entry.items_count {
        Some(count) if count > 0 => format!("{} - {} ({count})", entry.stage, entry.status),
        _ => format!("{} - {}", entry.stage, entry.status),
    }
}
