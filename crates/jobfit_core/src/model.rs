use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic identifier for one opened status channel.
pub type SubscriptionId = u64;

/// Progress of one backend subtask (jobfit scoring or insights enrichment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubTaskStatus {
    #[default]
    None,
    Queued,
    Processing,
    Processed,
    #[serde(alias = "failed")]
    Error,
}

impl SubTaskStatus {
    /// Parses the wire vocabulary. Empty or unknown strings mean "not reported".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "none" => Some(Self::None),
            "queued" => Some(Self::Queued),
            "processing" => Some(Self::Processing),
            "processed" => Some(Self::Processed),
            "error" | "failed" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_processed(self) -> bool {
        self == Self::Processed
    }
}

impl fmt::Display for SubTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::None => "none",
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Error => "error",
        };
        f.write_str(text)
    }
}

/// Scoring and CV-optimisation output. Written at most once per session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobfitResult {
    pub score: f64,
    pub narrative: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub optimization_suggestions: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

/// Enrichment output. Replaced every time the insights subtask reports `processed`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightsResult {
    pub company_insights: serde_json::Value,
    pub interview_prep: serde_json::Value,
    pub web_research: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentProgressEntry {
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items_count: Option<u64>,
}

/// Server-assigned job handle, persisted under `fileStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub file_id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
}

/// Top-level page of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Landing,
    Input,
    Processing,
    Results,
}

/// Sub-tabs of the results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsTab {
    #[default]
    JobFitScore,
    CvOptimization,
    InterviewPrep,
    CompanyInsights,
    WebResearch,
}

impl ResultsTab {
    pub const ALL: [ResultsTab; 5] = [
        ResultsTab::JobFitScore,
        ResultsTab::CvOptimization,
        ResultsTab::InterviewPrep,
        ResultsTab::CompanyInsights,
        ResultsTab::WebResearch,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ResultsTab::JobFitScore => "Job Fit Score",
            ResultsTab::CvOptimization => "CV Optimization",
            ResultsTab::InterviewPrep => "Interview Preparation",
            ResultsTab::CompanyInsights => "Company Insights",
            ResultsTab::WebResearch => "Web Research",
        }
    }
}
