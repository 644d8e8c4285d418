use jobfit_core::{AppViewModel, Page, ProcessingView, ReconciledResult, ResultsTab};

const NOT_AVAILABLE: &str = "Not available yet.";

/// Line-oriented renderer. Only prints a processing frame when it differs from
/// the previous one, so heartbeats stay silent.
#[derive(Debug, Default)]
pub struct Renderer {
    last_frame: Vec<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) {
        let frame = frame_lines(view);
        if frame.is_empty() || frame == self.last_frame {
            return;
        }
        for line in &frame {
            println!("{line}");
        }
        self.last_frame = frame;
    }
}

/// Lines for the page the session is currently on. Results are printed
/// separately, one tab at a time.
pub fn frame_lines(view: &AppViewModel) -> Vec<String> {
    match view.page {
        Page::Landing => Vec::new(),
        Page::Input => {
            let mut lines = Vec::new();
            if view.submitting {
                lines.push("Submitting...".to_string());
            }
            if let Some(notice) = &view.notice {
                lines.push(notice.clone());
            }
            lines
        }
        Page::Processing => processing_lines(&view.processing),
        Page::Results => vec!["Analysis complete.".to_string()],
    }
}

pub fn processing_lines(view: &ProcessingView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(name) = &view.file_name {
        lines.push(format!("Processing: {name}"));
    }
    lines.push(format!("  Job fit:  {}", view.jobfit_label));
    lines.push(format!("  Insights: {}", view.insights_label));
    if let Some(stage) = &view.agent_stage {
        lines.push(format!("  Research agent: {stage}"));
        lines.extend(view.agent_rows.iter().map(|row| format!("    {row}")));
    }
    lines.push(format!("  {}", view.progress_text));
    lines
}

pub fn tab_lines(tab: ResultsTab, result: &ReconciledResult) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", tab.title())];
    match tab {
        ResultsTab::JobFitScore => match &result.jobfit {
            Some(jobfit) => {
                lines.push(format!("Score: {:.0}/100", jobfit.score));
                if !jobfit.narrative.is_empty() {
                    lines.push(jobfit.narrative.clone());
                }
                push_list(&mut lines, "Strengths", &jobfit.strengths);
                push_list(&mut lines, "Weaknesses", &jobfit.weaknesses);
                push_list(&mut lines, "Matched keywords", &jobfit.matched_keywords);
                push_list(&mut lines, "Missing keywords", &jobfit.missing_keywords);
            }
            None => lines.push(NOT_AVAILABLE.to_string()),
        },
        ResultsTab::CvOptimization => match &result.jobfit {
            Some(jobfit) => {
                push_list(&mut lines, "Areas for improvement", &jobfit.areas_for_improvement);
                push_list(&mut lines, "Suggestions", &jobfit.optimization_suggestions);
            }
            None => lines.push(NOT_AVAILABLE.to_string()),
        },
        ResultsTab::InterviewPrep => {
            push_json(&mut lines, result.insights.as_ref().map(|i| &i.interview_prep))
        }
        ResultsTab::CompanyInsights => {
            push_json(&mut lines, result.insights.as_ref().map(|i| &i.company_insights))
        }
        ResultsTab::WebResearch => {
            push_json(&mut lines, result.insights.as_ref().map(|i| &i.web_research))
        }
    }
    lines
}

/// One-screen summary of a persisted session.
pub fn status_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("Page: {:?}", view.page)];
    if let Some(name) = &view.job_name {
        lines.push(format!("Job: {name}"));
    }
    if view.page == Page::Processing || view.page == Page::Results {
        lines.extend(processing_lines(&view.processing).into_iter().skip(1));
    }
    lines
}

fn push_list(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("{heading}:"));
    lines.extend(items.iter().map(|item| format!("  - {item}")));
}

fn push_json(lines: &mut Vec<String>, value: Option<&serde_json::Value>) {
    match value {
        Some(value) if !value.is_null() => match serde_json::to_string_pretty(value) {
            Ok(text) => lines.extend(text.lines().map(ToOwned::to_owned)),
            Err(_) => lines.push(value.to_string()),
        },
        _ => lines.push(NOT_AVAILABLE.to_string()),
    }
}
