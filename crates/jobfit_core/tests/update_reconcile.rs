use jobfit_core::{
    update, AnalysisInput, AppState, Effect, JobHandle, Msg, Page, StreamEvent, StreamFailure,
    SubTaskStatus, SubscriptionId, CONNECTION_ERROR_MESSAGE,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    jobfit_logging::initialize_for_tests();
}

fn processing() -> (AppState, SubscriptionId) {
    let input = AnalysisInput {
        resume_text: "Resume".to_string(),
        company_name: "Acme".to_string(),
        job_description: "JD".to_string(),
        ..AnalysisInput::default()
    };
    let job = JobHandle {
        file_id: "job-1".to_string(),
        name: "text-input".to_string(),
        created_at: String::new(),
    };
    let (state, _) = update(AppState::new(), Msg::StartClicked);
    let (state, _) = update(state, Msg::SubmitClicked(input));
    let (state, _) = update(state, Msg::SubmissionSucceeded(job));
    let subscription = state.open_stream().expect("stream opened");
    (state, subscription)
}

/// Feeds events in order and returns the final state plus every effect emitted.
fn feed(
    state: AppState,
    subscription: SubscriptionId,
    events: Vec<serde_json::Value>,
) -> (AppState, Vec<Effect>) {
    events
        .into_iter()
        .fold((state, Vec::new()), |(state, mut all), value| {
            let event: StreamEvent = serde_json::from_value(value).expect("valid event");
            let (state, effects) = update(
                state,
                Msg::StreamEvent {
                    subscription,
                    event,
                },
            );
            all.extend(effects);
            (state, all)
        })
}

fn close_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::CloseStream { .. }))
        .count()
}

#[test]
fn worked_example_first_wins_last_wins_and_completes() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = feed(
        state,
        subscription,
        vec![
            json!({"jobfit_status": "processing"}),
            json!({"jobfit_status": "processed", "score": 80}),
            json!({"insights_status": "processing"}),
            json!({"jobfit_status": "processed", "score": 10}),
            json!({"insights_status": "processed", "company_insights": ["hiring"]}),
        ],
    );

    let result = state.result();
    assert_eq!(result.jobfit.as_ref().map(|j| j.score), Some(80.0));
    assert_eq!(
        result.insights.as_ref().map(|i| i.company_insights.clone()),
        Some(json!(["hiring"]))
    );
    assert_eq!(state.page(), Page::Results);
    assert_eq!(state.open_stream(), None);
    assert_eq!(close_count(&effects), 1);
}

#[test]
fn jobfit_payload_is_taken_from_first_processed_event() {
    init_logging();
    let (state, subscription) = processing();
    let (state, _) = feed(
        state,
        subscription,
        vec![
            json!({
                "jobfit_status": "processed",
                "score": 72,
                "result": "Good fit",
                "strengths": ["Rust"],
                "weaknesses": ["Go"],
                "areas_for_improvement": ["Metrics"],
                "cv_optimization_suggestions": ["Quantify impact"],
                "keywords_already_matched": ["tokio"],
                "missing_keywords_to_add": ["kubernetes"]
            }),
            json!({
                "jobfit_status": "processed",
                "score": 5,
                "result": "Rewritten",
                "strengths": []
            }),
        ],
    );

    let jobfit = state.result().jobfit.clone().expect("jobfit captured");
    assert_eq!(jobfit.score, 72.0);
    assert_eq!(jobfit.narrative, "Good fit");
    assert_eq!(jobfit.strengths, vec!["Rust".to_string()]);
    assert_eq!(jobfit.weaknesses, vec!["Go".to_string()]);
    assert_eq!(jobfit.areas_for_improvement, vec!["Metrics".to_string()]);
    assert_eq!(jobfit.optimization_suggestions, vec!["Quantify impact".to_string()]);
    assert_eq!(jobfit.matched_keywords, vec!["tokio".to_string()]);
    assert_eq!(jobfit.missing_keywords, vec!["kubernetes".to_string()]);
}

#[test]
fn insights_payload_is_taken_from_last_processed_event() {
    init_logging();
    let (state, subscription) = processing();
    let (state, _) = feed(
        state,
        subscription,
        vec![
            json!({"insights_status": "processed", "company_insights": {"v": 1}, "interview_prep": {"q": ["a"]}}),
            json!({"insights_status": "processing", "company_insights": {"v": 99}}),
            json!({"insights_status": "processed", "company_insights": {"v": 2}, "web_research": {"news": []}}),
        ],
    );

    let insights = state.result().insights.clone().expect("insights captured");
    assert_eq!(insights.company_insights, json!({"v": 2}));
    assert_eq!(insights.interview_prep, serde_json::Value::Null);
    assert_eq!(insights.web_research, json!({"news": []}));
    // Jobfit never reported processed, so the session keeps waiting.
    assert_eq!(state.page(), Page::Processing);
}

#[test]
fn completion_needs_both_subtasks_across_separate_events() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = feed(
        state,
        subscription,
        vec![json!({"insights_status": "processed"}), json!({"status": "still scoring"})],
    );
    assert_eq!(state.page(), Page::Processing);
    assert_eq!(close_count(&effects), 0);

    let (state, effects) = feed(state, subscription, vec![json!({"jobfit_status": "processed"})]);
    assert_eq!(state.page(), Page::Results);
    assert_eq!(close_count(&effects), 1);
    assert!(matches!(
        effects.last(),
        Some(Effect::SaveSession(session)) if session.current_page == Page::Results
    ));
}

#[test]
fn completion_fires_once_even_if_more_events_arrive() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = feed(
        state,
        subscription,
        vec![
            json!({"jobfit_status": "processed", "insights_status": "processed"}),
            json!({"jobfit_status": "processed", "insights_status": "processed", "status": "again"}),
            json!({"insights_status": "processed", "company_insights": {"late": true}}),
        ],
    );

    assert_eq!(close_count(&effects), 1);
    assert_eq!(state.page(), Page::Results);
    assert_eq!(state.result().progress_message, "");
    assert_eq!(
        state.result().insights.as_ref().map(|i| i.company_insights.clone()),
        Some(serde_json::Value::Null)
    );
}

#[test]
fn progress_message_and_status_are_latest_write_wins() {
    init_logging();
    let (state, subscription) = processing();
    let (state, _) = feed(
        state,
        subscription,
        vec![
            json!({"status": "Queued", "jobfit_status": "queued", "insights_status": "queued"}),
            json!({"status": "Scoring", "jobfit_status": "processing"}),
            json!({}),
            json!({"status": "", "insights_status": "failed"}),
        ],
    );

    let result = state.result();
    assert_eq!(result.progress_message, "");
    assert_eq!(result.jobfit_status, SubTaskStatus::Processing);
    assert_eq!(result.insights_status, SubTaskStatus::Error);
    assert_eq!(state.view().processing.progress_text, "Starting...");
    assert_eq!(state.view().processing.jobfit_label, "⏳ processing");
}

#[test]
fn structured_error_closes_channel_and_ignores_further_events() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = update(
        state,
        Msg::StreamFailed {
            subscription,
            failure: StreamFailure::Structured("quota exceeded".to_string()),
        },
    );

    assert_eq!(effects[0], Effect::CloseStream { subscription });
    assert_eq!(state.result().progress_message, "Error: quota exceeded");
    assert_eq!(state.page(), Page::Processing);
    assert_eq!(state.open_stream(), None);

    let (state, effects) = feed(
        state,
        subscription,
        vec![json!({"jobfit_status": "processed", "insights_status": "processed"})],
    );
    assert!(effects.is_empty());
    assert_eq!(state.page(), Page::Processing);
    assert_eq!(state.result().progress_message, "Error: quota exceeded");
}

#[test]
fn connection_error_shows_generic_message_once() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = update(
        state,
        Msg::StreamFailed {
            subscription,
            failure: StreamFailure::Connection,
        },
    );
    assert_eq!(close_count(&effects), 1);
    assert_eq!(state.result().progress_message, CONNECTION_ERROR_MESSAGE);

    let (_state, effects) = update(
        state,
        Msg::StreamFailed {
            subscription,
            failure: StreamFailure::Connection,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn mistyped_result_fields_do_not_block_completion() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = feed(
        state,
        subscription,
        vec![json!({
            "jobfit_status": "processed",
            "insights_status": "processed",
            "score": "85",
            "strengths": [{"point": "Rust"}],
            "weaknesses": "none",
        })],
    );

    let jobfit = state.result().jobfit.clone().expect("jobfit captured");
    assert_eq!(jobfit.score, 85.0);
    assert_eq!(jobfit.strengths, vec![r#"{"point":"Rust"}"#.to_string()]);
    assert!(jobfit.weaknesses.is_empty());
    assert_eq!(state.page(), Page::Results);
    assert_eq!(close_count(&effects), 1);
}

#[test]
fn unknown_status_strings_are_not_reported() {
    init_logging();
    let (state, subscription) = processing();
    let (state, effects) = feed(
        state,
        subscription,
        vec![
            json!({"jobfit_status": "processing", "insights_status": "queued"}),
            json!({"jobfit_status": "bogus", "insights_status": "  "}),
        ],
    );

    let result = state.result();
    assert_eq!(result.jobfit_status, SubTaskStatus::Processing);
    assert_eq!(result.insights_status, SubTaskStatus::Queued);
    assert_eq!(state.page(), Page::Processing);
    assert_eq!(close_count(&effects), 0);
}
