use jobfit_logging::{jobfit_debug, jobfit_info, jobfit_warn};

use crate::{AppState, Effect, Msg, Notice, Page};

/// Pure update function: applies a message to state and returns any effects.
///
/// Any change to persisted session state is followed by a `SaveSession` effect,
/// except for reset, which clears the store instead.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let before = state.snapshot();
    let mut persist = true;

    let mut effects = match msg {
        Msg::StartClicked => {
            if state.page() == Page::Landing {
                state.set_page(Page::Input);
            }
            Vec::new()
        }
        Msg::SubmitClicked(input) => {
            if state.page() != Page::Input || state.is_submitting() {
                return (state, Vec::new());
            }
            match input.validate() {
                Ok(request) => {
                    jobfit_info!(
                        "submitting analysis for company={} resume={}",
                        request.company_name,
                        request.resume.kind()
                    );
                    state.set_notice(None);
                    state.set_submitting(true);
                    vec![Effect::SubmitJob { input }]
                }
                Err(err) => {
                    state.set_notice(Some(Notice::Validation(err)));
                    Vec::new()
                }
            }
        }
        Msg::SubmissionSucceeded(job) => {
            if !state.is_submitting() || state.page() != Page::Input {
                jobfit_debug!("ignoring late submission response for {}", job.file_id);
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if let Some(subscription) = state.take_subscription() {
                effects.push(Effect::CloseStream { subscription });
            }
            let job_id = job.file_id.clone();
            state.begin_job(job);
            let subscription = state.open_subscription();
            effects.push(Effect::OpenStream {
                subscription,
                job_id,
            });
            effects
        }
        Msg::SubmissionFailed(message) => {
            if state.is_submitting() {
                jobfit_warn!("submission failed: {}", message);
                state.set_submitting(false);
                state.set_notice(Some(Notice::Transport(message)));
            }
            Vec::new()
        }
        Msg::StreamEvent {
            subscription,
            event,
        } => {
            if state.open_stream() != Some(subscription) {
                jobfit_debug!("dropping message from closed subscription {}", subscription);
                return (state, Vec::new());
            }
            let applied = state.reconciler_mut().apply_event(&event);
            if applied.changed {
                state.mark_dirty();
            }
            if applied.completed && state.page() == Page::Processing {
                state.take_subscription();
                state.set_page(Page::Results);
                vec![Effect::CloseStream { subscription }]
            } else {
                Vec::new()
            }
        }
        Msg::StreamFailed {
            subscription,
            failure,
        } => {
            if state.open_stream() != Some(subscription) {
                return (state, Vec::new());
            }
            jobfit_warn!("subscription {} failed: {:?}", subscription, failure);
            state.take_subscription();
            state.reconciler_mut().record_failure(&failure);
            state.mark_dirty();
            vec![Effect::CloseStream { subscription }]
        }
        Msg::ResetClicked => {
            if state.page() == Page::Landing {
                return (state, Vec::new());
            }
            persist = false;
            let mut effects = Vec::with_capacity(3);
            if let Some(subscription) = state.take_subscription() {
                effects.push(Effect::CloseStream { subscription });
            }
            if state.page() == Page::Processing {
                if let Some(job) = state.job() {
                    effects.push(Effect::CancelJob {
                        job_id: job.file_id.clone(),
                    });
                }
            }
            state.clear();
            effects.push(Effect::ClearSession);
            effects
        }
        Msg::TabSelected(tab) => {
            if state.page() == Page::Results {
                state.set_tab(tab);
            }
            Vec::new()
        }
        Msg::SessionRestored(session) => {
            if state.page() != Page::Landing || state.job().is_some() {
                return (state, Vec::new());
            }
            persist = false;
            state.restore_from(session);
            restored_stream(&mut state)
        }
    };

    if persist {
        let after = state.snapshot();
        if after != before {
            effects.push(Effect::SaveSession(after));
        }
    }

    (state, effects)
}

/// Re-opens the channel for a session that was mid-flight when it was saved.
fn restored_stream(state: &mut AppState) -> Vec<Effect> {
    if state.page() != Page::Processing {
        return Vec::new();
    }
    match state.job().map(|job| job.file_id.clone()) {
        Some(job_id) => {
            jobfit_info!("resuming status channel for job {}", job_id);
            let subscription = state.open_subscription();
            vec![Effect::OpenStream {
                subscription,
                job_id,
            }]
        }
        None => {
            jobfit_warn!("persisted processing page has no job handle; returning to input");
            state.clear();
            vec![Effect::ClearSession]
        }
    }
}
