use std::time::Duration;

use jobfit_core::{Effect, Msg, SessionStore, SubscriptionId};
use jobfit_engine::{EngineEvent, EngineHandle, Subscription};
use jobfit_logging::{jobfit_info, jobfit_warn};

/// Executes core effects against the engine and the session store, and turns
/// engine events back into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    store: Box<dyn SessionStore>,
    active: Option<Subscription>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: Box<dyn SessionStore>) -> Self {
        Self {
            engine,
            store,
            active: None,
        }
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn has_open_channel(&self) -> bool {
        self.active.is_some()
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJob { input } => {
                    jobfit_info!(
                        "SubmitJob company_len={} resume_file={}",
                        input.company_name.len(),
                        input.resume_file.is_some()
                    );
                    self.engine.submit(input);
                }
                Effect::OpenStream {
                    subscription,
                    job_id,
                } => {
                    if let Some(previous) = self.active.take() {
                        jobfit_warn!(
                            "subscription {} still open while opening {}",
                            previous.id(),
                            subscription
                        );
                        previous.dispose();
                    }
                    self.active = Some(self.engine.subscribe(subscription, &job_id));
                }
                Effect::CloseStream { subscription } => self.close(subscription),
                Effect::CancelJob { job_id } => self.engine.cancel(job_id),
                Effect::SaveSession(session) => self.store.save(&session),
                Effect::ClearSession => self.store.reset(),
            }
        }
    }

    /// Waits up to `timeout` for the next engine event that maps to a message.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).and_then(map_event)
    }

    fn close(&mut self, subscription: SubscriptionId) {
        match self.active.take() {
            Some(active) if active.id() == subscription => active.dispose(),
            Some(other) => self.active = Some(other),
            None => {}
        }
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.dispose();
        }
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Submitted(Ok(job)) => Some(Msg::SubmissionSucceeded(job)),
        EngineEvent::Submitted(Err(err)) => Some(Msg::SubmissionFailed(err.to_string())),
        EngineEvent::CancelFinished { job_id, result } => {
            if result.is_ok() {
                jobfit_info!("server acknowledged cancel for job {}", job_id);
            }
            None
        }
        EngineEvent::StreamMessage {
            subscription,
            event,
        } => {
            jobfit_logging::set_active_subscription(subscription);
            Some(Msg::StreamEvent {
                subscription,
                event,
            })
        }
        EngineEvent::StreamFailed {
            subscription,
            failure,
        } => Some(Msg::StreamFailed {
            subscription,
            failure,
        }),
    }
}
