use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jobfit_core::{update, AnalysisInput, AppState, Effect, Msg, Page, ResultsTab, SessionStore};
use jobfit_engine::{ensure_state_dir, EngineConfig, EngineHandle};
use jobfit_logging::{jobfit_info, jobfit_warn};

use super::cli::{AppConfig, Cli, Command};
use super::effects::EffectRunner;
use super::persistence::RonSessionStore;
use super::render::{self, Renderer};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_cli(&cli);
    jobfit_info!(
        "jobfit starting: server={} state_dir={:?}",
        config.server_url,
        config.state_dir
    );

    match cli.command {
        Command::Status => print_status(&config),
        Command::Reset => {
            let mut session = Session::open(&config)?;
            session.load();
            session.reset();
            println!("Session cleared.");
            Ok(())
        }
        Command::Resume => {
            let mut session = Session::open(&config)?;
            session.boot();
            session.follow()
        }
        Command::Analyze(args) => {
            let input = args.into_input()?;
            let mut session = Session::open(&config)?;
            session.load();
            session.start(input);
            session.follow()
        }
    }
}

fn print_status(config: &AppConfig) -> Result<()> {
    let store = RonSessionStore::new(&config.state_dir);
    let Some(state) = restored_state(&store) else {
        println!("No saved session in {}.", store.path().display());
        return Ok(());
    };
    for line in render::status_lines(&state.view()) {
        println!("{line}");
    }
    Ok(())
}

/// Rebuilds the persisted session in memory. The returned effects are dropped,
/// so no status channel is opened.
fn restored_state(store: &dyn SessionStore) -> Option<AppState> {
    let persisted = store.restore()?;
    let (mut state, _) = update(AppState::new(), Msg::SessionRestored(persisted));
    state.consume_dirty();
    Some(state)
}

/// Where a followed session stands.
#[derive(Debug, PartialEq)]
enum Outcome {
    Running,
    Complete,
    Rejected(String),
    ChannelLost(String),
    Idle,
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    request_timeout: Duration,
}

impl Session {
    fn open(config: &AppConfig) -> Result<Self> {
        ensure_state_dir(&config.state_dir)
            .with_context(|| format!("preparing state directory {:?}", config.state_dir))?;

        let engine_config = EngineConfig {
            server_url: config.server_url.clone(),
            clock: Arc::new(|| chrono::Utc::now().to_rfc3339()),
            ..EngineConfig::default()
        };
        let request_timeout = engine_config.request_timeout;
        let engine = EngineHandle::new(engine_config).context("starting engine")?;
        let store = RonSessionStore::new(&config.state_dir);

        Ok(Self::with_runner(
            EffectRunner::new(engine, Box::new(store)),
            request_timeout,
        ))
    }

    fn with_runner(runner: EffectRunner, request_timeout: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(),
            request_timeout,
        }
    }

    /// Restores the persisted session and re-opens its status channel if it was processing.
    fn boot(&mut self) {
        if let Some(persisted) = self.runner.store().restore() {
            self.dispatch(Msg::SessionRestored(persisted));
        }
    }

    /// Restores the persisted session for a command that will replace it.
    fn load(&mut self) {
        if let Some(state) = restored_state(self.runner.store()) {
            self.state = state;
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            self.renderer.render(&self.state.view());
        }
    }

    /// Replaces any previous session with a fresh submission.
    fn start(&mut self, input: AnalysisInput) {
        if self.state.page() != Page::Landing {
            jobfit_info!("replacing persisted session on {:?}", self.state.page());
            self.reset();
        }
        self.dispatch(Msg::StartClicked);
        self.dispatch(Msg::SubmitClicked(input));
    }

    /// Clears the session. Waits for the server to acknowledge a cancel when one was sent.
    fn reset(&mut self) {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, Msg::ResetClicked);
        self.state = next;

        let cancelling = effects
            .iter()
            .any(|effect| matches!(effect, Effect::CancelJob { .. }));
        let cleared = effects
            .iter()
            .any(|effect| matches!(effect, Effect::ClearSession));
        self.runner.enqueue(effects);
        if !cleared {
            self.runner.enqueue(vec![Effect::ClearSession]);
        }

        // Stream output still queued belongs to a closed subscription.
        if cancelling {
            while self.runner.next_msg(self.request_timeout).is_some() {}
        }
        self.state.consume_dirty();
    }

    fn follow(&mut self) -> Result<()> {
        loop {
            match self.outcome() {
                Outcome::Running => {}
                Outcome::Complete => {
                    self.print_results();
                    return Ok(());
                }
                Outcome::Rejected(notice) => bail!(notice),
                Outcome::ChannelLost(status) => {
                    jobfit_warn!(
                        "status channel closed before completion (handle held: {})",
                        self.runner.has_open_channel()
                    );
                    bail!(
                        "{status}\nRun `jobfit resume` to reconnect or `jobfit reset` to start over."
                    );
                }
                Outcome::Idle => {
                    println!("No analysis in progress.");
                    return Ok(());
                }
            }

            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL) {
                self.dispatch(msg);
            }
        }
    }

    fn outcome(&self) -> Outcome {
        let view = self.state.view();
        match view.page {
            Page::Results => Outcome::Complete,
            Page::Processing if self.state.open_stream().is_none() => {
                Outcome::ChannelLost(view.processing.progress_text)
            }
            Page::Processing => Outcome::Running,
            Page::Input if view.submitting => Outcome::Running,
            Page::Input => match view.notice {
                Some(notice) => Outcome::Rejected(notice),
                None => Outcome::Idle,
            },
            Page::Landing => Outcome::Idle,
        }
    }

    fn print_results(&mut self) {
        for tab in ResultsTab::ALL {
            self.dispatch(Msg::TabSelected(tab));
            let view = self.state.view();
            println!();
            for line in render::tab_lines(view.tab, &view.result) {
                println!("{line}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jobfit_core::{JobHandle, MemorySessionStore, PersistedSession, SubmissionRequest};
    use jobfit_engine::{JobApi, StreamSubscriber, SubmitError};

    use super::*;

    #[derive(Default)]
    struct RecordingApi {
        cancelled: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl JobApi for RecordingApi {
        async fn create_job(&self, _request: &SubmissionRequest) -> Result<JobHandle, SubmitError> {
            Err(SubmitError::Transport("unused".to_string()))
        }

        async fn cancel(&self, job_id: &str) -> Result<(), SubmitError> {
            self.cancelled.lock().unwrap().push(job_id.to_string());
            Ok(())
        }
    }

    fn processing_store() -> MemorySessionStore {
        let store = MemorySessionStore::new();
        let mut seed = store.clone();
        seed.save(&PersistedSession {
            current_page: Page::Processing,
            analysis_result: None,
            file_status: Some(JobHandle {
                file_id: "job-1".to_string(),
                name: "cv.pdf".to_string(),
                created_at: String::new(),
            }),
        });
        store
    }

    fn session(api: Arc<RecordingApi>, store: MemorySessionStore) -> Session {
        let subscriber = StreamSubscriber::new(EngineConfig::default()).unwrap();
        let engine = EngineHandle::with_parts(api, subscriber).unwrap();
        Session::with_runner(
            EffectRunner::new(engine, Box::new(store)),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn reset_cancels_persisted_job_without_opening_a_channel() {
        let api = Arc::new(RecordingApi::default());
        let store = processing_store();
        let mut session = session(api.clone(), store.clone());

        session.load();
        assert_eq!(session.state.page(), Page::Processing);
        assert!(!session.runner.has_open_channel());

        session.reset();

        assert!(!session.runner.has_open_channel());
        assert_eq!(*api.cancelled.lock().unwrap(), vec!["job-1".to_string()]);
        assert_eq!(store.restore(), None);
        assert_eq!(session.state.page(), Page::Input);
    }

    #[test]
    fn status_view_is_rebuilt_without_side_effects() {
        let store = processing_store();
        let state = restored_state(&store).expect("session restored");

        assert_eq!(state.page(), Page::Processing);
        assert_eq!(state.job().map(|job| job.file_id.as_str()), Some("job-1"));
        assert_eq!(store.key_count(), 2);
    }
}
