use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use jobfit_core::{AnalysisInput, SubscriptionId};
use jobfit_logging::{jobfit_info, jobfit_warn};

use crate::dispatch::{JobApi, SubmissionDispatcher};
use crate::stream::{ChannelStreamSink, StreamSubscriber, Subscription};
use crate::{EngineConfig, EngineError, EngineEvent};

enum EngineCommand {
    Submit { input: AnalysisInput },
    Cancel { job_id: String },
}

/// Runs submissions and status channels on a background tokio runtime.
///
/// Results come back as [`EngineEvent`]s on a single queue, so channel messages
/// keep the order in which the server sent them.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
    runtime: tokio::runtime::Handle,
    subscriber: StreamSubscriber,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api: Arc<dyn JobApi> = Arc::new(SubmissionDispatcher::new(config.clone())?);
        let subscriber = StreamSubscriber::new(config)?;
        Self::with_parts(api, subscriber)
    }

    /// Builds a handle around an explicit job API, e.g. a test double.
    pub fn with_parts(
        api: Arc<dyn JobApi>,
        subscriber: StreamSubscriber,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let handle = runtime.handle().clone();

        let worker_tx = event_tx.clone();
        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = worker_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx,
            runtime: handle,
            subscriber,
        })
    }

    pub fn submit(&self, input: AnalysisInput) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { input });
    }

    /// Opens the status channel for `job_id`. Dropping or disposing the returned
    /// handle closes it.
    pub fn subscribe(&self, subscription: SubscriptionId, job_id: &str) -> Subscription {
        let sink = Arc::new(ChannelStreamSink::new(self.event_tx.clone()));
        self.subscriber
            .subscribe(&self.runtime, subscription, job_id, sink)
    }

    pub fn cancel(&self, job_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel {
            job_id: job_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn JobApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { input } => {
            let result = api.submit(&input).await;
            match &result {
                Ok(job) => jobfit_info!("job {} created for {}", job.file_id, job.name),
                Err(err) => jobfit_warn!("job creation failed: {}", err),
            }
            let _ = event_tx.send(EngineEvent::Submitted(result));
        }
        EngineCommand::Cancel { job_id } => {
            let result = api.cancel(&job_id).await;
            if let Err(err) = &result {
                jobfit_warn!("cancel for job {} failed: {}", job_id, err);
            }
            let _ = event_tx.send(EngineEvent::CancelFinished { job_id, result });
        }
    }
}
