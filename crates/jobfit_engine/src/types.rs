use jobfit_core::{JobHandle, StreamEvent, StreamFailure, SubscriptionId, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Outcome of a job-creation request.
    Submitted(Result<JobHandle, SubmitError>),
    /// Outcome of a best-effort server-side cancel.
    CancelFinished {
        job_id: String,
        result: Result<(), SubmitError>,
    },
    /// One parsed message from an open channel, in delivery order.
    StreamMessage {
        subscription: SubscriptionId,
        event: StreamEvent,
    },
    /// Terminal failure of a channel. Nothing else is reported for it afterwards.
    StreamFailed {
        subscription: SubscriptionId,
        failure: StreamFailure,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Transport(String),
}

impl SubmitError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
