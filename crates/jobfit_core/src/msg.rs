#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User chose to start a new analysis from the landing page.
    StartClicked,
    /// User submitted the input form.
    SubmitClicked(crate::AnalysisInput),
    /// Job-creation request succeeded.
    SubmissionSucceeded(crate::JobHandle),
    /// Job-creation request failed at the transport level.
    SubmissionFailed(String),
    /// One parsed message from an open status channel.
    StreamEvent {
        subscription: crate::SubscriptionId,
        event: crate::StreamEvent,
    },
    /// The status channel terminated with a failure.
    StreamFailed {
        subscription: crate::SubscriptionId,
        failure: crate::StreamFailure,
    },
    /// User asked to abandon the current job and start over.
    ResetClicked,
    /// User selected a results sub-tab.
    TabSelected(crate::ResultsTab),
    /// Persisted session found on process start.
    SessionRestored(crate::PersistedSession),
}
