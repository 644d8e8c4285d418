#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Input the core has accepted. The dispatcher validates it again before any IO.
    SubmitJob {
        input: crate::AnalysisInput,
    },
    OpenStream {
        subscription: crate::SubscriptionId,
        job_id: String,
    },
    CloseStream {
        subscription: crate::SubscriptionId,
    },
    /// Best-effort server-side cancel of an unfinished job.
    CancelJob {
        job_id: String,
    },
    SaveSession(crate::PersistedSession),
    ClearSession,
}
