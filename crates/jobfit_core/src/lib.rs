//! Jobfit core: pure session state machine, status reconciliation and view-model helpers.
mod effect;
mod error;
mod event;
mod input;
mod model;
mod msg;
mod reconcile;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::Notice;
pub use event::{StreamEvent, StreamFailure, CONNECTION_ERROR_MESSAGE};
pub use input::{AnalysisInput, ResumeSource, SubmissionRequest, ValidationError, TEXT_INPUT_NAME};
pub use model::{
    AgentProgressEntry, InsightsResult, JobHandle, JobfitResult, Page, ResultsTab, SubTaskStatus,
    SubscriptionId,
};
pub use msg::Msg;
pub use reconcile::{Applied, ReconciledResult, StatusReconciler};
pub use session::{
    MemorySessionStore, PersistedSession, SessionStore, KEY_ANALYSIS_RESULT, KEY_CURRENT_PAGE,
    KEY_FILE_STATUS,
};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ProcessingView};
