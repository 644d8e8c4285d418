use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::model::{JobHandle, Page};
use crate::reconcile::ReconciledResult;

pub const KEY_CURRENT_PAGE: &str = "currentPage";
pub const KEY_ANALYSIS_RESULT: &str = "analysisResult";
pub const KEY_FILE_STATUS: &str = "fileStatus";

/// Durable mirror of the live session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    pub current_page: Page,
    pub analysis_result: Option<ReconciledResult>,
    pub file_status: Option<JobHandle>,
}

/// Durable key/value storage for the session snapshot.
///
/// Implementations must make `reset` remove every key, so the next `restore`
/// reports a cold start.
pub trait SessionStore: Send {
    fn save(&mut self, session: &PersistedSession);
    fn restore(&self) -> Option<PersistedSession>;
    fn reset(&mut self);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Option<PersistedSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently present.
    pub fn key_count(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.as_ref().map_or(0, |session| {
                1 + usize::from(session.analysis_result.is_some())
                    + usize::from(session.file_status.is_some())
            }),
            Err(_) => 0,
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&mut self, session: &PersistedSession) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(session.clone());
        }
    }

    fn restore(&self) -> Option<PersistedSession> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }

    fn reset(&mut self) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
    }
}
