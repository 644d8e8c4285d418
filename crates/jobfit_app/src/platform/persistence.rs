use std::fs;
use std::path::{Path, PathBuf};

use jobfit_core::{JobHandle, Page, PersistedSession, ReconciledResult, SessionStore};
use jobfit_engine::AtomicFileWriter;
use jobfit_logging::{jobfit_error, jobfit_info, jobfit_warn};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = "session.ron";

/// On-disk layout: one document holding the three session keys. A key that is
/// absent was never written or has been cleared.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoredKeys {
    #[serde(rename = "currentPage", default, skip_serializing_if = "Option::is_none")]
    current_page: Option<Page>,
    #[serde(rename = "analysisResult", default, skip_serializing_if = "Option::is_none")]
    analysis_result: Option<ReconciledResult>,
    #[serde(rename = "fileStatus", default, skip_serializing_if = "Option::is_none")]
    file_status: Option<JobHandle>,
}

/// Session store backed by a ron file in the state directory.
///
/// Every save replaces the whole document atomically, and reset removes it, so
/// a reader never observes a mix of old and new keys.
pub struct RonSessionStore {
    dir: PathBuf,
    writer: AtomicFileWriter,
}

impl RonSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            writer: AtomicFileWriter::new(dir.clone()),
            dir,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }
}

impl SessionStore for RonSessionStore {
    fn save(&mut self, session: &PersistedSession) {
        let keys = StoredKeys {
            current_page: Some(session.current_page),
            analysis_result: session.analysis_result.clone(),
            file_status: session.file_status.clone(),
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&keys, pretty) {
            Ok(text) => text,
            Err(err) => {
                jobfit_error!("Failed to serialize session: {}", err);
                return;
            }
        };

        if let Err(err) = self.writer.write(STATE_FILENAME, &content) {
            jobfit_error!("Failed to write session to {:?}: {}", self.dir, err);
        }
    }

    fn restore(&self) -> Option<PersistedSession> {
        let keys = load_keys(&self.path())?;
        let current_page = keys.current_page?;
        jobfit_info!("Restored session on page {:?} from {:?}", current_page, self.dir);
        Some(PersistedSession {
            current_page,
            analysis_result: keys.analysis_result,
            file_status: keys.file_status,
        })
    }

    fn reset(&mut self) {
        if let Err(err) = self.writer.remove(STATE_FILENAME) {
            jobfit_error!("Failed to clear session in {:?}: {}", self.dir, err);
        }
    }
}

fn load_keys(path: &Path) -> Option<StoredKeys> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            jobfit_warn!("Failed to read session from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str(&content) {
        Ok(keys) => Some(keys),
        Err(err) => {
            jobfit_warn!("Failed to parse session from {:?}: {}", path, err);
            None
        }
    }
}
