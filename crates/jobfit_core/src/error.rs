use thiserror::Error;

use crate::input::ValidationError;

/// User-visible failure raised at the input step.
///
/// Stream failures do not appear here; they are written into the reconciled
/// progress message and leave the session on the processing page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Notice {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Submission failed: {0}")]
    Transport(String),
}
