//! Jobfit engine: job submission, status channels and durable writes.
mod config;
mod dispatch;
mod engine;
mod persist;
mod sse;
mod stream;
mod types;

pub use config::{Clock, EngineConfig};
pub use dispatch::{JobApi, SubmissionDispatcher};
pub use engine::EngineHandle;
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use sse::{SseDecoder, SseMessage};
pub use stream::{ChannelStreamSink, StreamSink, StreamSubscriber, Subscription};
pub use types::{EngineError, EngineEvent, SubmitError};
