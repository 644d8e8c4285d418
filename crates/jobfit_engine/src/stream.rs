use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use futures_util::StreamExt;
use jobfit_core::{StreamEvent, StreamFailure, SubscriptionId};
use jobfit_logging::{jobfit_debug, jobfit_info, jobfit_warn};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::sse::{SseDecoder, SseMessage};
use crate::{EngineError, EngineEvent};

/// Receives the output of one status channel, in delivery order.
pub trait StreamSink: Send + Sync {
    fn on_event(&self, subscription: SubscriptionId, event: StreamEvent);
    fn on_error(&self, subscription: SubscriptionId, failure: StreamFailure);
}

pub struct ChannelStreamSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelStreamSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl StreamSink for ChannelStreamSink {
    fn on_event(&self, subscription: SubscriptionId, event: StreamEvent) {
        let _ = self.tx.send(EngineEvent::StreamMessage {
            subscription,
            event,
        });
    }

    fn on_error(&self, subscription: SubscriptionId, failure: StreamFailure) {
        let _ = self.tx.send(EngineEvent::StreamFailed {
            subscription,
            failure,
        });
    }
}

/// Owned handle to an open status channel.
///
/// [`Subscription::dispose`] is the single teardown entry point. It is idempotent
/// and is also run on drop. A callback already in flight on the runtime may still
/// land after it returns, so sinks must drop output for ids they no longer track.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    token: CancellationToken,
    disposed: AtomicBool,
}

impl Subscription {
    pub fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.token.cancel();
        jobfit_info!("subscription {} disposed", self.id);
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Opens server-sent status channels, one per job.
#[derive(Clone)]
pub struct StreamSubscriber {
    client: reqwest::Client,
    config: EngineConfig,
}

enum Delivery {
    Continue,
    Closed,
}

impl StreamSubscriber {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Opens the channel for `job_id` on `runtime` and returns its owning handle.
    pub fn subscribe(
        &self,
        runtime: &tokio::runtime::Handle,
        subscription: SubscriptionId,
        job_id: &str,
        sink: Arc<dyn StreamSink>,
    ) -> Subscription {
        let handle = Subscription::new(subscription);
        let subscriber = self.clone();
        let job_id = job_id.to_string();
        let token = handle.token();
        runtime.spawn(async move {
            subscriber
                .run_channel(subscription, &job_id, token, sink.as_ref())
                .await;
        });
        handle
    }

    /// Reads the channel until it fails, ends, or `token` is cancelled.
    async fn run_channel(
        &self,
        subscription: SubscriptionId,
        job_id: &str,
        token: CancellationToken,
        sink: &dyn StreamSink,
    ) {
        let url = self.config.endpoint(&format!("stream/{job_id}"));
        jobfit_info!("subscription {} opening {}", subscription, url);

        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send();
        let response = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            response = request => response,
        };

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                jobfit_warn!(
                    "subscription {} rejected with {}",
                    subscription,
                    response.status()
                );
                fail(&token, sink, subscription, StreamFailure::Connection);
                return;
            }
            Err(err) => {
                jobfit_warn!("subscription {} could not connect: {}", subscription, err);
                fail(&token, sink, subscription, StreamFailure::Connection);
                return;
            }
        };

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                next = body.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    for message in decoder.push(&chunk) {
                        if token.is_cancelled() {
                            return;
                        }
                        if let Delivery::Closed = deliver(&token, sink, subscription, message) {
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    jobfit_warn!("subscription {} transport error: {}", subscription, err);
                    fail(&token, sink, subscription, StreamFailure::Connection);
                    return;
                }
                None => {
                    jobfit_warn!("subscription {} ended by server", subscription);
                    fail(&token, sink, subscription, StreamFailure::Connection);
                    return;
                }
            }
        }
    }
}

fn deliver(
    token: &CancellationToken,
    sink: &dyn StreamSink,
    subscription: SubscriptionId,
    message: SseMessage,
) -> Delivery {
    let event = match StreamEvent::from_json(&message.data) {
        Ok(event) => event,
        Err(err) => {
            jobfit_warn!(
                "subscription {} discarded malformed message ({} bytes): {}",
                subscription,
                message.data.len(),
                err
            );
            return Delivery::Continue;
        }
    };

    if let Some(error) = event.structured_error() {
        fail(
            token,
            sink,
            subscription,
            StreamFailure::Structured(error.to_string()),
        );
        return Delivery::Closed;
    }

    jobfit_debug!("subscription {} message delivered", subscription);
    sink.on_event(subscription, event);
    Delivery::Continue
}

/// Reports a terminal failure unless the owner already tore the channel down.
fn fail(
    token: &CancellationToken,
    sink: &dyn StreamSink,
    subscription: SubscriptionId,
    failure: StreamFailure,
) {
    if token.is_cancelled() {
        return;
    }
    jobfit_warn!("subscription {} closed: {:?}", subscription, failure);
    token.cancel();
    sink.on_error(subscription, failure);
}
