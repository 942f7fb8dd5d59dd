//! Telemetry feed subscriber.
//!
//! The backend pushes one JSON grid snapshot per WebSocket text frame. The
//! subscriber decodes each frame and forwards it over an mpsc channel; frames
//! that fail to decode are logged and skipped. The connection is torn down when
//! the cancellation token fires, the server closes, or the receiver goes away.

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::GridSnapshot;

/// Snapshots buffered between the socket and the consumer.
pub const FEED_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to connect to telemetry feed at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("telemetry stream error: {0}")]
    Stream(#[from] tungstenite::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEnd {
    Cancelled,
    ServerClosed,
    ReceiverDropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub end: FeedEnd,
    pub snapshots: u64,
    pub malformed: u64,
}

#[derive(Debug, Clone)]
pub struct TelemetryFeed {
    url: String,
}

impl TelemetryFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the subscription on a background task.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (
        mpsc::Receiver<GridSnapshot>,
        JoinHandle<Result<FeedSummary, FeedError>>,
    ) {
        let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move { self.run(tx, cancel).await });
        (rx, handle)
    }

    /// Connect and forward snapshots until the feed ends.
    pub async fn run(
        &self,
        tx: mpsc::Sender<GridSnapshot>,
        cancel: CancellationToken,
    ) -> Result<FeedSummary, FeedError> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|source| FeedError::Connect {
                url: self.url.clone(),
                source,
            })?;
        info!(url = %self.url, "telemetry feed connected");

        let (mut sink, mut stream) = socket.split();
        let mut snapshots = 0;
        let mut malformed = 0;

        let end = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        debug!(error = %e, "close frame not delivered");
                    }
                    break FeedEnd::Cancelled;
                }
                frame = stream.next() => match frame {
                    None | Some(Ok(Message::Close(_))) => break FeedEnd::ServerClosed,
                    Some(Err(e)) => return Err(FeedError::Stream(e)),
                    Some(Ok(Message::Text(text))) => match GridSnapshot::from_json(&text) {
                        Ok(snapshot) => {
                            snapshots += 1;
                            if tx.send(snapshot).await.is_err() {
                                break FeedEnd::ReceiverDropped;
                            }
                        }
                        Err(e) => {
                            malformed += 1;
                            warn!(error = %e, "skipping malformed telemetry frame");
                        }
                    },
                    Some(Ok(_)) => {}
                },
            }
        };

        info!(?end, snapshots, malformed, "telemetry feed ended");
        Ok(FeedSummary {
            end,
            snapshots,
            malformed,
        })
    }
}
