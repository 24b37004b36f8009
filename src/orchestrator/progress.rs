//! Progress events emitted while an orchestration runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

/// Channel capacity used for streamed runs.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    Info,
    Success,
    Error,
    Warning,
    Summary,
}

/// One progress line, serialised as `{ type, message, details?, done? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,
}

impl ProgressEvent {
    pub fn new(kind: ProgressKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            done: false,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Terminal event; a stream ends after the first event with `done` set.
    pub fn finished(mut self) -> Self {
        self.done = true;
        self
    }
}

/// Optional progress sink handed to a run.
///
/// Sending never fails the run: once the receiver is gone, events are dropped and the
/// refresh calls already in flight keep going.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    sender: Option<mpsc::Sender<ProgressEvent>>,
}

impl Progress {
    /// A sink that discards everything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub async fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.sender
            && sender.send(event).await.is_err()
        {
            trace!("Progress receiver dropped, discarding event");
        }
    }
}
