//! Decoder boundary: an isolated worker that turns frames into symbols.
//!
//! The worker is a tokio task that owns the [`SymbolDecoder`] engine and runs
//! each decode on the blocking pool. The control flow talks to it only through
//! two channels carrying the worker protocol below, so a slow decode never
//! holds up frame capture. A boundary is created per scan session and torn
//! down with it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::DecoderError;
use crate::ports::camera::Frame;
use crate::ports::decoder::SymbolDecoder;

/// Message sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerRequest {
    /// Decode one frame.
    ScanImage {
        /// The frame to decode.
        #[serde(rename = "imageData")]
        image_data: Frame,
    },
}

/// Message sent by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// The engine is loaded; sent exactly once, before anything else.
    WorkerReady,
    /// Symbols found in a frame; empty means none.
    ScanResult {
        /// Decoded symbol strings, in engine order.
        result: Vec<String>,
    },
    /// The engine failed on a frame.
    ScanError {
        /// Engine error text.
        message: String,
    },
    /// The worker itself failed.
    WorkerError {
        /// Failure description.
        message: String,
    },
}

/// Result of one submitted frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// At least one symbol was decoded.
    Symbols(Vec<String>),
    /// The frame held no readable barcode.
    NoSymbols,
    /// Decoding failed.
    Error(String),
}

impl WorkerMessage {
    /// Maps a result message to an outcome; `WorkerReady` has none.
    #[must_use]
    pub fn into_outcome(self) -> Option<DecodeOutcome> {
        match self {
            Self::WorkerReady => None,
            Self::ScanResult { result } if result.is_empty() => Some(DecodeOutcome::NoSymbols),
            Self::ScanResult { result } => Some(DecodeOutcome::Symbols(result)),
            Self::ScanError { message } | Self::WorkerError { message } => {
                Some(DecodeOutcome::Error(message))
            }
        }
    }
}

/// Handle to a running decoder worker.
///
/// Dropping the handle terminates the worker.
#[derive(Debug)]
pub struct DecoderBoundary {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    messages: mpsc::UnboundedReceiver<WorkerMessage>,
    worker: JoinHandle<()>,
}

impl DecoderBoundary {
    /// Starts a worker around `engine` and waits for its ready signal.
    ///
    /// Submissions are only possible on the returned handle, so nothing can
    /// be sent before the worker is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to warm up or the worker exits
    /// before reporting ready.
    pub async fn spawn(engine: Arc<dyn SymbolDecoder>) -> Result<Self, DecoderError> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (message_tx, mut message_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(engine, request_rx, message_tx));
        // Aborts the worker if this future is dropped before it reports.
        let mut guard = AbortGuard::new(&worker);

        let first = message_rx.recv().await;
        let failure = match first {
            Some(WorkerMessage::WorkerReady) => {
                tracing::debug!("decoder worker ready");
                guard.disarm();
                return Ok(Self { requests: request_tx, messages: message_rx, worker });
            }
            Some(WorkerMessage::WorkerError { message } | WorkerMessage::ScanError { message }) => {
                DecoderError::Startup(message)
            }
            Some(other) => DecoderError::Protocol(format!("{other:?} before workerReady")),
            None => DecoderError::WorkerGone,
        };
        drop(guard);
        Err(failure)
    }

    /// Hands a frame to the worker without waiting for the result.
    ///
    /// # Errors
    ///
    /// Returns [`DecoderError::WorkerGone`] if the worker has exited.
    pub fn submit(&self, frame: Frame) -> Result<(), DecoderError> {
        self.requests
            .send(WorkerRequest::ScanImage { image_data: frame })
            .map_err(|_| DecoderError::WorkerGone)
    }

    /// Waits for the next decode outcome.
    ///
    /// Returns `None` once the worker has exited. Cancel-safe.
    pub async fn next_outcome(&mut self) -> Option<DecodeOutcome> {
        loop {
            let message = self.messages.recv().await?;
            if let Some(outcome) = message.into_outcome() {
                return Some(outcome);
            }
            tracing::warn!("ignoring repeated workerReady");
        }
    }

    /// Stops the worker and closes both channels. Idempotent.
    pub fn terminate(&mut self) {
        self.worker.abort();
        self.messages.close();
    }
}

impl Drop for DecoderBoundary {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(
    engine: Arc<dyn SymbolDecoder>,
    mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
    messages: mpsc::UnboundedSender<WorkerMessage>,
) {
    let warm = Arc::clone(&engine);
    let ready = match tokio::task::spawn_blocking(move || warm.warm_up()).await {
        Ok(Ok(())) => WorkerMessage::WorkerReady,
        Ok(Err(e)) => WorkerMessage::WorkerError { message: e.to_string() },
        Err(e) => WorkerMessage::WorkerError { message: format!("engine panicked: {e}") },
    };
    let is_ready = ready == WorkerMessage::WorkerReady;
    if messages.send(ready).is_err() || !is_ready {
        return;
    }

    while let Some(WorkerRequest::ScanImage { image_data }) = requests.recv().await {
        let engine = Arc::clone(&engine);
        let decoded = tokio::task::spawn_blocking(move || engine.decode(&image_data)).await;
        let message = match decoded {
            Ok(Ok(symbols)) => WorkerMessage::ScanResult { result: symbols },
            Ok(Err(e)) => WorkerMessage::ScanError { message: e.to_string() },
            Err(e) => WorkerMessage::WorkerError { message: format!("engine panicked: {e}") },
        };
        if messages.send(message).is_err() {
            break;
        }
    }
}

/// Aborts a task when dropped, unless disarmed first.
struct AbortGuard(Option<AbortHandle>);

impl AbortGuard {
    fn new<T>(task: &JoinHandle<T>) -> Self {
        Self(Some(task.abort_handle()))
    }

    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}
