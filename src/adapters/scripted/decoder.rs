//! Decoding engine that answers from a script.

use std::collections::VecDeque;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::ports::camera::Frame;
use crate::ports::decoder::SymbolDecoder;

/// One scripted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedDecode {
    /// No barcode in the frame.
    Nothing,
    /// These symbols were found.
    Symbols(Vec<String>),
    /// The engine failed with this message.
    Fail(String),
}

/// Serves scripted answers frame by frame; once the script runs out every
/// frame decodes to nothing.
#[derive(Debug, Clone)]
pub struct ScriptedDecoder {
    script: Arc<Mutex<VecDeque<ScriptedDecode>>>,
    frames: Arc<AtomicUsize>,
    warm_up_error: Option<String>,
}

impl ScriptedDecoder {
    /// Creates an engine answering with `script` in order.
    #[must_use]
    pub fn new(script: Vec<ScriptedDecode>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            frames: Arc::new(AtomicUsize::new(0)),
            warm_up_error: None,
        }
    }

    /// Makes `warm_up` fail with `message`.
    #[must_use]
    pub fn failing_warm_up(mut self, message: &str) -> Self {
        self.warm_up_error = Some(message.to_string());
        self
    }

    /// Number of frames decoded so far.
    #[must_use]
    pub fn frames_seen(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn warm_up(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.warm_up_error {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }

    fn decode(&self, _frame: &Frame) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().expect("decoder script lock poisoned").pop_front();
        match next.unwrap_or(ScriptedDecode::Nothing) {
            ScriptedDecode::Nothing => Ok(Vec::new()),
            ScriptedDecode::Symbols(symbols) => Ok(symbols),
            ScriptedDecode::Fail(message) => Err(message.into()),
        }
    }
}
