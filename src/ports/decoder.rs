//! Symbol decoder port wrapping the external barcode decoding engine.

use std::error::Error;

use crate::ports::camera::Frame;

/// Turns a still image into barcode symbols.
///
/// Calls are blocking; the decoder boundary runs them off the control flow.
pub trait SymbolDecoder: Send + Sync {
    /// Prepares the engine. Called once per boundary before it reports ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be loaded.
    fn warm_up(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    /// Decodes every symbol found in `frame`. An empty vector means nothing
    /// was found.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails on this frame.
    fn decode(&self, frame: &Frame) -> Result<Vec<String>, Box<dyn Error + Send + Sync>>;
}
