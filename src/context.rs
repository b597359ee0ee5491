//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{
    HttpBackend, LiveClock, LiveIdGenerator, NoCamera, StillImageCamera, TerminalView,
    ZbarDecoder,
};
use crate::config::Config;
use crate::ports::backend::Backend;
use crate::ports::camera::Camera;
use crate::ports::clock::Clock;
use crate::ports::decoder::SymbolDecoder;
use crate::ports::id_gen::IdGenerator;
use crate::ports::view::View;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. The controller owns
/// the context; tests build one from scripted adapters.
pub struct ServiceContext {
    /// Clock for ingredient and cart timestamps.
    pub clock: Box<dyn Clock>,
    /// Scan session id source.
    pub id_gen: Box<dyn IdGenerator>,
    /// Recipe assistant backend.
    pub backend: Box<dyn Backend>,
    /// Camera the scan session opens.
    pub camera: Box<dyn Camera>,
    /// Decoding engine; shared with each session's worker.
    pub decoder: Arc<dyn SymbolDecoder>,
    /// Where display refreshes go.
    pub view: Box<dyn View>,
}

impl ServiceContext {
    /// Creates a live context from `config`.
    ///
    /// `image` selects the still image the camera serves; without one the
    /// camera refuses to open.
    #[must_use]
    pub fn live(config: &Config, image: Option<&Path>) -> Self {
        let camera: Box<dyn Camera> = match image {
            Some(path) => Box::new(StillImageCamera::new(path)),
            None => Box::new(NoCamera),
        };
        Self {
            clock: Box::new(LiveClock),
            id_gen: Box::new(LiveIdGenerator::new()),
            backend: Box::new(HttpBackend::new(&config.api_base)),
            camera,
            decoder: Arc::new(ZbarDecoder::new(&config.zbarimg)),
            view: Box::new(TerminalView),
        }
    }
}
