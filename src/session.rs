//! Scan session state machine.
//!
//! ```text
//! Idle ──start──▶ Starting ──camera+decoder ready──▶ Scanning
//!   ▲                │                                  │
//!   │             failure                     symbols / stop / give-up
//!   └────────────────┴──────────────────────────────────┘
//! ```
//!
//! `Detected`, `Stopped` and `Failed` are signals ([`ScanOutcome`]), not held
//! states: by the time one is reported the session has released its camera,
//! decoder and sampler and is back in `Idle`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DEFAULT_SCAN_INTERVAL};
use crate::decoder::{DecodeOutcome, DecoderBoundary};
use crate::error::StartError;
use crate::ports::camera::{Camera, CameraStream};
use crate::ports::decoder::SymbolDecoder;
use crate::sampler::{FrameSampler, SampleOutcome};

/// Held state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No camera, decoder or sampler.
    Idle,
    /// Acquiring the camera and starting the decoder.
    Starting,
    /// Sampling frames; detections are accepted while armed.
    Scanning,
}

/// How a scanning run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A barcode was accepted: the first symbol of the first non-empty batch.
    Detected(String),
    /// The user stopped the session.
    Stopped,
    /// The session gave up.
    Failed(String),
}

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Sampling period.
    pub interval: Duration,
    /// Consecutive decode failures tolerated; `None` means unbounded.
    pub failure_limit: Option<u32>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self { interval: DEFAULT_SCAN_INTERVAL, failure_limit: None }
    }
}

impl From<&Config> for ScanSettings {
    fn from(config: &Config) -> Self {
        Self { interval: config.scan_interval, failure_limit: config.decode_failure_limit }
    }
}

/// One camera-to-barcode scan, owning every resource it acquires.
pub struct ScanSession {
    settings: ScanSettings,
    state: ScanState,
    id: Option<String>,
    camera: Option<Box<dyn CameraStream>>,
    decoder: Option<DecoderBoundary>,
    sampler: Option<FrameSampler>,
    armed: bool,
    consecutive_failures: u32,
}

impl ScanSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new(settings: ScanSettings) -> Self {
        Self {
            settings,
            state: ScanState::Idle,
            id: None,
            camera: None,
            decoder: None,
            sampler: None,
            armed: false,
            consecutive_failures: 0,
        }
    }

    /// Current held state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Whether decoder results are still accepted.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the session holds a live camera stream.
    #[must_use]
    pub fn camera_active(&self) -> bool {
        self.camera.as_ref().is_some_and(|camera| camera.is_active())
    }

    /// Whether the session holds a decoder worker.
    #[must_use]
    pub fn decoder_active(&self) -> bool {
        self.decoder.is_some()
    }

    /// Whether the sampler is running.
    #[must_use]
    pub fn sampler_active(&self) -> bool {
        self.sampler.is_some()
    }

    /// Acquires the camera and starts a decoder concurrently, then arms the
    /// session and starts sampling.
    ///
    /// If this future is dropped midway the session stays in `Starting`;
    /// call [`ScanSession::stop`] to return it to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::Busy`] unless the session is idle. Any
    /// acquisition failure releases whatever was acquired and leaves the
    /// session idle.
    pub async fn start(
        &mut self,
        id: String,
        camera: &dyn Camera,
        engine: Arc<dyn SymbolDecoder>,
    ) -> Result<(), StartError> {
        if self.state != ScanState::Idle {
            return Err(StartError::Busy);
        }
        self.transition(ScanState::Starting);
        self.id = Some(id);

        let (stream, decoder) = tokio::join!(camera.open(), DecoderBoundary::spawn(engine));
        let failure = match (stream, decoder) {
            (Ok(stream), Ok(decoder)) => {
                self.camera = Some(stream);
                self.decoder = Some(decoder);
                self.sampler = Some(FrameSampler::start(self.settings.interval));
                self.armed = true;
                self.consecutive_failures = 0;
                self.transition(ScanState::Scanning);
                return Ok(());
            }
            (Err(e), decoder) => {
                // Dropping the boundary aborts its worker.
                drop(decoder);
                StartError::from(e)
            }
            (Ok(mut stream), Err(e)) => {
                stream.stop();
                StartError::from(e)
            }
        };

        tracing::warn!(session = self.session_id(), error = %failure, "scan session failed to start");
        self.release();
        self.transition(ScanState::Idle);
        Err(failure)
    }

    /// Samples and decodes until a barcode is accepted or the session gives
    /// up.
    ///
    /// Cancel-safe: dropping the future between events leaves the session
    /// scanning, and [`ScanSession::stop`] then tears it down. Returns
    /// [`ScanOutcome::Stopped`] immediately if the session is not scanning.
    pub async fn run(&mut self) -> ScanOutcome {
        loop {
            let (Some(sampler), Some(decoder)) = (self.sampler.as_mut(), self.decoder.as_mut())
            else {
                return ScanOutcome::Stopped;
            };

            tokio::select! {
                () = sampler.tick() => self.sample_frame(),
                outcome = decoder.next_outcome() => {
                    if let Some(ended) = self.handle_decode(outcome) {
                        return ended;
                    }
                }
            }
        }
    }

    /// Acts on one decoder event.
    ///
    /// `None` from the decoder means its worker exited, which ends the
    /// session. Symbols are acted on only while armed; the first accepted
    /// batch disarms the session, releases everything and yields its first
    /// symbol. Returns the outcome if the session ended.
    pub fn handle_decode(&mut self, outcome: Option<DecodeOutcome>) -> Option<ScanOutcome> {
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.resolve();
        }

        let Some(outcome) = outcome else {
            if self.state == ScanState::Idle {
                return None;
            }
            return Some(self.fail("decoder worker exited".to_string()));
        };

        if !self.armed {
            tracing::debug!(session = self.session_id(), ?outcome, "discarding late decode result");
            return None;
        }

        match outcome {
            DecodeOutcome::Symbols(symbols) => {
                let extra = symbols.len().saturating_sub(1);
                let code = symbols.into_iter().next()?;
                self.armed = false;
                tracing::info!(session = self.session_id(), %code, extra, "barcode detected");
                self.release();
                self.transition(ScanState::Idle);
                Some(ScanOutcome::Detected(code))
            }
            DecodeOutcome::NoSymbols => {
                self.consecutive_failures = 0;
                None
            }
            DecodeOutcome::Error(reason) => {
                self.consecutive_failures += 1;
                tracing::warn!(
                    session = self.session_id(),
                    failures = self.consecutive_failures,
                    %reason,
                    "decode failed"
                );
                let limit = self.settings.failure_limit?;
                if self.consecutive_failures < limit {
                    return None;
                }
                Some(self.fail(format!("decoding failed {limit} times in a row: {reason}")))
            }
        }
    }

    /// Tears the session down from any state. Returns `false` if it was
    /// already idle.
    ///
    /// Sampler, camera tracks and decoder worker are all released before
    /// this returns.
    pub fn stop(&mut self) -> bool {
        if self.state == ScanState::Idle {
            return false;
        }
        tracing::info!(session = self.session_id(), from = ?self.state, "scan session stopped");
        self.release();
        self.transition(ScanState::Idle);
        true
    }

    fn sample_frame(&mut self) {
        let (Some(sampler), Some(camera), Some(decoder)) =
            (self.sampler.as_mut(), self.camera.as_mut(), self.decoder.as_ref())
        else {
            return;
        };
        match sampler.sample(self.armed, camera.as_mut(), decoder) {
            SampleOutcome::Submitted => {
                tracing::trace!(session = self.session_id(), "frame submitted");
            }
            SampleOutcome::Failed(e) => {
                tracing::warn!(session = self.session_id(), error = %e, "frame not submitted");
            }
            skipped => tracing::trace!(session = self.session_id(), ?skipped, "tick skipped"),
        }
    }

    fn fail(&mut self, reason: String) -> ScanOutcome {
        tracing::warn!(session = self.session_id(), %reason, "scan session failed");
        self.release();
        self.transition(ScanState::Idle);
        ScanOutcome::Failed(reason)
    }

    fn release(&mut self) {
        self.armed = false;
        self.sampler = None;
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
        if let Some(mut decoder) = self.decoder.take() {
            decoder.terminate();
        }
        self.consecutive_failures = 0;
    }

    fn transition(&mut self, to: ScanState) {
        tracing::debug!(session = self.session_id(), from = ?self.state, ?to, "scan state");
        self.state = to;
    }

    fn session_id(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::{ScriptedCamera, ScriptedDecode, ScriptedDecoder};

    fn settings() -> ScanSettings {
        ScanSettings { interval: Duration::from_millis(200), failure_limit: None }
    }

    async fn scanning(
        camera: &ScriptedCamera,
        engine: &ScriptedDecoder,
        settings: ScanSettings,
    ) -> ScanSession {
        let mut session = ScanSession::new(settings);
        session.start("s-1".into(), camera, Arc::new(engine.clone())).await.unwrap();
        session
    }

    #[tokio::test]
    async fn stop_after_an_abandoned_start_returns_to_idle() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]);
        let mut session = ScanSession::new(settings());

        tokio::select! {
            biased;
            _ = session.start("s-1".into(), &camera, Arc::new(engine.clone())) => {
                panic!("start should still be waiting for the decoder");
            }
            () = std::future::ready(()) => {}
        }

        assert_eq!(session.state(), ScanState::Starting);
        assert_eq!(camera.opens(), 1);
        assert!(!camera.is_live());
        assert!(session.stop());
        assert_eq!(session.state(), ScanState::Idle);
        assert!(!session.decoder_active());
    }

    #[tokio::test(start_paused = true)]
    async fn detection_yields_first_symbol_and_releases_everything() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![
            ScriptedDecode::Nothing,
            ScriptedDecode::Symbols(vec!["049000028911".into(), "012345678905".into()]),
        ]);
        let mut session = scanning(&camera, &engine, settings()).await;
        assert_eq!(session.state(), ScanState::Scanning);
        assert!(session.is_armed());

        let outcome = session.run().await;

        assert_eq!(outcome, ScanOutcome::Detected("049000028911".into()));
        assert_eq!(session.state(), ScanState::Idle);
        assert!(!session.is_armed());
        assert!(!session.camera_active());
        assert!(!camera.is_live());
        assert!(!session.decoder_active());
        assert!(!session.sampler_active());
        assert_eq!(engine.frames_seen(), 2);
    }

    #[tokio::test]
    async fn only_the_first_detection_is_acted_upon() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]);
        let mut session = scanning(&camera, &engine, settings()).await;

        let first = session.handle_decode(Some(DecodeOutcome::Symbols(vec!["111".into()])));
        let second = session.handle_decode(Some(DecodeOutcome::Symbols(vec!["222".into()])));

        assert_eq!(first, Some(ScanOutcome::Detected("111".into())));
        assert_eq!(second, None);
        assert_eq!(session.state(), ScanState::Idle);
    }

    #[tokio::test]
    async fn stop_releases_camera_and_decoder_before_returning() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]);
        let mut session = scanning(&camera, &engine, settings()).await;
        assert!(session.camera_active());
        assert!(session.decoder_active());

        assert!(session.stop());

        assert_eq!(session.state(), ScanState::Idle);
        assert!(!session.camera_active());
        assert!(!camera.is_live());
        assert!(!session.decoder_active());
        assert!(!session.sampler_active());
        assert!(!session.stop(), "stopping an idle session is a no-op");
    }

    #[tokio::test]
    async fn run_on_idle_session_reports_stopped() {
        let mut session = ScanSession::new(settings());
        assert_eq!(session.run().await, ScanOutcome::Stopped);
    }

    #[tokio::test]
    async fn camera_failure_returns_to_idle() {
        let camera = ScriptedCamera::new().denying_permission();
        let engine = ScriptedDecoder::new(vec![]);
        let mut session = ScanSession::new(settings());

        let err = session.start("s-1".into(), &camera, Arc::new(engine)).await.unwrap_err();

        assert!(matches!(err, StartError::Camera(_)));
        assert_eq!(session.state(), ScanState::Idle);
        assert!(!session.decoder_active());
    }

    #[tokio::test]
    async fn decoder_failure_releases_the_camera() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]).failing_warm_up("wasm missing");
        let mut session = ScanSession::new(settings());

        let err = session.start("s-1".into(), &camera, Arc::new(engine)).await.unwrap_err();

        assert!(matches!(err, StartError::Decoder(_)));
        assert!(!camera.is_live());
        assert_eq!(session.state(), ScanState::Idle);
    }

    #[tokio::test]
    async fn start_while_scanning_is_busy() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]);
        let mut session = scanning(&camera, &engine, settings()).await;

        let err = session.start("s-2".into(), &camera, Arc::new(engine.clone())).await;
        assert!(matches!(err, Err(StartError::Busy)));
        assert_eq!(session.state(), ScanState::Scanning);
    }

    #[tokio::test(start_paused = true)]
    async fn decode_errors_do_not_end_an_unbounded_session() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![
            ScriptedDecode::Fail("glare".into()),
            ScriptedDecode::Fail("glare".into()),
            ScriptedDecode::Fail("glare".into()),
            ScriptedDecode::Symbols(vec!["4006381333931".into()]),
        ]);
        let mut session = scanning(&camera, &engine, settings()).await;

        assert_eq!(session.run().await, ScanOutcome::Detected("4006381333931".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_limit_ends_the_session() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![
            ScriptedDecode::Fail("glare".into()),
            ScriptedDecode::Nothing,
            ScriptedDecode::Fail("glare".into()),
            ScriptedDecode::Fail("glare".into()),
        ]);
        let limited = ScanSettings { failure_limit: Some(2), ..settings() };
        let mut session = scanning(&camera, &engine, limited).await;

        let outcome = session.run().await;

        assert!(matches!(outcome, ScanOutcome::Failed(ref reason) if reason.contains("2 times")));
        assert_eq!(engine.frames_seen(), 4);
        assert!(!camera.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn streams_without_resolution_are_never_sampled() {
        let camera = ScriptedCamera::new().with_dimensions(0, 0);
        let engine = ScriptedDecoder::new(vec![ScriptedDecode::Symbols(vec!["1".into()])]);
        let mut session = scanning(&camera, &engine, settings()).await;

        let timed_out =
            tokio::time::timeout(Duration::from_secs(2), session.run()).await.is_err();

        assert!(timed_out);
        assert_eq!(engine.frames_seen(), 0);
        assert!(session.stop());
    }

    #[tokio::test]
    async fn dropping_the_session_releases_the_camera() {
        let camera = ScriptedCamera::new();
        let engine = ScriptedDecoder::new(vec![]);
        let session = scanning(&camera, &engine, settings()).await;
        assert!(camera.is_live());

        drop(session);
        assert!(!camera.is_live());
    }
}
