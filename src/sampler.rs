//! Frame sampler: periodic capture from the camera into the decoder.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::decoder::DecoderBoundary;
use crate::error::DecoderError;
use crate::ports::camera::CameraStream;

/// What happened on one sampler tick.
#[derive(Debug)]
pub enum SampleOutcome {
    /// A frame was handed to the decoder.
    Submitted,
    /// The session no longer accepts detections.
    Disarmed,
    /// The stream has not negotiated a resolution yet.
    NoDimensions,
    /// The previous frame has not come back from the decoder.
    Busy,
    /// The stream produced no frame.
    NoFrame,
    /// The decoder refused the frame.
    Failed(DecoderError),
}

/// Fixed-period sampler. At most one frame is in flight; a tick that finds
/// the decoder busy is dropped, never queued.
#[derive(Debug)]
pub struct FrameSampler {
    interval: Interval,
    in_flight: bool,
}

impl FrameSampler {
    /// Starts a sampler whose first tick fires one `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, in_flight: false }
    }

    /// Waits for the next tick. Cancel-safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Captures a frame from `camera` and submits it to `decoder`, if the
    /// session is armed, the stream has a resolution and the decoder is idle.
    pub fn sample(
        &mut self,
        armed: bool,
        camera: &mut dyn CameraStream,
        decoder: &DecoderBoundary,
    ) -> SampleOutcome {
        if !armed {
            return SampleOutcome::Disarmed;
        }
        let (width, height) = camera.dimensions();
        if width == 0 || height == 0 {
            return SampleOutcome::NoDimensions;
        }
        if self.in_flight {
            return SampleOutcome::Busy;
        }
        let Some(frame) = camera.capture() else {
            return SampleOutcome::NoFrame;
        };
        match decoder.submit(frame) {
            Ok(()) => {
                self.in_flight = true;
                SampleOutcome::Submitted
            }
            Err(e) => SampleOutcome::Failed(e),
        }
    }

    /// Marks the in-flight frame as answered.
    pub fn resolve(&mut self) {
        self.in_flight = false;
    }

    /// Whether a submitted frame is still being decoded.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}
