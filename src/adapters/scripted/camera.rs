//! Camera that serves a blank frame of a chosen size.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::CameraError;
use crate::ports::camera::{Camera, CameraFuture, CameraStream, Frame};

/// Scripted camera. Clones share the "device is lit" flag.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    width: u32,
    height: u32,
    deny: bool,
    live: Arc<AtomicBool>,
    opens: Arc<AtomicUsize>,
}

impl Default for ScriptedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCamera {
    /// A 64x8 camera that grants permission.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 64,
            height: 8,
            deny: false,
            live: Arc::new(AtomicBool::new(false)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reports the given resolution; `(0, 0)` simulates a stream that never
    /// negotiates one.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Refuses every `open`.
    #[must_use]
    pub fn denying_permission(mut self) -> Self {
        self.deny = true;
        self
    }

    /// Whether a stream opened from this camera still holds the device.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// How many streams were opened.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl Camera for ScriptedCamera {
    fn open(&self) -> CameraFuture<'_> {
        Box::pin(async move {
            if self.deny {
                return Err(CameraError::PermissionDenied);
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.live.store(true, Ordering::SeqCst);
            let stream: Box<dyn CameraStream> = Box::new(ScriptedStream {
                width: self.width,
                height: self.height,
                live: Arc::clone(&self.live),
                stopped: false,
            });
            Ok(stream)
        })
    }
}

struct ScriptedStream {
    width: u32,
    height: u32,
    live: Arc<AtomicBool>,
    stopped: bool,
}

impl CameraStream for ScriptedStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn capture(&mut self) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        let len = usize::try_from(self.width * self.height).ok()?;
        Frame::new(self.width, self.height, vec![0; len])
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        !self.stopped
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_lights_and_releases_the_device() {
        let camera = ScriptedCamera::new();
        let mut stream = camera.open().await.unwrap();
        assert!(camera.is_live());
        assert_eq!(stream.capture().map(|f| f.data.len()), Some(64 * 8));

        stream.stop();
        assert!(!camera.is_live());
        assert!(!stream.is_active());
        assert!(stream.capture().is_none());
    }

    #[tokio::test]
    async fn denied_camera_never_opens() {
        let camera = ScriptedCamera::new().denying_permission();
        assert!(matches!(camera.open().await, Err(CameraError::PermissionDenied)));
        assert_eq!(camera.opens(), 0);
    }
}
