//! Camera port for acquiring a live video stream.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Boxed future returned by [`Camera::open`].
pub type CameraFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Box<dyn CameraStream>, CameraError>> + Send + 'a>>;

/// A single still image captured from a stream.
///
/// Pixels are 8-bit luma, row-major, `width * height` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Grayscale pixel buffer.
    pub data: Vec<u8>,
}

impl Frame {
    /// Creates a frame, returning `None` when the buffer does not match the
    /// stated dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
        (data.len() == expected).then_some(Self { width, height, data })
    }
}

/// Acquires camera streams.
pub trait Camera: Send + Sync {
    /// Requests permission and opens a stream.
    ///
    /// # Errors
    ///
    /// Returns an error if permission is denied or no device is available.
    fn open(&self) -> CameraFuture<'_>;
}

/// An open camera stream.
///
/// Implementations must release the device on drop as well as on
/// [`CameraStream::stop`]; a session cancelled while starting only drops
/// the stream.
pub trait CameraStream: Send {
    /// Negotiated resolution; `(0, 0)` until the stream has one.
    fn dimensions(&self) -> (u32, u32);

    /// Grabs the current frame, if the stream is live.
    fn capture(&mut self) -> Option<Frame>;

    /// Stops every track of the stream. Idempotent.
    fn stop(&mut self);

    /// Whether the stream still holds the device.
    fn is_active(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_mismatched_buffer() {
        assert!(Frame::new(2, 2, vec![0; 4]).is_some());
        assert!(Frame::new(2, 2, vec![0; 3]).is_none());
    }
}
