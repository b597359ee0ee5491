//! Live camera sources.
//!
//! There is no portable capture API to bind to, so the live camera replays a
//! still image from disk on every capture. That is enough to point the scan
//! pipeline at a photo of a barcode.

use std::path::{Path, PathBuf};

use image::ImageReader;

use crate::error::CameraError;
use crate::ports::camera::{Camera, CameraFuture, CameraStream, Frame};

/// Camera backed by a single image file.
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// Creates a camera that serves the image at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Camera for StillImageCamera {
    fn open(&self) -> CameraFuture<'_> {
        Box::pin(open_still(self.path.clone()))
    }
}

async fn open_still(path: PathBuf) -> Result<Box<dyn CameraStream>, CameraError> {
    let loaded = tokio::task::spawn_blocking(move || load_luma(&path))
        .await
        .map_err(|e| CameraError::Unavailable(format!("image loader panicked: {e}")))??;
    tracing::debug!(width = loaded.width, height = loaded.height, "still image opened");
    Ok(Box::new(StillImageStream { frame: Some(loaded) }))
}

fn load_luma(path: &Path) -> Result<Frame, CameraError> {
    let unavailable = |e: &dyn std::fmt::Display| {
        CameraError::Unavailable(format!("{}: {e}", path.display()))
    };
    let reader = ImageReader::open(path).map_err(|e| unavailable(&e))?;
    let image = reader.decode().map_err(|e| unavailable(&e))?.to_luma8();
    let (width, height) = image.dimensions();
    Frame::new(width, height, image.into_raw())
        .ok_or_else(|| CameraError::Unavailable(format!("{}: bad pixel buffer", path.display())))
}

struct StillImageStream {
    frame: Option<Frame>,
}

impl CameraStream for StillImageStream {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.as_ref().map_or((0, 0), |f| (f.width, f.height))
    }

    fn capture(&mut self) -> Option<Frame> {
        self.frame.clone()
    }

    fn stop(&mut self) {
        self.frame = None;
    }

    fn is_active(&self) -> bool {
        self.frame.is_some()
    }
}

/// Camera for hosts with no capture source configured.
pub struct NoCamera;

impl Camera for NoCamera {
    fn open(&self) -> CameraFuture<'_> {
        let refused: Result<Box<dyn CameraStream>, CameraError> =
            Err(CameraError::Unavailable("no camera source configured".to_string()));
        Box::pin(std::future::ready(refused))
    }
}
