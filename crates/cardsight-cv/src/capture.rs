//! Acquisition contract with the external capture collaborator
//!
//! The detection core never captures screens itself; it accepts pre-decoded
//! images. This module owns the failure taxonomy for whatever does the
//! capturing (a browser page, a screen grabber) so the orchestration loop
//! can log and skip a cycle instead of crashing.

use image::DynamicImage;
use thiserror::Error;

use crate::regions::Region;

/// A screenshot could not be taken or decoded
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot capture screenshot: source is not ready or already closed")]
    SourceClosed,
    #[error("failed to take screenshot: {0}")]
    CaptureFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to decode screenshot into an image: {0}")]
    DecodeFailed(#[from] image::ImageError),
}

/// Anything that can produce table screenshots.
///
/// Implementations are expected to be slow and fallible; callers should
/// treat every grab as such and never assume synchronous-fast capture.
pub trait FrameSource {
    fn grab(&mut self) -> Result<DynamicImage, CaptureError>;
}

/// Decode raw screenshot bytes (PNG or JPEG) into an image, surfacing
/// failures as a capture error.
pub fn decode_frame(bytes: &[u8]) -> Result<DynamicImage, CaptureError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Crop an image to `region`, clamped to the image extent
pub fn crop_region(image: &DynamicImage, region: &Region) -> DynamicImage {
    let x = region.x.clamp(0, image.width() as i32) as u32;
    let y = region.y.clamp(0, image.height() as i32) as u32;
    let right = (region.x + region.width).clamp(0, image.width() as i32) as u32;
    let bottom = (region.y + region.height).clamp(0, image.height() as i32) as u32;
    image.crop_imm(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}
