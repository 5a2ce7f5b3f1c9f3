//! Reduced-size previews.
//!
//! [`thumbnail`] never fails: if resampling cannot produce a raster the
//! caller gets the original pixels back, flagged as degraded, and a warning
//! is logged. A preview pane always has something to draw.

use super::calculations::calculate_fit_dimensions;
use super::decode::DecodedImage;
use super::params::BoundingBox;
use image::DynamicImage;
use image::imageops::FilterType;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResampleError {
    #[error("source raster is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },
    #[error("target size {width}x{height} has a zero edge")]
    EmptyTarget { width: u32, height: u32 },
}

/// A preview raster.
#[derive(Debug, Clone)]
pub struct ThumbnailRaster {
    image: DynamicImage,
    degraded: bool,
}

impl ThumbnailRaster {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// True when resampling failed and this is the full-size original.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Produce a preview of `image` that fits inside `bounds`.
///
/// Aspect ratio is preserved and images already inside the box keep their
/// size. The source image is never modified.
pub fn thumbnail(image: &DecodedImage, bounds: BoundingBox) -> ThumbnailRaster {
    let source = image.pixels();
    let target = calculate_fit_dimensions(image.dimensions(), bounds.as_tuple());

    match resample(source, target) {
        Ok(resized) => {
            debug!(
                path = %image.path().display(),
                from = ?image.dimensions(),
                to = ?target,
                "thumbnail"
            );
            ThumbnailRaster {
                image: resized,
                degraded: false,
            }
        }
        Err(e) => {
            warn!(
                path = %image.path().display(),
                error = %e,
                "thumbnail failed, using original"
            );
            ThumbnailRaster {
                image: source.clone(),
                degraded: true,
            }
        }
    }
}

/// Resize `source` to exactly `target` with a Lanczos3 filter.
pub fn resample(source: &DynamicImage, target: (u32, u32)) -> Result<DynamicImage, ResampleError> {
    let (width, height) = (source.width(), source.height());
    if width == 0 || height == 0 {
        return Err(ResampleError::EmptySource { width, height });
    }
    let (tw, th) = target;
    if tw == 0 || th == 0 {
        return Err(ResampleError::EmptyTarget {
            width: tw,
            height: th,
        });
    }
    if (tw, th) == (width, height) {
        return Ok(source.clone());
    }
    Ok(source.resize_exact(tw, th, FilterType::Lanczos3))
}
