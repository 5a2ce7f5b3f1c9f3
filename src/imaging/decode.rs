//! Decode step: turn a path into a [`DecodedImage`] handle.
//!
//! [`load`] re-checks everything the caller may already have checked. It
//! looks for the file first, then asks the [format gate](crate::formats),
//! and only then reads bytes. The file is read into memory in one call and
//! the handle is closed before `load` returns, so a [`DecodedImage`] never
//! pins an open file.
//!
//! The content, not the extension, picks the decoder once the gate has
//! accepted the path: a PNG saved as `photo.jpg` decodes as PNG and reports
//! `"PNG"` as its format.

use super::header_probe::{self, SideInfo};
use super::layout::PixelLayout;
use crate::formats;
use crate::tags::{self, TagBlock};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use serde::Serialize;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to decode {path}: {reason}")]
    DecodeFailure { path: PathBuf, reason: String },
}

/// Frame information for formats that can hold more than one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Animation {
    /// Number of frames (GIF, APNG) or pages (TIFF); at least 1.
    pub frame_count: u32,
    pub is_animated: bool,
}

impl Animation {
    fn from_frame_count(count: u32) -> Self {
        let frame_count = count.max(1);
        Self {
            frame_count,
            is_animated: frame_count > 1,
        }
    }
}

/// One decoded raster plus the header facts read alongside it.
///
/// Owned by whoever called [`load`]; it carries no interior mutability and
/// every accessor is a plain read, so extracting metadata from it any number
/// of times gives the same answer.
#[derive(Debug)]
pub struct DecodedImage {
    path: PathBuf,
    format: ImageFormat,
    layout: PixelLayout,
    width: u32,
    height: u32,
    animation: Option<Animation>,
    has_icc_profile: bool,
    side_info: SideInfo,
    tag_block: TagBlock,
    pixels: DynamicImage,
}

impl DecodedImage {
    /// The path this image was loaded from, as given to [`load`].
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoder format chosen from the file content.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Upper-case format name (`"PNG"`, `"JPEG"`, ...).
    pub fn format_name(&self) -> String {
        formats::format_name(self.format)
    }

    pub fn layout(&self) -> &PixelLayout {
        &self.layout
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Frame information, when the format records it.
    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// Whether an ICC profile was found by the decoder or the header probe.
    pub fn has_icc_profile(&self) -> bool {
        self.has_icc_profile
    }

    pub fn side_info(&self) -> &SideInfo {
        &self.side_info
    }

    pub fn tag_block(&self) -> &TagBlock {
        &self.tag_block
    }

    /// Decoded pixels of the first frame.
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

/// Load and decode the image at `path`.
///
/// # Errors
///
/// - [`DecodeError::FileNotFound`] when nothing exists at `path`, whatever
///   its extension.
/// - [`DecodeError::UnsupportedFormat`] when the extension is not supported.
///   No bytes are read in that case.
/// - [`DecodeError::DecodeFailure`] when the bytes cannot be read or parsed.
pub fn load(path: impl AsRef<Path>) -> Result<DecodedImage, DecodeError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DecodeError::FileNotFound(path.to_path_buf()));
    }
    let Some(ext_format) = formats::format_for_path(path) else {
        return Err(DecodeError::UnsupportedFormat(path.to_path_buf()));
    };

    let data = std::fs::read(path).map_err(|e| match e.kind() {
        // removed between the existence check and the read
        ErrorKind::NotFound => DecodeError::FileNotFound(path.to_path_buf()),
        _ => DecodeError::DecodeFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let decoded = decode_bytes(path, ext_format, &data)?;
    info!(
        path = %path.display(),
        format = %decoded.format_name(),
        width = decoded.width,
        height = decoded.height,
        layout = %decoded.layout,
        "decoded image"
    );
    Ok(decoded)
}

/// Decode an in-memory file. `ext_format` is the fallback when the content
/// does not identify itself.
fn decode_bytes(
    path: &Path,
    ext_format: ImageFormat,
    data: &[u8],
) -> Result<DecodedImage, DecodeError> {
    let failure = |reason: String| DecodeError::DecodeFailure {
        path: path.to_path_buf(),
        reason,
    };

    let reader = ImageReader::with_format(Cursor::new(data), ext_format)
        .with_guessed_format()
        .map_err(|e| failure(e.to_string()))?;
    let format = reader.format().unwrap_or(ext_format);

    let mut decoder = reader.into_decoder().map_err(|e| failure(e.to_string()))?;
    let (width, height) = decoder.dimensions();
    let native_color = decoder.original_color_type();
    let decoder_icc = match decoder.icc_profile() {
        Ok(profile) => profile.is_some_and(|p| !p.is_empty()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ICC profile unreadable");
            false
        }
    };
    let pixels = DynamicImage::from_decoder(decoder).map_err(|e| failure(e.to_string()))?;

    let side_info = header_probe::probe(format, data);
    let layout = side_info
        .layout_hint
        .clone()
        .unwrap_or_else(|| PixelLayout::from_color_type(native_color));
    let animation = side_info.frame_count.map(Animation::from_frame_count);
    let has_icc_profile = decoder_icc || side_info.has_icc_profile;
    let tag_block = tags::read_tag_block(format, data);

    Ok(DecodedImage {
        path: path.to_path_buf(),
        format,
        layout,
        width,
        height,
        animation,
        has_icc_profile,
        side_info,
        tag_block,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found_regardless_of_extension() {
        for name in ["missing.png", "missing.heic", "missing"] {
            let result = load(Path::new("/nonexistent/dir").join(name));
            assert!(
                matches!(result, Err(DecodeError::FileNotFound(_))),
                "{name}: {result:?}"
            );
        }
    }

    #[test]
    fn unsupported_extension_rejected_even_with_valid_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("really-a-png.heic");
        write_png(&path, 4, 4);
        assert!(matches!(load(&path), Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn garbage_bytes_are_decode_failure() {
        let tmp = TempDir::new().unwrap();
        for name in ["junk.png", "junk.jpg", "junk.gif", "junk.bmp", "junk.tiff"] {
            let path = tmp.path().join(name);
            std::fs::write(&path, b"definitely not pixels").unwrap();
            let result = load(&path);
            assert!(
                matches!(result, Err(DecodeError::DecodeFailure { .. })),
                "{name}: {result:?}"
            );
        }
    }

    #[test]
    fn empty_file_is_decode_failure() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(load(&path), Err(DecodeError::DecodeFailure { .. })));
    }

    #[test]
    fn directory_with_image_extension_is_decode_failure() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("folder.png");
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(load(&path), Err(DecodeError::DecodeFailure { .. })));
    }

    #[test]
    fn decodes_synthetic_png() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("solid.png");
        write_png(&path, 10, 10);

        let decoded = load(&path).unwrap();
        assert_eq!(decoded.dimensions(), (10, 10));
        assert_eq!(decoded.format(), ImageFormat::Png);
        assert_eq!(decoded.format_name(), "PNG");
        assert_eq!(decoded.layout(), &PixelLayout::Rgb);
        assert_eq!(decoded.animation(), None);
        assert_eq!(decoded.pixels().width(), 10);
        assert_eq!(decoded.path(), path.as_path());
    }

    #[test]
    fn content_decides_decoder_after_gate() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mislabelled.jpg");
        write_png(&path, 6, 3);
        let decoded = load(&path).unwrap();
        assert_eq!(decoded.format(), ImageFormat::Png);
        assert_eq!(decoded.dimensions(), (6, 3));
    }

    #[test]
    fn rgba_png_keeps_alpha_layout() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("alpha.png");
        write_rgba_png(&path, 8, 8);
        assert_eq!(load(&path).unwrap().layout(), &PixelLayout::Rgba);
    }

    #[test]
    fn grayscale_jpeg_is_gray() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gray.jpg");
        write_gray_jpeg(&path, 16, 16);
        let decoded = load(&path).unwrap();
        assert_eq!(decoded.layout(), &PixelLayout::Gray);
        assert_eq!(decoded.format_name(), "JPEG");
    }

    #[test]
    fn gif_is_palette_with_frame_count() {
        let tmp = TempDir::new().unwrap();
        let still = tmp.path().join("still.gif");
        write_gif(&still, 8, 8, 1);
        let decoded = load(&still).unwrap();
        assert_eq!(decoded.layout(), &PixelLayout::Palette);
        assert_eq!(
            decoded.animation(),
            Some(Animation {
                frame_count: 1,
                is_animated: false
            })
        );

        let animated = tmp.path().join("animated.gif");
        write_gif(&animated, 8, 8, 3);
        let decoded = load(&animated).unwrap();
        assert_eq!(
            decoded.animation(),
            Some(Animation {
                frame_count: 3,
                is_animated: true
            })
        );
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn bmp_and_tiff_decode() {
        let tmp = TempDir::new().unwrap();
        let bmp = tmp.path().join("plain.bmp");
        write_bmp(&bmp, 12, 7);
        let decoded = load(&bmp).unwrap();
        assert_eq!(decoded.dimensions(), (12, 7));
        assert_eq!(decoded.format_name(), "BMP");

        let tiff = tmp.path().join("plain.tif");
        write_tiff(&tiff, 9, 5);
        let decoded = load(&tiff).unwrap();
        assert_eq!(decoded.dimensions(), (9, 5));
        assert_eq!(decoded.format_name(), "TIFF");
        assert_eq!(decoded.animation().map(|a| a.frame_count), Some(1));
    }

    #[test]
    fn uppercase_extension_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("SHOUTY.PNG");
        write_png(&path, 3, 3);
        assert!(load(&path).is_ok());
    }
}
