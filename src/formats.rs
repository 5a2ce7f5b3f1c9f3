//! Format gate — decides whether a path names a supported raster file.
//!
//! The decision is made from the extension alone. No bytes are read and the
//! file does not need to exist, so the gate is safe to call on every entry of
//! a directory listing before any decode work is attempted.
//!
//! | Extension | Decoder |
//! |---|---|
//! | `png` | [`ImageFormat::Png`] |
//! | `jpg`, `jpeg` | [`ImageFormat::Jpeg`] |
//! | `bmp` | [`ImageFormat::Bmp`] |
//! | `tif`, `tiff` | [`ImageFormat::Tiff`] |
//! | `gif` | [`ImageFormat::Gif`] |

use image::ImageFormat;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

const EXTENSION_FORMATS: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
    ("tiff", ImageFormat::Tiff),
    ("tif", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<HashMap<&'static str, ImageFormat>> =
    LazyLock::new(|| EXTENSION_FORMATS.iter().copied().collect());

/// All recognized extensions, lower-case, in table order.
pub fn supported_extensions() -> Vec<&'static str> {
    EXTENSION_FORMATS.iter().map(|(ext, _)| *ext).collect()
}

/// Lower-cased extension of the final path segment, if any.
fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Whether `path` carries one of the supported extensions (any letter case).
///
/// ```
/// use imginfo::formats::is_supported;
/// assert!(is_supported("A.PNG"));
/// assert!(!is_supported("photo.heic"));
/// assert!(!is_supported("noext"));
/// ```
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    format_for_path(path).is_some()
}

/// The decoder format implied by the extension of `path`.
pub fn format_for_path(path: impl AsRef<Path>) -> Option<ImageFormat> {
    let ext = lowercase_extension(path.as_ref())?;
    SUPPORTED_EXTENSIONS.get(ext.as_str()).copied()
}

/// Upper-case display name for a decoder format (`"PNG"`, `"JPEG"`, ...).
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|ext| ext.to_uppercase())
            .unwrap_or_else(|| format!("{other:?}").to_uppercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_extension_accepted_in_any_case() {
        for ext in supported_extensions() {
            assert!(is_supported(format!("image.{ext}")), "{ext}");
            assert!(is_supported(format!("image.{}", ext.to_uppercase())), "{ext}");
        }
        assert!(is_supported("A.PNG"));
        assert!(is_supported("mixed.JpEg"));
    }

    #[test]
    fn unknown_or_missing_extension_rejected() {
        assert!(!is_supported("photo.heic"));
        assert!(!is_supported("photo.webp"));
        assert!(!is_supported("noext"));
        assert!(!is_supported("trailing."));
        assert!(!is_supported(""));
    }

    #[test]
    fn only_final_segment_extension_counts() {
        assert!(!is_supported("album.png/readme"));
        assert!(is_supported("dir.with.dots/shot.tif"));
        assert!(is_supported("archive.tar.gif"));
    }

    #[test]
    fn dotfile_without_extension_rejected() {
        // ".png" is a hidden file named "png" with no extension
        assert!(!is_supported(".png"));
    }

    #[test]
    fn gate_does_not_touch_filesystem() {
        assert!(is_supported("/definitely/not/here/photo.jpg"));
    }

    #[test]
    fn extensions_map_to_decoders() {
        assert_eq!(format_for_path("a.jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path("a.TIF"), Some(ImageFormat::Tiff));
        assert_eq!(format_for_path("a.gif"), Some(ImageFormat::Gif));
        assert_eq!(format_for_path("a.txt"), None);
    }

    #[test]
    fn format_names_are_upper_case() {
        assert_eq!(format_name(ImageFormat::Png), "PNG");
        assert_eq!(format_name(ImageFormat::Jpeg), "JPEG");
        assert_eq!(format_name(ImageFormat::Tiff), "TIFF");
        assert_eq!(format_name(ImageFormat::Bmp), "BMP");
        assert_eq!(format_name(ImageFormat::Gif), "GIF");
    }
}
