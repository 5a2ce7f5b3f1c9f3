//! Metadata extraction: one [`MetadataRecord`] per decoded image.
//!
//! A record has four groupings, always all present:
//!
//! - **basic**: what the decoder reports directly. Format, pixel layout,
//!   dimensions, channel count.
//! - **advanced**: derived facts. Color-space label, bits per pixel, alpha,
//!   animation, print resolution, compression, embedded color profile.
//! - **tags**: the embedded tag dictionary (see [`crate::tags`]). Empty, not
//!   missing, for files without one.
//! - **file_info**: what the filesystem says about the file.
//!
//! ## Failure model
//!
//! Decoding problems are reported by [`load`](crate::imaging::load) and never
//! reach this module. Inside [`extract_metadata`] every advanced and tag field
//! is computed on its own and falls back to a default when its source is
//! missing:
//!
//! | Field | Source | Fallback |
//! |---|---|---|
//! | `resolution` | header density | `"72 x 72 DPI"` |
//! | `compression` | header compression field | `"Unknown"` |
//! | `frame_count` / `is_animated` | frame/page count | `1` / `false` |
//! | `tags` | tag block | empty |
//!
//! Only the `stat` of the file can fail the whole call
//! ([`MetadataError::StatFailure`]).
//!
//! ## Idempotence
//!
//! Extraction reads the [`DecodedImage`] and the filesystem and nothing else.
//! Calling it twice on the same handle with an unchanged file gives equal
//! records.

use crate::imaging::{DecodeError, DecodedImage, layout};
use crate::tags::{self, TagBlock, TagDictionary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

/// Print resolution assumed when the file does not state one.
pub const DEFAULT_DPI: (u32, u32) = (72, 72);

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Cannot stat {path}: {source}")]
    StatFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single typed field value, as rendered by report writers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    IntegerTuple(Vec<i64>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// Ordered `(name, value)` pairs of one grouping.
pub type Fields = Vec<(&'static str, FieldValue)>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub format: String,
    pub layout: String,
    pub size: (u32, u32),
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl BasicInfo {
    pub fn fields(&self) -> Fields {
        vec![
            ("format", self.format.as_str().into()),
            ("layout", self.layout.as_str().into()),
            (
                "size",
                FieldValue::IntegerTuple(vec![i64::from(self.size.0), i64::from(self.size.1)]),
            ),
            ("width", self.width.into()),
            ("height", self.height.into()),
            ("channels", u32::from(self.channels).into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedInfo {
    pub color_space: String,
    pub bits_per_pixel: u32,
    pub has_alpha: bool,
    pub is_animated: bool,
    pub frame_count: u32,
    pub resolution: String,
    pub compression: String,
    pub has_icc_profile: bool,
}

impl AdvancedInfo {
    pub fn fields(&self) -> Fields {
        vec![
            ("color_space", self.color_space.as_str().into()),
            ("bits_per_pixel", self.bits_per_pixel.into()),
            ("has_alpha", self.has_alpha.into()),
            ("is_animated", self.is_animated.into()),
            ("frame_count", self.frame_count.into()),
            ("resolution", self.resolution.as_str().into()),
            ("compression", self.compression.as_str().into()),
            ("has_icc_profile", self.has_icc_profile.into()),
        ]
    }
}

/// Filesystem facts. Timestamps are seconds since the Unix epoch; `None`
/// where the platform does not report that time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    /// Size in MiB, rounded to two decimals.
    pub size_mib: f64,
    pub created: Option<f64>,
    pub modified: Option<f64>,
    pub accessed: Option<f64>,
}

impl FileInfo {
    pub fn fields(&self) -> Fields {
        let mut fields: Fields = vec![
            ("path", self.path.display().to_string().into()),
            ("file_name", self.file_name.as_str().into()),
            ("size_bytes", self.size_bytes.into()),
            ("size_mib", self.size_mib.into()),
        ];
        for (name, time) in [
            ("created", self.created),
            ("modified", self.modified),
            ("accessed", self.accessed),
        ] {
            if let Some(t) = time {
                fields.push((name, t.into()));
            }
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub basic: BasicInfo,
    pub advanced: AdvancedInfo,
    pub tags: TagDictionary,
    pub file_info: FileInfo,
}

/// Build the metadata record for `image`, stat-ing `path` for file facts.
///
/// # Errors
///
/// [`MetadataError::StatFailure`] when `path` cannot be stat-ed (for example
/// it was deleted after loading).
pub fn extract_metadata(
    image: &DecodedImage,
    path: impl AsRef<Path>,
) -> Result<MetadataRecord, MetadataError> {
    let path = path.as_ref();
    let file_info = file_info(path)?;

    if let TagBlock::Unreadable(reason) = image.tag_block() {
        debug!(path = %path.display(), %reason, "tag block unreadable, reporting no tags");
    }

    Ok(MetadataRecord {
        basic: basic_info(image),
        advanced: advanced_info(image),
        tags: tags::tag_dictionary(image.tag_block()),
        file_info,
    })
}

fn basic_info(image: &DecodedImage) -> BasicInfo {
    BasicInfo {
        format: image.format_name(),
        layout: image.layout().name().to_string(),
        size: image.dimensions(),
        width: image.width(),
        height: image.height(),
        channels: image.layout().channel_count(),
    }
}

fn advanced_info(image: &DecodedImage) -> AdvancedInfo {
    let side = image.side_info();
    let layout = image.layout();
    let animation = image.animation();

    AdvancedInfo {
        color_space: layout::color_space_label(layout.name()),
        bits_per_pixel: layout::bits_per_pixel(layout),
        has_alpha: layout.has_alpha(),
        is_animated: animation.is_some_and(|a| a.is_animated),
        frame_count: animation.map_or(1, |a| a.frame_count),
        resolution: resolution_label(side.dpi),
        compression: compression_label(side.compression.as_deref(), side.jpeg_quality),
        has_icc_profile: image.has_icc_profile(),
    }
}

/// `"X x Y DPI"`, defaulting to [`DEFAULT_DPI`].
pub fn resolution_label(dpi: Option<(u32, u32)>) -> String {
    let (x, y) = dpi.unwrap_or_else(|| {
        debug!("no density in header, assuming 72 DPI");
        DEFAULT_DPI
    });
    format!("{x} x {y} DPI")
}

/// Human label for a raw compression name.
///
/// ```
/// # use imginfo::metadata::compression_label;
/// assert_eq!(compression_label(Some("jpeg"), Some(90)), "JPEG (Quality: 90)");
/// assert_eq!(compression_label(Some("tiff_lzw"), None), "Tiff_lzw");
/// assert_eq!(compression_label(None, None), "Unknown");
/// ```
pub fn compression_label(raw: Option<&str>, jpeg_quality: Option<u8>) -> String {
    match raw {
        Some("jpeg") => match jpeg_quality {
            Some(q) => format!("JPEG (Quality: {q})"),
            None => "JPEG (Quality: Unknown)".to_string(),
        },
        Some(label) if !label.is_empty() => capitalize(label),
        _ => "Unknown".to_string(),
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn file_info(path: &Path) -> Result<FileInfo, MetadataError> {
    let stat_failure = |source| MetadataError::StatFailure {
        path: path.to_path_buf(),
        source,
    };
    let meta = fs::metadata(path).map_err(stat_failure)?;
    let absolute = std::path::absolute(path).map_err(stat_failure)?;

    let size_bytes = meta.len();
    Ok(FileInfo {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: absolute,
        size_bytes,
        size_mib: round2(size_bytes as f64 / (1024.0 * 1024.0)),
        created: creation_time(&meta),
        modified: meta.modified().ok().and_then(epoch_seconds),
        accessed: meta.accessed().ok().and_then(epoch_seconds),
    })
}

/// Metadata-change time on Unix, birth time elsewhere.
#[cfg(unix)]
fn creation_time(meta: &fs::Metadata) -> Option<f64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ctime() as f64 + meta.ctime_nsec() as f64 / 1e9)
}

#[cfg(not(unix))]
fn creation_time(meta: &fs::Metadata) -> Option<f64> {
    meta.created().ok().and_then(epoch_seconds)
}

fn epoch_seconds(time: SystemTime) -> Option<f64> {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =========================================================================
// One-shot convenience
// =========================================================================

#[derive(Error, Debug)]
pub enum InspectError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// A loaded image together with its record.
#[derive(Debug)]
pub struct Inspection {
    pub image: DecodedImage,
    pub record: MetadataRecord,
}

/// `load` followed by `extract_metadata` on the same path.
pub fn inspect(path: impl AsRef<Path>) -> Result<Inspection, InspectError> {
    let path = path.as_ref();
    let image = crate::imaging::load(path)?;
    let record = extract_metadata(&image, path)?;
    Ok(Inspection { image, record })
}
