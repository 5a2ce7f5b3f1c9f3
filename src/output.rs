//! CLI output formatting.
//!
//! # Report Layout
//!
//! A report shows the four groupings of a [`MetadataRecord`] as independent
//! sections under a header line naming the file. Field names are printed as
//! they appear in the record so text and JSON output use the same
//! vocabulary:
//!
//! ```text
//! sunset.jpg
//!     Basic
//!         format: JPEG
//!         layout: RGB
//!         size: 4000 x 3000
//!         ...
//!     Advanced
//!         color_space: 24-bit RGB
//!         has_alpha: No
//!         resolution: 72 x 72 DPI
//!         compression: JPEG (Quality: 90)
//!         ...
//!     File
//!         file_name: sunset.jpg
//!         size_bytes: 2,345,678 bytes
//!         size_mib: 2.24 MB
//!         modified: 2024-05-01 18:32:10
//!     EXIF
//!         Make: Canon
//!         ExposureTime: 1/250
//! ```
//!
//! A file that fails to load gets an error state instead of sections:
//!
//! ```text
//! broken.png
//!     ERROR: Failed to decode broken.png: ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::ThumbnailRaster;
use crate::metadata::{FieldValue, Fields, MetadataRecord};
use crate::scan::FileSet;
use chrono::{DateTime, Local};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display name for a path: the file name, or the whole path if it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Group digits in threes: `1234567` → `"1,234,567"`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Epoch seconds as local `YYYY-MM-DD HH:MM:SS`.
fn local_timestamp(secs: f64) -> String {
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("{secs}"),
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "Yes" } else { "No" }
}

/// Render one field value for a text report.
fn format_value(name: &str, value: &FieldValue) -> String {
    match (name, value) {
        ("size_bytes", FieldValue::Integer(n)) => {
            format!("{} bytes", thousands(u64::try_from(*n).unwrap_or(0)))
        }
        ("size_mib", FieldValue::Float(mib)) => format!("{mib:.2} MB"),
        ("created" | "modified" | "accessed", FieldValue::Float(t)) => local_timestamp(*t),
        (_, FieldValue::Integer(n)) => n.to_string(),
        (_, FieldValue::Float(f)) => f.to_string(),
        (_, FieldValue::Text(s)) => s.clone(),
        (_, FieldValue::Bool(b)) => yes_no(*b).to_string(),
        (_, FieldValue::IntegerTuple(values)) => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" x "),
    }
}

fn section(title: &str, fields: Fields, skip: &[&str]) -> Vec<String> {
    let mut lines = vec![format!("{}{}", indent(1), title)];
    for (name, value) in fields {
        if skip.contains(&name) {
            continue;
        }
        lines.push(format!("{}{}: {}", indent(2), name, format_value(name, &value)));
    }
    lines
}

// ============================================================================
// Reports
// ============================================================================

/// Format a full metadata report.
///
/// The absolute path row is only included when `show_path` is set.
pub fn format_report(record: &MetadataRecord, show_path: bool) -> Vec<String> {
    let mut lines = vec![record.file_info.file_name.clone()];
    lines.extend(section("Basic", record.basic.fields(), &[]));
    lines.extend(section("Advanced", record.advanced.fields(), &[]));
    let skip: &[&str] = if show_path { &[] } else { &["path"] };
    lines.extend(section("File", record.file_info.fields(), skip));

    lines.push(format!("{}EXIF", indent(1)));
    if record.tags.is_empty() {
        lines.push(format!("{}No EXIF data available", indent(2)));
    } else {
        for (name, value) in record.tags.iter() {
            lines.push(format!("{}{}: {}", indent(2), name, value));
        }
    }
    lines
}

pub fn print_report(record: &MetadataRecord, show_path: bool) {
    for line in format_report(record, show_path) {
        println!("{}", line);
    }
}

/// Format the error state shown in place of a report.
pub fn format_error(path: &Path, message: &str) -> Vec<String> {
    vec![
        display_name(path),
        format!("{}ERROR: {}", indent(1), message),
    ]
}

pub fn print_error(path: &Path, message: &str) {
    for line in format_error(path, message) {
        println!("{}", line);
    }
}

// ============================================================================
// Listings
// ============================================================================

/// Format a folder listing, one indexed file name per line.
///
/// ```text
/// photos (3 images)
/// 001 a.jpg
/// 002 b.png
/// 003 c.gif
/// ```
pub fn format_file_set(dir: &Path, files: &FileSet) -> Vec<String> {
    let noun = if files.len() == 1 { "image" } else { "images" };
    let mut lines = vec![format!("{} ({} {})", display_name(dir), files.len(), noun)];
    for (i, path) in files.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), display_name(path)));
    }
    lines
}

pub fn print_file_set(dir: &Path, files: &FileSet) {
    for line in format_file_set(dir, files) {
        println!("{}", line);
    }
}

/// Header line for one browsing step: `[2/5] name.png`.
pub fn format_browse_header(position: usize, total: usize, path: &Path) -> String {
    format!("[{}/{}] {}", position + 1, total, display_name(path))
}

// ============================================================================
// Thumbnails
// ============================================================================

/// Format thumbnail geometry.
///
/// ```text
/// sunset.jpg
///     4000 x 3000 -> 200 x 150
/// ```
///
/// A degraded thumbnail is marked so the caller can tell it is the original.
pub fn format_thumbnail(path: &Path, source: (u32, u32), thumb: &ThumbnailRaster) -> Vec<String> {
    let mut detail = format!(
        "{}{} x {} -> {} x {}",
        indent(1),
        source.0,
        source.1,
        thumb.width(),
        thumb.height()
    );
    if thumb.is_degraded() {
        detail.push_str(" (degraded: original size)");
    }
    vec![display_name(path), detail]
}

pub fn print_thumbnail(path: &Path, source: (u32, u32), thumb: &ThumbnailRaster) {
    for line in format_thumbnail(path, source, thumb) {
        println!("{}", line);
    }
}
