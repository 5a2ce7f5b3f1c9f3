//! # imginfo
//!
//! A read-only inspector for raster image files. Point it at a PNG, JPEG,
//! BMP, TIFF or GIF and it reports what is inside: dimensions and pixel
//! layout, derived facts like color space and compression, the embedded tag
//! block, and what the filesystem knows about the file. It can also produce
//! a reduced-size preview and list the images in a folder for sequential
//! browsing.
//!
//! # Flow
//!
//! ```text
//! path ──▶ formats::is_supported ──▶ imaging::load ──▶ DecodedImage
//!                                                        │
//!                     ┌──────────────────────────────────┤
//!                     ▼                                  ▼
//!       metadata::extract_metadata              imaging::thumbnail
//!              MetadataRecord                     ThumbnailRaster
//!
//! dir ──▶ scan::list_images ──▶ FileSet ──▶ browse::Session
//! ```
//!
//! The gate is cheap and reads no bytes, so callers use it to reject paths
//! before any decode work. `load` checks again on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`formats`] | Format gate: supported extensions, extension → decoder format |
//! | [`imaging`] | Decoding, header facts, pixel layouts, thumbnail fitting and resampling |
//! | [`tags`] | Embedded EXIF / TIFF tag block → name/value dictionary |
//! | [`metadata`] | The four-grouping [`MetadataRecord`](metadata::MetadataRecord) and its extraction |
//! | [`scan`] | Folder enumeration into a [`FileSet`](scan::FileSet) |
//! | [`browse`] | Cursor over a file set with wrap-around stepping and a preview strip |
//! | [`config`] | `imginfo.toml` loading for the command-line tool |
//! | [`output`] | Text formatting of reports and listings for the command-line tool |
//!
//! # Design Decisions
//!
//! ## Errors Are Terminal Only at Decode Time
//!
//! `load` either returns a fully decoded image or one of three errors:
//! the file is missing, its extension is not supported, or its bytes do not
//! decode. Once an image is decoded, extraction does not give up because one
//! fact is missing: every advanced field and every tag is computed on its own
//! and falls back to a default. Only a failing `stat` of the file (it was
//! deleted after loading, say) fails the record as a whole.
//!
//! ## Thumbnails Never Fail
//!
//! A preview pane always has something to draw. If resampling fails, the
//! original raster is returned, flagged as degraded, and a warning is logged.
//!
//! ## Pure-Rust Decoding
//!
//! Pixels come from the `image` crate; tag blocks from `kamadak-exif`. The
//! header facts those crates do not expose (print density, compression
//! scheme, palette-ness, frame counts, JPEG quality) are read by small
//! bounds-checked walkers in [`imaging::header_probe`]. No system libraries
//! are needed.
//!
//! ## Single-Threaded
//!
//! Every operation is synchronous and blocking. A decoded image is owned by
//! its caller and carries no synchronization. The only shared state is
//! immutable lookup tables.

pub mod browse;
pub mod config;
pub mod formats;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod scan;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_helpers;
