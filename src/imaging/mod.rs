//! Image decoding and preview derivation, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (content-sniffed, pixels decoded eagerly) |
//! | **Header facts** | hand-rolled walkers over PNG / JPEG / TIFF / BMP / GIF headers |
//! | **Thumbnail** | fit-inside-box calculation + Lanczos3 `resize_exact` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`BoundingBox`] describing the preview box
//! - **Layout**: [`PixelLayout`] and the color-space label table
//! - **Header probe**: per-format side-channel facts ([`SideInfo`])
//! - **Decode / Thumbnail**: the operations combining the above

mod calculations;
mod decode;
pub mod header_probe;
pub mod layout;
mod params;
mod thumbnail;

pub use calculations::calculate_fit_dimensions;
pub use decode::{Animation, DecodeError, DecodedImage, load};
pub use header_probe::SideInfo;
pub use layout::PixelLayout;
pub use params::BoundingBox;
pub use thumbnail::{ResampleError, ThumbnailRaster, resample, thumbnail};
