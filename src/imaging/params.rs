//! Parameter types for preview derivation.
//!
//! - [`BoundingBox`] — the box a thumbnail must fit inside. Defaults to the
//!   200×200 preview pane; [`BoundingBox::STRIP`] is the smaller icon size
//!   used for a browsing strip.

use serde::{Deserialize, Serialize};

/// Maximum width and height a thumbnail may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Icon size for a strip of previews alongside the main view.
    pub const STRIP: BoundingBox = BoundingBox {
        width: 100,
        height: 100,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
        }
    }
}

impl From<(u32, u32)> for BoundingBox {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}
