//! Pixel layout descriptors and the color-space label table.
//!
//! Layout names follow the short mode strings photo tools commonly print
//! (`"1"`, `"L"`, `"P"`, `"RGB"`, `"RGBA"`, `"CMYK"`, ...). They are what
//! [`MetadataRecord::basic`](crate::metadata::BasicInfo) reports as the layout
//! name and what the color-space table is keyed by.

use image::ExtendedColorType;
use serde::Serialize;
use std::fmt;

/// Channel composition of a decoded raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PixelLayout {
    /// 1-bit black and white.
    Bilevel,
    /// 8-bit (or narrower) grayscale.
    Gray,
    /// 16-bit grayscale.
    Gray16,
    GrayAlpha,
    /// Indexed color through a palette.
    Palette,
    /// Indexed color with a transparency table.
    PaletteAlpha,
    Rgb,
    Rgba,
    Cmyk,
    YCbCr,
    Lab,
    Hsv,
    /// A layout with no dedicated variant; carries its raw name.
    Other { name: String, channels: u8 },
}

impl PixelLayout {
    /// Short layout name, e.g. `"RGB"` or `"P"`.
    pub fn name(&self) -> &str {
        match self {
            PixelLayout::Bilevel => "1",
            PixelLayout::Gray => "L",
            PixelLayout::Gray16 => "I;16",
            PixelLayout::GrayAlpha => "LA",
            PixelLayout::Palette => "P",
            PixelLayout::PaletteAlpha => "PA",
            PixelLayout::Rgb => "RGB",
            PixelLayout::Rgba => "RGBA",
            PixelLayout::Cmyk => "CMYK",
            PixelLayout::YCbCr => "YCbCr",
            PixelLayout::Lab => "LAB",
            PixelLayout::Hsv => "HSV",
            PixelLayout::Other { name, .. } => name,
        }
    }

    /// Number of channels (bands) in this layout.
    pub fn channel_count(&self) -> u8 {
        match self {
            PixelLayout::Bilevel
            | PixelLayout::Gray
            | PixelLayout::Gray16
            | PixelLayout::Palette => 1,
            PixelLayout::GrayAlpha | PixelLayout::PaletteAlpha => 2,
            PixelLayout::Rgb | PixelLayout::YCbCr | PixelLayout::Lab | PixelLayout::Hsv => 3,
            PixelLayout::Rgba | PixelLayout::Cmyk => 4,
            PixelLayout::Other { channels, .. } => *channels,
        }
    }

    /// Whether the layout carries an alpha channel.
    ///
    /// Decided per variant: searching the name for `A` misfires on `"LAB"`.
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelLayout::GrayAlpha | PixelLayout::PaletteAlpha | PixelLayout::Rgba
        )
    }

    /// Map the decoder's native color type onto a layout.
    ///
    /// Indexed images are reported by the decoders as their expanded color
    /// type; [`header_probe`](super::header_probe) corrects those to
    /// [`PixelLayout::Palette`].
    pub fn from_color_type(color: ExtendedColorType) -> Self {
        use ExtendedColorType::*;
        match color {
            L1 => PixelLayout::Bilevel,
            L2 | L4 | L8 => PixelLayout::Gray,
            L16 => PixelLayout::Gray16,
            La1 | La2 | La4 | La8 | La16 => PixelLayout::GrayAlpha,
            Rgb1 | Rgb2 | Rgb4 | Rgb8 | Rgb16 | Bgr8 | Rgb32F => PixelLayout::Rgb,
            Rgba1 | Rgba2 | Rgba4 | Rgba8 | Rgba16 | Bgra8 | Rgba32F => PixelLayout::Rgba,
            Cmyk8 => PixelLayout::Cmyk,
            A8 => PixelLayout::Other {
                name: "A".to_string(),
                channels: 1,
            },
            Unknown(bits) => PixelLayout::Other {
                name: format!("Unknown({bits}-bit)"),
                channels: 1,
            },
            other => PixelLayout::Other {
                name: format!("{other:?}"),
                channels: other.channel_count(),
            },
        }
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const COLOR_SPACE_LABELS: &[(&str, &str)] = &[
    ("1", "1-bit Monochrome"),
    ("L", "8-bit Grayscale"),
    ("P", "8-bit Palette"),
    ("RGB", "24-bit RGB"),
    ("RGBA", "32-bit RGBA"),
    ("CMYK", "32-bit CMYK"),
    ("YCbCr", "YCbCr"),
    ("LAB", "LAB"),
    ("HSV", "HSV"),
];

/// Human-readable color-space label for a layout name.
///
/// Unknown names pass through unchanged.
pub fn color_space_label(layout_name: &str) -> String {
    COLOR_SPACE_LABELS
        .iter()
        .find(|(name, _)| *name == layout_name)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| layout_name.to_string())
}

/// Bits per pixel, assuming 8 bits per channel for every layout.
///
/// This over-reports 1-bit and under-reports 16-bit rasters; it is kept as
/// a coarse figure rather than a decoded bit depth.
pub fn bits_per_pixel(layout: &PixelLayout) -> u32 {
    u32::from(layout.channel_count()) * 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_space_table_lookups() {
        assert_eq!(color_space_label("1"), "1-bit Monochrome");
        assert_eq!(color_space_label("L"), "8-bit Grayscale");
        assert_eq!(color_space_label("P"), "8-bit Palette");
        assert_eq!(color_space_label("RGB"), "24-bit RGB");
        assert_eq!(color_space_label("RGBA"), "32-bit RGBA");
        assert_eq!(color_space_label("CMYK"), "32-bit CMYK");
        assert_eq!(color_space_label("YCbCr"), "YCbCr");
        assert_eq!(color_space_label("LAB"), "LAB");
        assert_eq!(color_space_label("HSV"), "HSV");
    }

    #[test]
    fn unknown_layout_passes_through() {
        assert_eq!(color_space_label("LA"), "LA");
        assert_eq!(color_space_label("I;16"), "I;16");
    }

    #[test]
    fn bits_per_pixel_is_channels_times_eight() {
        assert_eq!(bits_per_pixel(&PixelLayout::Rgb), 24);
        assert_eq!(bits_per_pixel(&PixelLayout::Rgba), 32);
        assert_eq!(bits_per_pixel(&PixelLayout::Palette), 8);
        // coarse on purpose: 1-bit still reports 8, 16-bit gray still reports 8
        assert_eq!(bits_per_pixel(&PixelLayout::Bilevel), 8);
        assert_eq!(bits_per_pixel(&PixelLayout::Gray16), 8);
    }

    #[test]
    fn alpha_detection() {
        assert!(PixelLayout::Rgba.has_alpha());
        assert!(PixelLayout::GrayAlpha.has_alpha());
        assert!(PixelLayout::PaletteAlpha.has_alpha());
        assert!(!PixelLayout::Rgb.has_alpha());
        assert!(!PixelLayout::Lab.has_alpha());
        assert!(!PixelLayout::Cmyk.has_alpha());
    }

    #[test]
    fn decoder_color_types_map_to_layouts() {
        assert_eq!(PixelLayout::from_color_type(ExtendedColorType::L1), PixelLayout::Bilevel);
        assert_eq!(PixelLayout::from_color_type(ExtendedColorType::L8), PixelLayout::Gray);
        assert_eq!(PixelLayout::from_color_type(ExtendedColorType::Rgb8), PixelLayout::Rgb);
        assert_eq!(PixelLayout::from_color_type(ExtendedColorType::Rgba16), PixelLayout::Rgba);
        assert_eq!(PixelLayout::from_color_type(ExtendedColorType::Cmyk8), PixelLayout::Cmyk);
    }

    #[test]
    fn channel_counts() {
        assert_eq!(PixelLayout::Rgb.channel_count(), 3);
        assert_eq!(PixelLayout::Cmyk.channel_count(), 4);
        assert_eq!(PixelLayout::GrayAlpha.channel_count(), 2);
        let other = PixelLayout::Other {
            name: "RGBX".into(),
            channels: 4,
        };
        assert_eq!(other.channel_count(), 4);
        assert_eq!(other.name(), "RGBX");
    }
}
