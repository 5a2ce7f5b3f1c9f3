//! Format side-channel facts read straight from header bytes.
//!
//! The decoders expose pixels and dimensions but not the small facts a photo
//! inspector wants next to them: print resolution, compression scheme, whether
//! an ICC profile is embedded, how many frames an animation has, whether the
//! raster is palette-indexed. These live in format-specific header structures,
//! so each format gets a short walker here:
//!
//! | Format | Structures read |
//! |---|---|
//! | PNG | `IHDR` color type, `pHYs` density, `iCCP`, `acTL` frame count |
//! | JPEG | `APP0` JFIF density, `APP2` ICC_PROFILE, `DQT` luminance table, `SOFn` components |
//! | TIFF | IFD0 Compression / Photometric / BitsPerSample / X,YResolution / ICC tag, IFD chain length |
//! | BMP | info header bit count, compression, pixels-per-metre, V5 embedded profile |
//! | GIF | image descriptors (frames), `ICCRGBG1012` application extension |
//!
//! Every walker is best-effort: a truncated or malformed structure stops the
//! walk and whatever was read so far is returned. Probing never fails.

use super::layout::PixelLayout;
use image::ImageFormat;

/// Facts read from the header of one file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideInfo {
    /// Print resolution in dots per inch, `(x, y)`.
    pub dpi: Option<(u32, u32)>,
    /// Raw compression label, lower-case (`"deflate"`, `"tiff_lzw"`, `"jpeg"`, ...).
    pub compression: Option<String>,
    /// Estimated JPEG quality (1–100) recovered from the quantization tables.
    pub jpeg_quality: Option<u8>,
    /// Whether an embedded ICC color profile was found.
    pub has_icc_profile: bool,
    /// Number of frames or pages, when the format records it.
    pub frame_count: Option<u32>,
    /// Layout correction for cases the decoder reports in expanded form
    /// (palette, bilevel, CMYK).
    pub layout_hint: Option<PixelLayout>,
}

/// Probe `data` as `format`. Unsupported formats yield an empty [`SideInfo`].
pub fn probe(format: ImageFormat, data: &[u8]) -> SideInfo {
    match format {
        ImageFormat::Png => probe_png(data),
        ImageFormat::Jpeg => probe_jpeg(data),
        ImageFormat::Tiff => probe_tiff(data),
        ImageFormat::Bmp => probe_bmp(data),
        ImageFormat::Gif => probe_gif(data),
        _ => SideInfo::default(),
    }
}

/// Convert a dots-per-metre density to dots per inch.
fn per_metre_to_dpi(ppm: f64) -> u32 {
    (ppm * 0.0254).round() as u32
}

fn be_u16(data: &[u8], pos: usize) -> Option<u16> {
    data.get(pos..pos + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(data: &[u8], pos: usize) -> Option<u32> {
    data.get(pos..pos + 4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u16(data: &[u8], pos: usize) -> Option<u16> {
    data.get(pos..pos + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

fn le_u32(data: &[u8], pos: usize) -> Option<u32> {
    data.get(pos..pos + 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Walk PNG chunks up to the first `IDAT`.
///
/// Chunk layout: length (u32 BE), type (4 bytes), data, CRC (4 bytes).
fn probe_png(data: &[u8]) -> SideInfo {
    let mut info = SideInfo {
        compression: Some("deflate".to_string()),
        ..SideInfo::default()
    };
    if !data.starts_with(PNG_SIGNATURE) {
        return info;
    }

    let mut pos = PNG_SIGNATURE.len();
    let mut palette = false;
    let mut transparency = false;
    while let Some(len) = be_u32(data, pos) {
        let len = len as usize;
        let Some(kind) = data.get(pos + 4..pos + 8) else {
            break;
        };
        let body_start = pos + 8;
        let Some(body) = data.get(body_start..body_start + len) else {
            break;
        };

        match kind {
            b"IHDR" if body.len() >= 10 => {
                let bit_depth = body[8];
                let color_type = body[9];
                palette = color_type == 3;
                if color_type == 0 && bit_depth == 1 {
                    info.layout_hint = Some(PixelLayout::Bilevel);
                }
            }
            b"tRNS" => transparency = true,
            b"pHYs" if body.len() >= 9 => {
                // unit 1 = metre; unit 0 only states an aspect ratio
                if body[8] == 1 {
                    let x = be_u32(body, 0).unwrap_or(0);
                    let y = be_u32(body, 4).unwrap_or(0);
                    info.dpi = Some((per_metre_to_dpi(x as f64), per_metre_to_dpi(y as f64)));
                }
            }
            b"iCCP" => info.has_icc_profile = true,
            b"acTL" => info.frame_count = be_u32(body, 0),
            b"IDAT" | b"IEND" => break,
            _ => {}
        }

        pos = body_start + len + 4;
    }

    if palette {
        info.layout_hint = Some(if transparency {
            PixelLayout::PaletteAlpha
        } else {
            PixelLayout::Palette
        });
    }
    info
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

const JFIF_HEADER: &[u8] = b"JFIF\0";
const ICC_HEADER: &[u8] = b"ICC_PROFILE\0";

/// Annex K luminance quantization table, the base the common encoders scale
/// by quality. Only the sum is used, so element order does not matter.
const STD_LUMINANCE_TABLE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104,
    113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Walk JPEG marker segments up to start-of-scan.
fn probe_jpeg(data: &[u8]) -> SideInfo {
    let mut info = SideInfo {
        compression: Some("jpeg".to_string()),
        ..SideInfo::default()
    };
    if !data.starts_with(&[0xFF, 0xD8]) {
        return info;
    }

    let mut luminance: Option<Vec<u16>> = None;
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // fill bytes and standalone markers carry no length
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0xD8 || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        let Some(seg_len) = be_u16(data, pos + 2) else {
            break;
        };
        let seg_len = seg_len as usize;
        if seg_len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        let segment = &data[seg_start..seg_end];

        match marker {
            0xE0 if segment.starts_with(JFIF_HEADER) => {
                info.dpi = jfif_density(&segment[JFIF_HEADER.len()..]);
            }
            0xE2 if segment.starts_with(ICC_HEADER) => info.has_icc_profile = true,
            0xDB => {
                if let Some(table) = luminance_table(segment) {
                    luminance = Some(table);
                }
            }
            // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
            0xC0..=0xCF if marker != 0xC4 && marker != 0xC8 && marker != 0xCC => {
                info.layout_hint = match segment.get(5) {
                    Some(1) => Some(PixelLayout::Gray),
                    Some(4) => Some(PixelLayout::Cmyk),
                    _ => None,
                };
            }
            _ => {}
        }

        pos += 2 + seg_len;
    }

    info.jpeg_quality = luminance.as_deref().and_then(estimate_jpeg_quality);
    info
}

/// JFIF density: version (2), units (1), x density (2), y density (2).
fn jfif_density(body: &[u8]) -> Option<(u32, u32)> {
    let units = *body.get(2)?;
    let x = be_u16(body, 3)? as f64;
    let y = be_u16(body, 5)? as f64;
    match units {
        1 => Some((x as u32, y as u32)),
        2 => Some(((x * 2.54).round() as u32, (y * 2.54).round() as u32)),
        _ => None,
    }
}

/// Pull quantization table 0 out of a DQT segment (which may hold several).
fn luminance_table(segment: &[u8]) -> Option<Vec<u16>> {
    let mut pos = 0;
    while pos < segment.len() {
        let pq_tq = segment[pos];
        let precision_16 = pq_tq >> 4 != 0;
        let table_id = pq_tq & 0x0F;
        pos += 1;

        let entry_size = if precision_16 { 2 } else { 1 };
        let body = segment.get(pos..pos + 64 * entry_size)?;
        if table_id == 0 {
            let table = if precision_16 {
                body.chunks_exact(2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
                    .collect()
            } else {
                body.iter().map(|&b| u16::from(b)).collect()
            };
            return Some(table);
        }
        pos += 64 * entry_size;
    }
    None
}

/// Invert the libjpeg quality scaling for a luminance table.
///
/// Encoders derive each entry as `(std * scale + 50) / 100` where
/// `scale = 5000 / q` below quality 50 and `200 - 2q` above it. Comparing the
/// table sum to the standard table sum recovers `scale`, and from it `q`.
pub fn estimate_jpeg_quality(table: &[u16]) -> Option<u8> {
    if table.len() != 64 {
        return None;
    }
    let sum: f64 = table.iter().map(|&v| f64::from(v)).sum();
    let std_sum: f64 = STD_LUMINANCE_TABLE.iter().map(|&v| f64::from(v)).sum();
    let scale = sum * 100.0 / std_sum;
    if scale <= 0.0 {
        return None;
    }
    let quality = if scale <= 100.0 {
        (200.0 - scale) / 2.0
    } else {
        5000.0 / scale
    };
    Some(quality.round().clamp(1.0, 100.0) as u8)
}

// ---------------------------------------------------------------------------
// TIFF
// ---------------------------------------------------------------------------

const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_X_RESOLUTION: u16 = 282;
const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TAG_ICC_PROFILE: u16 = 34675;

const MAX_TIFF_PAGES: u32 = 4096;

/// Byte-order aware, bounds-checked reads over a TIFF file.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl TiffReader<'_> {
    fn u16(&self, pos: usize) -> Option<u16> {
        if self.big_endian {
            be_u16(self.data, pos)
        } else {
            le_u16(self.data, pos)
        }
    }

    fn u32(&self, pos: usize) -> Option<u32> {
        if self.big_endian {
            be_u32(self.data, pos)
        } else {
            le_u32(self.data, pos)
        }
    }

    /// First value of a SHORT or LONG entry stored inline.
    fn inline_uint(&self, entry: usize) -> Option<u32> {
        match self.u16(entry + 2)? {
            3 => self.u16(entry + 8).map(u32::from),
            4 => self.u32(entry + 8),
            _ => None,
        }
    }

    /// A RATIONAL entry's value, read through its offset.
    fn rational(&self, entry: usize) -> Option<f64> {
        if self.u16(entry + 2)? != 5 {
            return None;
        }
        let offset = self.u32(entry + 8)? as usize;
        let num = self.u32(offset)?;
        let den = self.u32(offset + 4)?;
        (den != 0).then(|| f64::from(num) / f64::from(den))
    }
}

/// TIFF compression scheme number → label.
pub fn tiff_compression_label(code: u32) -> String {
    let label = match code {
        1 => "raw",
        2 => "tiff_ccitt",
        3 => "group3",
        4 => "group4",
        5 => "tiff_lzw",
        6 => "tiff_jpeg",
        7 => "jpeg",
        8 => "tiff_adobe_deflate",
        32771 => "tiff_raw_16",
        32773 => "packbits",
        32809 => "tiff_thunderscan",
        32946 => "tiff_deflate",
        34676 => "tiff_sgilog",
        34677 => "tiff_sgilog24",
        34925 => "lzma",
        50000 => "zstd",
        50001 => "webp",
        other => return other.to_string(),
    };
    label.to_string()
}

fn probe_tiff(data: &[u8]) -> SideInfo {
    let mut info = SideInfo::default();
    let big_endian = match data.get(0..2) {
        Some(b"MM") => true,
        Some(b"II") => false,
        _ => return info,
    };
    let reader = TiffReader { data, big_endian };
    if reader.u16(2) != Some(42) {
        return info;
    }
    let Some(ifd0) = reader.u32(4).map(|o| o as usize) else {
        return info;
    };

    let mut x_res = None;
    let mut y_res = None;
    let mut unit = None;
    let mut photometric = None;
    let mut bits = None;

    if let Some(count) = reader.u16(ifd0) {
        for i in 0..count as usize {
            let entry = ifd0 + 2 + i * 12;
            let Some(tag) = reader.u16(entry) else {
                break;
            };
            match tag {
                TAG_COMPRESSION => {
                    info.compression = reader.inline_uint(entry).map(tiff_compression_label);
                }
                TAG_PHOTOMETRIC => photometric = reader.inline_uint(entry),
                TAG_BITS_PER_SAMPLE => bits = reader.inline_uint(entry),
                TAG_X_RESOLUTION => x_res = reader.rational(entry),
                TAG_Y_RESOLUTION => y_res = reader.rational(entry),
                TAG_RESOLUTION_UNIT => unit = reader.inline_uint(entry),
                TAG_ICC_PROFILE => info.has_icc_profile = true,
                _ => {}
            }
        }
    }

    // 2 = inch (also the default when absent), 3 = centimetre, 1 = no unit
    let inch_factor = match unit {
        None | Some(2) => Some(1.0),
        Some(3) => Some(2.54),
        _ => None,
    };
    if let (Some(x), Some(y), Some(factor)) = (x_res, y_res, inch_factor) {
        info.dpi = Some(((x * factor).round() as u32, (y * factor).round() as u32));
    }

    info.layout_hint = match (photometric, bits) {
        (Some(0 | 1), Some(1)) => Some(PixelLayout::Bilevel),
        (Some(3), _) => Some(PixelLayout::Palette),
        (Some(5), _) => Some(PixelLayout::Cmyk),
        (Some(6), _) => Some(PixelLayout::YCbCr),
        (Some(8), _) => Some(PixelLayout::Lab),
        _ => None,
    };
    info.frame_count = Some(count_tiff_pages(&reader, ifd0));
    info
}

/// Follow the IFD chain, counting pages. Stops on loops and bad offsets.
fn count_tiff_pages(reader: &TiffReader<'_>, first: usize) -> u32 {
    let mut seen = Vec::new();
    let mut offset = first;
    let mut pages = 0;
    while offset != 0 && pages < MAX_TIFF_PAGES && !seen.contains(&offset) {
        let Some(count) = reader.u16(offset) else {
            break;
        };
        seen.push(offset);
        pages += 1;
        let next_at = offset + 2 + count as usize * 12;
        offset = reader.u32(next_at).unwrap_or(0) as usize;
    }
    pages.max(1)
}

// ---------------------------------------------------------------------------
// BMP
// ---------------------------------------------------------------------------

const BMP_FILE_HEADER_LEN: usize = 14;
/// `LCS_PROFILE_EMBEDDED` ("MBED") in a V5 header's color space type.
const BMP_PROFILE_EMBEDDED: u32 = 0x4D42_4544;

fn bmp_compression_label(code: u32) -> String {
    let label = match code {
        0 => "raw",
        1 => "rle8",
        2 => "rle4",
        3 => "bitfields",
        4 => "jpeg",
        5 => "png",
        6 => "alphabitfields",
        other => return other.to_string(),
    };
    label.to_string()
}

fn probe_bmp(data: &[u8]) -> SideInfo {
    let mut info = SideInfo::default();
    if !data.starts_with(b"BM") {
        return info;
    }
    let h = BMP_FILE_HEADER_LEN;
    let Some(header_len) = le_u32(data, h) else {
        return info;
    };

    // OS/2 core header: 16-bit dimensions, no compression or density
    let bit_count = if header_len == 12 {
        le_u16(data, h + 10)
    } else {
        le_u16(data, h + 14)
    };
    if let Some(bits @ 1..=8) = bit_count {
        info.layout_hint = Some(if bits == 1 {
            PixelLayout::Bilevel
        } else {
            PixelLayout::Palette
        });
    }
    if header_len < 40 {
        return info;
    }

    info.compression = le_u32(data, h + 16).map(bmp_compression_label);
    let x_ppm = le_u32(data, h + 24).unwrap_or(0);
    let y_ppm = le_u32(data, h + 28).unwrap_or(0);
    if x_ppm > 0 && y_ppm > 0 {
        info.dpi = Some((per_metre_to_dpi(x_ppm as f64), per_metre_to_dpi(y_ppm as f64)));
    }
    if header_len >= 124 && le_u32(data, h + 56) == Some(BMP_PROFILE_EMBEDDED) {
        info.has_icc_profile = true;
    }
    info
}

// ---------------------------------------------------------------------------
// GIF
// ---------------------------------------------------------------------------

const GIF_ICC_APPLICATION: &[u8] = b"ICCRGBG1012";

/// Skip a chain of GIF data sub-blocks starting at `pos`; returns the
/// position after the zero-length terminator.
fn skip_sub_blocks(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *data.get(pos)? as usize;
        pos += 1;
        if len == 0 {
            return Some(pos);
        }
        pos += len;
    }
}

fn probe_gif(data: &[u8]) -> SideInfo {
    let mut info = SideInfo {
        compression: Some("lzw".to_string()),
        layout_hint: Some(PixelLayout::Palette),
        ..SideInfo::default()
    };
    if !(data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")) || data.len() < 13 {
        return info;
    }

    let flags = data[10];
    let mut pos = 13;
    if flags & 0x80 != 0 {
        pos += 3 * (1 << ((flags & 0x07) + 1));
    }

    let mut frames = 0u32;
    while let Some(&introducer) = data.get(pos) {
        match introducer {
            0x2C => {
                frames += 1;
                let Some(&local_flags) = data.get(pos + 9) else {
                    break;
                };
                pos += 10;
                if local_flags & 0x80 != 0 {
                    pos += 3 * (1 << ((local_flags & 0x07) + 1));
                }
                // LZW minimum code size, then the image data sub-blocks
                match skip_sub_blocks(data, pos + 1) {
                    Some(next) => pos = next,
                    None => break,
                }
            }
            0x21 => {
                let label = data.get(pos + 1).copied();
                if label == Some(0xFF)
                    && data.get(pos + 2) == Some(&11)
                    && data.get(pos + 3..pos + 14) == Some(GIF_ICC_APPLICATION)
                {
                    info.has_icc_profile = true;
                }
                match skip_sub_blocks(data, pos + 2) {
                    Some(next) => pos = next,
                    None => break,
                }
            }
            _ => break,
        }
    }

    info.frame_count = Some(frames.max(1));
    info
}
