//! Shared test utilities: synthetic images written to disk.
//!
//! Every helper writes a complete, decodable file so tests exercise the real
//! decoders instead of hand-built byte fixtures.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_png(&tmp.path().join("a.png"), 10, 10);
//! write_gif(&tmp.path().join("b.gif"), 8, 8, 3);
//! ```

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{
    DynamicImage, ExtendedColorType, Frame, GrayImage, ImageEncoder, ImageFormat, Rgb, RgbImage,
    Rgba, RgbaImage,
};
use std::fs::File;
use std::path::Path;

/// A gradient so resampling has real content to work on.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

// =========================================================================
// Writers, one per supported format
// =========================================================================

pub fn write_png(path: &Path, width: u32, height: u32) {
    DynamicImage::ImageRgb8(gradient_rgb(width, height))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn write_rgba_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]));
    DynamicImage::ImageRgba8(img)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

pub fn write_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
    let img = gradient_rgb(width, height);
    let file = File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, quality)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

pub fn write_gray_jpeg(path: &Path, width: u32, height: u32) {
    let img = GrayImage::from_fn(width, height, |x, _| image::Luma([(x * 8 % 256) as u8]));
    let file = File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, 85)
        .write_image(img.as_raw(), width, height, ExtendedColorType::L8)
        .unwrap();
}

/// GIF with `frames` frames of alternating solid colors.
pub fn write_gif(path: &Path, width: u32, height: u32, frames: usize) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    let frames = (0..frames).map(|i| {
        let shade = if i % 2 == 0 { 255 } else { 0 };
        Frame::new(RgbaImage::from_pixel(
            width,
            height,
            Rgba([shade, 0, 255 - shade, 255]),
        ))
    });
    encoder.encode_frames(frames).unwrap();
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    DynamicImage::ImageRgb8(gradient_rgb(width, height))
        .save_with_format(path, ImageFormat::Bmp)
        .unwrap();
}

pub fn write_tiff(path: &Path, width: u32, height: u32) {
    DynamicImage::ImageRgb8(gradient_rgb(width, height))
        .save_with_format(path, ImageFormat::Tiff)
        .unwrap();
}

/// Insert a raw `eXIf` chunk holding `tiff_block` right after `IHDR`.
///
/// The CRC is computed so strict decoders accept the file.
pub fn insert_png_exif(path: &Path, tiff_block: &[u8]) {
    let data = std::fs::read(path).unwrap();
    // signature (8) + IHDR chunk (4 len + 4 type + 13 body + 4 crc)
    let split = 8 + 25;
    let mut chunk = (tiff_block.len() as u32).to_be_bytes().to_vec();
    let mut typed = b"eXIf".to_vec();
    typed.extend_from_slice(tiff_block);
    chunk.extend_from_slice(&typed);
    chunk.extend_from_slice(&crc32(&typed).to_be_bytes());

    let mut out = data[..split].to_vec();
    out.extend(chunk);
    out.extend_from_slice(&data[split..]);
    std::fs::write(path, out).unwrap();
}

/// Insert an `APP1` Exif segment holding `tiff_block` after SOI.
pub fn insert_jpeg_exif(path: &Path, tiff_block: &[u8]) {
    let data = std::fs::read(path).unwrap();
    let mut body = b"Exif\0\0".to_vec();
    body.extend_from_slice(tiff_block);
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((body.len() + 2) as u16).to_be_bytes());
    out.extend(body);
    out.extend_from_slice(&data[2..]);
    std::fs::write(path, out).unwrap();
}

/// Little-endian TIFF block with one IFD of ASCII / SHORT entries, suitable
/// as an Exif payload.
pub fn exif_block(ascii: &[(u16, &str)], shorts: &[(u16, u16)]) -> Vec<u8> {
    let count = ascii.len() + shorts.len();
    let ifd_len = 2 + count * 12 + 4;
    let mut strings_at = 8 + ifd_len;

    let mut entries: Vec<(u16, Vec<u8>)> = Vec::new();
    let mut strings = Vec::new();
    for &(tag, text) in ascii {
        let mut value = text.as_bytes().to_vec();
        value.push(0);
        let mut e = tag.to_le_bytes().to_vec();
        e.extend_from_slice(&2u16.to_le_bytes());
        e.extend_from_slice(&(value.len() as u32).to_le_bytes());
        if value.len() <= 4 {
            value.resize(4, 0);
            e.extend_from_slice(&value);
        } else {
            e.extend_from_slice(&(strings_at as u32).to_le_bytes());
            strings_at += value.len();
            strings.extend(value);
        }
        entries.push((tag, e));
    }
    for &(tag, v) in shorts {
        let mut e = tag.to_le_bytes().to_vec();
        e.extend_from_slice(&3u16.to_le_bytes());
        e.extend_from_slice(&1u32.to_le_bytes());
        e.extend_from_slice(&v.to_le_bytes());
        e.extend_from_slice(&[0, 0]);
        entries.push((tag, e));
    }
    // IFD entries must be sorted by tag
    entries.sort_by_key(|(tag, _)| *tag);

    let mut out = b"II".to_vec();
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&(count as u16).to_le_bytes());
    for (_, e) in entries {
        out.extend(e);
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend(strings);
    out
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
