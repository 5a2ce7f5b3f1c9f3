//! Embedded tag blocks (EXIF / TIFF IFD0) as a flat name → value dictionary.
//!
//! The block is located and parsed by `kamadak-exif` when the image is
//! loaded ([`read_tag_block`]); turning it into a [`TagDictionary`] happens
//! later, on every metadata extraction, and never fails as a whole. Fields
//! whose values cannot be represented are skipped one by one.
//!
//! Only the primary image's fields are used. Thumbnail IFDs are ignored.
//!
//! ## Names
//!
//! Tag ids are mapped to the names photo tools conventionally print
//! (`Make`, `ExifImageWidth`, `ISOSpeedRatings`, `GPSLatitude`, ...). Ids
//! not in the tables appear under their decimal id, e.g. `"59932"`.
//!
//! ## Values
//!
//! | Stored as | Reported as |
//! |---|---|
//! | ASCII | [`TagValue::Text`] (trailing NULs trimmed) |
//! | UNDEFINED bytes | [`TagValue::Text`], UTF-8 with invalid sequences dropped |
//! | BYTE / SHORT / LONG (signed or not) | [`TagValue::Integer`], or [`TagValue::IntegerTuple`] for several |
//! | RATIONAL / SRATIONAL | [`TagValue::Rational`] |
//! | FLOAT / DOUBLE | [`TagValue::Float`], or text for several |

use exif::{Context, Field, In, Tag, Value};
use image::ImageFormat;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::debug;

/// The raw tag block found at load time.
pub enum TagBlock {
    /// The format has no tag block, or this file carries none.
    Absent,
    /// A block exists but could not be parsed at all.
    Unreadable(String),
    Present(exif::Exif),
}

impl fmt::Debug for TagBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagBlock::Absent => f.write_str("Absent"),
            TagBlock::Unreadable(reason) => f.debug_tuple("Unreadable").field(reason).finish(),
            TagBlock::Present(exif) => f
                .debug_struct("Present")
                .field("fields", &exif.fields().count())
                .finish(),
        }
    }
}

impl TagBlock {
    pub fn is_present(&self) -> bool {
        matches!(self, TagBlock::Present(_))
    }
}

/// Locate and parse the tag block of an in-memory file.
///
/// JPEG (`APP1`), PNG (`eXIf`) and TIFF (IFD0 itself) carry tag blocks;
/// every other format yields [`TagBlock::Absent`]. Individual malformed
/// fields are dropped and logged; the rest of the block is kept. A block
/// whose directory offset cannot be followed comes back present but empty.
pub fn read_tag_block(format: ImageFormat, data: &[u8]) -> TagBlock {
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff) {
        return TagBlock::Absent;
    }

    let parsed = exif::Reader::new()
        .continue_on_error(true)
        .read_from_container(&mut Cursor::new(data))
        .or_else(|e| {
            e.distill_partial_result(|errors| {
                for error in errors {
                    debug!(error = %error, "skipping malformed tag field");
                }
            })
        });

    match parsed {
        Ok(exif) => TagBlock::Present(exif),
        Err(exif::Error::NotFound(_)) => TagBlock::Absent,
        Err(e) => {
            debug!(error = %e, "tag block unreadable");
            TagBlock::Unreadable(e.to_string())
        }
    }
}

/// One side of a rational value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// A decoded tag value. Closed set; see the module table for the mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Integer(i64),
    Float(f64),
    Text(String),
    IntegerTuple(Vec<i64>),
    Rational(Vec<Ratio>),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Integer(v) => write!(f, "{v}"),
            TagValue::Float(v) => write!(f, "{v}"),
            TagValue::Text(s) => f.write_str(s),
            TagValue::IntegerTuple(values) => write!(f, "({})", join(values)),
            TagValue::Rational(values) if values.len() == 1 => write!(f, "{}", values[0]),
            TagValue::Rational(values) => write!(f, "({})", join(values)),
        }
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tag name → value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagDictionary(BTreeMap<String, TagValue>);

impl TagDictionary {
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build the dictionary for a tag block. Absent and unreadable blocks give
/// an empty dictionary.
pub fn tag_dictionary(block: &TagBlock) -> TagDictionary {
    let TagBlock::Present(exif) = block else {
        return TagDictionary::default();
    };

    let mut tags = BTreeMap::new();
    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let name = tag_name(field.tag);
        match decode_field(field) {
            Some(value) => {
                tags.insert(name, value);
            }
            None => debug!(tag = %name, "skipping tag with unrepresentable value"),
        }
    }
    TagDictionary(tags)
}

fn decode_field(field: &Field) -> Option<TagValue> {
    #[allow(unreachable_patterns)]
    let value = match &field.value {
        Value::Ascii(strings) => TagValue::Text(
            strings
                .iter()
                .map(|s| lossy_utf8(s))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Undefined(bytes, _) => TagValue::Text(lossy_utf8(bytes)),
        Value::Byte(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::Short(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::Long(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::SByte(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::SShort(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::SLong(v) => integers(v.iter().map(|&x| i64::from(x)))?,
        Value::Rational(v) if !v.is_empty() => TagValue::Rational(
            v.iter()
                .map(|r| Ratio {
                    num: i64::from(r.num),
                    den: i64::from(r.denom),
                })
                .collect(),
        ),
        Value::SRational(v) if !v.is_empty() => TagValue::Rational(
            v.iter()
                .map(|r| Ratio {
                    num: i64::from(r.num),
                    den: i64::from(r.denom),
                })
                .collect(),
        ),
        Value::Float(v) => floats(v.iter().map(|&x| f64::from(x)))?,
        Value::Double(v) => floats(v.iter().copied())?,
        _ => return None,
    };
    Some(value)
}

fn integers(values: impl Iterator<Item = i64>) -> Option<TagValue> {
    let values: Vec<i64> = values.collect();
    match values.as_slice() {
        [] => None,
        [single] => Some(TagValue::Integer(*single)),
        _ => Some(TagValue::IntegerTuple(values)),
    }
}

fn floats(values: impl Iterator<Item = f64>) -> Option<TagValue> {
    let values: Vec<f64> = values.collect();
    match values.as_slice() {
        [] => None,
        [single] => Some(TagValue::Float(*single)),
        _ => Some(TagValue::Text(join(&values))),
    }
}

/// UTF-8 decode dropping invalid sequences and trailing NULs.
fn lossy_utf8(bytes: &[u8]) -> String {
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim_end_matches('\0').to_string()
}

// =========================================================================
// Name tables
// =========================================================================

/// IFD0 and Exif sub-IFD tags.
const MAIN_TAG_NAMES: &[(u16, &str)] = &[
    (0x00FE, "NewSubfileType"),
    (0x0100, "ImageWidth"),
    (0x0101, "ImageLength"),
    (0x0102, "BitsPerSample"),
    (0x0103, "Compression"),
    (0x0106, "PhotometricInterpretation"),
    (0x010E, "ImageDescription"),
    (0x010F, "Make"),
    (0x0110, "Model"),
    (0x0111, "StripOffsets"),
    (0x0112, "Orientation"),
    (0x0115, "SamplesPerPixel"),
    (0x0116, "RowsPerStrip"),
    (0x0117, "StripByteCounts"),
    (0x011A, "XResolution"),
    (0x011B, "YResolution"),
    (0x011C, "PlanarConfiguration"),
    (0x0128, "ResolutionUnit"),
    (0x012D, "TransferFunction"),
    (0x0131, "Software"),
    (0x0132, "DateTime"),
    (0x013B, "Artist"),
    (0x013C, "HostComputer"),
    (0x013D, "Predictor"),
    (0x013E, "WhitePoint"),
    (0x013F, "PrimaryChromaticities"),
    (0x0140, "ColorMap"),
    (0x0142, "TileWidth"),
    (0x0143, "TileLength"),
    (0x0144, "TileOffsets"),
    (0x0145, "TileByteCounts"),
    (0x0152, "ExtraSamples"),
    (0x0153, "SampleFormat"),
    (0x0201, "JpegIFOffset"),
    (0x0202, "JpegIFByteCount"),
    (0x0211, "YCbCrCoefficients"),
    (0x0212, "YCbCrSubSampling"),
    (0x0213, "YCbCrPositioning"),
    (0x0214, "ReferenceBlackWhite"),
    (0x02BC, "XMLPacket"),
    (0x4746, "Rating"),
    (0x8298, "Copyright"),
    (0x829A, "ExposureTime"),
    (0x829D, "FNumber"),
    (0x8769, "ExifOffset"),
    (0x8773, "InterColorProfile"),
    (0x8822, "ExposureProgram"),
    (0x8824, "SpectralSensitivity"),
    (0x8825, "GPSInfo"),
    (0x8827, "ISOSpeedRatings"),
    (0x8830, "SensitivityType"),
    (0x8832, "RecommendedExposureIndex"),
    (0x9000, "ExifVersion"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (0x9010, "OffsetTime"),
    (0x9011, "OffsetTimeOriginal"),
    (0x9012, "OffsetTimeDigitized"),
    (0x9101, "ComponentsConfiguration"),
    (0x9102, "CompressedBitsPerPixel"),
    (0x9201, "ShutterSpeedValue"),
    (0x9202, "ApertureValue"),
    (0x9203, "BrightnessValue"),
    (0x9204, "ExposureBiasValue"),
    (0x9205, "MaxApertureValue"),
    (0x9206, "SubjectDistance"),
    (0x9207, "MeteringMode"),
    (0x9208, "LightSource"),
    (0x9209, "Flash"),
    (0x920A, "FocalLength"),
    (0x9214, "SubjectArea"),
    (0x927C, "MakerNote"),
    (0x9286, "UserComment"),
    (0x9290, "SubsecTime"),
    (0x9291, "SubsecTimeOriginal"),
    (0x9292, "SubsecTimeDigitized"),
    (0xA000, "FlashPixVersion"),
    (0xA001, "ColorSpace"),
    (0xA002, "ExifImageWidth"),
    (0xA003, "ExifImageHeight"),
    (0xA004, "RelatedSoundFile"),
    (0xA005, "ExifInteroperabilityOffset"),
    (0xA20B, "FlashEnergy"),
    (0xA20E, "FocalPlaneXResolution"),
    (0xA20F, "FocalPlaneYResolution"),
    (0xA210, "FocalPlaneResolutionUnit"),
    (0xA214, "SubjectLocation"),
    (0xA215, "ExposureIndex"),
    (0xA217, "SensingMethod"),
    (0xA300, "FileSource"),
    (0xA301, "SceneType"),
    (0xA302, "CFAPattern"),
    (0xA401, "CustomRendered"),
    (0xA402, "ExposureMode"),
    (0xA403, "WhiteBalance"),
    (0xA404, "DigitalZoomRatio"),
    (0xA405, "FocalLengthIn35mmFilm"),
    (0xA406, "SceneCaptureType"),
    (0xA407, "GainControl"),
    (0xA408, "Contrast"),
    (0xA409, "Saturation"),
    (0xA40A, "Sharpness"),
    (0xA40B, "DeviceSettingDescription"),
    (0xA40C, "SubjectDistanceRange"),
    (0xA420, "ImageUniqueID"),
    (0xA430, "CameraOwnerName"),
    (0xA431, "BodySerialNumber"),
    (0xA432, "LensSpecification"),
    (0xA433, "LensMake"),
    (0xA434, "LensModel"),
    (0xA435, "LensSerialNumber"),
    (0xA500, "Gamma"),
];

const GPS_TAG_NAMES: &[(u16, &str)] = &[
    (0, "GPSVersionID"),
    (1, "GPSLatitudeRef"),
    (2, "GPSLatitude"),
    (3, "GPSLongitudeRef"),
    (4, "GPSLongitude"),
    (5, "GPSAltitudeRef"),
    (6, "GPSAltitude"),
    (7, "GPSTimeStamp"),
    (8, "GPSSatellites"),
    (9, "GPSStatus"),
    (10, "GPSMeasureMode"),
    (11, "GPSDOP"),
    (12, "GPSSpeedRef"),
    (13, "GPSSpeed"),
    (14, "GPSTrackRef"),
    (15, "GPSTrack"),
    (16, "GPSImgDirectionRef"),
    (17, "GPSImgDirection"),
    (18, "GPSMapDatum"),
    (19, "GPSDestLatitudeRef"),
    (20, "GPSDestLatitude"),
    (21, "GPSDestLongitudeRef"),
    (22, "GPSDestLongitude"),
    (23, "GPSDestBearingRef"),
    (24, "GPSDestBearing"),
    (25, "GPSDestDistanceRef"),
    (26, "GPSDestDistance"),
    (27, "GPSProcessingMethod"),
    (28, "GPSAreaInformation"),
    (29, "GPSDateStamp"),
    (30, "GPSDifferential"),
    (31, "GPSHPositioningError"),
];

const INTEROP_TAG_NAMES: &[(u16, &str)] = &[
    (1, "InteroperabilityIndex"),
    (2, "InteroperabilityVersion"),
];

fn table(entries: &'static [(u16, &'static str)]) -> HashMap<u16, &'static str> {
    entries.iter().copied().collect()
}

static MAIN_NAMES: LazyLock<HashMap<u16, &'static str>> =
    LazyLock::new(|| table(MAIN_TAG_NAMES));
static GPS_NAMES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| table(GPS_TAG_NAMES));
static INTEROP_NAMES: LazyLock<HashMap<u16, &'static str>> =
    LazyLock::new(|| table(INTEROP_TAG_NAMES));

/// Human-readable name for a tag, or its decimal id when unnamed.
pub fn tag_name(tag: Tag) -> String {
    let names = match tag.context() {
        Context::Gps => &*GPS_NAMES,
        Context::Interop => &*INTEROP_NAMES,
        _ => &*MAIN_NAMES,
    };
    names
        .get(&tag.number())
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| tag.number().to_string())
}
