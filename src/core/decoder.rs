// src/core/decoder.rs
//
// Image decoding with best-effort metadata extraction.
// Uses the `image` crate for pixels and `kamadak-exif` for metadata.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::core::signal::to_luminance;

/// Decode-surface errors. Converted into null-score analyzer results at the
/// analyzer boundary, never propagated past it.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no se pudo abrir el archivo: {0}")]
    Open(String),
    #[error("formato de imagen no reconocido o datos corruptos: {0}")]
    Undecodable(String),
}

/// Best-effort EXIF metadata. Every field is optional; analyzers must
/// handle partial or absent metadata.
#[derive(Debug, Clone, Default)]
pub struct ExifMetadata {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub datetime_original: Option<String>,
    pub datetime_digitized: Option<String>,
    pub exposure_time: Option<String>,
    pub f_number: Option<String>,
    pub iso: Option<String>,
    /// All decoded fields, keyed by tag name.
    pub fields: BTreeMap<String, String>,
}

impl ExifMetadata {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Container for a decoded image and its metadata.
///
/// Pixels are interleaved RGB8. The raw container bytes are retained for the
/// duration of the request (EXIF parsing, recompression analysis) and
/// dropped with the request, never persisted.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Interleaved samples, `channels` bytes per pixel.
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// Container format name as detected ("jpeg", "png", ...).
    pub format_name: String,
    /// Raw encoded bytes as read from disk or received from the caller.
    pub raw_bytes: Vec<u8>,
    pub exif: ExifMetadata,
}

impl ImageData {
    pub fn is_jpeg(&self) -> bool {
        self.format_name == "jpeg"
    }

    /// BT.709 luminance buffer, one byte per pixel. Empty on invalid input.
    pub fn luminance(&self) -> Vec<u8> {
        to_luminance(&self.pixels, self.width, self.height, self.channels)
    }
}

/// Decode an image file to RGB8 samples plus metadata.
pub fn decode_image(path: &Path) -> Result<ImageData> {
    let bytes = std::fs::read(path)
        .map_err(|e| DecodeError::Open(format!("{}: {}", path.display(), e)))
        .with_context(|| format!("failed to read image file: {}", path.display()))?;
    decode_image_bytes(&bytes)
}

/// Decode an in-memory image buffer to RGB8 samples plus metadata.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<ImageData> {
    let format_name = image::guess_format(bytes)
        .map(|f| format!("{:?}", f).to_lowercase())
        .unwrap_or_else(|_| "unknown".to_string());

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| DecodeError::Undecodable(e.to_string()))
        .context("failed to decode image data")?;

    let rgb = decoded.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    let exif = read_exif_metadata(bytes);

    Ok(ImageData {
        pixels: rgb.into_raw(),
        width,
        height,
        channels: 3,
        format_name,
        raw_bytes: bytes.to_vec(),
        exif,
    })
}

/// Read EXIF metadata from raw container bytes. Best effort: missing or
/// unparseable EXIF yields an empty `ExifMetadata`, never an error.
pub fn read_exif_metadata(bytes: &[u8]) -> ExifMetadata {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return ExifMetadata::default(),
    };

    let mut meta = ExifMetadata::default();
    for field in reader.fields() {
        let tag_name = field.tag.to_string();
        let value = field.display_value().to_string();
        meta.fields.insert(tag_name, value.clone());

        match field.tag {
            exif::Tag::Make => meta.make = Some(trim_exif_string(&value)),
            exif::Tag::Model => meta.model = Some(trim_exif_string(&value)),
            exif::Tag::Software => meta.software = Some(trim_exif_string(&value)),
            exif::Tag::DateTimeOriginal => meta.datetime_original = Some(trim_exif_string(&value)),
            exif::Tag::DateTimeDigitized => {
                meta.datetime_digitized = Some(trim_exif_string(&value))
            }
            exif::Tag::ExposureTime => meta.exposure_time = Some(trim_exif_string(&value)),
            exif::Tag::FNumber => meta.f_number = Some(trim_exif_string(&value)),
            exif::Tag::PhotographicSensitivity => meta.iso = Some(trim_exif_string(&value)),
            _ => {}
        }
    }
    meta
}

fn trim_exif_string(value: &str) -> String {
    value.trim_matches(|c| c == '"' || c == ' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, value: u8) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([value; 3]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png_bytes() {
        let bytes = encode_png(8, 6, 200);
        let data = decode_image_bytes(&bytes).unwrap();
        assert_eq!((data.width, data.height, data.channels), (8, 6, 3));
        assert_eq!(data.format_name, "png");
        assert!(!data.is_jpeg());
        assert!(data.pixels.iter().all(|&p| p == 200));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_luminance_dimensions() {
        let bytes = encode_png(10, 4, 128);
        let data = decode_image_bytes(&bytes).unwrap();
        let lum = data.luminance();
        assert_eq!(lum.len(), 40);
        assert!(lum.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_exif_missing_is_empty() {
        let bytes = encode_png(4, 4, 0);
        let data = decode_image_bytes(&bytes).unwrap();
        assert!(data.exif.is_empty());
    }
}
