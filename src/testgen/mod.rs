//! Synthetic image fixtures for tests and validation
//!
//! Builds deterministic in-memory images (flat, gradient, noise,
//! checkerboard, block grids) plus JPEG round-trip fixtures, so tests never
//! depend on binary assets on disk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

use crate::core::decoder::{decode_image_bytes, ExifMetadata, ImageData};

/// Wrap raw interleaved RGB8 samples as an `ImageData` fixture.
pub fn from_rgb(width: usize, height: usize, pixels: Vec<u8>) -> ImageData {
    assert_eq!(pixels.len(), width * height * 3, "fixture buffer size mismatch");
    ImageData {
        pixels,
        width,
        height,
        channels: 3,
        format_name: "raw".to_string(),
        raw_bytes: Vec::new(),
        exif: ExifMetadata::default(),
    }
}

/// Uniform gray image, all channels equal to `value`.
pub fn uniform_gray(width: usize, height: usize, value: u8) -> ImageData {
    from_rgb(width, height, vec![value; width * height * 3])
}

/// Horizontal luminance ramp from 0 to 255.
pub fn gradient_image(width: usize, height: usize) -> ImageData {
    let mut pixels = Vec::with_capacity(width * height * 3);
    for _ in 0..height {
        for x in 0..width {
            let v = (x * 255 / width.max(1)) as u8;
            pixels.extend_from_slice(&[v, v, v]);
        }
    }
    from_rgb(width, height, pixels)
}

/// Seeded uniform white-noise image; identical per channel distribution.
pub fn noise_image(width: usize, height: usize, seed: u64) -> ImageData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity(width * height * 3);
    for _ in 0..width * height {
        pixels.push(rng.gen::<u8>());
        pixels.push(rng.gen::<u8>());
        pixels.push(rng.gen::<u8>());
    }
    from_rgb(width, height, pixels)
}

/// Black/white checkerboard with `cell`-pixel squares.
pub fn checkerboard(width: usize, height: usize, cell: usize) -> ImageData {
    let cell = cell.max(1);
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let v = if ((x / cell) + (y / cell)) % 2 == 0 { 0 } else { 255 };
            pixels.extend_from_slice(&[v, v, v]);
        }
    }
    from_rgb(width, height, pixels)
}

/// Grid of flat `block`-sized blocks alternating between `base` and
/// `base + delta` in a checkerboard layout. Every block boundary is a hard
/// luminance step of `delta` — a synthetic blockiness fixture.
pub fn block_grid(width: usize, height: usize, block: usize, delta: u8) -> ImageData {
    let block = block.max(1);
    let base = 100u8;
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let v = if ((x / block) + (y / block)) % 2 == 0 {
                base
            } else {
                base.saturating_add(delta)
            };
            pixels.extend_from_slice(&[v, v, v]);
        }
    }
    from_rgb(width, height, pixels)
}

/// Encode a fixture as JPEG at `quality` and decode it back, yielding an
/// `ImageData` whose format is genuinely "jpeg" (raw bytes included).
pub fn jpeg_roundtrip(image: &ImageData, quality: u8) -> ImageData {
    let mut encoded = Cursor::new(Vec::new());
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, quality);
    encoder
        .encode(
            &image.pixels,
            image.width as u32,
            image.height as u32,
            image::ExtendedColorType::Rgb8,
        )
        .expect("jpeg encoding of a valid fixture cannot fail");

    decode_image_bytes(encoded.get_ref()).expect("jpeg fixture decodes")
}

/// Double-compressed JPEG fixture: quality `q1` then `q2`. Used to exercise
/// recompression-sensitive probes (ELA).
pub fn jpeg_double_compressed(image: &ImageData, q1: u8, q2: u8) -> ImageData {
    let once = jpeg_roundtrip(image, q1);
    jpeg_roundtrip(&once, q2)
}
