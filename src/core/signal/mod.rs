//! Signal primitives shared by every analyzer
//!
//! Pure, allocation-light functions over raw pixel buffers:
//! - Luminance conversion (BT.709)
//! - Sobel gradients
//! - Histogram / Shannon entropy
//! - Gaussian pyramid construction
//! - Block extraction and SSIM
//! - Autocorrelation and basic statistics
//!
//! These are the only code paths that walk the full pixel buffer, and the
//! single place where range invariants (clamping, NaN fallbacks) are
//! enforced.

mod gradient;
mod pyramid;
mod ssim;
mod stats;

pub use gradient::{sobel, SobelGradient};
pub use pyramid::{gaussian_pyramid, PyramidLevel};
pub use ssim::{extract_block, ssim};
pub use stats::{
    histogram, histogram_entropy, histogram_peaks, lag1_autocorrelation, mean, mean_stddev,
    shannon_entropy_bits,
};

/// Clamp a value to [0, 1]. NaN collapses to the neutral 0.5.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.5;
    }
    x.clamp(0.0, 1.0)
}

/// Clamp a top-level analyzer score to [0, 10]. NaN collapses to 5.0.
pub fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        return 5.0;
    }
    x.clamp(0.0, 10.0)
}

/// Replace a non-finite intermediate value with the neutral 0.5.
pub fn or_neutral(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.5
    }
}

/// Convert interleaved pixel samples to a per-pixel luminance buffer.
///
/// Uses the BT.709 weighting `0.2126 R + 0.7152 G + 0.0722 B`, rounded to a
/// byte. Fails closed: returns an empty buffer when the channel count is
/// below 3 or the sample buffer is shorter than `w * h * channels`.
pub fn to_luminance(pixels: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    if channels < 3 || pixels.len() < width * height * channels {
        return Vec::new();
    }

    let mut lum = Vec::with_capacity(width * height);
    for px in pixels.chunks_exact(channels).take(width * height) {
        let y = 0.2126 * px[0] as f64 + 0.7152 * px[1] as f64 + 0.0722 * px[2] as f64;
        lum.push(y.round().min(255.0) as u8);
    }
    lum
}
