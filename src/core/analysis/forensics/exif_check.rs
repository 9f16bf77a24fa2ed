// src/core/analysis/forensics/exif_check.rs
//
// EXIF consistency probe: camera captures carry a coherent tag set; edited
// or generated images tend to arrive stripped, stamped by editing software,
// or with inconsistent timestamps.

use chrono::NaiveDateTime;

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::decoder::{ExifMetadata, ImageData};
use crate::core::result::{Confidence, ForensicProbeResult, ProbeKind};
use crate::core::signal::clamp01;

/// EXIF datetime format, e.g. "2023:07:14 16:02:11".
const EXIF_DATETIME: &str = "%Y:%m:%d %H:%M:%S";

const TAG_BONUS: f64 = 0.06;
const TIMESTAMP_PENALTY: f64 = 0.15;
const EDITOR_PENALTY: f64 = 0.2;
const GENERATOR_PENALTY: f64 = 0.4;

/// Known editing-software signatures (lowercased substring match).
const EDITOR_SIGNATURES: [&str; 7] = [
    "photoshop",
    "lightroom",
    "gimp",
    "snapseed",
    "affinity",
    "pixelmator",
    "paint.net",
];

/// Known generative-model signatures.
const GENERATOR_SIGNATURES: [&str; 5] = [
    "stable diffusion",
    "midjourney",
    "dall-e",
    "dall·e",
    "firefly",
];

pub fn run(
    image: &ImageData,
    _config: &AnalysisConfig,
    _cancel: &CancelToken,
) -> ForensicProbeResult {
    let exif = &image.exif;
    let mut score = 0.5;

    let key_tags = [
        ("make", exif.make.is_some()),
        ("model", exif.model.is_some()),
        ("dateTimeOriginal", exif.datetime_original.is_some()),
        ("exposureTime", exif.exposure_time.is_some()),
        ("fNumber", exif.f_number.is_some()),
    ];
    let present = key_tags.iter().filter(|(_, p)| *p).count();
    score += present as f64 * TAG_BONUS;

    let timestamp_gap_hours = timestamp_gap_hours(exif);
    let timestamp_inconsistent = timestamp_gap_hours.map(|h| h > 24.0).unwrap_or(false);
    if timestamp_inconsistent {
        score -= TIMESTAMP_PENALTY;
    }

    let software = exif.software.as_deref().unwrap_or("").to_lowercase();
    let editor_match = EDITOR_SIGNATURES.iter().any(|sig| software.contains(sig));
    let generator_match = GENERATOR_SIGNATURES.iter().any(|sig| software.contains(sig));
    if generator_match {
        score -= GENERATOR_PENALTY;
    } else if editor_match {
        score -= EDITOR_PENALTY;
    }

    let confidence = if exif.is_empty() {
        Confidence::Low
    } else if present >= 4 {
        Confidence::High
    } else {
        Confidence::Medium
    };

    let mut result = ForensicProbeResult::new(ProbeKind::Exif, clamp01(score), confidence)
        .with_metric("tagsPresentes", present as f64)
        .with_metric("timestampInconsistente", timestamp_inconsistent)
        .with_metric("softwareEdicion", editor_match)
        .with_metric("softwareGenerativo", generator_match);
    if let Some(gap) = timestamp_gap_hours {
        result = result.with_metric("gapHoras", gap);
    }
    result
}

/// Absolute gap in hours between DateTimeOriginal and DateTimeDigitized.
/// `None` when either timestamp is missing or unparseable.
fn timestamp_gap_hours(exif: &ExifMetadata) -> Option<f64> {
    let original = parse_exif_datetime(exif.datetime_original.as_deref()?)?;
    let digitized = parse_exif_datetime(exif.datetime_digitized.as_deref()?)?;
    let gap = (original - digitized).num_seconds().abs();
    Some(gap as f64 / 3600.0)
}

fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME).ok()
}
