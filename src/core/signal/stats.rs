//! Histogram, entropy and autocorrelation statistics

/// Build a 256-bin histogram over a byte buffer.
pub fn histogram(buffer: &[u8]) -> [u32; 256] {
    let mut bins = [0u32; 256];
    for &b in buffer {
        bins[b as usize] += 1;
    }
    bins
}

/// Shannon entropy in bits over a 256-bin histogram (0..=8 for 8-bit data).
pub fn shannon_entropy_bits(buffer: &[u8]) -> f64 {
    if buffer.is_empty() {
        return 0.0;
    }

    let bins = histogram(buffer);
    let total = buffer.len() as f64;

    bins.iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Normalized Shannon entropy: bits divided by 8, landing in [0, 1].
pub fn histogram_entropy(buffer: &[u8]) -> f64 {
    shannon_entropy_bits(buffer) / 8.0
}

/// Count local maxima in a 256-bin histogram.
///
/// The histogram is smoothed with a 3-bin moving average first; a peak is a
/// bin strictly above both smoothed neighbors and holding at least 0.5% of
/// the total mass. Used by the artifact and frequency heuristics.
pub fn histogram_peaks(buffer: &[u8]) -> usize {
    if buffer.is_empty() {
        return 0;
    }

    let bins = histogram(buffer);
    let mut smoothed = [0.0f64; 256];
    for i in 0..256 {
        let prev = if i > 0 { bins[i - 1] } else { bins[i] };
        let next = if i < 255 { bins[i + 1] } else { bins[i] };
        smoothed[i] = (prev + bins[i] + next) as f64 / 3.0;
    }

    let floor = buffer.len() as f64 * 0.005;
    let mut peaks = 0;
    for i in 1..255 {
        if smoothed[i] > smoothed[i - 1] && smoothed[i] > smoothed[i + 1] && smoothed[i] > floor {
            peaks += 1;
        }
    }
    peaks
}

/// Arithmetic mean of a byte buffer.
pub fn mean(buffer: &[u8]) -> f64 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().map(|&b| b as f64).sum::<f64>() / buffer.len() as f64
}

/// Mean and population standard deviation of a byte buffer.
pub fn mean_stddev(buffer: &[u8]) -> (f64, f64) {
    if buffer.is_empty() {
        return (0.0, 0.0);
    }

    let m = mean(buffer);
    let var = buffer
        .iter()
        .map(|&b| {
            let d = b as f64 - m;
            d * d
        })
        .sum::<f64>()
        / buffer.len() as f64;
    (m, var.sqrt())
}

/// Lag-1 autocorrelation of a series, computed over the zero-mean,
/// unit-variance normalization of the input.
///
/// Returns 0.0 for degenerate input (fewer than 3 points or zero variance).
pub fn lag1_autocorrelation(series: &[f64]) -> f64 {
    if series.len() < 3 {
        return 0.0;
    }

    let n = series.len() as f64;
    let m = series.iter().sum::<f64>() / n;
    let var = series.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / n;
    if var < 1e-12 {
        return 0.0;
    }

    let cov = series
        .windows(2)
        .map(|w| (w[0] - m) * (w[1] - m))
        .sum::<f64>()
        / (n - 1.0);
    cov / var
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_uniform_image() {
        // Single value = zero entropy
        let flat = vec![128u8; 1024];
        assert!(shannon_entropy_bits(&flat) < 1e-9);
        assert!(histogram_entropy(&flat) < 1e-9);
    }

    #[test]
    fn test_entropy_full_range() {
        // Every value equally likely = exactly 8 bits
        let mut buf = Vec::with_capacity(256 * 4);
        for v in 0u16..256 {
            buf.extend_from_slice(&[v as u8; 4]);
        }
        assert!((shannon_entropy_bits(&buf) - 8.0).abs() < 1e-9);
        assert!((histogram_entropy(&buf) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_lag1_autocorrelation_smooth_vs_alternating() {
        // A slow ramp is strongly correlated lag-1
        let ramp: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert!(lag1_autocorrelation(&ramp) > 0.9);

        // Alternating series is anti-correlated
        let alt: Vec<f64> = (0..100)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        assert!(lag1_autocorrelation(&alt) < -0.9);
    }

    #[test]
    fn test_lag1_degenerate() {
        assert_eq!(lag1_autocorrelation(&[1.0, 2.0]), 0.0);
        assert_eq!(lag1_autocorrelation(&[5.0; 50]), 0.0);
    }

    #[test]
    fn test_mean_stddev() {
        let (m, s) = mean_stddev(&[0, 0, 255, 255]);
        assert!((m - 127.5).abs() < 1e-9);
        assert!((s - 127.5).abs() < 1e-9);
    }
}
