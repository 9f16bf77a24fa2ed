//! Block extraction and SSIM (Structural Similarity Index)

const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Extract a square `size`x`size` block starting at `(x, y)`.
///
/// Returns `None` when the block would run past the buffer bounds.
pub fn extract_block(
    buffer: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    size: usize,
) -> Option<Vec<u8>> {
    if size == 0 || x + size > width || y + size > height || buffer.len() < width * height {
        return None;
    }

    let mut block = Vec::with_capacity(size * size);
    for row in y..y + size {
        block.extend_from_slice(&buffer[row * width + x..row * width + x + size]);
    }
    Some(block)
}

/// SSIM between two equally-sized blocks.
///
/// Standard single-window formulation with `C1 = (0.01*255)^2` and
/// `C2 = (0.03*255)^2`. Returns 0.0 when the inputs are empty or
/// size-mismatched.
pub fn ssim(block_a: &[u8], block_b: &[u8]) -> f64 {
    if block_a.is_empty() || block_a.len() != block_b.len() {
        return 0.0;
    }

    let n = block_a.len() as f64;
    let mean_a = block_a.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_b = block_b.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut cov = 0.0;
    for (&a, &b) in block_a.iter().zip(block_b) {
        let da = a as f64 - mean_a;
        let db = b as f64 - mean_b;
        var_a += da * da;
        var_b += db * db;
        cov += da * db;
    }
    var_a /= n;
    var_b /= n;
    cov /= n;

    let numerator = (2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2);
    let denominator = (mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2);
    if denominator < 1e-12 {
        return 0.0;
    }

    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssim_identical_blocks() {
        let block = vec![10, 50, 90, 130, 170, 210, 250, 30, 70];
        assert!((ssim(&block, &block) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ssim_flat_equal_blocks() {
        // Two identical constant blocks are perfectly similar
        let a = vec![128u8; 25];
        let b = vec![128u8; 25];
        assert!((ssim(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ssim_opposite_blocks() {
        let a = vec![0u8; 25];
        let b = vec![255u8; 25];
        assert!(ssim(&a, &b) < 0.05);
    }

    #[test]
    fn test_ssim_mismatched_inputs() {
        assert_eq!(ssim(&[1, 2, 3], &[1, 2]), 0.0);
        assert_eq!(ssim(&[], &[]), 0.0);
    }

    #[test]
    fn test_extract_block_bounds() {
        let buf: Vec<u8> = (0..64).collect();
        let block = extract_block(&buf, 8, 8, 2, 3, 3).unwrap();
        assert_eq!(block.len(), 9);
        assert_eq!(block[0], 3 * 8 + 2);
        assert!(extract_block(&buf, 8, 8, 7, 7, 3).is_none());
    }
}
