//! Sobel gradient operator

/// Gradient at a single pixel: horizontal/vertical responses, magnitude
/// and orientation angle in radians.
#[derive(Debug, Clone, Copy, Default)]
pub struct SobelGradient {
    pub gx: f64,
    pub gy: f64,
    pub magnitude: f64,
    pub angle: f64,
}

/// Apply the standard 3x3 Sobel kernels at `(x, y)` of a luminance buffer.
///
/// Returns a zero gradient for border pixels and out-of-range coordinates.
pub fn sobel(buffer: &[u8], width: usize, height: usize, x: usize, y: usize) -> SobelGradient {
    if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
        return SobelGradient::default();
    }
    if buffer.len() < width * height {
        return SobelGradient::default();
    }

    let px = |dx: isize, dy: isize| -> f64 {
        let xi = (x as isize + dx) as usize;
        let yi = (y as isize + dy) as usize;
        buffer[yi * width + xi] as f64
    };

    let gx = -px(-1, -1) - 2.0 * px(-1, 0) - px(-1, 1) + px(1, -1) + 2.0 * px(1, 0) + px(1, 1);
    let gy = -px(-1, -1) - 2.0 * px(0, -1) - px(1, -1) + px(-1, 1) + 2.0 * px(0, 1) + px(1, 1);

    let magnitude = (gx * gx + gy * gy).sqrt();
    let angle = gy.atan2(gx);

    SobelGradient {
        gx,
        gy,
        magnitude,
        angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sobel_flat_region() {
        let buf = vec![100u8; 25];
        let g = sobel(&buf, 5, 5, 2, 2);
        assert_eq!(g.magnitude, 0.0);
    }

    #[test]
    fn test_sobel_vertical_edge() {
        // Left half dark, right half bright: strong gx, no gy
        let mut buf = vec![0u8; 25];
        for y in 0..5 {
            for x in 3..5 {
                buf[y * 5 + x] = 200;
            }
        }
        let g = sobel(&buf, 5, 5, 2, 2);
        assert!(g.gx > 0.0);
        assert_eq!(g.gy, 0.0);
        assert!(g.magnitude > 0.0);
    }

    #[test]
    fn test_sobel_border_is_zero() {
        let buf = vec![50u8; 25];
        assert_eq!(sobel(&buf, 5, 5, 0, 2).magnitude, 0.0);
        assert_eq!(sobel(&buf, 5, 5, 4, 2).magnitude, 0.0);
    }
}
