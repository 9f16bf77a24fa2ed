//! Gaussian pyramid construction for multi-scale analysis

/// One level of the pyramid: a luminance buffer plus its dimensions.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Build a pyramid of progressively half-sized luminance buffers.
///
/// Each level is a 2x2 box-filtered downscale of the previous one.
/// Construction stops early when a dimension would fall below 10 pixels.
/// Always yields at least the original level (level 0).
pub fn gaussian_pyramid(
    buffer: &[u8],
    width: usize,
    height: usize,
    levels: usize,
) -> Vec<PyramidLevel> {
    let mut pyramid = Vec::with_capacity(levels.max(1));
    pyramid.push(PyramidLevel {
        data: buffer.to_vec(),
        width,
        height,
    });

    for _ in 1..levels {
        let prev = match pyramid.last() {
            Some(p) => p,
            None => break,
        };
        let nw = prev.width / 2;
        let nh = prev.height / 2;
        if nw < 10 || nh < 10 {
            break;
        }

        let mut data = Vec::with_capacity(nw * nh);
        for y in 0..nh {
            for x in 0..nw {
                let sy = y * 2;
                let sx = x * 2;
                let sum = prev.data[sy * prev.width + sx] as u32
                    + prev.data[sy * prev.width + sx + 1] as u32
                    + prev.data[(sy + 1) * prev.width + sx] as u32
                    + prev.data[(sy + 1) * prev.width + sx + 1] as u32;
                data.push((sum / 4) as u8);
            }
        }
        pyramid.push(PyramidLevel {
            data,
            width: nw,
            height: nh,
        });
    }

    pyramid
}
