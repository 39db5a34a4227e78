//! Height buffer resampling between resolutions

use crate::validation::{buffer_len, vertex_index};

/// Bilinearly resample a full `(from+1)²` buffer to `(to+1)²`
///
/// Corner vertices map onto corner vertices, so a tile keeps its outline.
pub fn resample_heights(heights: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to {
        return heights.to_vec();
    }
    let scale = from as f32 / to as f32;
    let max = from as f32;
    let at = |col: u32, row: u32| heights[vertex_index(from, col.min(from), row.min(from))];

    let mut out = Vec::with_capacity(buffer_len(to));
    for row in 0..=to {
        for col in 0..=to {
            let fx = (col as f32 * scale).min(max);
            let fy = (row as f32 * scale).min(max);
            let x0 = fx.floor() as u32;
            let y0 = fy.floor() as u32;
            let tx = fx - x0 as f32;
            let ty = fy - y0 as f32;

            let bottom = at(x0, y0) * (1.0 - tx) + at(x0 + 1, y0) * tx;
            let top = at(x0, y0 + 1) * (1.0 - tx) + at(x0 + 1, y0 + 1) * tx;
            out.push(bottom * (1.0 - ty) + top * ty);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsample_interpolates() {
        // 2x2 vertices (resolution 1) ramping along x
        let heights = vec![0.0, 4.0, 0.0, 4.0];
        let out = resample_heights(&heights, 1, 4);
        assert_eq!(out.len(), 25);
        assert_eq!(&out[0..5], &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(&out[20..25], &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_downsample_keeps_shared_vertices() {
        let heights: Vec<f32> = (0..25).map(|v| v as f32).collect();
        let out = resample_heights(&heights, 4, 2);
        assert_eq!(out.len(), 9);
        // Vertices at even indices of the fine grid survive exactly
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 2.0);
        assert_eq!(out[2], 4.0);
        assert_eq!(out[8], 24.0);
    }

    #[test]
    fn test_same_resolution_is_copy() {
        let heights = vec![1.0; 9];
        assert_eq!(resample_heights(&heights, 2, 2), heights);
    }
}
