//! Brush masks and brush parameters
//!
//! The engine only needs a [`BrushSampler`]: a normalized 2-D alpha lookup
//! with mip levels. [`BrushMask`] is the stock implementation, a box-filtered
//! mip chain built either procedurally (round brush with hardness falloff) or
//! from a grayscale bitmap.

use terrain_config::BrushConfig;
use tracing::debug;

use crate::constants::DEFAULT_BRUSH_MASK_SIZE;

/// Source of brush intensity for a normalized brush coordinate
pub trait BrushSampler {
    /// Intensity in [0, 1] at `(u, v)` in [0, 1]², read from mip level `mip`
    fn sample(&self, linear: bool, u: f32, v: f32, mip: u32) -> f32;

    /// Mip level to use when the brush spans `footprint` samples
    fn mip_level_for(&self, linear: bool, footprint: u32) -> u32;
}

/// Parameters for a single paint step
#[derive(Debug, Clone, PartialEq)]
pub struct BrushParams {
    /// Brush diameter in world units
    pub size: f32,
    /// Intensity multiplier
    pub intensity: f32,
    /// Lower instead of raise (change-height mode)
    pub lower: bool,
    /// Target for the set-height mode
    pub target_height: f32,
    /// Threshold for the suppress mode
    pub suppress_threshold: f32,
    /// Bilinear instead of point sampling
    pub linear: bool,
    /// Leave tile boundary vertices untouched
    pub lock_edges: bool,
    /// Restrict the edit to the tile under the cursor (implies `lock_edges`)
    pub paint_in_one_tile: bool,
    /// Resolution to plan and write at; `None` uses each tile's own
    pub resolution: Option<u32>,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self::from_config(&BrushConfig::default())
    }
}

impl BrushParams {
    /// Build parameters from configured brush defaults
    pub fn from_config(config: &BrushConfig) -> Self {
        Self {
            size: config.size,
            intensity: config.intensity,
            lower: false,
            target_height: config.target_height,
            suppress_threshold: config.suppress_threshold,
            linear: config.linear_sampling,
            lock_edges: false,
            paint_in_one_tile: false,
            resolution: None,
        }
    }

    /// Whether boundary vertices must be kept
    #[inline]
    pub fn edges_locked(&self) -> bool {
        self.lock_edges || self.paint_in_one_tile
    }
}

/// One level of a mask's mip chain
#[derive(Debug, Clone)]
struct MaskLevel {
    width: u32,
    height: u32,
    alpha: Vec<f32>,
}

impl MaskLevel {
    #[inline]
    fn texel(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.alpha[(y * self.width + x) as usize]
    }

    fn downsample(&self) -> MaskLevel {
        let width = self.width.div_ceil(2).max(1);
        let height = self.height.div_ceil(2).max(1);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let sx = x * 2;
                let sy = y * 2;
                let sum = self.texel(sx, sy)
                    + self.texel(sx + 1, sy)
                    + self.texel(sx, sy + 1)
                    + self.texel(sx + 1, sy + 1);
                alpha.push(sum * 0.25);
            }
        }
        MaskLevel {
            width,
            height,
            alpha,
        }
    }

    fn sample_point(&self, u: f32, v: f32) -> f32 {
        let x = (u * self.width as f32) as u32;
        let y = (v * self.height as f32) as u32;
        self.texel(x, y)
    }

    fn sample_linear(&self, u: f32, v: f32) -> f32 {
        let fx = (u * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.texel(x0, y0) * (1.0 - tx) + self.texel(x0 + 1, y0) * tx;
        let bottom = self.texel(x0, y0 + 1) * (1.0 - tx) + self.texel(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Mip-mapped alpha mask
#[derive(Debug, Clone)]
pub struct BrushMask {
    levels: Vec<MaskLevel>,
}

impl BrushMask {
    /// Build a mask from row-major alpha values
    ///
    /// Returns None if the dimensions are zero or do not match the data.
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<f32>) -> Option<Self> {
        if width == 0 || height == 0 || alpha.len() != (width * height) as usize {
            return None;
        }
        let alpha = alpha.into_iter().map(|a| a.clamp(0.0, 1.0)).collect();
        let mut levels = vec![MaskLevel {
            width,
            height,
            alpha,
        }];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }
        debug!(
            "BrushMask: {}x{} with {} mip levels",
            width,
            height,
            levels.len()
        );
        Some(Self { levels })
    }

    /// Procedural round brush
    ///
    /// `hardness` is 0.0 (linear falloff to the rim) to 1.0 (hard disc).
    pub fn round(size: u32, hardness: f32) -> Self {
        let size = size.max(1);
        let radius = size as f32 * 0.5;
        let mut alpha = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5) - radius;
                let dy = (y as f32 + 0.5) - radius;
                let distance_normalized = (dx * dx + dy * dy).sqrt() / radius;
                let a = if distance_normalized > 1.0 {
                    0.0
                } else {
                    calculate_hardness_falloff(distance_normalized, hardness)
                };
                alpha.push(a);
            }
        }
        Self::from_alpha(size, size, alpha).unwrap_or_else(Self::solid)
    }

    /// Mask that samples 1.0 everywhere
    pub fn solid() -> Self {
        Self {
            levels: vec![MaskLevel {
                width: 1,
                height: 1,
                alpha: vec![1.0],
            }],
        }
    }

    /// Build a mask from the luminance of an image
    pub fn from_image(image: &image::DynamicImage) -> Option<Self> {
        let luma = image.to_luma32f();
        let (width, height) = luma.dimensions();
        Self::from_alpha(width, height, luma.into_raw())
    }

    /// Number of mip levels
    pub fn mip_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Dimensions of mip level `mip` (clamped to the last level)
    pub fn level_size(&self, mip: u32) -> (u32, u32) {
        let level = self.level(mip);
        (level.width, level.height)
    }

    fn level(&self, mip: u32) -> &MaskLevel {
        let index = (mip as usize).min(self.levels.len() - 1);
        &self.levels[index]
    }
}

impl Default for BrushMask {
    fn default() -> Self {
        Self::round(DEFAULT_BRUSH_MASK_SIZE, 0.0)
    }
}

impl BrushSampler for BrushMask {
    fn sample(&self, linear: bool, u: f32, v: f32, mip: u32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let level = self.level(mip);
        if linear {
            level.sample_linear(u, v)
        } else {
            level.sample_point(u, v)
        }
    }

    fn mip_level_for(&self, linear: bool, footprint: u32) -> u32 {
        // Bilinear filtering tolerates one level coarser than point sampling.
        let required = if linear {
            footprint.div_ceil(2)
        } else {
            footprint
        }
        .max(1);

        let mut mip = 0;
        while let Some(next) = self.levels.get(mip + 1) {
            if next.width.max(next.height) < required {
                break;
            }
            mip += 1;
        }
        mip as u32
    }
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if distance_normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = distance_normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        let hard = if t <= 1.0 { 1.0 } else { 0.0 };
        soft * (1.0 - hardness) + hard * hardness
    }
}
