/// Smallest mesh resolution a tile may use.
pub const MIN_RESOLUTION: u32 = 1;

/// Largest mesh resolution a tile may use.
pub const MAX_RESOLUTION: u32 = terrain_config::MAX_RESOLUTION;

/// Height change per unit of brush sample and intensity for the raise/lower modes.
pub const HEIGHT_CHANGE_SCALE: f32 = 10.0;

/// Fraction of the distance to the local average covered per smooth step.
pub const SMOOTH_BLEND_FACTOR: f32 = 0.1;

/// Default edge length of the procedural brush mask.
pub const DEFAULT_BRUSH_MASK_SIZE: u32 = 64;
