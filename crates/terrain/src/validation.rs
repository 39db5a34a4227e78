use crate::constants::{MAX_RESOLUTION, MIN_RESOLUTION};
use crate::types::{HeightWrite, VertexRect};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error(
        "Invalid resolution {0}: must be a power of two in [{min}, {max}]",
        min = MIN_RESOLUTION,
        max = MAX_RESOLUTION
    )]
    InvalidResolution(u32),
    #[error("Invalid grid configuration: {0}")]
    InvalidGrid(String),
    #[error("Rectangle {rect:?} does not fit resolution {resolution}")]
    RectOutOfBounds { rect: VertexRect, resolution: u32 },
    #[error("Value count mismatch: expected {expected}, got {got}")]
    ValueCountMismatch { expected: usize, got: usize },
}

/// Check if a resolution is a power of two within the supported range
pub fn is_valid_resolution(resolution: u32) -> bool {
    resolution.is_power_of_two() && (MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution)
}

/// Validate a tile resolution
pub fn validate_resolution(resolution: u32) -> Result<(), ValidationError> {
    if is_valid_resolution(resolution) {
        Ok(())
    } else {
        Err(ValidationError::InvalidResolution(resolution))
    }
}

/// Number of heights in a full buffer at `resolution`: (R+1)²
#[inline]
pub fn buffer_len(resolution: u32) -> usize {
    let side = resolution as usize + 1;
    side * side
}

/// Flat buffer index of vertex (col, row) at `resolution`
#[inline]
pub fn vertex_index(resolution: u32, col: u32, row: u32) -> usize {
    row as usize * (resolution as usize + 1) + col as usize
}

/// Validate a rectangle write against a tile resolution
pub fn validate_write(
    rect: &VertexRect,
    resolution: u32,
    write: &HeightWrite,
) -> Result<(), ValidationError> {
    validate_resolution(resolution)?;
    if !rect.fits(resolution) {
        return Err(ValidationError::RectOutOfBounds {
            rect: *rect,
            resolution,
        });
    }
    if let HeightWrite::Values(values) = write {
        let expected = rect.vertex_count();
        if values.len() != expected {
            return Err(ValidationError::ValueCountMismatch {
                expected,
                got: values.len(),
            });
        }
    }
    Ok(())
}
