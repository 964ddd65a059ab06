use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("voxel ({x}, {y}, {z}) is outside the {width}x{height}x{depth} map")]
    InvalidCoordinate {
        x: i32,
        y: i32,
        z: i32,
        width: i32,
        height: i32,
        depth: i32,
    },
    #[error("invalid map dimensions {width}x{height}x{depth}: {reason}")]
    InvalidDimensions {
        width: i32,
        height: i32,
        depth: i32,
        reason: &'static str,
    },
}
