//! Dense voxel terrain: solidity bitmap, color/health words, observers and
//! the ray casters that walk it.
#![forbid(unsafe_code)]

pub mod color;
mod error;
mod grid;
mod line;
mod observer;
mod raycast;

pub use error::MapError;
pub use grid::{MapDims, VoxelGrid};
pub use line::cube_line;
pub use observer::GridObserver;
pub use raycast::RayCastResult;
pub use spades_geom::{IVec3, Vec3};
