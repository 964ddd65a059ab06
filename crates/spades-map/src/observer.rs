use crate::grid::VoxelGrid;

/// Receives one call per net voxel change made through [`VoxelGrid::set`].
///
/// Called on the mutating thread while the grid's observer lock is held, so
/// implementations must not add or remove observers from inside the callback.
pub trait GridObserver: Send + Sync {
    fn voxel_changed(&self, x: i32, y: i32, z: i32, grid: &VoxelGrid);
}
