use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::color;
use crate::error::MapError;
use crate::observer::GridObserver;

/// Map extents. Width and height wrap toroidally and must be powers of two;
/// depth is at most 64 so a column fits one `u64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapDims {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl MapDims {
    /// The standard 512x512x64 map.
    pub const STANDARD: MapDims = MapDims {
        width: 512,
        height: 512,
        depth: 64,
    };

    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self, MapError> {
        let invalid = |reason| MapError::InvalidDimensions {
            width,
            height,
            depth,
            reason,
        };
        if width <= 0 || height <= 0 || depth <= 0 {
            return Err(invalid("every extent must be positive"));
        }
        if (width & (width - 1)) != 0 || (height & (height - 1)) != 0 {
            return Err(invalid("width and height must be powers of two"));
        }
        if depth > 64 {
            return Err(invalid("depth must not exceed 64"));
        }
        if depth < 3 {
            return Err(invalid("depth must be at least 3"));
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn voxels(&self) -> usize {
        self.columns() * self.depth as usize
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0 && y >= 0 && z >= 0 && x < self.width && y < self.height && z < self.depth
    }

    /// Bit mask with one bit per depth level.
    #[inline]
    pub fn column_mask(&self) -> u64 {
        if self.depth >= 64 {
            u64::MAX
        } else {
            (1u64 << self.depth) - 1
        }
    }
}

impl Default for MapDims {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for MapDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

// Vertical dirt ramp, one entry per 8-layer band boundary (0xRRGGBB).
const DIRT_RAMP: [u32; 9] = [
    0x506050, 0x605848, 0x705040, 0x804838, 0x704030, 0x603828, 0x503020, 0x402818, 0x302010,
];

/// Solid/air bitmap plus one color word per voxel.
///
/// Storage is two flat buffers: `solid` holds one `u64` per `(x, y)` column
/// (bit `z` set means solid), `colors` holds `depth` words per column.
pub struct VoxelGrid {
    dims: MapDims,
    solid: Vec<u64>,
    colors: Vec<u32>,
    jit_state: u32,
    observers: Mutex<Vec<Arc<dyn GridObserver>>>,
}

impl VoxelGrid {
    /// All air.
    pub fn empty(dims: MapDims) -> Self {
        Self {
            dims,
            solid: vec![0; dims.columns()],
            colors: vec![0; dims.voxels()],
            jit_state: 0,
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Blank map: only the bottom layer is solid, colored with dirt.
    pub fn new(dims: MapDims) -> Self {
        Self::with_ground(dims, dims.depth - 1)
    }

    /// Every voxel at or below `ground_level` is solid dirt.
    pub fn with_ground(dims: MapDims, ground_level: i32) -> Self {
        let mut grid = Self::empty(dims);
        let top = ground_level.clamp(0, dims.depth - 1);
        for y in 0..dims.height {
            for x in 0..dims.width {
                for z in top..dims.depth {
                    let c = grid.dirt_color(x, y, z);
                    grid.set_quiet(x, y, z, true, c);
                }
            }
        }
        grid
    }

    #[inline]
    pub fn dims(&self) -> MapDims {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.dims.height
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.dims.depth
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        self.dims.contains(x, y, z)
    }

    #[inline]
    fn column_index(&self, x: i32, y: i32) -> usize {
        y as usize * self.dims.width as usize + x as usize
    }

    #[inline]
    fn voxel_index(&self, x: i32, y: i32, z: i32) -> usize {
        self.column_index(x, y) * self.dims.depth as usize + z as usize
    }

    #[inline]
    fn wrap_x(&self, x: i32) -> i32 {
        x & (self.dims.width - 1)
    }

    #[inline]
    fn wrap_y(&self, y: i32) -> i32 {
        y & (self.dims.height - 1)
    }

    /// Solidity of an in-range voxel.
    #[inline]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        debug_assert!(self.in_bounds(x, y, z), "voxel ({x}, {y}, {z}) out of range");
        (self.solid[self.column_index(x, y)] >> z) & 1 != 0
    }

    pub fn checked_is_solid(&self, x: i32, y: i32, z: i32) -> Result<bool, MapError> {
        if !self.in_bounds(x, y, z) {
            return Err(self.invalid_coordinate(x, y, z));
        }
        Ok(self.is_solid(x, y, z))
    }

    /// x/y wrap around; above the sky is air, below the floor is solid.
    #[inline]
    pub fn is_solid_wrapped(&self, x: i32, y: i32, z: i32) -> bool {
        if z < 0 {
            return false;
        }
        if z >= self.dims.depth {
            return true;
        }
        (self.solid[self.column_index(self.wrap_x(x), self.wrap_y(y))] >> z) & 1 != 0
    }

    #[inline]
    pub fn solid_column(&self, x: i32, y: i32) -> u64 {
        debug_assert!(x >= 0 && y >= 0 && x < self.dims.width && y < self.dims.height);
        self.solid[self.column_index(x, y)]
    }

    #[inline]
    pub fn solid_column_wrapped(&self, x: i32, y: i32) -> u64 {
        self.solid[self.column_index(self.wrap_x(x), self.wrap_y(y))]
    }

    /// Color word of a voxel; only meaningful where the voxel is solid.
    #[inline]
    pub fn color(&self, x: i32, y: i32, z: i32) -> u32 {
        debug_assert!(self.in_bounds(x, y, z), "voxel ({x}, {y}, {z}) out of range");
        self.colors[self.voxel_index(x, y, z)]
    }

    #[inline]
    pub fn color_wrapped(&self, x: i32, y: i32, z: i32) -> u32 {
        let z = z.clamp(0, self.dims.depth - 1);
        self.colors[self.voxel_index(self.wrap_x(x), self.wrap_y(y), z)]
    }

    /// Updates one voxel and notifies observers if anything changed.
    pub fn set(&mut self, x: i32, y: i32, z: i32, solid: bool, color: u32) {
        if self.apply(x, y, z, solid, color) {
            self.notify(x, y, z);
        }
    }

    /// Bulk-load variant of [`set`](Self::set) that never notifies.
    pub fn set_quiet(&mut self, x: i32, y: i32, z: i32, solid: bool, color: u32) {
        self.apply(x, y, z, solid, color);
    }

    /// Replaces a whole column's solidity bits without notifying.
    pub fn set_solid_column_quiet(&mut self, x: i32, y: i32, bits: u64) {
        let ci = self.column_index(x, y);
        self.solid[ci] = bits & self.dims.column_mask();
    }

    fn apply(&mut self, x: i32, y: i32, z: i32, solid: bool, color: u32) -> bool {
        debug_assert!(self.in_bounds(x, y, z), "voxel ({x}, {y}, {z}) out of range");
        let ci = self.column_index(x, y);
        let mask = 1u64 << z;
        let want = if solid { mask } else { 0 };
        let value = self.solid[ci];
        let mut changed = false;
        if value & mask != want {
            self.solid[ci] = (value & !mask) | want;
            changed = true;
        }
        if solid {
            let vi = ci * self.dims.depth as usize + z as usize;
            if self.colors[vi] != color {
                self.colors[vi] = color;
                changed = true;
            }
        }
        changed
    }

    fn notify(&self, x: i32, y: i32, z: i32) {
        let observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer.voxel_changed(x, y, z, self);
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn GridObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Removes an observer by identity. Returns false if it was not registered.
    pub fn remove_observer(&self, observer: &Arc<dyn GridObserver>) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Box collision used by player movement: outside the map horizontally
    /// is solid, above the sky is open, the bottom layer reads as the one
    /// above it and anything deeper is solid.
    pub fn clip_box(&self, x: i32, y: i32, z: i32) -> bool {
        if x < 0 || x >= self.dims.width || y < 0 || y >= self.dims.height {
            return true;
        }
        if z < 0 {
            return false;
        }
        let sz = if z == self.dims.depth - 1 {
            self.dims.depth - 2
        } else if z >= self.dims.depth {
            return true;
        } else {
            z
        };
        self.is_solid(x, y, sz)
    }

    #[inline]
    pub fn clip_box_f(&self, x: f32, y: f32, z: f32) -> bool {
        self.clip_box(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    /// Collision used by projectiles: like [`clip_box`](Self::clip_box) but
    /// leaving the map horizontally is open.
    pub fn clip_world(&self, x: i32, y: i32, z: i32) -> bool {
        if x < 0 || x >= self.dims.width || y < 0 || y >= self.dims.height {
            return false;
        }
        if z < 0 {
            return false;
        }
        let sz = if z == self.dims.depth - 1 {
            self.dims.depth - 2
        } else if z >= self.dims.depth - 1 {
            return true;
        } else {
            z
        };
        self.is_solid(x, y, sz)
    }

    #[inline]
    pub fn clip_world_f(&self, x: f32, y: f32, z: f32) -> bool {
        self.clip_world(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }

    #[inline]
    fn next_random(&mut self) -> u32 {
        self.jit_state = self.jit_state.wrapping_mul(0x1A4E86D).wrapping_add(1);
        self.jit_state
    }

    /// XORs a few low color bits with the grid's LCG; `mask` selects them.
    pub fn color_jit(&mut self, color: u32, mask: u32) -> u32 {
        color ^ (self.next_random() & mask)
    }

    pub fn jit_state(&self) -> u32 {
        self.jit_state
    }

    pub fn set_jit_state(&mut self, state: u32) {
        self.jit_state = state;
    }

    /// Procedural dirt color for a blank map.
    pub fn dirt_color(&mut self, x: i32, y: i32, z: i32) -> u32 {
        let z = z.clamp(0, 63);
        let band = ((z >> 3) as usize).min(DIRT_RAMP.len() - 2);
        let t = z & 7;
        let lo = DIRT_RAMP[band];
        let hi = DIRT_RAMP[band + 1];
        let channel = |shift: u32| {
            let a = ((lo >> shift) & 0xFF) as i32;
            let b = ((hi >> shift) & 0xFF) as i32;
            a + (b - a) * t / 8
        };
        let noise = ((self.next_random() >> 16) & 7) as i32;
        let r = channel(16) + 4 * (x.rem_euclid(8) - 4).abs() + noise;
        let g = channel(8) + 4 * (y.rem_euclid(8) - 4).abs() + noise;
        let b = channel(0) + 4 * ((63 - z).rem_euclid(8) - 4).abs() + noise;
        color::from_rgb(
            r.clamp(0, 255) as u8,
            g.clamp(0, 255) as u8,
            b.clamp(0, 255) as u8,
        )
    }

    /// Solid neighbor-aware surface test used by serialization: solid and
    /// either at z = 0 or with an in-range face neighbor that is air.
    pub fn is_surface(&self, x: i32, y: i32, z: i32) -> bool {
        if !self.is_solid(x, y, z) {
            return false;
        }
        if z == 0 {
            return true;
        }
        (x > 0 && !self.is_solid(x - 1, y, z))
            || (x + 1 < self.dims.width && !self.is_solid(x + 1, y, z))
            || (y > 0 && !self.is_solid(x, y - 1, z))
            || (y + 1 < self.dims.height && !self.is_solid(x, y + 1, z))
            || !self.is_solid(x, y, z - 1)
            || (z + 1 < self.dims.depth && !self.is_solid(x, y, z + 1))
    }

    pub fn solid_count(&self) -> usize {
        self.solid.iter().map(|c| c.count_ones() as usize).sum()
    }

    fn invalid_coordinate(&self, x: i32, y: i32, z: i32) -> MapError {
        MapError::InvalidCoordinate {
            x,
            y,
            z,
            width: self.dims.width,
            height: self.dims.height,
            depth: self.dims.depth,
        }
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new(MapDims::STANDARD)
    }
}

/// Copies voxel data and PRNG state; observers are not carried over.
impl Clone for VoxelGrid {
    fn clone(&self) -> Self {
        Self {
            dims: self.dims,
            solid: self.solid.clone(),
            colors: self.colors.clone(),
            jit_state: self.jit_state,
            observers: Mutex::new(Vec::new()),
        }
    }
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("dims", &self.dims)
            .field("solid_voxels", &self.solid_count())
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small() -> MapDims {
        MapDims::new(16, 16, 16).unwrap()
    }

    struct Counter(AtomicUsize);

    impl GridObserver for Counter {
        fn voxel_changed(&self, _x: i32, _y: i32, _z: i32, _grid: &VoxelGrid) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dims_validation() {
        assert!(MapDims::new(512, 512, 64).is_ok());
        assert!(MapDims::new(500, 512, 64).is_err());
        assert!(MapDims::new(512, 512, 65).is_err());
        assert!(MapDims::new(0, 512, 64).is_err());
    }

    #[test]
    fn set_notifies_only_on_change() {
        let mut g = VoxelGrid::empty(small());
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        g.add_observer(counter.clone());
        g.set(1, 2, 3, true, 0x1234);
        g.set(1, 2, 3, true, 0x1234);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        g.set(1, 2, 3, true, 0x4321);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        g.set(1, 2, 3, false, 0);
        g.set(1, 2, 3, false, 0xFFFF);
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
        g.set_quiet(4, 4, 4, true, 1);
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn remove_observer_by_identity() {
        let g = VoxelGrid::empty(small());
        let a: Arc<dyn GridObserver> = Arc::new(Counter(AtomicUsize::new(0)));
        let b: Arc<dyn GridObserver> = Arc::new(Counter(AtomicUsize::new(0)));
        g.add_observer(a.clone());
        g.add_observer(b.clone());
        assert!(g.remove_observer(&a));
        assert!(!g.remove_observer(&a));
        assert_eq!(g.observer_count(), 1);
    }

    #[test]
    fn clip_policies_differ_outside_the_map() {
        let g = VoxelGrid::empty(small());
        assert!(g.clip_box(-1, 0, 0));
        assert!(!g.clip_world(-1, 0, 0));
        assert!(!g.clip_box(0, 0, -1));
        assert!(!g.clip_world(0, 0, -1));
        assert!(g.clip_box(0, 0, 16));
        assert!(g.clip_world(0, 0, 16));
    }

    #[test]
    fn bottom_layer_reads_as_the_one_above() {
        let mut g = VoxelGrid::empty(small());
        g.set(3, 3, 15, true, 1);
        assert!(!g.clip_box(3, 3, 15));
        assert!(!g.clip_world(3, 3, 15));
        g.set(3, 3, 14, true, 1);
        assert!(g.clip_box(3, 3, 15));
        assert!(g.clip_world(3, 3, 15));
    }

    #[test]
    fn color_jit_uses_the_documented_lcg() {
        let mut g = VoxelGrid::empty(small());
        g.set_jit_state(0);
        assert_eq!(g.color_jit(0, 0xFFFF_FFFF), 1);
        assert_eq!(g.color_jit(0, 0xFFFF_FFFF), 0x1A4E86D + 1);
        let c = g.color_jit(0x00FF_FFFF, color::DEFAULT_JIT_MASK);
        assert_eq!(c & !color::DEFAULT_JIT_MASK, 0x00FF_FFFF & !color::DEFAULT_JIT_MASK);
    }

    #[test]
    fn default_map_has_a_solid_floor() {
        let g = VoxelGrid::new(small());
        assert_eq!(g.solid_count(), 16 * 16);
        assert!(g.is_solid(0, 0, 15));
        assert_eq!(color::health(g.color(0, 0, 15)), color::MAX_HEALTH);
    }

    #[test]
    fn checked_access_reports_out_of_range() {
        let g = VoxelGrid::empty(small());
        assert!(matches!(
            g.checked_is_solid(16, 0, 0),
            Err(MapError::InvalidCoordinate { x: 16, .. })
        ));
        assert_eq!(g.checked_is_solid(0, 0, 0), Ok(false));
    }
}
