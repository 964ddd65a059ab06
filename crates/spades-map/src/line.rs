use spades_geom::IVec3;

use crate::grid::{MapDims, VoxelGrid};

// Step length used for an axis the line does not move along. Half of it must
// stay ahead of the 1024-per-cell major axis across the whole map.
fn far_step(dims: MapDims) -> i64 {
    let extent = i64::from(dims.width.max(dims.height).max(dims.depth));
    (0x3fff_ffff / 512).max(extent * 4096)
}

// Legacy bounds check: negative coordinates become huge when viewed unsigned.
#[inline]
fn outside_unsigned(v: i32, extent: i32) -> bool {
    (v as u32) >= (extent as u32)
}

#[inline]
fn step_ratio(major: i64, minor: i64, far: i64) -> i64 {
    if minor == 0 {
        far
    } else {
        (major * 1024 / minor).abs()
    }
}

/// Integer voxel line from `from` to `to` (both inclusive), in the 1024-scaled
/// fixed point of the classic voxel engine.
///
/// Stops after `max_len` cells, on reaching `to`, or when the next cell would
/// leave the grid. `from` itself is always the first element.
pub fn cube_line(dims: MapDims, from: IVec3, to: IVec3, max_len: usize) -> Vec<IVec3> {
    let mut out = Vec::new();
    if max_len == 0 {
        return out;
    }
    let mut c = from;
    let d = [
        i64::from(to.x) - i64::from(from.x),
        i64::from(to.y) - i64::from(from.y),
        i64::from(to.z) - i64::from(from.z),
    ];
    let ixi = if d[0] < 0 { -1 } else { 1 };
    let iyi = if d[1] < 0 { -1 } else { 1 };
    let izi = if d[2] < 0 { -1 } else { 1 };

    let far = far_step(dims);
    let (dxi, dyi, dzi);
    let (mut dx, mut dy, mut dz);
    if d[0].abs() >= d[1].abs() && d[0].abs() >= d[2].abs() {
        dxi = 1024;
        dx = 512;
        dyi = step_ratio(d[0], d[1], far);
        dy = dyi / 2;
        dzi = step_ratio(d[0], d[2], far);
        dz = dzi / 2;
    } else if d[1].abs() >= d[2].abs() {
        dyi = 1024;
        dy = 512;
        dxi = step_ratio(d[1], d[0], far);
        dx = dxi / 2;
        dzi = step_ratio(d[1], d[2], far);
        dz = dzi / 2;
    } else {
        dzi = 1024;
        dz = 512;
        dxi = step_ratio(d[2], d[0], far);
        dx = dxi / 2;
        dyi = step_ratio(d[2], d[1], far);
        dy = dyi / 2;
    }
    if ixi >= 0 {
        dx = dxi - dx;
    }
    if iyi >= 0 {
        dy = dyi - dy;
    }
    if izi >= 0 {
        dz = dzi - dz;
    }

    loop {
        out.push(c);
        if out.len() >= max_len || c == to {
            break;
        }
        if dz <= dx && dz <= dy {
            c.z += izi;
            if c.z < 0 || c.z >= dims.depth {
                break;
            }
            dz += dzi;
        } else if dx < dy {
            c.x += ixi;
            if outside_unsigned(c.x, dims.width) {
                break;
            }
            dx += dxi;
        } else {
            c.y += iyi;
            if outside_unsigned(c.y, dims.height) {
                break;
            }
            dy += dyi;
        }
    }
    out
}

impl VoxelGrid {
    pub fn cube_line(&self, from: IVec3, to: IVec3, max_len: usize) -> Vec<IVec3> {
        cube_line(self.dims(), from, to, max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> MapDims {
        MapDims::new(32, 32, 32).unwrap()
    }

    #[test]
    fn single_cell_line() {
        let p = IVec3::new(3, 4, 5);
        assert_eq!(cube_line(dims(), p, p, 10), vec![p]);
    }

    #[test]
    fn axis_aligned_line_is_contiguous() {
        let line = cube_line(dims(), IVec3::new(2, 2, 2), IVec3::new(7, 2, 2), 50);
        assert_eq!(line.len(), 6);
        for (i, c) in line.iter().enumerate() {
            assert_eq!(*c, IVec3::new(2 + i as i32, 2, 2));
        }
    }

    #[test]
    fn diagonal_steps_are_face_adjacent() {
        let a = IVec3::new(1, 1, 1);
        let b = IVec3::new(6, 4, 9);
        let line = cube_line(dims(), a, b, 100);
        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
        assert_eq!(line.len() as i32, a.manhattan(b) + 1);
        for w in line.windows(2) {
            assert_eq!(w[0].manhattan(w[1]), 1);
        }
    }

    #[test]
    fn stops_at_max_len() {
        let line = cube_line(dims(), IVec3::new(0, 0, 0), IVec3::new(20, 0, 0), 4);
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn stops_at_grid_edge() {
        let line = cube_line(dims(), IVec3::new(2, 0, 5), IVec3::new(2, -5, 5), 100);
        assert_eq!(line, vec![IVec3::new(2, 0, 5)]);
    }

    #[test]
    fn long_line_on_wide_map_stays_on_its_axis() {
        let wide = MapDims::new(2048, 4, 8).unwrap();
        let to = IVec3::new(1500, 1, 1);
        let line = cube_line(wide, IVec3::new(0, 1, 1), to, 2000);
        assert_eq!(line.len(), 1501);
        assert_eq!(line.last(), Some(&to));
        assert!(line.iter().all(|c| c.y == 1 && c.z == 1));
    }
}
