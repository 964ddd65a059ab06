use spades_geom::{IVec3, Vec3};

use crate::grid::VoxelGrid;

/// Outcome of [`VoxelGrid::cast_ray2`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCastResult {
    pub hit: bool,
    /// The ray began inside a solid voxel; no stepping was done.
    pub start_solid: bool,
    /// Entry point on the hit voxel's boundary, or the last point reached on a miss.
    pub hit_pos: Vec3,
    /// Hit voxel, or the last voxel visited on a miss.
    pub hit_block: IVec3,
    /// Face normal of the crossed boundary; zero for `start_solid` and misses.
    pub normal: IVec3,
}

impl RayCastResult {
    fn miss(pos: Vec3, block: IVec3) -> Self {
        Self {
            hit: false,
            start_solid: false,
            hit_pos: pos,
            hit_block: block,
            normal: IVec3::ZERO,
        }
    }
}

// Fixed-point accumulators of the legacy caster overflow on long rays; the
// original relies on two's-complement wraparound so these must too.
#[inline]
fn fx_add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

#[inline]
fn fx_sub(a: i64, b: i64) -> i64 {
    a.wrapping_sub(b)
}

#[inline]
fn fx_cross(a: f32, b: f32, c: f32, d: f32) -> i64 {
    (a * b - c * d) as i64
}

// Magnitudes beyond this make f32 voxel math meaningless.
const MAX_COORD: f32 = 1.0e9;

impl VoxelGrid {
    /// Fast wrapped caster: walks from `origin` toward `origin + dir * length`
    /// and returns the first solid voxel.
    ///
    /// Wraps x/y, treats z >= depth as solid. Visits at most `length` voxels
    /// (and never more than the Manhattan voxel distance to the end point).
    pub fn cast_ray(&self, origin: Vec3, dir: Vec3, length: f32) -> Option<IVec3> {
        if !origin.is_finite() || !dir.is_finite() || !length.is_finite() {
            return None;
        }
        let end = origin + dir * length;
        if !end.is_finite()
            || origin.chebyshev_length() > MAX_COORD
            || end.chebyshev_length() > MAX_COORD
        {
            return None;
        }

        let mut a = origin.floor();
        let c = end.floor();
        let mut d = [0i32; 3];
        let mut f = [0f32; 3];
        let mut g = [0f32; 3];
        let mut cnt: i64 = 0;
        let av = [a.x, a.y, a.z];
        let cv = [c.x, c.y, c.z];
        for axis in 0..3 {
            let v0 = origin.component(axis);
            let v1 = end.component(axis);
            if cv[axis] < av[axis] {
                d[axis] = -1;
                f[axis] = v0 - av[axis] as f32;
                g[axis] = (v0 - v1) * 1024.0;
                cnt += i64::from(av[axis]) - i64::from(cv[axis]);
            } else if cv[axis] != av[axis] {
                d[axis] = 1;
                f[axis] = av[axis] as f32 + 1.0 - v0;
                g[axis] = (v1 - v0) * 1024.0;
                cnt += i64::from(cv[axis]) - i64::from(av[axis]);
            }
        }

        let mut p = [
            fx_cross(f[0], g[2], f[2], g[0]),
            fx_cross(f[1], g[2], f[2], g[1]),
            fx_cross(f[1], g[0], f[0], g[1]),
        ];
        let i = [g[0] as i64, g[1] as i64, g[2] as i64];
        cnt = cnt.min(length as i64);

        while cnt > 0 {
            if (p[0] | p[1]) >= 0 && a.z != c.z {
                a.z += d[2];
                p[0] = fx_sub(p[0], i[0]);
                p[1] = fx_sub(p[1], i[1]);
            } else if p[2] >= 0 && a.x != c.x {
                a.x += d[0];
                p[0] = fx_add(p[0], i[2]);
                p[2] = fx_sub(p[2], i[1]);
            } else {
                a.y += d[1];
                p[1] = fx_add(p[1], i[2]);
                p[2] = fx_add(p[2], i[0]);
            }
            if self.is_solid_wrapped(a.x, a.y, a.z) {
                return Some(a);
            }
            cnt -= 1;
        }
        None
    }

    /// Accurate non-wrapping caster. `dir` need not be normalized. Voxels
    /// outside the grid count as air. At most `max_steps` boundary crossings
    /// are taken.
    pub fn cast_ray2(&self, origin: Vec3, dir: Vec3, max_steps: u32) -> RayCastResult {
        let start = origin.floor();
        if !origin.is_finite() || origin.chebyshev_length() > MAX_COORD {
            return RayCastResult::miss(origin, start);
        }
        if self.solid_at(start) {
            return RayCastResult {
                hit: true,
                start_solid: true,
                hit_pos: origin,
                hit_block: start,
                normal: IVec3::ZERO,
            };
        }
        if !dir.is_finite() || dir.length_squared() == 0.0 {
            return RayCastResult::miss(origin, start);
        }
        let dir = dir.normalized();

        let mut cell = [start.x, start.y, start.z];
        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        for axis in 0..3 {
            let o = origin.component(axis);
            let v = dir.component(axis);
            let base = cell[axis] as f32;
            if v > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / v;
                t_max[axis] = (base + 1.0 - o) / v;
            } else if v < 0.0 {
                step[axis] = -1;
                t_delta[axis] = -1.0 / v;
                t_max[axis] = (base - o) / v;
            }
        }

        let mut pos = origin;
        for _ in 0..max_steps {
            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            if !t_max[axis].is_finite() {
                break;
            }
            let t = t_max[axis];
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];

            pos = origin + dir * t;
            // Land exactly on the crossed plane.
            let plane = if step[axis] > 0 {
                cell[axis] as f32
            } else {
                (cell[axis] + 1) as f32
            };
            pos.set_component(axis, plane);

            let block = IVec3::new(cell[0], cell[1], cell[2]);
            if self.solid_at(block) {
                let mut normal = [0i32; 3];
                normal[axis] = -step[axis];
                return RayCastResult {
                    hit: true,
                    start_solid: false,
                    hit_pos: pos,
                    hit_block: block,
                    normal: IVec3::new(normal[0], normal[1], normal[2]),
                };
            }
        }
        RayCastResult::miss(pos, IVec3::new(cell[0], cell[1], cell[2]))
    }

    #[inline]
    fn solid_at(&self, v: IVec3) -> bool {
        self.in_bounds(v.x, v.y, v.z) && self.is_solid(v.x, v.y, v.z)
    }
}
