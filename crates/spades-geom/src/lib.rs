//! Small geometry types shared by the map, physics and hit-box code.
//!
//! World space is x/y horizontal, z pointing down (z = 0 is the sky side).
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    /// Gravity direction.
    pub const DOWN: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    /// Largest absolute component.
    #[inline]
    pub fn chebyshev_length(self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    #[inline]
    pub fn floor(self) -> IVec3 {
        IVec3::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    #[inline]
    pub fn lerp(self, to: Vec3, t: f32) -> Vec3 {
        self + (to - self) * t
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn component(self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub fn set_component(&mut self, axis: usize, v: f32) {
        match axis {
            0 => self.x = v,
            1 => self.y = v,
            _ => self.z = v,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Integer voxel coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3 { x: 0, y: 0, z: 0 };

    /// The six face-neighbor offsets: -x, +x, -y, +y, -z, +z.
    pub const FACES: [IVec3; 6] = [
        IVec3 { x: -1, y: 0, z: 0 },
        IVec3 { x: 1, y: 0, z: 0 },
        IVec3 { x: 0, y: -1, z: 0 },
        IVec3 { x: 0, y: 1, z: 0 },
        IVec3 { x: 0, y: 0, z: -1 },
        IVec3 { x: 0, y: 0, z: 1 },
    ];

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Center of the unit voxel at this coordinate.
    #[inline]
    pub fn center(self) -> Vec3 {
        self.as_vec3() + Vec3::splat(0.5)
    }

    #[inline]
    pub fn manhattan(self, other: IVec3) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    #[inline]
    fn add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    #[inline]
    fn sub(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for IVec3 {
    type Output = IVec3;
    #[inline]
    fn neg(self) -> IVec3 {
        IVec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<(i32, i32, i32)> for IVec3 {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The unit cube occupied by a voxel.
    #[inline]
    pub fn voxel(v: IVec3) -> Self {
        let min = v.as_vec3();
        Self::new(min, min + Vec3::splat(1.0))
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Column-major 4x4 matrix: `m[col * 4 + row]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    #[inline]
    fn at(&self, row: usize, col: usize) -> f32 {
        self.m[col * 4 + row]
    }

    pub fn translate(v: Vec3) -> Mat4 {
        let mut out = Self::IDENTITY;
        out.m[12] = v.x;
        out.m[13] = v.y;
        out.m[14] = v.z;
        out
    }

    pub fn scale(v: Vec3) -> Mat4 {
        let mut out = Self::IDENTITY;
        out.m[0] = v.x;
        out.m[5] = v.y;
        out.m[10] = v.z;
        out
    }

    /// Right-handed rotation of `angle` radians around `axis`.
    pub fn rotate(axis: Vec3, angle: f32) -> Mat4 {
        let a = axis.normalized();
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let mut out = Self::IDENTITY;
        // column 0
        out.m[0] = t * a.x * a.x + c;
        out.m[1] = t * a.x * a.y + s * a.z;
        out.m[2] = t * a.x * a.z - s * a.y;
        // column 1
        out.m[4] = t * a.x * a.y - s * a.z;
        out.m[5] = t * a.y * a.y + c;
        out.m[6] = t * a.y * a.z + s * a.x;
        // column 2
        out.m[8] = t * a.x * a.z + s * a.y;
        out.m[9] = t * a.y * a.z - s * a.x;
        out.m[10] = t * a.z * a.z + c;
        out
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.at(0, 0) * p.x + self.at(0, 1) * p.y + self.at(0, 2) * p.z + self.at(0, 3),
            self.at(1, 0) * p.x + self.at(1, 1) * p.y + self.at(1, 2) * p.z + self.at(1, 3),
            self.at(2, 0) * p.x + self.at(2, 1) * p.y + self.at(2, 2) * p.z + self.at(2, 3),
        )
    }

    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z,
            self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z,
            self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z,
        )
    }

    /// Inverse of an affine transform (last row `0 0 0 1`). Returns `None`
    /// for a singular linear part.
    pub fn inverse_affine(&self) -> Option<Mat4> {
        let (a, b, c) = (self.at(0, 0), self.at(0, 1), self.at(0, 2));
        let (d, e, f) = (self.at(1, 0), self.at(1, 1), self.at(1, 2));
        let (g, h, i) = (self.at(2, 0), self.at(2, 1), self.at(2, 2));
        let co00 = e * i - f * h;
        let co01 = -(d * i - f * g);
        let co02 = d * h - e * g;
        let det = a * co00 + b * co01 + c * co02;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        // rows of the inverse 3x3
        let r = [
            [co00, -(b * i - c * h), b * f - c * e],
            [co01, a * i - c * g, -(a * f - c * d)],
            [co02, -(a * h - b * g), a * e - b * d],
        ];
        let mut out = Self::IDENTITY;
        for row in 0..3 {
            for col in 0..3 {
                out.m[col * 4 + row] = r[row][col] * inv_det;
            }
        }
        let t = Vec3::new(self.at(0, 3), self.at(1, 3), self.at(2, 3));
        let it = out.transform_vector(t);
        out.m[12] = -it.x;
        out.m[13] = -it.y;
        out.m[14] = -it.z;
        Some(out)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(row, k) * rhs.at(k, col);
                }
                out[col * 4 + row] = sum;
            }
        }
        Mat4 { m: out }
    }
}

/// Oriented box: the image of the unit cube `[0,1]^3` under `m`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obb {
    pub m: Mat4,
}

impl Obb {
    #[inline]
    pub const fn new(m: Mat4) -> Self {
        Self { m }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.m.transform_point(Vec3::splat(0.5))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        match self.m.inverse_affine() {
            Some(inv) => {
                let l = inv.transform_point(p);
                let unit = 0.0..=1.0;
                unit.contains(&l.x) && unit.contains(&l.y) && unit.contains(&l.z)
            }
            None => false,
        }
    }

    /// Slab test in box-local space. Returns the world-space entry point of
    /// the ray `start + dir * t` (t >= 0), or `start` if it begins inside.
    pub fn ray_cast(&self, start: Vec3, dir: Vec3) -> Option<Vec3> {
        let inv = self.m.inverse_affine()?;
        let ls = inv.transform_point(start);
        let ld = inv.transform_vector(dir);
        let mut t_enter = 0.0f32;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let s = ls.component(axis);
            let d = ld.component(axis);
            if d.abs() < 1e-12 {
                if !(0.0..=1.0).contains(&s) {
                    return None;
                }
                continue;
            }
            let mut t0 = (0.0 - s) / d;
            let mut t1 = (1.0 - s) / d;
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }
        Some(start + dir * t_enter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_roundtrips_points() {
        let m = Mat4::translate(Vec3::new(3.0, -2.0, 5.0))
            * Mat4::rotate(Vec3::new(0.0, 0.0, 1.0), 0.7)
            * Mat4::scale(Vec3::new(0.5, 2.0, 1.5));
        let inv = m.inverse_affine().unwrap();
        let p = Vec3::new(1.0, 2.0, 3.0);
        let back = inv.transform_point(m.transform_point(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Mat4::scale(Vec3::new(1.0, 0.0, 1.0)).inverse_affine().is_none());
    }
}
