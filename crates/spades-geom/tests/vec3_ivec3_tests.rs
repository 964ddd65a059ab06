use spades_geom::{Aabb, IVec3, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::DOWN, Vec3::new(0.0, 0.0, 1.0), 1e-6));
}

#[test]
fn vec3_arith() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    assert!(vec3_approx_eq(a + b, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq((a + b) - a, b, 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(a * 2.0 / 2.0, a, 1e-6));
}

#[test]
fn vec3_normalized_zero_is_noop() {
    let zn = Vec3::ZERO.normalized();
    assert_eq!(zn, Vec3::ZERO);
    let n = Vec3::new(3.0, 4.0, 0.0).normalized();
    assert!(vec3_approx_eq(n, Vec3::new(0.6, 0.8, 0.0), 1e-6));
}

#[test]
fn vec3_floor_handles_negative() {
    assert_eq!(Vec3::new(-0.5, 0.5, -1.0).floor(), IVec3::new(-1, 0, -1));
}

#[test]
fn chebyshev_picks_largest_component() {
    assert!(approx_eq(Vec3::new(1.0, -3.5, 2.0).chebyshev_length(), 3.5, 1e-6));
}

#[test]
fn ivec3_faces_are_unit_and_distinct() {
    for (i, a) in IVec3::FACES.iter().enumerate() {
        assert_eq!(a.manhattan(IVec3::ZERO), 1);
        for b in IVec3::FACES.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn voxel_aabb_overlap() {
    let a = Aabb::voxel(IVec3::new(1, 1, 1));
    let b = Aabb::voxel(IVec3::new(2, 1, 1));
    // Touching faces do not overlap.
    assert!(!a.intersects(&b));
    let c = Aabb::new(Vec3::new(1.5, 1.5, 1.5), Vec3::new(2.5, 2.5, 2.5));
    assert!(a.intersects(&c));
    assert!(a.contains(Vec3::new(1.5, 1.5, 1.5)));
}
