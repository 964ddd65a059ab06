use proptest::prelude::*;
use spades_map::{MapDims, Vec3, VoxelGrid};

fn dims() -> MapDims {
    MapDims::new(16, 8, 24).unwrap()
}

fn coord() -> impl Strategy<Value = (i32, i32, i32)> {
    (0i32..16, 0i32..8, 0i32..24)
}

fn grid_with(cells: &[(i32, i32, i32)]) -> VoxelGrid {
    let mut g = VoxelGrid::empty(dims());
    for &(x, y, z) in cells {
        g.set_quiet(x, y, z, true, 0x64_00_00_FF);
    }
    g
}

proptest! {
    // bit test agrees with the column word
    #[test]
    fn is_solid_matches_column_bits(
        cells in prop::collection::vec(coord(), 0..64),
        cell in coord(),
    ) {
        let g = grid_with(&cells);
        let (x, y, z) = cell;
        prop_assert_eq!(g.is_solid(x, y, z), (g.solid_column(x, y) >> z) & 1 == 1);
    }

    // wrapped lookups fold x/y and clamp the vertical policy
    #[test]
    fn wrapped_agrees_with_unwrapped(
        cells in prop::collection::vec(coord(), 0..64),
        x in -100i32..100,
        y in -100i32..100,
        z in -10i32..34,
    ) {
        let g = grid_with(&cells);
        let expect = if z < 0 {
            false
        } else if z >= 24 {
            true
        } else {
            g.is_solid(x.rem_euclid(16), y.rem_euclid(8), z)
        };
        prop_assert_eq!(g.is_solid_wrapped(x, y, z), expect);
    }

    // the accurate caster is bounded and its hits sit on the reported face
    #[test]
    fn cast_ray2_hits_are_consistent(
        cells in prop::collection::vec(coord(), 1..64),
        ox in 0.0f32..16.0, oy in 0.0f32..8.0, oz in 0.0f32..24.0,
        dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..1.0,
        steps in 0u32..80,
    ) {
        let g = grid_with(&cells);
        let r = g.cast_ray2(Vec3::new(ox, oy, oz), Vec3::new(dx, dy, dz), steps);
        if r.hit {
            let b = r.hit_block;
            prop_assert!(g.in_bounds(b.x, b.y, b.z));
            prop_assert!(g.is_solid(b.x, b.y, b.z));
            if !r.start_solid {
                // exactly one axis of the normal is set, and the hit point
                // lies on that face of the block
                let n = r.normal;
                prop_assert_eq!(n.x.abs() + n.y.abs() + n.z.abs(), 1);
                let face = |c: i32, n: i32| if n < 0 { c as f32 } else { (c + 1) as f32 };
                if n.x != 0 { prop_assert_eq!(r.hit_pos.x, face(b.x, n.x)); }
                if n.y != 0 { prop_assert_eq!(r.hit_pos.y, face(b.y, n.y)); }
                if n.z != 0 { prop_assert_eq!(r.hit_pos.z, face(b.z, n.z)); }
            }
        }
    }

    // the fast caster only ever reports solid voxels
    #[test]
    fn cast_ray_hits_are_solid(
        cells in prop::collection::vec(coord(), 1..64),
        ox in -20.0f32..36.0, oy in -20.0f32..28.0, oz in -4.0f32..28.0,
        dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..1.0,
        len in 0.0f32..64.0,
    ) {
        let g = grid_with(&cells);
        if let Some(v) = g.cast_ray(Vec3::new(ox, oy, oz), Vec3::new(dx, dy, dz), len) {
            prop_assert!(g.is_solid_wrapped(v.x, v.y, v.z));
        }
    }
}
