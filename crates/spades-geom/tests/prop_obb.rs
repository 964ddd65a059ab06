use proptest::prelude::*;
use spades_geom::{Mat4, Obb, Vec3};

fn arb_unit_axis() -> impl Strategy<Value = Vec3> {
    (-1.0f32..1.0, -1.0f32..1.0, -1.0f32..1.0)
        .prop_filter("non-degenerate", |(x, y, z)| x * x + y * y + z * z > 0.01)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z).normalized())
}

fn arb_box() -> impl Strategy<Value = Obb> {
    (
        (-50.0f32..50.0, -50.0f32..50.0, -50.0f32..50.0),
        arb_unit_axis(),
        -3.0f32..3.0,
        (0.1f32..3.0, 0.1f32..3.0, 0.1f32..3.0),
    )
        .prop_map(|((tx, ty, tz), axis, angle, (sx, sy, sz))| {
            Obb::new(
                Mat4::translate(Vec3::new(tx, ty, tz))
                    * Mat4::rotate(axis, angle)
                    * Mat4::scale(Vec3::new(sx, sy, sz)),
            )
        })
}

proptest! {
    // A ray aimed from outside at the box center always hits, and the hit
    // lies no farther than the center.
    #[test]
    fn ray_at_center_hits(obb in arb_box(), dir in arb_unit_axis()) {
        let c = obb.center();
        let start = c - dir * 20.0;
        let hit = obb.ray_cast(start, dir);
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();
        prop_assert!((hit - start).length() <= 20.0 + 1e-3);
    }

    // Pointing directly away from the box never hits when starting outside.
    #[test]
    fn ray_away_from_box_misses(obb in arb_box(), dir in arb_unit_axis()) {
        let c = obb.center();
        let start = c + dir * 20.0;
        prop_assert!(obb.ray_cast(start, dir).is_none());
    }

    #[test]
    fn center_is_contained(obb in arb_box()) {
        prop_assert!(obb.contains(obb.center()));
    }
}
