use proptest::prelude::*;
use spades_map::{MapDims, VoxelGrid, color};
use spades_vxl::{decode_with_dims, encode};

fn dims() -> MapDims {
    MapDims::new(4, 4, 12).unwrap()
}

fn grid_strategy() -> impl Strategy<Value = VoxelGrid> {
    prop::collection::vec((0i32..4, 0i32..4, 0i32..12, any::<u32>()), 0..120).prop_map(|cells| {
        let mut g = VoxelGrid::empty(dims());
        for (x, y, z, rgb) in cells {
            g.set_quiet(x, y, z, true, color::from_hex(rgb & 0xFF_FFFF));
        }
        g
    })
}

proptest! {
    // decode(encode(g)) keeps solidity everywhere and colors on the surface
    #[test]
    fn roundtrip_preserves_visible_state(g in grid_strategy()) {
        let bytes = encode(&g);
        let back = decode_with_dims(&bytes, dims()).unwrap();
        for y in 0..4 { for x in 0..4 {
            prop_assert_eq!(back.solid_column(x, y), g.solid_column(x, y));
            for z in 0..12 {
                if g.is_surface(x, y, z) {
                    prop_assert_eq!(back.color(x, y, z), g.color(x, y, z));
                }
            }
        }}
        prop_assert_eq!(encode(&back), bytes);
    }
}
