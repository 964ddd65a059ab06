use spades_map::{IVec3, MapDims, VoxelGrid};
use spades_support::{Grounding, SupportTracker, clusterize_blocks};

// 3x3x3 cube resting on layer 0, anchored there.
fn cube_on_top_layer() -> (VoxelGrid, SupportTracker) {
    let mut grid = VoxelGrid::empty(MapDims::new(8, 8, 8).unwrap());
    for z in 0..3 {
        for y in 2..5 {
            for x in 2..5 {
                grid.set_quiet(x, y, z, true, 1);
            }
        }
    }
    let tracker = SupportTracker::new(&grid, Grounding { anchor_layer: 0 });
    (grid, tracker)
}

#[test]
fn removing_base_center_keeps_cube_supported() {
    let (mut grid, mut t) = cube_on_top_layer();
    let floating = t.remove_blocks(&mut grid, &[IVec3::new(3, 3, 0)]);
    assert!(floating.is_empty());
    assert!(!grid.is_solid(3, 3, 0));
    assert_eq!(grid.solid_count(), 26);
    assert!(t.is_supported(IVec3::new(3, 3, 1)));
    assert!(t.is_supported(IVec3::new(3, 3, 2)));
}

#[test]
fn removing_base_layer_drops_the_rest_as_one_cluster() {
    let (mut grid, mut t) = cube_on_top_layer();
    let base: Vec<IVec3> = (2..5)
        .flat_map(|y| (2..5).map(move |x| IVec3::new(x, y, 0)))
        .collect();
    let floating = t.remove_blocks(&mut grid, &base);
    assert_eq!(floating.len(), 18);
    // floating voxels are reported, not removed
    assert_eq!(grid.solid_count(), 18);
    let clusters = clusterize_blocks(&floating);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 18);
    assert!(clusters[0].iter().all(|p| p.z >= 1));
}

#[test]
fn bottom_anchored_cube_behaves_the_same() {
    let dims = MapDims::new(8, 8, 8).unwrap();
    let mut grid = VoxelGrid::empty(dims);
    for z in 5..8 {
        for y in 2..5 {
            for x in 2..5 {
                grid.set_quiet(x, y, z, true, 1);
            }
        }
    }
    let mut t = SupportTracker::new(&grid, Grounding::bottom(dims));
    assert!(t.remove_blocks(&mut grid, &[IVec3::new(3, 3, 7)]).is_empty());
    let rest: Vec<IVec3> = (2..5)
        .flat_map(|y| (2..5).map(move |x| IVec3::new(x, y, 7)))
        .collect();
    let floating = t.remove_blocks(&mut grid, &rest);
    assert_eq!(floating.len(), 18);
}

#[test]
fn two_disconnected_towers_fall_separately() {
    let dims = MapDims::new(16, 16, 8).unwrap();
    let mut grid = VoxelGrid::empty(dims);
    // ground slab
    for y in 0..16 {
        for x in 0..16 {
            grid.set_quiet(x, y, 7, true, 1);
        }
    }
    // two towers, each resting on a single block at z = 6
    let towers = [(2, 2), (10, 10)];
    for &(x, y) in &towers {
        for z in 2..7 {
            grid.set_quiet(x, y, z, true, 1);
        }
        grid.set_quiet(x + 1, y, 2, true, 1);
    }
    let mut t = SupportTracker::new(&grid, Grounding::bottom(dims));
    let cut: Vec<IVec3> = towers.iter().map(|&(x, y)| IVec3::new(x, y, 6)).collect();
    let floating = t.remove_blocks(&mut grid, &cut);
    assert_eq!(floating.len(), 10);
    let clusters = clusterize_blocks(&floating);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters.iter().map(Vec::len).sum::<usize>(), floating.len());
    for c in &clusters {
        assert_eq!(c.len(), 5);
        let x0 = c[0].x;
        assert!(c.iter().all(|p| (p.x - x0).abs() <= 1));
    }
}

#[test]
fn placing_a_bridge_supports_a_hanging_block() {
    let dims = MapDims::new(8, 8, 8).unwrap();
    let mut grid = VoxelGrid::empty(dims);
    grid.set_quiet(0, 0, 7, true, 1);
    grid.set_quiet(0, 0, 6, true, 1);
    let mut t = SupportTracker::new(&grid, Grounding::bottom(dims));
    t.add_block(&mut grid, IVec3::new(1, 0, 6), 5);
    t.add_block(&mut grid, IVec3::new(2, 0, 6), 5);
    assert!(t.is_supported(IVec3::new(2, 0, 6)));
    let floating = t.remove_blocks(&mut grid, &[IVec3::new(0, 0, 6)]);
    assert_eq!(floating, vec![IVec3::new(1, 0, 6), IVec3::new(2, 0, 6)]);
}

#[test]
fn rebuild_matches_incremental_state() {
    let (mut grid, mut t) = cube_on_top_layer();
    t.remove_blocks(&mut grid, &[IVec3::new(3, 3, 0), IVec3::new(2, 2, 0)]);
    let fresh = SupportTracker::new(&grid, Grounding { anchor_layer: 0 });
    for z in 0..3 {
        for y in 2..5 {
            for x in 2..5 {
                let p = IVec3::new(x, y, z);
                assert_eq!(t.is_supported(p), fresh.is_supported(p), "{p:?}");
            }
        }
    }
}
