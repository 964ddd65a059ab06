use std::sync::{Arc, Mutex};

use spades_map::{GridObserver, IVec3, MapDims, Vec3, VoxelGrid, color};

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(i32, i32, i32, bool)>>,
}

impl GridObserver for Recorder {
    fn voxel_changed(&self, x: i32, y: i32, z: i32, grid: &VoxelGrid) {
        // grid already reflects the change
        let solid = grid.is_solid(x, y, z);
        self.seen.lock().unwrap().push((x, y, z, solid));
    }
}

#[test]
fn observers_see_post_change_state_once_per_change() {
    let mut g = VoxelGrid::empty(MapDims::new(8, 8, 8).unwrap());
    let rec = Arc::new(Recorder::default());
    g.add_observer(rec.clone());

    g.set(1, 1, 1, true, color::from_rgb(1, 2, 3));
    g.set(1, 1, 1, true, color::from_rgb(1, 2, 3));
    g.set(1, 1, 1, false, 0);
    g.set_quiet(2, 2, 2, true, 0);

    let seen = rec.seen.lock().unwrap();
    assert_eq!(*seen, vec![(1, 1, 1, true), (1, 1, 1, false)]);
}

#[test]
fn clones_are_detached_from_observers() {
    let mut g = VoxelGrid::empty(MapDims::new(8, 8, 8).unwrap());
    let rec = Arc::new(Recorder::default());
    g.add_observer(rec.clone());
    let mut copy = g.clone();
    assert_eq!(copy.observer_count(), 0);
    copy.set(0, 0, 0, true, 7);
    assert!(rec.seen.lock().unwrap().is_empty());
    assert!(!g.is_solid(0, 0, 0));
}

#[test]
fn standard_default_map() {
    let g = VoxelGrid::default();
    assert_eq!(g.dims(), MapDims::STANDARD);
    assert!(g.is_solid(100, 200, 63));
    assert!(!g.is_solid(100, 200, 62));
    assert_eq!(g.solid_count(), 512 * 512);
}

#[test]
fn ground_fill_marks_surface_only_on_top() {
    let g = VoxelGrid::with_ground(MapDims::new(8, 8, 16).unwrap(), 10);
    assert!(g.is_surface(3, 3, 10));
    assert!(!g.is_surface(3, 3, 12));
    // map edges do not expose the side faces
    assert!(!g.is_surface(0, 0, 12));
}

#[test]
fn dirt_ramp_is_deterministic_for_a_seed() {
    let mut a = VoxelGrid::empty(MapDims::new(8, 8, 64).unwrap());
    let mut b = a.clone();
    a.set_jit_state(42);
    b.set_jit_state(42);
    for z in 0..64 {
        assert_eq!(a.dirt_color(3, 5, z), b.dirt_color(3, 5, z));
    }
}

#[test]
fn dirt_gets_darker_with_depth() {
    let mut g = VoxelGrid::empty(MapDims::new(8, 8, 64).unwrap());
    let top = g.dirt_color(4, 4, 4);
    let bottom = g.dirt_color(4, 4, 63);
    let sum = |c: u32| color::red(c) as u32 + color::green(c) as u32 + color::blue(c) as u32;
    assert!(sum(top) > sum(bottom));
}

#[test]
fn cast_ray2_down_onto_plane() {
    let mut g = VoxelGrid::empty(MapDims::STANDARD);
    for y in 0..4 {
        for x in 0..4 {
            g.set_quiet(x, y, 10, true, 0);
        }
    }
    let r = g.cast_ray2(Vec3::new(0.5, 0.5, 5.5), Vec3::new(0.0, 0.0, 1.0), 32);
    assert!(r.hit);
    assert_eq!(r.hit_block, IVec3::new(0, 0, 10));
    assert_eq!(r.normal, IVec3::new(0, 0, -1));
    assert_eq!(r.hit_pos.z, 10.0);
}

#[test]
fn cast_ray2_treats_outside_as_air() {
    let g = VoxelGrid::new(MapDims::new(8, 8, 8).unwrap());
    let r = g.cast_ray2(Vec3::new(-3.5, 2.5, 2.5), Vec3::new(-1.0, 0.0, 0.0), 100);
    assert!(!r.hit);
}

#[test]
fn grid_cube_line_matches_free_function() {
    let g = VoxelGrid::empty(MapDims::new(16, 16, 16).unwrap());
    let a = IVec3::new(1, 2, 3);
    let b = IVec3::new(9, 4, 3);
    assert_eq!(g.cube_line(a, b, 64), spades_map::cube_line(g.dims(), a, b, 64));
}
