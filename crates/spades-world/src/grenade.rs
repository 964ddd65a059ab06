use spades_geom::Vec3;
use spades_map::VoxelGrid;

use crate::constants::{GRENADE_BOUNCE_DAMPING, GRENADE_SOUND_VELOCITY, VELOCITY_SCALE};

/// Result of one grenade step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrenadeStep {
    Flying,
    /// Touched terrain.
    Bounced { audible: bool },
    Exploded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grenade {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds until detonation.
    pub fuse: f32,
    /// Spin angles in radians, display only.
    pub orientation: Vec3,
    pub thrower: Option<usize>,
}

impl Grenade {
    pub fn new(position: Vec3, velocity: Vec3, fuse: f32) -> Self {
        Self {
            position,
            velocity,
            fuse,
            orientation: Vec3::ZERO,
            thrower: None,
        }
    }

    pub fn update(&mut self, map: &VoxelGrid, dt: f32) -> GrenadeStep {
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            return GrenadeStep::Exploded;
        }
        let step = self.move_body(map, dt);
        self.orientation = self.orientation + self.velocity * (dt * 4.0);
        step
    }

    fn move_body(&mut self, map: &VoxelGrid, dt: f32) -> GrenadeStep {
        match ballistic_step(
            map,
            &mut self.position,
            &mut self.velocity,
            dt,
            GRENADE_BOUNCE_DAMPING,
        ) {
            Some(audible) => GrenadeStep::Bounced { audible },
            None => GrenadeStep::Flying,
        }
    }
}

/// One gravity step for a point body. On terrain contact the body stays
/// where it was, the velocity axis that crossed into the solid voxel is
/// reflected and everything is scaled by `damping`. Returns `Some(audible)`
/// on contact.
pub(crate) fn ballistic_step(
    map: &VoxelGrid,
    position: &mut Vec3,
    velocity: &mut Vec3,
    dt: f32,
    damping: f32,
) -> Option<bool> {
    let old = *position;
    let f = dt * VELOCITY_SCALE;
    velocity.z += dt;
    *position = *position + *velocity * f;

    let lp = position.floor();
    if !map.clip_world(lp.x, lp.y, lp.z) {
        return None;
    }
    let v = *velocity;
    let audible = v.x.abs() > GRENADE_SOUND_VELOCITY
        || v.y.abs() > GRENADE_SOUND_VELOCITY
        || v.z.abs() > GRENADE_SOUND_VELOCITY;

    let lp2 = old.floor();
    if lp.z != lp2.z && ((lp.x == lp2.x && lp.y == lp2.y) || !map.clip_world(lp.x, lp.y, lp2.z)) {
        velocity.z = -velocity.z;
    } else if lp.x != lp2.x
        && ((lp.y == lp2.y && lp.z == lp2.z) || !map.clip_world(lp2.x, lp.y, lp.z))
    {
        velocity.x = -velocity.x;
    } else if lp.y != lp2.y
        && ((lp.x == lp2.x && lp.z == lp2.z) || !map.clip_world(lp.x, lp2.y, lp.z))
    {
        velocity.y = -velocity.y;
    }
    *position = old;
    *velocity = *velocity * damping;
    Some(audible)
}
