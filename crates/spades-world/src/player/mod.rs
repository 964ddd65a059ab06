//! Player state, input handling and the per-tick integrator.
//!
//! A player never touches the world directly. [`Player::update`] runs the
//! movement physics against the map and queues [`PlayerAction`]s; the world
//! resolves them (hit tests against other players, block damage, listener
//! events) once every player has moved.

mod movement;
mod tools;

use rand::rngs::StdRng;
use spades_geom::{Aabb, IVec3, Vec3};
use spades_map::VoxelGrid;

use crate::constants::{
    APPROX_HIT_RADIUS, CROUCH_DROP, HALF_WIDTH, MAX_BLOCK_STOCK, MAX_GRENADES, ON_GROUND_VELOCITY,
};
use crate::grenade::Grenade;
use crate::hitbox::HitBoxes;
use crate::listener::BuildFailureReason;
use crate::weapon::{Weapon, WeaponKind};

/// Team id of spectators. Spectators are never simulated.
pub const SPECTATOR_TEAM: u8 = 255;

pub const MAX_HEALTH: i32 = 100;

/// Movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub crouch: bool,
    pub sneak: bool,
    pub sprint: bool,
}

/// Mouse buttons; their meaning depends on the held [`Tool`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeaponInput {
    pub primary: bool,
    pub secondary: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    Spade,
    Block,
    #[default]
    Weapon,
    Grenade,
}

/// Something a player asked for during its update.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAction {
    Jumped,
    Landed { hurt: bool, damage: i32 },
    Footstep,
    SpadeSwing { origin: Vec3, dir: Vec3 },
    /// Local player only.
    Dig { origin: Vec3, dir: Vec3 },
    /// Local player only.
    PlaceBlock(IVec3),
    /// Local player only.
    BuildLine { from: IVec3, to: IVec3 },
    /// Local player only.
    BuildError(BuildFailureReason),
    FireWeapon {
        muzzle: Vec3,
        dirs: Vec<Vec3>,
        kind: WeaponKind,
    },
    DryFire,
    Reloaded,
    /// `None` when the grenade was cooked past its fuse or the thrower is
    /// remote.
    ThrowGrenade(Option<Grenade>),
}

/// What a player may read and write during one update.
pub struct PlayerContext<'a> {
    pub map: &'a VoxelGrid,
    pub time: f32,
    pub rng: &'a mut StdRng,
    /// The player is the one this client controls. Building, digging and
    /// crouch validation only run locally.
    pub local: bool,
    pub actions: &'a mut Vec<PlayerAction>,
}

#[derive(Clone, Debug)]
pub struct Player {
    id: usize,
    team: u8,
    /// Eye position.
    pub position: Vec3,
    pub velocity: Vec3,
    front: Vec3,
    /// Smoothed `front` for rendering remote players.
    pub display_front: Vec3,

    input: PlayerInput,
    weapon_input: WeaponInput,
    last_weapon_input: WeaponInput,
    tool: Tool,
    weapon: Weapon,
    pub grenades: u32,
    pub block_stock: u32,
    pub block_color: u32,
    health: i32,
    alive: bool,
    respawn_time: f32,

    airborne: bool,
    wade: bool,
    last_climb_time: f32,
    last_jump_time: f32,
    last_jump: bool,
    move_distance: f32,

    next_spade_time: f32,
    next_dig_time: f32,
    next_block_time: f32,
    next_grenade_time: f32,
    holding_grenade: bool,
    grenade_cook_start: f32,

    cursor_active: bool,
    cursor_pos: IVec3,
    dragging: bool,
    drag_pos: IVec3,
    pending_place: bool,
    pending_pos: IVec3,
    can_pending: bool,
    single_build_done: bool,
}

impl Player {
    pub fn new(id: usize, team: u8, weapon: WeaponKind, position: Vec3) -> Self {
        Self {
            id,
            team,
            position,
            velocity: Vec3::ZERO,
            front: Vec3::new(1.0, 0.0, 0.0),
            display_front: Vec3::new(1.0, 0.0, 0.0),
            input: PlayerInput::default(),
            weapon_input: WeaponInput::default(),
            last_weapon_input: WeaponInput::default(),
            tool: Tool::Weapon,
            weapon: Weapon::new(weapon),
            grenades: MAX_GRENADES,
            block_stock: MAX_BLOCK_STOCK,
            block_color: spades_map::color::from_hex(0x707070),
            health: MAX_HEALTH,
            alive: true,
            respawn_time: 0.0,
            airborne: true,
            wade: false,
            last_climb_time: f32::NEG_INFINITY,
            last_jump_time: f32::NEG_INFINITY,
            last_jump: false,
            move_distance: 0.0,
            next_spade_time: 0.0,
            next_dig_time: 0.0,
            next_block_time: 0.0,
            next_grenade_time: 0.0,
            holding_grenade: false,
            grenade_cook_start: 0.0,
            cursor_active: false,
            cursor_pos: IVec3::ZERO,
            dragging: false,
            drag_pos: IVec3::ZERO,
            pending_place: false,
            pending_pos: IVec3::ZERO,
            can_pending: false,
            single_build_done: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn team(&self) -> u8 {
        self.team
    }

    pub fn set_team(&mut self, team: u8) {
        self.team = team;
    }

    pub fn is_spectator(&self) -> bool {
        self.team == SPECTATOR_TEAM
    }

    pub fn eye(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Sets the facing direction. Zero or non-finite vectors are ignored.
    pub fn set_orientation(&mut self, front: Vec3) {
        if !front.is_finite() || front.length_squared() < 1e-12 {
            return;
        }
        self.front = front.normalized();
    }

    pub fn right(&self) -> Vec3 {
        let r = Vec3::new(-self.front.y, self.front.x, 0.0);
        if r.length_squared() < 1e-12 {
            Vec3::new(1.0, 0.0, 0.0)
        } else {
            r.normalized()
        }
    }

    pub fn input(&self) -> PlayerInput {
        self.input
    }

    pub fn weapon_input(&self) -> WeaponInput {
        self.weapon_input
    }

    /// Applies new movement keys. Crouch changes move the eye; a local
    /// player whose head is blocked keeps crouching. Returns the input that
    /// was actually applied.
    pub fn set_input(&mut self, input: PlayerInput, map: &VoxelGrid, local: bool) -> PlayerInput {
        if !self.alive {
            return self.input;
        }
        let mut input = input;
        if input.crouch != self.input.crouch {
            if input.crouch {
                if !self.airborne {
                    self.position.z += CROUCH_DROP;
                }
            } else if local {
                if !self.try_uncrouch(map, true) {
                    input.crouch = true;
                }
            } else if !self.airborne {
                self.position.z -= CROUCH_DROP;
            }
        }
        self.input = input;
        input
    }

    pub fn set_weapon_input(&mut self, input: WeaponInput) {
        if !self.alive {
            return;
        }
        self.weapon_input = input;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.tool = tool;
        self.holding_grenade = false;
        self.dragging = false;
        self.pending_place = false;
        self.cursor_active = false;
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn weapon_mut(&mut self) -> &mut Weapon {
        &mut self.weapon
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, MAX_HEALTH);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn respawn_time(&self) -> f32 {
        self.respawn_time
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn is_wading(&self) -> bool {
        self.wade
    }

    pub fn last_climb_time(&self) -> f32 {
        self.last_climb_time
    }

    pub fn is_on_ground_or_wade(&self) -> bool {
        let resting = self.velocity.z >= 0.0 && self.velocity.z < ON_GROUND_VELOCITY;
        (resting && !self.airborne) || self.wade
    }

    pub fn is_holding_grenade(&self) -> bool {
        self.holding_grenade
    }

    /// Block cursor target, when it is valid for placement.
    pub fn block_cursor(&self) -> Option<IVec3> {
        self.cursor_active.then_some(self.cursor_pos)
    }

    /// Anchor of the line being dragged.
    pub fn drag_anchor(&self) -> Option<IVec3> {
        self.dragging.then_some(self.drag_pos)
    }

    /// Consumes placed blocks once the server confirms them.
    pub fn use_blocks(&mut self, count: u32) {
        self.block_stock = self.block_stock.saturating_sub(count);
    }

    /// Marks the player dead until `respawn_time`.
    pub fn killed_by(&mut self, respawn_time: f32) {
        self.health = 0;
        self.alive = false;
        self.respawn_time = respawn_time;
        self.input = PlayerInput::default();
        self.weapon_input = WeaponInput::default();
        self.last_weapon_input = WeaponInput::default();
        self.holding_grenade = false;
        self.dragging = false;
        self.pending_place = false;
        self.cursor_active = false;
    }

    /// Brings the player back with full health and restocked equipment.
    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.health = MAX_HEALTH;
        self.alive = true;
        self.airborne = true;
        self.wade = false;
        self.weapon.restock();
        self.grenades = MAX_GRENADES;
        self.block_stock = MAX_BLOCK_STOCK;
    }

    /// Body box used to keep players from building inside themselves.
    pub fn body_box(&self) -> Aabb {
        let (offset, m) = if self.input.crouch { (0.45, 0.9) } else { (0.9, 1.35) };
        let p = self.position;
        Aabb::new(
            Vec3::new(p.x - HALF_WIDTH, p.y - HALF_WIDTH, p.z),
            Vec3::new(p.x + HALF_WIDTH, p.y + HALF_WIDTH, p.z + offset + m - 0.5),
        )
    }

    pub fn overlaps_with_block(&self, block: IVec3) -> bool {
        self.body_box().intersects(&Aabb::voxel(block))
    }

    /// Chebyshev distance from the eye to the block's center.
    pub fn box_distance_to_block(&self, block: IVec3) -> f32 {
        (block.center() - self.eye()).chebyshev_length()
    }

    pub fn hitboxes(&self) -> HitBoxes {
        HitBoxes::new(self.position, self.front, self.input.crouch)
    }

    /// Cheap pre-filter for hit tests: the player is in front of the ray and
    /// within a few blocks of it.
    pub fn ray_cast_approx(&self, start: Vec3, dir: Vec3) -> bool {
        let diff = self.position - start;
        if diff.dot(dir) < 0.0 {
            return false;
        }
        let c = diff.dot(dir);
        let dist_sq = diff.length_squared() - c * c;
        dist_sq < APPROX_HIT_RADIUS * APPROX_HIT_RADIUS
    }

    /// One locked step. Dead players only fall.
    pub fn update(&mut self, ctx: &mut PlayerContext<'_>, dt: f32) {
        if !self.alive {
            self.move_dead(ctx.map, dt);
            return;
        }
        self.move_player(ctx, dt);
        self.update_tool(ctx);
        self.last_weapon_input = self.weapon_input;
    }

    /// Eases `display_front` toward `front`.
    pub fn update_smooth(&mut self, rate: f32, dt: f32) {
        let t = (rate * dt).clamp(0.0, 1.0);
        let f = self.display_front.lerp(self.front, t);
        if f.length_squared() > 1e-12 {
            self.display_front = f.normalized();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spades_map::MapDims;

    fn flat() -> VoxelGrid {
        VoxelGrid::with_ground(MapDims::new(32, 32, 16).unwrap(), 12)
    }

    #[test]
    fn crouch_on_ground_drops_eye() {
        let map = flat();
        let mut p = Player::new(0, 0, WeaponKind::Rifle, Vec3::new(8.5, 8.5, 9.7));
        p.airborne = false;
        let applied = p.set_input(
            PlayerInput {
                crouch: true,
                ..Default::default()
            },
            &map,
            true,
        );
        assert!(applied.crouch);
        assert!((p.position.z - 10.6).abs() < 1e-4);
        let applied = p.set_input(PlayerInput::default(), &map, true);
        assert!(!applied.crouch);
        assert!((p.position.z - 9.7).abs() < 1e-4);
    }

    #[test]
    fn blocked_local_uncrouch_is_rejected() {
        let mut map = flat();
        let mut p = Player::new(0, 0, WeaponKind::Rifle, Vec3::new(8.5, 8.5, 10.6));
        p.airborne = false;
        p.input.crouch = true;
        // low ceiling right above the crouched head
        map.set_quiet(8, 8, 9, true, 0);
        let applied = p.set_input(PlayerInput::default(), &map, true);
        assert!(applied.crouch);
        assert!((p.position.z - 10.6).abs() < 1e-4);

        let applied = p.set_input(PlayerInput::default(), &map, false);
        assert!(!applied.crouch);
    }

    #[test]
    fn overlap_covers_body_not_neighbours() {
        let p = Player::new(0, 0, WeaponKind::Rifle, Vec3::new(8.5, 8.5, 9.7));
        assert!(p.overlaps_with_block(IVec3::new(8, 8, 10)));
        assert!(!p.overlaps_with_block(IVec3::new(10, 8, 10)));
        assert!(!p.overlaps_with_block(IVec3::new(8, 8, 12)));
    }

    #[test]
    fn approx_filter_rejects_behind_and_far() {
        let p = Player::new(0, 0, WeaponKind::Rifle, Vec3::new(10.0, 0.0, 0.0));
        let dir = Vec3::new(1.0, 0.0, 0.0);
        assert!(p.ray_cast_approx(Vec3::ZERO, dir));
        assert!(!p.ray_cast_approx(Vec3::new(20.0, 0.0, 0.0), dir));
        assert!(!p.ray_cast_approx(Vec3::new(0.0, 10.0, 0.0), dir));
    }

    #[test]
    fn killed_clears_inputs() {
        let mut p = Player::new(0, 0, WeaponKind::Smg, Vec3::ZERO);
        p.set_weapon_input(WeaponInput {
            primary: true,
            secondary: false,
        });
        p.killed_by(5.0);
        assert!(!p.is_alive());
        assert_eq!(p.health(), 0);
        assert_eq!(p.weapon_input(), WeaponInput::default());
        assert_eq!(p.respawn_time(), 5.0);
    }
}
