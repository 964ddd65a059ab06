//! Movement and balance constants. These must match the server's values or
//! client prediction drifts.

/// Upward (negative z) velocity given by a jump.
pub const JUMP_VELOCITY: f32 = -0.36;
/// Minimum time between two "jumped" events.
pub const JUMP_EVENT_COOLDOWN: f32 = 0.1;
/// Vertical speed below which the player counts as standing on something.
pub const ON_GROUND_VELOCITY: f32 = 0.017;

pub const FALL_SLOW_DOWN: f32 = 0.24;
pub const FALL_DAMAGE_VELOCITY: f32 = 0.58;
pub const FALL_DAMAGE_SCALE: f32 = 4096.0;

pub const AIRBORNE_ACCEL: f32 = 0.1;
pub const CROUCH_ACCEL: f32 = 0.3;
pub const SNEAK_ACCEL: f32 = 0.5;
pub const SPRINT_ACCEL: f32 = 1.3;
pub const DIAGONAL_ACCEL: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Ticks per second the legacy integrator was tuned for; velocities are in
/// blocks per tick.
pub const VELOCITY_SCALE: f32 = 32.0;

pub const HALF_WIDTH: f32 = 0.45;
/// Eye to feet distance while standing / crouching.
pub const STAND_HEIGHT: f32 = 2.25;
pub const CROUCH_HEIGHT: f32 = 1.35;
/// Eye height lost when crouching.
pub const CROUCH_DROP: f32 = 0.9;

/// Walked distance is scaled by this; each whole unit is one footstep.
pub const FOOTSTEP_DISTANCE_SCALE: f32 = 0.5;

pub const SPADE_DELAY: f32 = 0.2;
pub const DIG_DELAY: f32 = 1.0;
pub const SPADE_BLOCK_DAMAGE: u8 = 55;
pub const SPADE_RANGE: f32 = 3.0;
pub const MELEE_RANGE: f32 = 3.0;

pub const BLOCK_DELAY: f32 = 0.5;
/// Chebyshev distance from the eye within which blocks can be placed.
pub const BUILD_RANGE: f32 = 3.0;
pub const BUILD_CAST_STEPS: u32 = 12;
pub const MAX_LINE_LENGTH: usize = 256;
pub const MAX_BLOCK_STOCK: u32 = 50;

pub const GRENADE_FUSE: f32 = 3.0;
pub const GRENADE_DELAY: f32 = 0.5;
pub const GRENADE_BOUNCE_DAMPING: f32 = 0.36;
pub const GRENADE_SOUND_VELOCITY: f32 = 0.1;
pub const MAX_GRENADES: u32 = 3;

/// Seconds a damaged block waits before healing.
pub const BLOCK_REGEN_DELAY: f32 = 10.0;

pub const WEAPON_CAST_STEPS: u32 = 256;
/// Bullets ignore blocks farther than this.
pub const WEAPON_BLOCK_RANGE: f32 = 128.0;
/// Players farther than this from a ray are skipped before the box test.
pub const APPROX_HIT_RADIUS: f32 = 4.0;
