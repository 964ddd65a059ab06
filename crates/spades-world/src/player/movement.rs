use spades_geom::Vec3;
use spades_map::VoxelGrid;

use super::{Player, PlayerAction, PlayerContext, Tool};
use crate::constants::*;
use crate::grenade::ballistic_step;

// Corpses lose half their speed on every bounce.
const CORPSE_BOUNCE_DAMPING: f32 = 0.5;

impl Player {
    /// Checks whether a crouching player has room to stand. Airborne players
    /// stand by lowering their feet; grounded ones raise their head, moving
    /// the eye up when `apply` is set.
    pub fn try_uncrouch(&mut self, map: &VoxelGrid, apply: bool) -> bool {
        let p = self.position;
        let x1 = p.x + HALF_WIDTH;
        let x2 = p.x - HALF_WIDTH;
        let y1 = p.y + HALF_WIDTH;
        let y2 = p.y - HALF_WIDTH;
        let corners_clear = |z: f32| {
            !(map.clip_box_f(x1, y1, z)
                || map.clip_box_f(x2, y1, z)
                || map.clip_box_f(x1, y2, z)
                || map.clip_box_f(x2, y2, z))
        };
        if self.airborne && corners_clear(p.z + STAND_HEIGHT) {
            return true;
        }
        if corners_clear(p.z - CROUCH_HEIGHT) {
            if apply {
                self.position.z -= CROUCH_DROP;
            }
            return true;
        }
        false
    }

    /// Input driven acceleration, friction, gravity and collision for one step.
    pub(super) fn move_player(&mut self, ctx: &mut PlayerContext<'_>, dt: f32) {
        let input = self.input;

        if input.jump && !self.last_jump && self.is_on_ground_or_wade() {
            self.velocity.z = JUMP_VELOCITY;
            self.last_jump = true;
            if ctx.time > self.last_jump_time + JUMP_EVENT_COOLDOWN {
                ctx.actions.push(PlayerAction::Jumped);
                self.last_jump_time = ctx.time;
            }
        } else if !input.jump {
            self.last_jump = false;
        }

        let scoped = self.tool == Tool::Weapon && self.weapon_input.secondary;
        let mut f = dt;
        if self.airborne {
            f *= AIRBORNE_ACCEL;
        } else if input.crouch {
            f *= CROUCH_ACCEL;
        } else if scoped || input.sneak {
            f *= SNEAK_ACCEL;
        } else if input.sprint {
            f *= SPRINT_ACCEL;
        }
        if (input.move_forward || input.move_backward) && (input.move_left || input.move_right) {
            f *= DIAGONAL_ACCEL;
        }

        let front = self.front;
        if input.move_forward {
            self.velocity.x += front.x * f;
            self.velocity.y += front.y * f;
        } else if input.move_backward {
            self.velocity.x -= front.x * f;
            self.velocity.y -= front.y * f;
        }
        let right = self.right();
        if input.move_left {
            self.velocity.x -= right.x * f;
            self.velocity.y -= right.y * f;
        } else if input.move_right {
            self.velocity.x += right.x * f;
            self.velocity.y += right.y * f;
        }

        let mut f = dt + 1.0;
        self.velocity.z += dt;
        self.velocity.z /= f;
        if self.wade {
            f = dt * 6.0 + 1.0;
        } else if !self.airborne {
            f = dt * 4.0 + 1.0;
        }
        self.velocity.x /= f;
        self.velocity.y /= f;

        let f2 = self.velocity.z;
        let before = self.position;
        self.box_clip_move(ctx.map, ctx.time, dt);

        if self.velocity.z == 0.0 && f2 > FALL_SLOW_DOWN {
            self.velocity.x *= 0.5;
            self.velocity.y *= 0.5;
            if f2 > FALL_DAMAGE_VELOCITY {
                let over = f2 - FALL_DAMAGE_VELOCITY;
                let damage = (over * over * FALL_DAMAGE_SCALE) as i32;
                ctx.actions.push(PlayerAction::Landed { hurt: true, damage });
            } else {
                ctx.actions.push(PlayerAction::Landed {
                    hurt: false,
                    damage: 0,
                });
            }
        }

        if self.velocity.z >= 0.0 && self.velocity.z < ON_GROUND_VELOCITY && !self.airborne {
            let dx = self.position.x - before.x;
            let dy = self.position.y - before.y;
            if !input.crouch && !input.sneak {
                self.move_distance += (dx * dx + dy * dy).sqrt() * FOOTSTEP_DISTANCE_SCALE;
            }
            if self.move_distance >= 1.0 {
                self.move_distance = self.move_distance.fract();
                ctx.actions.push(PlayerAction::Footstep);
            }
        }
    }

    /// Moves by `velocity`, resolving X, then Y, then Z against the map.
    ///
    /// Horizontal axes scan the body column in 0.9 steps. A blocked standing
    /// player that is neither sprinting nor looking steeply down retries the
    /// scan one block higher and climbs when that clears.
    pub fn box_clip_move(&mut self, map: &VoxelGrid, time: f32, dt: f32) {
        let mut climb = false;
        let step = dt * VELOCITY_SCALE;
        let nx = step * self.velocity.x + self.position.x;
        let ny = step * self.velocity.y + self.position.y;
        let crouch = self.input.crouch;
        let (offset, mut m) = if crouch { (0.45, 0.9) } else { (0.9, 1.35) };
        let mut nz = self.position.z + offset;
        let can_climb = !crouch && self.front.z < 0.5 && !self.input.sprint;

        // x
        let f = if self.velocity.x < 0.0 { -HALF_WIDTH } else { HALF_WIDTH };
        let (y, px) = (self.position.y, nx + f);
        let open = |z: f32| {
            !map.clip_box_f(px, y - HALF_WIDTH, nz + z)
                && !map.clip_box_f(px, y + HALF_WIDTH, nz + z)
        };
        if scan_clear(m, -1.36, &open) {
            self.position.x = nx;
        } else if can_climb && scan_clear(0.35, -2.36, &open) {
            self.position.x = nx;
            climb = true;
        } else {
            self.velocity.x = 0.0;
        }

        // y
        let f = if self.velocity.y < 0.0 { -HALF_WIDTH } else { HALF_WIDTH };
        let (x, py) = (self.position.x, ny + f);
        let open = |z: f32| {
            !map.clip_box_f(x - HALF_WIDTH, py, nz + z)
                && !map.clip_box_f(x + HALF_WIDTH, py, nz + z)
        };
        if scan_clear(m, -1.36, &open) {
            self.position.y = ny;
        } else if can_climb && scan_clear(0.35, -2.36, &open) {
            self.position.y = ny;
            climb = true;
        } else {
            self.velocity.y = 0.0;
        }

        // z
        if climb {
            self.velocity.x *= 0.5;
            self.velocity.y *= 0.5;
            self.last_climb_time = time;
            nz -= 1.0;
            m = -1.35;
        } else {
            if self.velocity.z < 0.0 {
                m = -m;
            }
            nz += self.velocity.z * step;
        }

        self.airborne = true;
        let p = self.position;
        let hit = map.clip_box_f(p.x - HALF_WIDTH, p.y - HALF_WIDTH, nz + m)
            || map.clip_box_f(p.x - HALF_WIDTH, p.y + HALF_WIDTH, nz + m)
            || map.clip_box_f(p.x + HALF_WIDTH, p.y - HALF_WIDTH, nz + m)
            || map.clip_box_f(p.x + HALF_WIDTH, p.y + HALF_WIDTH, nz + m);
        if hit {
            if self.velocity.z >= 0.0 {
                self.wade = p.z > (map.depth() - 3) as f32;
                self.airborne = false;
            }
            self.velocity.z = 0.0;
        } else {
            self.position.z = nz - offset;
        }
    }

    /// Ballistic fall for dead players: gravity and damped bounces, no input.
    pub fn move_dead(&mut self, map: &VoxelGrid, dt: f32) {
        // the body point rests near the floor, not at eye height
        let feet = if self.input.crouch { CROUCH_HEIGHT } else { STAND_HEIGHT };
        let mut body = self.position + Vec3::new(0.0, 0.0, feet - 0.5);
        let mut velocity = self.velocity;
        if ballistic_step(map, &mut body, &mut velocity, dt, CORPSE_BOUNCE_DAMPING).is_some() {
            velocity.x *= 0.5;
            velocity.y *= 0.5;
        }
        self.velocity = velocity;
        self.position = body - Vec3::new(0.0, 0.0, feet - 0.5);
    }
}

// Walks `z` from `start` down in 0.9 steps while `open(z)` holds; true when
// the whole column down to `floor` is open.
fn scan_clear(start: f32, floor: f32, open: impl Fn(f32) -> bool) -> bool {
    let mut z = start;
    while z >= floor && open(z) {
        z -= 0.9;
    }
    z < floor
}
