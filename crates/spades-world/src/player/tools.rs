use rand::Rng;
use spades_geom::{IVec3, Vec3};

use super::{Player, PlayerAction, PlayerContext, Tool};
use crate::constants::*;
use crate::grenade::Grenade;
use crate::listener::BuildFailureReason;

impl Player {
    pub(super) fn update_tool(&mut self, ctx: &mut PlayerContext<'_>) {
        match self.tool {
            Tool::Spade => self.update_spade(ctx),
            Tool::Block => {
                if ctx.local {
                    self.update_block(ctx);
                }
            }
            Tool::Grenade => self.update_grenade(ctx),
            Tool::Weapon => self.update_weapon(ctx),
        }
    }

    fn update_spade(&mut self, ctx: &mut PlayerContext<'_>) {
        let input = self.weapon_input;
        if input.primary {
            if ctx.time >= self.next_spade_time {
                ctx.actions.push(PlayerAction::SpadeSwing {
                    origin: self.eye(),
                    dir: self.front,
                });
                self.next_spade_time = ctx.time + SPADE_DELAY;
            }
        } else if input.secondary {
            if !self.last_weapon_input.secondary {
                self.next_dig_time = ctx.time + DIG_DELAY;
            } else if ctx.time >= self.next_dig_time {
                if ctx.local {
                    ctx.actions.push(PlayerAction::Dig {
                        origin: self.eye(),
                        dir: self.front,
                    });
                }
                self.next_dig_time = ctx.time + DIG_DELAY;
            }
        }
    }

    fn update_block(&mut self, ctx: &mut PlayerContext<'_>) {
        let map = ctx.map;
        let depth = map.depth();
        let eye = self.eye();
        let front = self.front;
        let mut result = map.cast_ray2(eye, front, BUILD_CAST_STEPS);
        self.can_pending = false;

        if self.dragging {
            let anchor = self.drag_pos;
            let attached = IVec3::FACES.iter().any(|&o| {
                let n = anchor + o;
                map.is_solid_wrapped(n.x, n.y, n.z)
            });
            if !attached {
                ctx.actions
                    .push(PlayerAction::BuildError(BuildFailureReason::InvalidPosition));
                self.dragging = false;
            }
        }

        let target = result.hit_block + result.normal;
        if result.hit
            && target.z < depth - 2
            && !self.overlaps_with_block(target)
            && self.box_distance_to_block(target) < BUILD_RANGE
            && !self.pending_place
        {
            self.cursor_active = true;
            self.cursor_pos = target;
        } else if self.pending_place {
            // waiting for the jump to bring the pending block into reach
            self.cursor_active = false;
            if !self.airborne || self.block_stock == 0 {
                self.pending_place = false;
                self.single_build_done = true;
            } else if !self.overlaps_with_block(self.pending_pos)
                && self.box_distance_to_block(self.pending_pos) < BUILD_RANGE
            {
                ctx.actions.push(PlayerAction::PlaceBlock(self.pending_pos));
                self.pending_place = false;
                self.single_build_done = true;
                self.next_block_time = ctx.time + BLOCK_DELAY;
            }
        } else {
            self.can_pending = result.hit
                && target.z < depth - 2
                && self.box_distance_to_block(target) < BUILD_RANGE;
            self.cursor_active = false;

            // pull the cursor back into reach, then push it as far as it goes
            let mut steps = BUILD_CAST_STEPS - 1;
            while steps >= 1
                && self.box_distance_to_block(result.hit_block + result.normal) > BUILD_RANGE
            {
                steps -= 1;
                result = map.cast_ray2(eye, front, steps);
            }
            while steps < BUILD_CAST_STEPS
                && self.box_distance_to_block(result.hit_block + result.normal) < BUILD_RANGE
            {
                steps += 1;
                result = map.cast_ray2(eye, front, steps);
            }
            self.cursor_pos = result.hit_block + result.normal;
        }

        let secondary = self.weapon_input.secondary;
        let was_secondary = self.last_weapon_input.secondary;
        if secondary && !was_secondary {
            if self.cursor_active {
                self.dragging = true;
                self.drag_pos = self.cursor_pos;
            } else {
                ctx.actions
                    .push(PlayerAction::BuildError(BuildFailureReason::InvalidPosition));
            }
        } else if !secondary && was_secondary && self.dragging {
            self.dragging = false;
            if self.cursor_active {
                let blocks = map.cube_line(self.drag_pos, self.cursor_pos, MAX_LINE_LENGTH);
                if blocks.len() as u32 <= self.block_stock {
                    ctx.actions.push(PlayerAction::BuildLine {
                        from: self.drag_pos,
                        to: self.cursor_pos,
                    });
                } else {
                    ctx.actions.push(PlayerAction::BuildError(
                        BuildFailureReason::InsufficientBlocks,
                    ));
                }
                self.next_block_time = ctx.time + BLOCK_DELAY;
            } else {
                ctx.actions
                    .push(PlayerAction::BuildError(BuildFailureReason::InvalidPosition));
            }
        }

        if self.weapon_input.primary {
            if !self.single_build_done && ctx.time >= self.next_block_time && !self.dragging {
                if self.cursor_active && self.block_stock > 0 {
                    ctx.actions.push(PlayerAction::PlaceBlock(self.cursor_pos));
                    self.single_build_done = true;
                    self.next_block_time = ctx.time + BLOCK_DELAY;
                } else if self.block_stock > 0
                    && self.airborne
                    && self.can_pending
                    && !self.pending_place
                {
                    self.pending_place = true;
                    self.pending_pos = self.cursor_pos;
                } else if !self.cursor_active {
                    ctx.actions
                        .push(PlayerAction::BuildError(BuildFailureReason::InvalidPosition));
                    self.single_build_done = true;
                }
            }
        } else {
            self.single_build_done = false;
        }
    }

    fn update_grenade(&mut self, ctx: &mut PlayerContext<'_>) {
        if self.weapon_input.primary
            && !self.holding_grenade
            && self.grenades > 0
            && ctx.time >= self.next_grenade_time
        {
            self.holding_grenade = true;
            self.grenade_cook_start = ctx.time;
        }
        if !self.holding_grenade {
            return;
        }
        let cooked = ctx.time - self.grenade_cook_start;
        if !self.weapon_input.primary || cooked >= GRENADE_FUSE {
            self.throw_grenade(ctx, cooked);
        }
    }

    fn throw_grenade(&mut self, ctx: &mut PlayerContext<'_>, cooked: f32) {
        self.holding_grenade = false;
        self.grenades = self.grenades.saturating_sub(1);
        self.next_grenade_time = ctx.time + GRENADE_DELAY;
        let fuse = GRENADE_FUSE - cooked;
        // remote grenades arrive from the server through `World::add_grenade`
        let grenade = (ctx.local && fuse > 0.0).then(|| {
            let mut g = Grenade::new(
                self.eye() + self.front * 0.1,
                self.front + self.velocity,
                fuse,
            );
            g.thrower = Some(self.id);
            g
        });
        ctx.actions.push(PlayerAction::ThrowGrenade(grenade));
    }

    fn update_weapon(&mut self, ctx: &mut PlayerContext<'_>) {
        let tick = self.weapon.tick(ctx.time, self.weapon_input.primary);
        if tick.fired {
            let kind = self.weapon.kind();
            let mut spread = kind.spread();
            if !self.weapon_input.secondary {
                spread *= 2.0;
            }
            let mut dirs = Vec::with_capacity(kind.pellets() as usize);
            for _ in 0..kind.pellets() {
                let mut jitter = || ctx.rng.gen_range(0.0f32..1.0) - ctx.rng.gen_range(0.0f32..1.0);
                let d = self.front + Vec3::new(jitter(), jitter(), jitter()) * spread;
                dirs.push(d.normalized());
            }
            ctx.actions.push(PlayerAction::FireWeapon {
                muzzle: self.eye(),
                dirs,
                kind,
            });
        }
        if tick.dry_fired {
            ctx.actions.push(PlayerAction::DryFire);
        }
        if tick.reloaded {
            ctx.actions.push(PlayerAction::Reloaded);
        }
    }

    /// Starts a reload of the held weapon.
    pub fn reload(&mut self, now: f32) -> bool {
        self.alive && self.weapon.reload(now)
    }
}
