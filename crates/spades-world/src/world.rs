use std::collections::{BTreeMap, BTreeSet};
use std::mem;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use spades_geom::{IVec3, Vec3};
use spades_map::{VoxelGrid, color};
use spades_support::{Grounding, SupportTracker, clusterize_blocks};

use crate::config::WorldConfig;
use crate::constants::{
    BUILD_CAST_STEPS, BUILD_RANGE, MAX_LINE_LENGTH, MELEE_RANGE, SPADE_RANGE, WEAPON_BLOCK_RANGE,
    WEAPON_CAST_STEPS,
};
use crate::error::WorldError;
use crate::gamemode::GameMode;
use crate::grenade::{Grenade, GrenadeStep};
use crate::hitbox::HitType;
use crate::listener::{BlockActionType, KillType, WorldListener};
use crate::player::{Player, PlayerAction, PlayerContext, PlayerInput, WeaponInput};
use crate::regen::RegenQueue;
use crate::weapon::WeaponKind;

// Spade swings look this many voxels ahead before the range check.
const SPADE_CAST_STEPS: u32 = 32;

/// Outcome of [`World::weapon_ray_cast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponRayCastResult {
    pub hit: bool,
    pub start_solid: bool,
    /// Slot and body part, when a player was hit before any terrain.
    pub player: Option<(usize, HitType)>,
    pub hit_pos: Vec3,
    pub block: IVec3,
    pub normal: IVec3,
}

fn notify(listener: &mut Option<Box<dyn WorldListener>>, f: impl FnOnce(&mut dyn WorldListener)) {
    if let Some(l) = listener.as_deref_mut() {
        f(l);
    }
}

/// The client-side game world.
///
/// Everything that changes during play happens inside [`World::advance`],
/// which runs one locked step in a fixed order. Network handlers queue block
/// changes with [`World::create_block`] and [`World::destroy_blocks`]; they
/// land at the start of the next step.
pub struct World {
    config: WorldConfig,
    map: VoxelGrid,
    support: SupportTracker,
    // set by `map_mut`; support is rebuilt before the next block batch
    support_stale: bool,
    players: Vec<Option<Player>>,
    local_player: Option<usize>,
    grenades: Vec<Grenade>,
    mode: Option<GameMode>,
    regen: RegenQueue,
    pending_creates: BTreeMap<IVec3, u32>,
    pending_destroys: BTreeSet<IVec3>,
    time: f32,
    rng: StdRng,
    listener: Option<Box<dyn WorldListener>>,
}

impl World {
    pub fn new(map: VoxelGrid, config: WorldConfig) -> Self {
        let support = SupportTracker::new(&map, grounding_for(&map, &config));
        let players = (0..config.max_players).map(|_| None).collect();
        let rng = StdRng::seed_from_u64(config.rng_seed);
        Self {
            config,
            map,
            support,
            support_stale: false,
            players,
            local_player: None,
            grenades: Vec::new(),
            mode: None,
            regen: RegenQueue::new(),
            pending_creates: BTreeMap::new(),
            pending_destroys: BTreeSet::new(),
            time: 0.0,
            rng,
            listener: None,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn map(&self) -> &VoxelGrid {
        &self.map
    }

    /// Direct grid access. Ground support is rebuilt from the edited grid
    /// at the start of the next [`World::advance`], or right away through
    /// [`World::rebuild_support`].
    pub fn map_mut(&mut self) -> &mut VoxelGrid {
        self.support_stale = true;
        &mut self.map
    }

    /// Swaps in a new map, dropping pending block work and regeneration.
    pub fn set_map(&mut self, map: VoxelGrid) {
        let t0 = Instant::now();
        self.map = map;
        self.support = SupportTracker::new(&self.map, grounding_for(&self.map, &self.config));
        self.support_stale = false;
        self.pending_creates.clear();
        self.pending_destroys.clear();
        self.regen.clear();
        self.grenades.clear();
        log::info!(
            target: "perf",
            "ms={} world_set_map dims={} supported={}",
            t0.elapsed().as_millis(),
            self.map.dims(),
            self.support.supported_count()
        );
    }

    pub fn rebuild_support(&mut self) {
        self.support.rebuild(&self.map);
        self.support_stale = false;
    }

    /// Support as of the last rebuild or block batch.
    pub fn support(&self) -> &SupportTracker {
        &self.support
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn WorldListener>>) {
        self.listener = listener;
    }

    pub fn mode(&self) -> Option<&GameMode> {
        self.mode.as_ref()
    }

    pub fn mode_mut(&mut self) -> Option<&mut GameMode> {
        self.mode.as_mut()
    }

    pub fn set_mode(&mut self, mode: Option<GameMode>) {
        self.mode = mode;
    }

    pub fn max_players(&self) -> usize {
        self.players.len()
    }

    fn check_slot(&self, index: usize) -> Result<(), WorldError> {
        if index < self.players.len() {
            Ok(())
        } else {
            Err(WorldError::SlotOutOfRange {
                index,
                max: self.players.len(),
            })
        }
    }

    pub fn player(&self, index: usize) -> Result<Option<&Player>, WorldError> {
        self.check_slot(index)?;
        Ok(self.players[index].as_ref())
    }

    pub fn player_mut(&mut self, index: usize) -> Result<Option<&mut Player>, WorldError> {
        self.check_slot(index)?;
        Ok(self.players[index].as_mut())
    }

    pub fn players(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    /// Puts a player into an empty slot.
    pub fn set_player(&mut self, index: usize, player: Player) -> Result<(), WorldError> {
        self.check_slot(index)?;
        if self.players[index].is_some() {
            return Err(WorldError::SlotOccupied(index));
        }
        log::debug!(target: "events", "player_join slot={index} team={}", player.team());
        self.players[index] = Some(player);
        Ok(())
    }

    pub fn remove_player(&mut self, index: usize) -> Result<Option<Player>, WorldError> {
        self.check_slot(index)?;
        if self.local_player == Some(index) {
            self.local_player = None;
        }
        let removed = self.players[index].take();
        if removed.is_some() {
            log::debug!(target: "events", "player_leave slot={index}");
        }
        Ok(removed)
    }

    pub fn set_local_player(&mut self, index: Option<usize>) -> Result<(), WorldError> {
        if let Some(i) = index {
            self.check_slot(i)?;
        }
        self.local_player = index;
        Ok(())
    }

    pub fn local_player_index(&self) -> Option<usize> {
        self.local_player
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.local_player.and_then(|i| self.players[i].as_ref())
    }

    /// Applies movement keys through the crouch rules. Returns the input that
    /// took effect, which differs from `input` when a local uncrouch is blocked.
    pub fn set_player_input(
        &mut self,
        index: usize,
        input: PlayerInput,
    ) -> Result<Option<PlayerInput>, WorldError> {
        self.check_slot(index)?;
        let local = self.local_player == Some(index);
        Ok(self.players[index]
            .as_mut()
            .map(|p| p.set_input(input, &self.map, local)))
    }

    pub fn set_weapon_input(&mut self, index: usize, input: WeaponInput) -> Result<(), WorldError> {
        if let Some(p) = self.player_mut(index)? {
            p.set_weapon_input(input);
        }
        Ok(())
    }

    /// Kills `victim` and reports it. `killer` defaults to the victim.
    pub fn kill_player(
        &mut self,
        victim: usize,
        killer: Option<usize>,
        kind: KillType,
    ) -> Result<(), WorldError> {
        self.check_slot(victim)?;
        if let Some(k) = killer {
            self.check_slot(k)?;
        }
        let respawn = self.time + self.config.respawn_delay;
        let Some(p) = self.players[victim].as_mut() else {
            return Ok(());
        };
        p.killed_by(respawn);
        let killer = killer.unwrap_or(victim);
        log::debug!(
            target: "events",
            "player_killed victim={victim} killer={killer} kind={kind:?}"
        );
        notify(&mut self.listener, |l| l.player_killed_player(killer, victim, kind));
        Ok(())
    }

    pub fn grenades(&self) -> &[Grenade] {
        &self.grenades
    }

    pub fn add_grenade(&mut self, grenade: Grenade) {
        self.grenades.push(grenade);
    }

    /// Queues a block for the next step. Out-of-range cells are ignored.
    pub fn create_block(&mut self, pos: IVec3, color: u32) {
        if !self.map.in_bounds(pos.x, pos.y, pos.z) {
            return;
        }
        self.pending_destroys.remove(&pos);
        self.pending_creates.insert(pos, color);
    }

    /// Queues cells for removal. Out-of-range cells and the two indestructible
    /// bottom layers are ignored.
    pub fn destroy_blocks(&mut self, cells: &[IVec3]) {
        let floor = self.map.depth() - 2;
        for &p in cells {
            if self.map.in_bounds(p.x, p.y, p.z) && p.z < floor {
                self.pending_destroys.insert(p);
            }
        }
    }

    /// Lowers a solid block's health and schedules its regeneration.
    /// Returns the new health, or `None` when there is no block.
    pub fn damage_block(&mut self, pos: IVec3, amount: u8) -> Option<u8> {
        if !self.map.in_bounds(pos.x, pos.y, pos.z) || !self.map.is_solid(pos.x, pos.y, pos.z) {
            return None;
        }
        let c = self.map.color(pos.x, pos.y, pos.z);
        let health = color::health(c).saturating_sub(amount);
        self.map
            .set(pos.x, pos.y, pos.z, true, color::with_health(c, health));
        self.mark_block_for_regeneration(pos);
        Some(health)
    }

    pub fn mark_block_for_regeneration(&mut self, pos: IVec3) {
        let due = self.time + self.config.block_regen_delay;
        self.regen.schedule(pos, f64::from(due));
    }

    pub fn unmark_block_for_regeneration(&mut self, pos: IVec3) {
        self.regen.cancel(pos);
    }

    pub fn regen_queue(&self) -> &RegenQueue {
        &self.regen
    }

    pub fn cube_line(&self, from: IVec3, to: IVec3) -> Vec<IVec3> {
        self.map.cube_line(from, to, MAX_LINE_LENGTH)
    }

    /// Casts a bullet: the nearest of the first solid voxel and any live
    /// player's hit boxes. `exclude` is the shooter.
    pub fn weapon_ray_cast(
        &self,
        start: Vec3,
        dir: Vec3,
        exclude: Option<usize>,
    ) -> WeaponRayCastResult {
        let dir = dir.normalized();
        let terrain = self.map.cast_ray2(start, dir, WEAPON_CAST_STEPS);
        if terrain.start_solid {
            return WeaponRayCastResult {
                hit: false,
                start_solid: true,
                player: None,
                hit_pos: start,
                block: terrain.hit_block,
                normal: IVec3::ZERO,
            };
        }
        let block_dist = if terrain.hit {
            (terrain.hit_pos - start).length()
        } else {
            f32::INFINITY
        };

        let mut best: Option<(usize, HitType, Vec3, f32)> = None;
        for (i, p) in self.players() {
            if Some(i) == exclude || !p.is_alive() || p.is_spectator() {
                continue;
            }
            if !p.ray_cast_approx(start, dir) {
                continue;
            }
            if let Some((kind, pos)) = p.hitboxes().ray_cast(start, dir) {
                let d = (pos - start).length();
                if d < block_dist && best.is_none_or(|b| d < b.3) {
                    best = Some((i, kind, pos, d));
                }
            }
        }

        if let Some((i, kind, pos, _)) = best {
            return WeaponRayCastResult {
                hit: true,
                start_solid: false,
                player: Some((i, kind)),
                hit_pos: pos,
                block: pos.floor(),
                normal: IVec3::ZERO,
            };
        }
        let hit = terrain.hit && block_dist <= WEAPON_BLOCK_RANGE;
        WeaponRayCastResult {
            hit,
            start_solid: false,
            player: None,
            hit_pos: terrain.hit_pos,
            block: terrain.hit_block,
            normal: terrain.normal,
        }
    }

    /// One locked simulation step.
    pub fn advance(&mut self, dt: f32) {
        self.apply_block_actions();

        let mut actions = Vec::new();
        for i in 0..self.players.len() {
            let Some(player) = self.players[i].as_mut() else {
                continue;
            };
            if player.is_spectator() {
                continue;
            }
            let mut ctx = PlayerContext {
                map: &self.map,
                time: self.time,
                rng: &mut self.rng,
                local: self.local_player == Some(i),
                actions: &mut actions,
            };
            player.update(&mut ctx, dt);
            for action in actions.drain(..) {
                self.resolve_action(i, action);
            }
        }

        self.regenerate_blocks();
        self.update_grenades(dt);
        self.time += dt;
    }

    /// Display-only smoothing for remote players; the locked step never
    /// reads what this writes.
    pub fn update_smooth(&mut self, dt: f32) {
        let rate = self.config.smooth_rate;
        for (i, slot) in self.players.iter_mut().enumerate() {
            if self.local_player == Some(i) {
                continue;
            }
            if let Some(p) = slot {
                p.update_smooth(rate, dt);
            }
        }
    }

    fn apply_block_actions(&mut self) {
        if self.support_stale {
            log::debug!(target: "events", "support_rebuild after direct map edits");
            self.rebuild_support();
        }
        let creates = mem::take(&mut self.pending_creates);
        for (pos, c) in creates {
            self.regen.cancel(pos);
            let c = color::with_health(c, color::MAX_HEALTH);
            self.support.add_block(&mut self.map, pos, c);
        }

        if self.pending_destroys.is_empty() {
            return;
        }
        let cells: Vec<IVec3> = mem::take(&mut self.pending_destroys).into_iter().collect();
        let removed: Vec<IVec3> = cells
            .iter()
            .copied()
            .filter(|p| self.map.is_solid(p.x, p.y, p.z))
            .collect();
        let floating = self.support.remove_blocks(&mut self.map, &cells);
        for &p in &removed {
            self.regen.cancel(p);
        }
        if !removed.is_empty() {
            log::debug!(target: "events", "blocks_destroyed count={}", removed.len());
            notify(&mut self.listener, |l| l.blocks_destroyed(&removed));
        }

        for cluster in clusterize_blocks(&floating) {
            for &p in &cluster {
                self.map.set(p.x, p.y, p.z, false, 0);
                self.regen.cancel(p);
            }
            log::debug!(target: "events", "blocks_fell count={}", cluster.len());
            notify(&mut self.listener, |l| l.blocks_fell(&cluster));
        }
    }

    fn resolve_action(&mut self, i: usize, action: PlayerAction) {
        let listener = &mut self.listener;
        match action {
            PlayerAction::Jumped => notify(listener, |l| l.player_jumped(i)),
            PlayerAction::Landed { hurt, damage } => {
                log::debug!(target: "events", "player_landed slot={i} hurt={hurt} damage={damage}");
                notify(listener, |l| l.player_landed(i, hurt, damage));
            }
            PlayerAction::Footstep => notify(listener, |l| l.player_made_footstep(i)),
            PlayerAction::SpadeSwing { origin, dir } => self.resolve_spade(i, origin, dir),
            PlayerAction::Dig { origin, dir } => self.resolve_dig(i, origin, dir),
            PlayerAction::PlaceBlock(pos) => {
                notify(listener, |l| l.local_player_block_action(pos, BlockActionType::Create));
            }
            PlayerAction::BuildLine { from, to } => {
                notify(listener, |l| l.local_player_created_line_block(from, to));
            }
            PlayerAction::BuildError(reason) => {
                log::debug!(target: "events", "build_error slot={i} reason={reason:?}");
                notify(listener, |l| l.local_player_build_error(reason));
            }
            PlayerAction::FireWeapon { muzzle, dirs, kind } => {
                notify(listener, |l| l.player_fired_weapon(i));
                for dir in dirs {
                    self.resolve_bullet(i, muzzle, dir, kind);
                }
            }
            PlayerAction::DryFire => notify(listener, |l| l.player_dry_fired_weapon(i)),
            PlayerAction::Reloaded => notify(listener, |l| l.player_reloaded(i)),
            PlayerAction::ThrowGrenade(grenade) => {
                notify(listener, |l| l.player_threw_grenade(i, grenade.as_ref()));
                if let Some(g) = grenade {
                    self.grenades.push(g);
                }
            }
        }
    }

    // Nearest live player within reach of the swing, if any.
    fn melee_target(&self, i: usize, origin: Vec3, dir: Vec3) -> Option<(usize, Vec3)> {
        let mut best: Option<(usize, Vec3, f32)> = None;
        for (j, p) in self.players() {
            if j == i || !p.is_alive() || p.is_spectator() {
                continue;
            }
            if (p.eye() - origin).length() > MELEE_RANGE || !p.ray_cast_approx(origin, dir) {
                continue;
            }
            if let Some((_, pos)) = p.hitboxes().ray_cast(origin, dir) {
                let d = (pos - origin).length();
                if d <= MELEE_RANGE && best.is_none_or(|b| d < b.2) {
                    best = Some((j, pos, d));
                }
            }
        }
        best.map(|(j, pos, _)| (j, pos))
    }

    fn resolve_spade(&mut self, i: usize, origin: Vec3, dir: Vec3) {
        if let Some((victim, pos)) = self.melee_target(i, origin, dir) {
            log::debug!(target: "events", "melee_hit slot={i} victim={victim}");
            notify(&mut self.listener, |l| l.bullet_hit_player(i, victim, HitType::Melee, pos));
            return;
        }
        let r = self.map.cast_ray2(origin, dir, SPADE_CAST_STEPS);
        let in_reach = (r.hit_block.center() - origin).length() <= SPADE_RANGE;
        if !(r.hit && in_reach && r.hit_block.z < self.map.depth() - 2) {
            notify(&mut self.listener, |l| l.player_missed_spade(i));
            return;
        }
        let health = self.damage_block(r.hit_block, self.config.spade_block_damage);
        notify(&mut self.listener, |l| {
            l.player_hit_block_with_spade(i, r.hit_pos, r.hit_block, r.normal)
        });
        if health == Some(0) && self.local_player == Some(i) {
            notify(&mut self.listener, |l| {
                l.local_player_block_action(r.hit_block, BlockActionType::Destroy)
            });
        }
    }

    fn resolve_dig(&mut self, i: usize, origin: Vec3, dir: Vec3) {
        let r = self.map.cast_ray2(origin, dir, BUILD_CAST_STEPS);
        let dist = (r.hit_block.center() - origin).chebyshev_length();
        if r.hit && dist < BUILD_RANGE && r.hit_block.z < self.map.depth() - 2 {
            notify(&mut self.listener, |l| {
                l.local_player_block_action(r.hit_block, BlockActionType::Dig);
                l.player_hit_block_with_spade(i, r.hit_pos, r.hit_block, r.normal);
            });
        } else {
            notify(&mut self.listener, |l| l.player_missed_spade(i));
        }
    }

    fn resolve_bullet(&mut self, i: usize, muzzle: Vec3, dir: Vec3, kind: WeaponKind) {
        let r = self.weapon_ray_cast(muzzle, dir, Some(i));
        if let Some((victim, hit)) = r.player {
            log::debug!(
                target: "events",
                "bullet_hit_player slot={i} victim={victim} part={hit:?} damage={}",
                kind.damage(hit)
            );
            notify(&mut self.listener, |l| l.bullet_hit_player(i, victim, hit, r.hit_pos));
            return;
        }
        if !r.hit || r.block.z >= self.map.depth() - 2 {
            return;
        }
        notify(&mut self.listener, |l| l.bullet_hit_block(r.hit_pos, r.block, r.normal));
        let health = self.damage_block(r.block, kind.block_damage());
        if health == Some(0) && self.local_player == Some(i) {
            notify(&mut self.listener, |l| {
                l.local_player_block_action(r.block, BlockActionType::Destroy)
            });
        }
    }

    fn regenerate_blocks(&mut self) {
        while let Some(p) = self.regen.pop_due(f64::from(self.time)) {
            if !self.map.in_bounds(p.x, p.y, p.z) || !self.map.is_solid(p.x, p.y, p.z) {
                continue;
            }
            let c = self.map.color(p.x, p.y, p.z);
            self.map
                .set(p.x, p.y, p.z, true, color::with_health(c, color::MAX_HEALTH));
            notify(&mut self.listener, |l| l.block_regenerated(p));
        }
    }

    fn update_grenades(&mut self, dt: f32) {
        let map = &self.map;
        let listener = &mut self.listener;
        self.grenades.retain_mut(|g| match g.update(map, dt) {
            GrenadeStep::Flying => true,
            GrenadeStep::Bounced { audible } => {
                if audible {
                    notify(listener, |l| l.grenade_bounced(g));
                }
                true
            }
            GrenadeStep::Exploded => {
                log::debug!(target: "events", "grenade_exploded pos={:?}", g.position);
                notify(listener, |l| l.grenade_exploded(g));
                false
            }
        });
    }
}

fn grounding_for(map: &VoxelGrid, config: &WorldConfig) -> Grounding {
    match config.grounding_layer {
        Some(layer) => Grounding {
            anchor_layer: layer,
        },
        None => Grounding::bottom(map.dims()),
    }
}
