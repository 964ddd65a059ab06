use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use spades_world::{
    BlockActionType, BuildFailureReason, Grenade, HitType, IVec3, KillType, Vec3, WorldListener,
};

/// Logs world events under the `events` target and keeps per-kind counts.
#[derive(Clone, Default)]
pub struct EventLog {
    counts: Rc<RefCell<HashMap<&'static str, usize>>>,
}

impl EventLog {
    fn bump(&self, kind: &'static str) {
        *self.counts.borrow_mut().entry(kind).or_insert(0) += 1;
    }

    /// Counts sorted by event name.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        let mut v: Vec<_> = self.counts.borrow().iter().map(|(k, n)| (*k, *n)).collect();
        v.sort_unstable();
        v
    }
}

impl WorldListener for EventLog {
    fn player_jumped(&mut self, player: usize) {
        log::trace!(target: "events", "jump slot={player}");
        self.bump("jumped");
    }

    fn player_landed(&mut self, player: usize, hurt: bool, damage: i32) {
        log::debug!(target: "events", "land slot={player} hurt={hurt} damage={damage}");
        self.bump(if hurt { "landed_hurt" } else { "landed" });
    }

    fn player_made_footstep(&mut self, _player: usize) {
        self.bump("footstep");
    }

    fn player_fired_weapon(&mut self, player: usize) {
        log::trace!(target: "events", "fire slot={player}");
        self.bump("fired");
    }

    fn player_dry_fired_weapon(&mut self, _player: usize) {
        self.bump("dry_fired");
    }

    fn player_reloaded(&mut self, player: usize) {
        log::debug!(target: "events", "reloaded slot={player}");
        self.bump("reloaded");
    }

    fn player_threw_grenade(&mut self, player: usize, grenade: Option<&Grenade>) {
        log::debug!(target: "events", "grenade slot={player} live={}", grenade.is_some());
        self.bump("grenade_thrown");
    }

    fn player_hit_block_with_spade(
        &mut self,
        player: usize,
        _hit_pos: Vec3,
        block: IVec3,
        _normal: IVec3,
    ) {
        log::debug!(target: "events", "spade slot={player} block={block:?}");
        self.bump("spade_hit");
    }

    fn player_missed_spade(&mut self, _player: usize) {
        self.bump("spade_miss");
    }

    fn player_killed_player(&mut self, killer: usize, victim: usize, kind: KillType) {
        log::info!(target: "events", "kill killer={killer} victim={victim} kind={kind:?}");
        self.bump("kill");
    }

    fn bullet_hit_player(&mut self, shooter: usize, victim: usize, hit: HitType, _hit_pos: Vec3) {
        log::info!(target: "events", "hit shooter={shooter} victim={victim} part={hit:?}");
        self.bump("player_hit");
    }

    fn bullet_hit_block(&mut self, _hit_pos: Vec3, _block: IVec3, _normal: IVec3) {
        self.bump("block_hit");
    }

    fn blocks_fell(&mut self, cells: &[IVec3]) {
        log::info!(target: "events", "fell count={}", cells.len());
        self.bump("fell");
    }

    fn blocks_destroyed(&mut self, cells: &[IVec3]) {
        log::debug!(target: "events", "destroyed count={}", cells.len());
        self.bump("destroyed");
    }

    fn block_regenerated(&mut self, _pos: IVec3) {
        self.bump("regenerated");
    }

    fn grenade_bounced(&mut self, _grenade: &Grenade) {
        self.bump("grenade_bounced");
    }

    fn grenade_exploded(&mut self, grenade: &Grenade) {
        log::info!(target: "events", "explosion pos={:?}", grenade.position);
        self.bump("grenade_exploded");
    }

    fn local_player_block_action(&mut self, pos: IVec3, action: BlockActionType) {
        log::debug!(target: "events", "block_action pos={pos:?} action={action:?}");
        self.bump("block_action");
    }

    fn local_player_created_line_block(&mut self, from: IVec3, to: IVec3) {
        log::debug!(target: "events", "line from={from:?} to={to:?}");
        self.bump("line");
    }

    fn local_player_build_error(&mut self, reason: BuildFailureReason) {
        log::debug!(target: "events", "build_error reason={reason:?}");
        self.bump("build_error");
    }
}
