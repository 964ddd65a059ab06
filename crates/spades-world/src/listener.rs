use spades_geom::{IVec3, Vec3};

use crate::grenade::Grenade;
use crate::hitbox::HitType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildFailureReason {
    InsufficientBlocks,
    InvalidPosition,
}

/// Block change the local player asks the server for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockActionType {
    Create,
    /// Spade or bullet took the block's health to zero.
    Destroy,
    /// Secondary spade: removes a column of three.
    Dig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillType {
    Weapon,
    Headshot,
    Melee,
    Grenade,
    Fall,
    Other,
}

/// Gameplay events raised by [`crate::World`]. Every method defaults to a
/// no-op. Players are referred to by slot index.
#[allow(unused_variables)]
pub trait WorldListener {
    fn player_jumped(&mut self, player: usize) {}
    /// `damage` is the fall damage the server will apply; zero for soft landings.
    fn player_landed(&mut self, player: usize, hurt: bool, damage: i32) {}
    fn player_made_footstep(&mut self, player: usize) {}
    fn player_fired_weapon(&mut self, player: usize) {}
    fn player_dry_fired_weapon(&mut self, player: usize) {}
    fn player_reloaded(&mut self, player: usize) {}
    /// `None` when the grenade went off in hand.
    fn player_threw_grenade(&mut self, player: usize, grenade: Option<&Grenade>) {}
    fn player_hit_block_with_spade(
        &mut self,
        player: usize,
        hit_pos: Vec3,
        block: IVec3,
        normal: IVec3,
    ) {
    }
    fn player_missed_spade(&mut self, player: usize) {}
    fn player_killed_player(&mut self, killer: usize, victim: usize, kind: KillType) {}
    fn bullet_hit_player(&mut self, shooter: usize, victim: usize, hit: HitType, hit_pos: Vec3) {}
    fn bullet_hit_block(&mut self, hit_pos: Vec3, block: IVec3, normal: IVec3) {}
    fn blocks_fell(&mut self, cells: &[IVec3]) {}
    fn blocks_destroyed(&mut self, cells: &[IVec3]) {}
    fn block_regenerated(&mut self, pos: IVec3) {}
    fn grenade_bounced(&mut self, grenade: &Grenade) {}
    fn grenade_exploded(&mut self, grenade: &Grenade) {}
    fn local_player_block_action(&mut self, pos: IVec3, action: BlockActionType) {}
    fn local_player_created_line_block(&mut self, from: IVec3, to: IVec3) {}
    fn local_player_build_error(&mut self, reason: BuildFailureReason) {}
}
