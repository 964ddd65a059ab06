//! Client world simulation: players, grenades, block batches, regeneration
//! and the events they raise.
#![forbid(unsafe_code)]

pub mod config;
pub mod constants;
mod error;
pub mod gamemode;
mod grenade;
pub mod hitbox;
mod listener;
pub mod player;
mod regen;
pub mod weapon;
mod world;

pub use config::WorldConfig;
pub use error::WorldError;
pub use gamemode::GameMode;
pub use grenade::{Grenade, GrenadeStep};
pub use hitbox::{HitBoxes, HitType};
pub use listener::{BlockActionType, BuildFailureReason, KillType, WorldListener};
pub use player::{
    Player, PlayerAction, PlayerContext, PlayerInput, SPECTATOR_TEAM, Tool, WeaponInput,
};
pub use regen::RegenQueue;
pub use weapon::{Weapon, WeaponKind};
pub use world::{WeaponRayCastResult, World};

pub use spades_geom::{IVec3, Vec3};
pub use spades_map::{MapDims, VoxelGrid};
