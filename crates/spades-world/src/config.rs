use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants;
use crate::error::WorldError;

/// Tunables read from a TOML file; every key is optional.
///
/// ```toml
/// max_players = 32
/// block_regen_delay = 10.0
/// grounding_layer = 63
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub max_players: usize,
    pub block_regen_delay: f32,
    pub respawn_delay: f32,
    /// Anchor layer for ground support; `None` means the map's bottom layer.
    pub grounding_layer: Option<i32>,
    pub rng_seed: u64,
    pub spade_block_damage: u8,
    /// Fraction of the way remote players' display orientation moves
    /// toward the real one per second of smooth update.
    pub smooth_rate: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_players: 32,
            block_regen_delay: constants::BLOCK_REGEN_DELAY,
            respawn_delay: 5.0,
            grounding_layer: None,
            rng_seed: 0x5EED,
            spade_block_damage: constants::SPADE_BLOCK_DAMAGE,
            smooth_rate: 10.0,
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, WorldError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
