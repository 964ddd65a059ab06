use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("player slot {index} is outside 0..{max}")]
    SlotOutOfRange { index: usize, max: usize },
    #[error("player slot {0} is already occupied")]
    SlotOccupied(usize),
    #[error("invalid world config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("world io: {0}")]
    Io(#[from] std::io::Error),
}
