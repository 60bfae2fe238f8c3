use thiserror::Error;

use crate::core::types::{EntityId, TilePos, ZoneId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Zone not found: {0}")]
    ZoneNotFound(ZoneId),

    #[error("Position {0} is outside every zone")]
    OutsideWorld(TilePos),

    #[error("Position {0} is not available")]
    PositionUnavailable(TilePos),

    #[error("World has no zones")]
    NoZones,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("World lock poisoned")]
    Poisoned,

    #[error("Tick task failed: {0}")]
    TickTask(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
