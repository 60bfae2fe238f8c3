pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::SimClock;
pub use config::{PopulationConfig, SimulationConfig, StallPolicy};
pub use error::{Result, SimError};
pub use types::{Direction, EntityId, SimRng, TilePos, ZoneId};
