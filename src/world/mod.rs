//! Zones, the world manager that schedules them, and world population

pub mod driver;
pub mod manager;
pub mod population;
pub mod profiles;
pub mod snapshot;
pub mod zone;

pub use driver::run_tick_loop;
pub use manager::{TickReport, WorldManager};
pub use snapshot::{EntitySnapshot, ZoneSnapshot};
pub use zone::{Zone, ZoneDiagnostics};
