//! Repairable structures (altars)

use serde::{Deserialize, Serialize};

/// Marks an entity as maintainable while Active and rebuildable while Dead
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Maintenance is refused at or above this fraction of max pulse
    pub repair_threshold: f64,
}

impl Default for Structure {
    fn default() -> Self {
        Self {
            repair_threshold: 0.8,
        }
    }
}
