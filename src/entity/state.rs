//! Lifecycle tag carried by entities with a state capability

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    #[default]
    Active,
    Dead,
    Idle,
    Roaming,
    Repairing,
    Building,
    Upgrading,
    /// Depleted resource waiting to restock
    Regrowing,
}

impl EntityState {
    pub fn is_dead(&self) -> bool {
        matches!(self, EntityState::Dead)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Active => "active",
            EntityState::Dead => "dead",
            EntityState::Idle => "idle",
            EntityState::Roaming => "roaming",
            EntityState::Repairing => "repairing",
            EntityState::Building => "building",
            EntityState::Upgrading => "upgrading",
            EntityState::Regrowing => "regrowing",
        }
    }
}
