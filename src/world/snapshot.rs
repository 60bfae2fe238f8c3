//! Serializable views of zones and entities for external consumers

use serde::{Deserialize, Serialize};

use crate::actions::plan::ActionPlanReport;
use crate::core::types::{Direction, EntityId, TilePos, ZoneId};
use crate::entity::{Entity, EntityState, Item, LogEntry, Stats};
use crate::world::zone::Zone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: TilePos,
    pub facing: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<EntityState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<ActionPlanReport>,
}

impl EntitySnapshot {
    pub fn capture(entity: &Entity, zone: &Zone) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.clone(),
            position: entity.position,
            facing: entity.facing,
            state: entity.state,
            stats: entity.stats.clone(),
            items: entity.inventory.as_ref().map(|inv| inv.items()).unwrap_or_default(),
            activity: entity
                .activity_log
                .as_ref()
                .map(|log| log.entries().cloned().collect())
                .unwrap_or_default(),
            action_plan: entity.plan.as_ref().map(|plan| plan.to_report(zone)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    pub id: ZoneId,
    pub origin: TilePos,
    pub width: i32,
    pub height: i32,
    pub threat_level: f64,
    pub obstacles: Vec<TilePos>,
    pub entities: Vec<EntitySnapshot>,
}

impl ZoneSnapshot {
    pub fn capture(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            origin: zone.origin(),
            width: zone.width(),
            height: zone.height(),
            threat_level: zone.threat_level(),
            obstacles: zone.obstacles().iter().collect(),
            entities: zone
                .entities()
                .map(|e| EntitySnapshot::capture(e, zone))
                .collect(),
        }
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
