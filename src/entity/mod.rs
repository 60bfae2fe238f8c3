//! Entities and their optional capabilities
//!
//! An entity is a type tag, a tile position and a fixed set of optional
//! components. The component set is decided at construction, so capability
//! checks are plain `Option` tests.

pub mod activity_log;
pub mod buff;
pub mod inventory;
pub mod jobs;
pub mod resource;
pub mod spawner;
pub mod state;
pub mod stats;
pub mod structure;
pub mod trader;

use std::time::Duration;

use crate::actions::catalog::ActionKind;
use crate::actions::plan::ActionPlan;
use crate::core::types::{Direction, EntityId, TilePos, ZoneId};

pub use activity_log::{ActivityLog, LogEntry};
pub use buff::{BuffProvider, SpeedBuff};
pub use inventory::{Inventory, Item, CURRENCY};
pub use jobs::Job;
pub use resource::{RegrowRule, ResourceKind, ResourceNode};
pub use spawner::Spawner;
pub use state::EntityState;
pub use stats::{Stat, Stats, MISSING_STAT};
pub use structure::Structure;
pub use trader::{Offer, Trader};

/// Capabilities an entity may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Stats,
    Inventory,
    ActivityLog,
    Trader,
    State,
    Resource,
    Structure,
    BuffConsumer,
    BuffProvider,
    Spawner,
    Plan,
}

#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: String,
    pub position: TilePos,
    pub facing: Direction,
    /// Owning zone, set while the entity is registered with one
    pub zone: Option<ZoneId>,

    pub stats: Option<Stats>,
    pub inventory: Option<Inventory>,
    pub activity_log: Option<ActivityLog>,
    pub trader: Option<Trader>,
    pub state: Option<EntityState>,
    pub resource: Option<ResourceNode>,
    pub structure: Option<Structure>,
    pub speed_buff: Option<SpeedBuff>,
    pub buff_provider: Option<BuffProvider>,
    pub spawner: Option<Spawner>,
    pub job: Option<Job>,
    pub plan: Option<ActionPlan>,

    /// Remove from the zone once the state turns Dead
    pub despawn_on_death: bool,
    /// Number of zone updates this entity has received
    pub updates: u64,
}

impl Entity {
    pub fn new(kind: &str, position: TilePos) -> Self {
        Self {
            id: EntityId::new(),
            kind: kind.to_string(),
            position,
            facing: Direction::default(),
            zone: None,
            stats: None,
            inventory: None,
            activity_log: None,
            trader: None,
            state: None,
            resource: None,
            structure: None,
            speed_buff: None,
            buff_provider: None,
            spawner: None,
            job: None,
            plan: None,
            despawn_on_death: false,
            updates: 0,
        }
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_activity_log(mut self, capacity: usize) -> Self {
        self.activity_log = Some(ActivityLog::new(capacity));
        self
    }

    pub fn with_trader(mut self, trader: Trader) -> Self {
        self.trader = Some(trader);
        self
    }

    pub fn with_state(mut self, state: EntityState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_resource(mut self, node: ResourceNode) -> Self {
        self.resource = Some(node);
        self
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_speed_buff(mut self) -> Self {
        self.speed_buff = Some(SpeedBuff::default());
        self
    }

    pub fn with_buff_provider(mut self, provider: BuffProvider) -> Self {
        self.buff_provider = Some(provider);
        self
    }

    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn with_job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_plan(mut self, plan: ActionPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn despawning_on_death(mut self) -> Self {
        self.despawn_on_death = true;
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Stats => self.stats.is_some(),
            Capability::Inventory => self.inventory.is_some(),
            Capability::ActivityLog => self.activity_log.is_some(),
            Capability::Trader => self.trader.is_some(),
            Capability::State => self.state.is_some(),
            Capability::Resource => self.resource.is_some(),
            Capability::Structure => self.structure.is_some(),
            Capability::BuffConsumer => self.speed_buff.is_some(),
            Capability::BuffProvider => self.buff_provider.is_some(),
            Capability::Spawner => self.spawner.is_some(),
            Capability::Plan => self.plan.is_some(),
        }
    }

    // === STATS ===

    /// Stat value, or [`MISSING_STAT`] when the entity has no such stat
    pub fn stat(&self, stat: Stat) -> f64 {
        match &self.stats {
            Some(stats) => stats.get(stat),
            None => MISSING_STAT,
        }
    }

    /// Current vital (pulse), None if the entity has none
    pub fn vital(&self) -> Option<f64> {
        self.stats.as_ref()?.try_get(Stat::Pulse)
    }

    pub fn set_stat(&mut self, stat: Stat, value: f64) {
        let Some(stats) = self.stats.as_mut() else {
            return;
        };
        let previous = stats.try_get(stat);
        stats.set(stat, value);
        self.on_stat_changed(stat, previous, value);
    }

    /// Apply a delta and return the new value
    pub fn delta_stat(&mut self, stat: Stat, amount: f64) -> Option<f64> {
        let stats = self.stats.as_mut()?;
        let previous = stats.try_get(stat);
        let value = stats.delta(stat, amount)?;
        self.on_stat_changed(stat, previous, value);
        Some(value)
    }

    /// Pulse crossing zero kills anything with a lifecycle state
    fn on_stat_changed(&mut self, stat: Stat, previous: Option<f64>, value: f64) {
        if stat != Stat::Pulse || value > 0.0 {
            return;
        }
        if previous.map_or(true, |p| p > 0.0) {
            if let Some(state) = self.state.as_mut() {
                *state = EntityState::Dead;
            }
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state.map_or(false, |s| s.is_dead())
    }

    pub fn is_active(&self) -> bool {
        self.state.map_or(true, |s| s == EntityState::Active)
    }

    // === MULTIPLIERS ===

    pub fn job_multiplier(&self, action: ActionKind) -> f64 {
        self.job.map_or(1.0, |job| job.action_multiplier(action))
    }

    /// Multiplier applied to this entity's action dt
    pub fn speed_multiplier(&self) -> f64 {
        self.speed_buff.map_or(1.0, |b| b.multiplier)
    }

    // === INVENTORY / LOG ===

    pub fn item_quantity(&self, name: &str) -> u32 {
        self.inventory.as_ref().map_or(0, |inv| inv.quantity(name))
    }

    /// Append to the activity log if the entity keeps one
    pub fn log_activity(&mut self, description: impl Into<String>, now: Duration) {
        if let Some(log) = self.activity_log.as_mut() {
            log.push(description, now);
        }
    }

    // === RESOURCES ===

    pub fn can_be_harvested(&self, kind: ResourceKind) -> bool {
        self.resource
            .as_ref()
            .map_or(false, |node| node.kind == kind && node.can_be_harvested())
    }

    /// Take one harvest; returns the item name and amount
    pub fn harvest(&mut self) -> Option<(String, u32)> {
        let node = self.resource.as_mut()?;
        let amount = node.harvest();
        let item = node.item.clone();
        if node.is_regrowing() {
            if let Some(state) = self.state.as_mut() {
                *state = EntityState::Regrowing;
            }
        }
        Some((item, amount))
    }

    // === STRUCTURES ===

    pub fn can_be_maintained(&self) -> bool {
        let Some(structure) = self.structure else {
            return false;
        };
        if self.state != Some(EntityState::Active) {
            return false;
        }
        match (self.vital(), self.max_vital()) {
            (Some(pulse), Some(max)) => pulse < max * structure.repair_threshold,
            _ => false,
        }
    }

    pub fn can_be_rebuilt(&self) -> bool {
        self.structure.is_some() && self.state == Some(EntityState::Dead)
    }

    pub fn max_vital(&self) -> Option<f64> {
        self.stats.as_ref()?.try_get(Stat::MaxPulse)
    }

    /// Restore pulse up to the max; returns the amount actually restored
    pub fn restore_vital(&mut self, amount: f64) -> f64 {
        let (Some(pulse), Some(max)) = (self.vital(), self.max_vital()) else {
            return 0.0;
        };
        let restored = amount.min(max - pulse).max(0.0);
        self.set_stat(Stat::Pulse, pulse + restored);
        restored
    }

    /// Bring a dead structure back at full pulse
    pub fn rebuild(&mut self) {
        if let Some(max) = self.max_vital() {
            self.set_stat(Stat::Pulse, max);
        }
        if let Some(state) = self.state.as_mut() {
            *state = EntityState::Active;
        }
    }

    // === PASSIVE LIFECYCLE ===

    /// Per-tick upkeep that does not depend on any action
    pub fn update_passive(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        if let Some(node) = self.resource.as_mut() {
            if node.regrow(dt).is_some() {
                if let Some(state) = self.state.as_mut() {
                    *state = EntityState::Active;
                }
            }
        }
        if self.structure.is_some() {
            if let (Some(pulse), Some(max)) = (self.vital(), self.max_vital()) {
                match self.state {
                    Some(EntityState::Active) if pulse <= 0.0 => {
                        self.state = Some(EntityState::Dead);
                    }
                    Some(EntityState::Dead) if pulse >= max => {
                        self.state = Some(EntityState::Active);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Move to `pos`, turning to face the direction of travel
    pub fn set_position(&mut self, pos: TilePos) {
        if let Some(facing) = Direction::from_step(self.position, pos) {
            self.facing = facing;
        }
        self.position = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Entity {
        Entity::new("gotchi", TilePos::new(0, 0))
            .with_stats(Stats::new().with(Stat::Pulse, 10.0).with(Stat::Ecto, 500.0))
            .with_state(EntityState::Active)
    }

    fn altar(pulse: f64) -> Entity {
        Entity::new("altar", TilePos::new(0, 0))
            .with_stats(Stats::new().with(Stat::Pulse, pulse).with(Stat::MaxPulse, 1000.0))
            .with_state(EntityState::Active)
            .with_structure(Structure::default())
    }

    #[test]
    fn test_capabilities_reflect_components() {
        let e = agent();
        assert!(e.has(Capability::Stats));
        assert!(e.has(Capability::State));
        assert!(!e.has(Capability::Inventory));
        assert!(!e.has(Capability::Trader));
    }

    #[test]
    fn test_vital_crossing_zero_kills() {
        let mut e = agent();
        e.delta_stat(Stat::Pulse, -4.0);
        assert!(!e.is_dead());
        e.delta_stat(Stat::Pulse, -6.0);
        assert!(e.is_dead());
    }

    #[test]
    fn test_missing_stat_sentinel() {
        let e = Entity::new("rock", TilePos::new(0, 0));
        assert_eq!(e.stat(Stat::Pulse), MISSING_STAT);
        assert_eq!(e.vital(), None);
    }

    #[test]
    fn test_maintain_threshold() {
        assert!(altar(799.0).can_be_maintained());
        assert!(!altar(800.0).can_be_maintained());
        assert!(!altar(100.0).can_be_rebuilt());
    }

    #[test]
    fn test_restore_vital_caps_at_max() {
        let mut a = altar(950.0);
        assert_eq!(a.restore_vital(100.0), 50.0);
        assert_eq!(a.vital(), Some(1000.0));
    }

    #[test]
    fn test_structure_dies_and_rebuilds() {
        let mut a = altar(5.0);
        a.delta_stat(Stat::Pulse, -10.0);
        assert!(a.is_dead());
        assert!(a.can_be_rebuilt());
        a.rebuild();
        assert!(a.is_active());
        assert_eq!(a.vital(), Some(1000.0));
    }

    #[test]
    fn test_harvest_marks_regrowing() {
        let mut tree = Entity::new("kekwoodtree", TilePos::new(0, 0))
            .with_state(EntityState::Active)
            .with_resource(
                ResourceNode::new(ResourceKind::Chop, "kekwood", 5, 5)
                    .with_regrow(RegrowRule::AfterDepletion { duration_s: 10.0 }),
            );
        assert_eq!(tree.harvest(), Some(("kekwood".to_string(), 5)));
        assert_eq!(tree.state, Some(EntityState::Regrowing));
        assert!(!tree.can_be_harvested(ResourceKind::Chop));

        tree.update_passive(10.0);
        assert_eq!(tree.state, Some(EntityState::Active));
        assert!(tree.can_be_harvested(ResourceKind::Chop));
    }

    #[test]
    fn test_set_position_updates_facing() {
        let mut e = agent();
        e.set_position(TilePos::new(0, -1));
        assert_eq!(e.facing, Direction::Up);
        e.set_position(TilePos::new(2, -1));
        assert_eq!(e.facing, Direction::Right);
    }
}
