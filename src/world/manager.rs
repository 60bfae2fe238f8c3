//! World manager: the zone grid, the simulated clock and the tick dispatch
//!
//! Each tick the manager advances the clock and updates every zone in
//! parallel on a rayon pool. A zone is borrowed mutably by exactly one
//! worker, so entities in different zones never share a worker within a
//! tick. The `install` call returns only once every zone is done.

use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::actions::plan::ActionPlanReport;
use crate::core::clock::SimClock;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, SimRng, TilePos, ZoneId};
use crate::entity::Entity;
use crate::world::population;
use crate::world::snapshot::ZoneSnapshot;
use crate::world::zone::Zone;

/// A zone together with its private random stream
#[derive(Debug)]
pub struct ZoneSlot {
    pub zone: Zone,
    rng: SimRng,
}

/// Summary of one completed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub tick: u64,
    /// Simulated seconds covered by this tick
    pub sim_dt: f64,
    /// Simulated time after the tick, in seconds
    pub now_s: f64,
    pub entities: usize,
    pub entity_updates: u64,
    /// Distinct pool threads that ran a zone this tick
    pub workers_used: usize,
}

/// Stream for a zone, derived from the world seed and the zone id
fn zone_rng(seed: u64, zone: ZoneId) -> SimRng {
    let mixed = seed ^ (u64::from(zone.0) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SimRng::seed_from_u64(mixed)
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn build_pool(workers: usize) -> Result<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("zone-worker-{i}"))
        .build()?)
}

pub struct WorldManager {
    config: SimulationConfig,
    zones: Vec<ZoneSlot>,
    clock: SimClock,
    pool: rayon::ThreadPool,
    worker_count: usize,
    tick_count: u64,
    last_tick: Option<Instant>,
}

impl WorldManager {
    /// Build the static zone grid described by `config`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(SimError::InvalidConfig)?;

        let mut zones = Vec::new();
        for row in 0..config.zone_rows {
            for col in 0..config.zone_columns {
                let id = ZoneId(row * config.zone_columns + col);
                let origin = TilePos::new(
                    col as i32 * config.zone_width,
                    row as i32 * config.zone_height,
                );
                zones.push(Zone::new(
                    id,
                    origin,
                    config.zone_width,
                    config.zone_height,
                    config.spatial_cell_size,
                ));
            }
        }
        Self::with_zones(config, zones)
    }

    /// Build a manager around zones constructed elsewhere
    pub fn with_zones(config: SimulationConfig, zones: Vec<Zone>) -> Result<Self> {
        if zones.is_empty() {
            error!("Cannot start the world without zones");
            return Err(SimError::NoZones);
        }

        let worker_count = match config.worker_count {
            0 => default_worker_count(),
            n => n,
        };
        let pool = build_pool(worker_count)?;
        let zones: Vec<ZoneSlot> = zones
            .into_iter()
            .map(|zone| ZoneSlot {
                rng: zone_rng(config.seed, zone.id),
                zone,
            })
            .collect();

        info!(
            zones = zones.len(),
            workers = worker_count,
            speed = config.speed_multiplier,
            "World manager ready"
        );

        Ok(Self {
            clock: SimClock::new(config.speed_multiplier),
            config,
            zones,
            pool,
            worker_count,
            tick_count: 0,
            last_tick: None,
        })
    }

    /// Fill every zone with the configured demo population
    pub fn populate(&mut self) -> usize {
        let config = &self.config;
        let added: usize = self
            .zones
            .iter_mut()
            .map(|slot| population::populate(&mut slot.zone, config, &mut slot.rng))
            .sum();
        info!(entities = added, "Populated world");
        added
    }

    // === CLOCK / SCHEDULER ===

    /// Tick using the wall time elapsed since the previous tick
    ///
    /// The first tick counts as one configured tick period.
    pub fn tick(&mut self) -> TickReport {
        let now = Instant::now();
        let real_dt = match self.last_tick {
            Some(previous) => now.duration_since(previous),
            None => self.config.tick_period(),
        };
        self.last_tick = Some(now);
        self.step(real_dt)
    }

    /// Advance the world by `real_dt` of wall time
    pub fn step(&mut self, real_dt: Duration) -> TickReport {
        let sim_dt = self.clock.advance(real_dt.as_secs_f64());
        let now = self.clock.now();
        self.tick_count += 1;

        let updates_before: u64 = self.zones.iter().map(|s| s.zone.diagnostics().entity_updates).sum();

        let zones = &mut self.zones;
        let config = &self.config;
        self.pool.install(|| {
            zones.par_iter_mut().for_each(|slot| {
                slot.zone.update(sim_dt, now, &mut slot.rng, config);
            });
        });

        let updates_after: u64 = self.zones.iter().map(|s| s.zone.diagnostics().entity_updates).sum();
        let workers: BTreeSet<usize> = self
            .zones
            .iter()
            .filter_map(|s| s.zone.diagnostics().last_worker)
            .collect();

        let report = TickReport {
            tick: self.tick_count,
            sim_dt,
            now_s: now.as_secs_f64(),
            entities: self.entity_count(),
            entity_updates: updates_after - updates_before,
            workers_used: workers.len(),
        };
        debug!(tick = report.tick, sim_dt, updates = report.entity_updates, "Tick complete");
        report
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn since(&self, t: Duration) -> Duration {
        self.clock.since(t)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.clock.speed_multiplier()
    }

    /// Rejects values <= 0 and keeps the previous multiplier
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> bool {
        let accepted = self.clock.set_speed_multiplier(multiplier);
        if accepted {
            self.config.speed_multiplier = multiplier;
            info!(multiplier, "Simulation speed changed");
        }
        accepted
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Resize the worker pool; 0 is rejected and the current pool kept
    pub fn set_worker_count(&mut self, workers: usize) -> bool {
        if workers == 0 {
            warn!("Rejected worker count of 0");
            return false;
        }
        match build_pool(workers) {
            Ok(pool) => {
                self.pool = pool;
                self.worker_count = workers;
                self.config.worker_count = workers;
                info!(workers, "Worker pool resized");
                true
            }
            Err(e) => {
                error!(error = %e, workers, "Failed to rebuild worker pool");
                false
            }
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // === ZONES ===

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter().map(|s| &s.zone)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones().find(|z| z.id == id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().map(|s| &mut s.zone).find(|z| z.id == id)
    }

    fn slot_for_position(&mut self, pos: TilePos) -> Option<&mut ZoneSlot> {
        self.zones.iter_mut().find(|s| s.zone.contains(pos))
    }

    pub fn zone_for_position(&self, pos: TilePos) -> Option<ZoneId> {
        self.zones().find(|z| z.contains(pos)).map(|z| z.id)
    }

    pub fn zone_of(&self, id: EntityId) -> Option<ZoneId> {
        self.entity(id).and_then(|e| e.zone)
    }

    pub fn zone_snapshot(&self, id: ZoneId) -> Result<ZoneSnapshot> {
        self.zone(id)
            .map(ZoneSnapshot::capture)
            .ok_or(SimError::ZoneNotFound(id))
    }

    // === ENTITIES ===

    /// Register an entity with the zone containing its position
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        let pos = entity.position;
        let slot = self
            .slot_for_position(pos)
            .ok_or(SimError::OutsideWorld(pos))?;
        if !slot.zone.is_position_available(pos) {
            return Err(SimError::PositionUnavailable(pos));
        }
        slot.zone.add_entity(entity)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.zones.iter_mut().find_map(|s| s.zone.remove_entity(id))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.zones().find_map(|z| z.entity(id))
    }

    pub fn entity_count(&self) -> usize {
        self.zones().map(|z| z.entity_count()).sum()
    }

    pub fn action_plan_report(&self, id: EntityId) -> Option<ActionPlanReport> {
        self.zones().find_map(|z| z.action_plan_report(id))
    }

    pub fn is_position_available(&self, pos: TilePos) -> bool {
        self.zones()
            .find(|z| z.contains(pos))
            .map_or(false, |z| z.is_position_available(pos))
    }

    /// Delegates to the zone containing `pos`, using that zone's stream
    pub fn find_nearby_available_position(
        &mut self,
        pos: TilePos,
        radius: i32,
        min_gap: i32,
    ) -> Option<TilePos> {
        let slot = self.slot_for_position(pos)?;
        slot.zone
            .find_nearby_available_position(pos, radius, min_gap, &mut slot.rng)
    }

    pub fn distance(&self, a: TilePos, b: TilePos) -> i32 {
        a.manhattan(&b)
    }

    /// Threat level per zone, in zone order
    pub fn threat_levels(&self) -> Vec<(ZoneId, f64)> {
        self.zones().map(|z| (z.id, z.threat_level())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            zone_width: 16,
            zone_height: 16,
            zone_columns: 2,
            zone_rows: 1,
            worker_count: 2,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_zero_zones_is_rejected() {
        let config = SimulationConfig {
            zone_columns: 0,
            ..small_config()
        };
        assert!(matches!(WorldManager::new(config), Err(SimError::NoZones)));
    }

    #[test]
    fn test_grid_layout_and_routing() {
        let mut world = WorldManager::new(small_config()).unwrap();
        assert_eq!(world.zone_count(), 2);
        assert_eq!(world.zone_for_position(TilePos::new(3, 3)), Some(ZoneId(0)));
        assert_eq!(world.zone_for_position(TilePos::new(20, 3)), Some(ZoneId(1)));
        assert_eq!(world.zone_for_position(TilePos::new(40, 3)), None);

        let id = world.add_entity(Entity::new("gotchi", TilePos::new(20, 3))).unwrap();
        assert_eq!(world.zone_of(id), Some(ZoneId(1)));
        assert!(!world.is_position_available(TilePos::new(20, 3)));
        assert!(matches!(
            world.add_entity(Entity::new("gotchi", TilePos::new(20, 3))),
            Err(SimError::PositionUnavailable(_))
        ));
        assert!(matches!(
            world.add_entity(Entity::new("gotchi", TilePos::new(-1, 0))),
            Err(SimError::OutsideWorld(_))
        ));

        let removed = world.remove_entity(id).unwrap();
        assert_eq!(removed.zone, None);
        assert!(world.entity(id).is_none());
    }

    #[test]
    fn test_step_scales_by_speed() {
        let mut world = WorldManager::new(small_config()).unwrap();
        assert!(world.set_speed_multiplier(2.0));
        let report = world.step(Duration::from_millis(500));
        assert_eq!(report.sim_dt, 1.0);
        assert_eq!(world.now(), Duration::from_secs(1));
        assert_eq!(world.since(Duration::from_millis(250)), Duration::from_millis(750));

        assert!(!world.set_speed_multiplier(0.0));
        assert!(!world.set_speed_multiplier(-3.0));
        assert_eq!(world.speed_multiplier(), 2.0);
    }

    #[test]
    fn test_worker_count_setter() {
        let mut world = WorldManager::new(small_config()).unwrap();
        assert_eq!(world.worker_count(), 2);
        assert!(!world.set_worker_count(0));
        assert_eq!(world.worker_count(), 2);
        assert!(world.set_worker_count(3));
        assert_eq!(world.worker_count(), 3);
    }

    #[test]
    fn test_zone_streams_differ_and_repeat() {
        use rand::Rng;
        let a: u64 = zone_rng(42, ZoneId(0)).gen();
        let b: u64 = zone_rng(42, ZoneId(1)).gen();
        let again: u64 = zone_rng(42, ZoneId(0)).gen();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_snapshot_of_unknown_zone() {
        let world = WorldManager::new(small_config()).unwrap();
        assert!(world.zone_snapshot(ZoneId(0)).is_ok());
        assert!(matches!(
            world.zone_snapshot(ZoneId(9)),
            Err(SimError::ZoneNotFound(_))
        ));
    }
}
