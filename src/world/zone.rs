//! A rectangular region of the world and everything inside it
//!
//! The zone owns its entities outright (arena keyed by id, plus insertion
//! order for deterministic iteration), indexes them spatially, and tracks
//! impassable tiles. A zone is updated by exactly one worker per tick.

use ahash::{AHashMap, AHashSet};
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{debug, warn};

use crate::actions::action::ActionContext;
use crate::actions::plan::ActionPlanReport;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, SimRng, TilePos, ZoneId};
use crate::entity::Entity;
use crate::spatial::{ObstacleGrid, SpatialIndex};
use crate::world::profiles;

/// Counters used for tuning and for verifying the scheduler
#[derive(Debug, Clone, Default)]
pub struct ZoneDiagnostics {
    pub ticks: u64,
    pub entity_updates: u64,
    /// Index of the worker thread that ran the most recent update
    pub last_worker: Option<usize>,
}

#[derive(Debug)]
pub struct Zone {
    pub id: ZoneId,
    origin: TilePos,
    width: i32,
    height: i32,
    obstacles: ObstacleGrid,
    index: SpatialIndex,
    entities: AHashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    threat: f64,
    diagnostics: ZoneDiagnostics,
}

impl Zone {
    pub fn new(id: ZoneId, origin: TilePos, width: i32, height: i32, cell_size: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            id,
            origin,
            width,
            height,
            obstacles: ObstacleGrid::new(width as usize, height as usize, origin),
            index: SpatialIndex::new(cell_size),
            entities: AHashMap::new(),
            order: Vec::new(),
            threat: 0.0,
            diagnostics: ZoneDiagnostics::default(),
        }
    }

    // === BOUNDS ===

    pub fn origin(&self) -> TilePos {
        self.origin
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.origin.x
            && pos.y >= self.origin.y
            && pos.x < self.origin.x + self.width
            && pos.y < self.origin.y + self.height
    }

    // === ENTITIES ===

    /// Take ownership of an entity and index it at its current position
    ///
    /// Positions outside the zone are rejected and the entity is dropped.
    pub fn add_entity(&mut self, mut entity: Entity) -> Result<EntityId> {
        let id = entity.id;
        if !self.contains(entity.position) {
            warn!(zone = %self.id, %id, position = %entity.position, "Rejected entity outside zone bounds");
            return Err(SimError::OutsideWorld(entity.position));
        }
        entity.zone = Some(self.id);
        self.index.insert(id, entity.position);
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
        Ok(id)
    }

    /// Release an entity, clearing its zone reference
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(&id)?;
        self.index.remove(id);
        self.order.retain(|e| *e != id);
        entity.zone = None;
        Some(entity)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(move |id| self.entities.get(id))
    }

    /// Entities with the given type tag, in insertion order
    pub fn entities_by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities().filter(move |e| e.kind == kind)
    }

    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Ids of entities whose indexed position is within a Manhattan radius
    pub fn find_nearby_entities(&self, center: TilePos, radius: i32) -> Vec<EntityId> {
        self.index.entities_within(center, radius)
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    // === MOVEMENT / OCCUPANCY ===

    /// Move an entity onto an available tile, keeping the index in sync
    pub fn move_entity(&mut self, id: EntityId, pos: TilePos) -> bool {
        if !self.is_position_available(pos) {
            return false;
        }
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        entity.set_position(pos);
        self.index.update(id, pos);
        true
    }

    pub fn distance(&self, a: TilePos, b: TilePos) -> i32 {
        a.manhattan(&b)
    }

    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.index.is_occupied(pos.x, pos.y)
    }

    pub fn is_obstacle(&self, pos: TilePos) -> bool {
        self.obstacles.is_obstacle(pos)
    }

    /// Out-of-zone positions are ignored
    pub fn add_obstacle(&mut self, pos: TilePos) {
        self.obstacles.add(pos);
    }

    pub fn remove_obstacle(&mut self, pos: TilePos) {
        self.obstacles.remove(pos);
    }

    pub fn obstacles(&self) -> &ObstacleGrid {
        &self.obstacles
    }

    /// Inside the zone, unoccupied and not an obstacle
    pub fn is_position_available(&self, pos: TilePos) -> bool {
        self.contains(pos) && !self.is_occupied(pos) && !self.is_obstacle(pos)
    }

    /// Random available tile within `radius` whose `min_gap` surroundings are clear
    ///
    /// Every in-bounds offset within the square radius is a candidate; the
    /// candidates are shuffled and the first one passing the gap check wins.
    /// Gap cells outside the zone are not checked.
    pub fn find_nearby_available_position(
        &self,
        center: TilePos,
        radius: i32,
        min_gap: i32,
        rng: &mut SimRng,
    ) -> Option<TilePos> {
        let radius = radius.max(0);
        // Offsets clamped to the zone, so the scan never exceeds its area
        let (min_dx, max_dx) = Self::clamp_offsets(center.x, self.origin.x, self.width, radius);
        let (min_dy, max_dy) = Self::clamp_offsets(center.y, self.origin.y, self.height, radius);
        let mut candidates: Vec<TilePos> = Vec::new();
        for dy in min_dy..=max_dy {
            for dx in min_dx..=max_dx {
                candidates.push(center.offset(dx, dy));
            }
        }
        candidates.shuffle(rng);
        candidates
            .into_iter()
            .find(|pos| self.has_clear_gap(*pos, min_gap))
    }

    /// Offset range along one axis that stays within `radius` and inside
    /// `[origin, origin + extent)`; empty when the two do not overlap
    fn clamp_offsets(center: i32, origin: i32, extent: i32, radius: i32) -> (i32, i32) {
        let low = origin.saturating_sub(center).max(-radius);
        let high = origin
            .saturating_add(extent - 1)
            .saturating_sub(center)
            .min(radius);
        (low, high)
    }

    fn has_clear_gap(&self, pos: TilePos, min_gap: i32) -> bool {
        let gap = min_gap.max(0);
        for dy in -gap..=gap {
            for dx in -gap..=gap {
                let cell = pos.offset(dx, dy);
                if self.contains(cell) && !self.is_position_available(cell) {
                    return false;
                }
            }
        }
        true
    }

    /// A random free tile orthogonally next to `target`
    pub fn free_tile_adjacent_to(&self, target: TilePos, rng: &mut SimRng) -> Option<TilePos> {
        let free: Vec<TilePos> = target
            .neighbors4()
            .into_iter()
            .filter(|p| self.is_position_available(*p))
            .collect();
        free.choose(rng).copied()
    }

    // === DERIVED STATE ===

    /// Fraction of entities whose type tag is hostile
    pub fn threat_level(&self) -> f64 {
        self.threat
    }

    pub fn diagnostics(&self) -> &ZoneDiagnostics {
        &self.diagnostics
    }

    pub fn action_plan_report(&self, id: EntityId) -> Option<ActionPlanReport> {
        self.entity(id)?.plan.as_ref().map(|plan| plan.to_report(self))
    }

    fn compute_threat(&self, hostile_kinds: &[String]) -> f64 {
        if self.order.is_empty() {
            return 0.0;
        }
        let hostile = self
            .entities()
            .filter(|e| hostile_kinds.iter().any(|k| *k == e.kind))
            .count();
        hostile as f64 / self.order.len() as f64
    }

    // === TICK ===

    /// Advance every entity by `dt` simulated seconds
    ///
    /// Entities update sequentially in insertion order. Entities spawned
    /// during the update are first processed on the next tick.
    pub fn update(&mut self, dt: f64, now: Duration, rng: &mut SimRng, config: &SimulationConfig) {
        self.diagnostics.ticks += 1;
        self.diagnostics.last_worker = rayon::current_thread_index();

        self.refresh_speed_buffs(config.buff_scan_range);

        let order = self.order.clone();
        for id in order {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            entity.updates += 1;
            self.diagnostics.entity_updates += 1;
            let before = entity.position;
            entity.update_passive(dt);

            if entity.is_dead() {
                continue;
            }
            let Some(mut plan) = entity.plan.take() else {
                continue;
            };
            {
                let mut ctx = ActionContext {
                    zone: &mut *self,
                    rng: &mut *rng,
                    now,
                    config,
                };
                plan.process_actions(&mut ctx, dt);
            }
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.plan = Some(plan);
                if entity.position != before {
                    let pos = entity.position;
                    self.index.update(id, pos);
                }
            }
        }

        self.run_spawners(now, rng, config);
        self.sweep_dead();
        self.threat = self.compute_threat(&config.hostile_kinds);
    }

    fn refresh_speed_buffs(&mut self, scan_range: i32) {
        let consumers: Vec<(EntityId, TilePos)> = self
            .entities()
            .filter(|e| e.speed_buff.is_some())
            .map(|e| (e.id, e.position))
            .collect();

        for (id, pos) in consumers {
            let mut best = 1.0_f64;
            for other in self.index.entities_within(pos, scan_range) {
                let Some(provider) = self.entities.get(&other) else {
                    continue;
                };
                if let Some(buff) = provider.buff_provider {
                    if provider.is_active() && pos.manhattan(&provider.position) <= buff.range {
                        best = best.max(buff.multiplier);
                    }
                }
            }
            if let Some(buff) = self.entities.get_mut(&id).and_then(|e| e.speed_buff.as_mut()) {
                buff.reset();
                buff.offer(best);
            }
        }
    }

    fn run_spawners(&mut self, now: Duration, rng: &mut SimRng, config: &SimulationConfig) {
        let spawners: Vec<EntityId> = self
            .entities()
            .filter(|e| e.spawner.is_some())
            .map(|e| e.id)
            .collect();

        for id in spawners {
            let gone: AHashSet<EntityId> = match self.entities.get(&id).and_then(|e| e.spawner.as_ref()) {
                Some(spawner) => spawner
                    .spawned()
                    .iter()
                    .copied()
                    .filter(|s| !self.entities.contains_key(s))
                    .collect(),
                None => continue,
            };

            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            let active = entity.is_active();
            let origin = entity.position;
            let Some(spawner) = entity.spawner.as_mut() else {
                continue;
            };
            spawner.retain_alive(|s| !gone.contains(&s));
            if !active || !spawner.is_due(now) {
                continue;
            }
            let pos = spawner.spawn_position(origin, rng);
            let template = spawner.template.clone();

            if !self.is_position_available(pos) {
                debug!(zone = %self.id, %pos, "Spawn corner blocked");
                continue;
            }
            let Some(spawned) = profiles::spawn_template(&template, pos, config, rng) else {
                warn!(%template, "Unknown spawn template");
                continue;
            };
            let spawned_id = match self.add_entity(spawned) {
                Ok(spawned_id) => spawned_id,
                Err(e) => {
                    warn!(zone = %self.id, error = %e, "Spawn rejected");
                    continue;
                }
            };
            if let Some(spawner) = self.entities.get_mut(&id).and_then(|e| e.spawner.as_mut()) {
                spawner.record_spawn(spawned_id, now);
            }
            debug!(zone = %self.id, spawner = %id, %spawned_id, "Spawned entity");
        }
    }

    fn sweep_dead(&mut self) {
        let dead: Vec<EntityId> = self
            .entities()
            .filter(|e| e.despawn_on_death && e.is_dead())
            .map(|e| e.id)
            .collect();
        for id in dead {
            debug!(zone = %self.id, %id, "Removing dead entity");
            self.remove_entity(id);
        }
    }
}
