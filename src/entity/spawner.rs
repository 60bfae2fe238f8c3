//! Periodic spawning of entities around a source (hostile portals)

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::types::{EntityId, TilePos};

/// Diagonal corners a spawn may appear at, relative to the spawner
pub const SPAWN_OFFSETS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Template name understood by `world::profiles::spawn_template`
    pub template: String,
    pub interval: Duration,
    pub max_alive: usize,
    last_spawn: Duration,
    spawned: Vec<EntityId>,
}

impl Spawner {
    pub fn new(template: &str, interval: Duration, max_alive: usize) -> Self {
        Self {
            template: template.to_string(),
            interval,
            max_alive,
            last_spawn: Duration::ZERO,
            spawned: Vec::new(),
        }
    }

    /// Forget spawns that no longer exist
    pub fn retain_alive(&mut self, mut alive: impl FnMut(EntityId) -> bool) {
        self.spawned.retain(|id| alive(*id));
    }

    pub fn alive_count(&self) -> usize {
        self.spawned.len()
    }

    /// Whether a spawn is due at `now`
    pub fn is_due(&self, now: Duration) -> bool {
        self.spawned.len() < self.max_alive && now.saturating_sub(self.last_spawn) >= self.interval
    }

    /// Pick a random diagonal corner around `origin`
    pub fn spawn_position<R: Rng>(&self, origin: TilePos, rng: &mut R) -> TilePos {
        let (dx, dy) = SPAWN_OFFSETS[rng.gen_range(0..SPAWN_OFFSETS.len())];
        origin.offset(dx, dy)
    }

    pub fn record_spawn(&mut self, id: EntityId, now: Duration) {
        self.spawned.push(id);
        self.last_spawn = now;
    }

    pub fn spawned(&self) -> &[EntityId] {
        &self.spawned
    }
}
