//! Demo population for a fresh world
//!
//! Scatters obstacles, resources, structures, agents and hostiles across a
//! zone according to [`PopulationConfig`](crate::core::config::PopulationConfig).

use rand::Rng;
use tracing::{debug, warn};

use crate::core::config::SimulationConfig;
use crate::core::types::{SimRng, TilePos};
use crate::entity::{Entity, Job};
use crate::world::profiles;
use crate::world::zone::Zone;

/// Attempts at finding a free tile before a placement is skipped
const PLACEMENT_ATTEMPTS: usize = 64;

/// Random available tile in the zone, keeping a one-tile gap to neighbours
pub fn random_free_tile(zone: &Zone, rng: &mut SimRng) -> Option<TilePos> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let pos = TilePos::new(
            zone.origin().x + rng.gen_range(0..zone.width()),
            zone.origin().y + rng.gen_range(0..zone.height()),
        );
        if let Some(found) = zone.find_nearby_available_position(pos, 0, 1, rng) {
            return Some(found);
        }
    }
    None
}

fn place(
    zone: &mut Zone,
    rng: &mut SimRng,
    count: usize,
    mut build: impl FnMut(TilePos, &mut SimRng) -> Entity,
) -> usize {
    let mut placed = 0;
    for _ in 0..count {
        let Some(pos) = random_free_tile(zone, rng) else {
            warn!(zone = %zone.id, "No free tile left for placement");
            break;
        };
        match zone.add_entity(build(pos, rng)) {
            Ok(_) => placed += 1,
            Err(e) => warn!(zone = %zone.id, error = %e, "Placement rejected"),
        }
    }
    placed
}

/// Fill `zone` with the configured demo population; returns entities added
pub fn populate(zone: &mut Zone, config: &SimulationConfig, rng: &mut SimRng) -> usize {
    let pop = &config.population;

    let tiles = (zone.width() * zone.height()) as f64;
    let obstacles = (tiles * pop.obstacle_density) as usize;
    for _ in 0..obstacles {
        if let Some(pos) = random_free_tile(zone, rng) {
            zone.add_obstacle(pos);
        }
    }

    let mut added = 0;
    added += place(zone, rng, pop.berry_bushes_per_zone, |p, _| profiles::berry_bush(p));
    added += place(zone, rng, pop.trees_per_zone, |p, _| profiles::tree(p));
    added += place(zone, rng, pop.boulders_per_zone, |p, _| profiles::boulders(p));
    added += place(zone, rng, pop.altars_per_zone, |p, _| profiles::altar(p));
    added += place(zone, rng, pop.shops_per_zone, |p, _| profiles::shop(p));
    added += place(zone, rng, pop.portals_per_zone, |p, _| profiles::portal(p));
    added += place(zone, rng, pop.agents_per_zone, |p, rng| {
        let job = Job::random(rng);
        profiles::agent(p, job, config, rng)
    });
    added += place(zone, rng, pop.hostiles_per_zone, |p, rng| profiles::hostile(p, config, rng));

    debug!(zone = %zone.id, obstacles, entities = added, "Populated zone");
    added
}
