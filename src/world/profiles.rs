//! Entity templates and per-job behavior profiles
//!
//! A template decides which components an entity carries; a profile decides
//! which actions its plan holds and how heavily each one is weighted.

use rand::Rng;
use std::time::Duration;

use crate::actions::building::{maintain_action, rebuild_action, STONE, WOOD};
use crate::actions::catalog::ActionKind;
use crate::actions::combat::AttackAction;
use crate::actions::gather::gather_action;
use crate::actions::roam::RoamAction;
use crate::actions::target::TargetSpec;
use crate::actions::trade::sell_action;
use crate::actions::ActionPlan;
use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, SimRng, TilePos};
use crate::entity::{
    BuffProvider, Entity, EntityState, Inventory, Job, RegrowRule, ResourceKind, ResourceNode,
    Spawner, Stat, Stats, Structure, Trader, CURRENCY,
};

// === TYPE TAGS ===

pub const AGENT: &str = "gotchi";
pub const HOSTILE: &str = "lickquidator";
pub const PORTAL: &str = "lickvoid";
pub const BERRY_BUSH: &str = "fomoberrybush";
pub const TREE: &str = "kekwoodtree";
pub const BOULDERS: &str = "alphaslateboulders";
pub const ALTAR: &str = "altar";
pub const SHOP: &str = "shop";

pub const BERRY: &str = "fomoberry";

/// Weight for the job's own specialty
const PRIMARY: f64 = 1.0;
/// Weight for everything else an agent could do
const SIDELINE: f64 = 0.1;

/// Action weights for one behavior profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorProfile {
    pub attack_hostile: f64,
    pub attack_portal: f64,
    pub forage: f64,
    pub chop: f64,
    pub mine: f64,
    pub maintain: f64,
    pub rebuild: f64,
    pub sell: f64,
    pub roam: f64,
}

impl BehaviorProfile {
    fn sideline() -> Self {
        Self {
            attack_hostile: SIDELINE,
            attack_portal: SIDELINE,
            forage: SIDELINE,
            chop: SIDELINE,
            mine: SIDELINE,
            maintain: SIDELINE,
            rebuild: SIDELINE,
            sell: SIDELINE,
            roam: SIDELINE,
        }
    }

    /// Profile for a job. Jobs without a dedicated profile explore.
    pub fn for_job(job: Job) -> Self {
        let base = Self::sideline();
        match job {
            Job::Mercenary => Self {
                attack_hostile: PRIMARY,
                attack_portal: PRIMARY,
                ..base
            },
            Job::Farmer => Self {
                forage: PRIMARY,
                chop: 0.5,
                mine: 0.5,
                ..base
            },
            Job::Minerjack => Self {
                forage: 0.5,
                chop: PRIMARY,
                mine: PRIMARY,
                ..base
            },
            Job::Builder => Self {
                maintain: PRIMARY,
                rebuild: PRIMARY,
                ..base
            },
            _ => Self {
                roam: PRIMARY,
                ..base
            },
        }
    }

    /// Build the action plan for `actor`
    pub fn build_plan(&self, actor: EntityId) -> ActionPlan {
        ActionPlan::new()
            .with_action(AttackAction::boxed(
                actor,
                None,
                self.attack_hostile,
                Some(TargetSpec::nearest(HOSTILE)),
            ))
            .with_action(AttackAction::boxed(
                actor,
                None,
                self.attack_portal,
                Some(TargetSpec::nearest(PORTAL)),
            ))
            .with_action(gather_action(
                ActionKind::Forage,
                actor,
                None,
                self.forage,
                Some(TargetSpec::nearest(BERRY_BUSH)),
            ))
            .with_action(gather_action(
                ActionKind::Chop,
                actor,
                None,
                self.chop,
                Some(TargetSpec::nearest(TREE)),
            ))
            .with_action(gather_action(
                ActionKind::Mine,
                actor,
                None,
                self.mine,
                Some(TargetSpec::nearest(BOULDERS)),
            ))
            .with_action(maintain_action(
                actor,
                None,
                self.maintain,
                Some(TargetSpec::nearest(ALTAR)),
            ))
            .with_action(rebuild_action(
                actor,
                None,
                self.rebuild,
                Some(TargetSpec::nearest(ALTAR)),
            ))
            .with_action(sell_action(actor, None, self.sell, Some(TargetSpec::nearest(SHOP))))
            .with_action(RoamAction::boxed(actor, self.roam))
    }
}

/// Plan for hostiles: split attention between agents and altars
pub fn hostile_plan(actor: EntityId) -> ActionPlan {
    ActionPlan::new()
        .with_action(AttackAction::boxed(actor, None, 0.5, Some(TargetSpec::nearest(AGENT))))
        .with_action(AttackAction::boxed(actor, None, 0.5, Some(TargetSpec::nearest(ALTAR))))
}

fn random_stat<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(0..=1000) as f64
}

// === TEMPLATES ===

/// An agent with the given job and a plan matching its profile
pub fn agent(pos: TilePos, job: Job, config: &SimulationConfig, rng: &mut SimRng) -> Entity {
    let stats = Stats::new()
        .with(Stat::Ecto, random_stat(rng))
        .with(Stat::Spark, random_stat(rng))
        .with(Stat::Pulse, 1000.0)
        .with(Stat::MaxPulse, 1000.0);
    let mut entity = Entity::new(AGENT, pos)
        .with_stats(stats)
        .with_state(EntityState::Active)
        .with_inventory(Inventory::new())
        .with_activity_log(config.activity_log_capacity)
        .with_trader(Trader::new(1))
        .with_speed_buff()
        .with_job(job);
    entity.plan = Some(BehaviorProfile::for_job(job).build_plan(entity.id));
    entity
}

pub fn hostile(pos: TilePos, config: &SimulationConfig, rng: &mut SimRng) -> Entity {
    let stats = Stats::new()
        .with(Stat::Ecto, random_stat(rng))
        .with(Stat::Spark, random_stat(rng))
        .with(Stat::Pulse, 500.0)
        .with(Stat::MaxPulse, 500.0);
    let mut entity = Entity::new(HOSTILE, pos)
        .with_stats(stats)
        .with_state(EntityState::Active)
        .with_inventory(Inventory::new().with_item("tongue", 1))
        .with_activity_log(config.activity_log_capacity)
        .despawning_on_death();
    entity.plan = Some(hostile_plan(entity.id));
    entity
}

/// Portal that periodically spawns hostiles at its corners
pub fn portal(pos: TilePos) -> Entity {
    Entity::new(PORTAL, pos)
        .with_stats(Stats::new().with(Stat::Pulse, 1000.0).with(Stat::MaxPulse, 1000.0))
        .with_state(EntityState::Active)
        .with_spawner(Spawner::new(HOSTILE, Duration::from_secs(5), 5))
}

pub fn berry_bush(pos: TilePos) -> Entity {
    Entity::new(BERRY_BUSH, pos)
        .with_state(EntityState::Active)
        .with_resource(
            ResourceNode::new(ResourceKind::Forage, BERRY, 5, 50).with_regrow(RegrowRule::Interval {
                every_s: 20.0,
                amount: 10,
            }),
        )
}

pub fn tree(pos: TilePos) -> Entity {
    Entity::new(TREE, pos)
        .with_state(EntityState::Active)
        .with_resource(
            ResourceNode::new(ResourceKind::Chop, WOOD, 5, 100)
                .with_regrow(RegrowRule::AfterDepletion { duration_s: 60.0 }),
        )
}

pub fn boulders(pos: TilePos) -> Entity {
    Entity::new(BOULDERS, pos)
        .with_state(EntityState::Active)
        .with_resource(ResourceNode::inexhaustible(ResourceKind::Mine, STONE, 1))
}

/// Structure that speeds up nearby agents while standing
pub fn altar(pos: TilePos) -> Entity {
    Entity::new(ALTAR, pos)
        .with_stats(Stats::new().with(Stat::Pulse, 1000.0).with(Stat::MaxPulse, 1000.0))
        .with_state(EntityState::Active)
        .with_structure(Structure::default())
        .with_buff_provider(BuffProvider::new(5, 1.5))
}

pub fn shop(pos: TilePos) -> Entity {
    Entity::new(SHOP, pos)
        .with_stats(Stats::new().with(Stat::Pulse, 1000.0).with(Stat::MaxPulse, 1000.0))
        .with_inventory(Inventory::new().with_item(CURRENCY, 10_000))
        .with_trader(
            Trader::new(1)
                .buying(BERRY, 2)
                .buying(WOOD, 3)
                .buying(STONE, 3)
                .buying("tongue", 20),
        )
}

/// Build an entity from a template name (used by spawners)
pub fn spawn_template(
    template: &str,
    pos: TilePos,
    config: &SimulationConfig,
    rng: &mut SimRng,
) -> Option<Entity> {
    let entity = match template {
        AGENT => {
            let job = Job::random(rng);
            agent(pos, job, config, rng)
        }
        HOSTILE => hostile(pos, config, rng),
        PORTAL => portal(pos),
        BERRY_BUSH => berry_bush(pos),
        TREE => tree(pos),
        BOULDERS => boulders(pos),
        ALTAR => altar(pos),
        SHOP => shop(pos),
        _ => return None,
    };
    Some(entity)
}
