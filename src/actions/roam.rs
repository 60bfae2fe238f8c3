//! Wander to a random free tile and linger there

use tracing::debug;

use crate::actions::action::{Action, ActionContext, ActionCore};
use crate::actions::catalog::ActionKind;
use crate::core::types::EntityId;
use crate::entity::{Entity, Stat};
use crate::world::zone::Zone;

/// Pulse spent on each roam
pub const ROAM_PULSE_COST: f64 = 0.5;

#[derive(Debug)]
pub struct RoamAction {
    core: ActionCore,
    timer_s: f64,
}

impl RoamAction {
    pub fn new(actor: EntityId, weighting: f64) -> Self {
        Self {
            core: ActionCore::new(ActionKind::Roam, actor, None, weighting, None),
            timer_s: 0.0,
        }
    }

    pub fn boxed(actor: EntityId, weighting: f64) -> Box<dyn Action> {
        Box::new(Self::new(actor, weighting))
    }
}

/// Low-ecto agents wander further: radius 2 at full ecto, 10 at none
pub fn roam_radius(ecto: f64) -> i32 {
    let alpha = ecto.clamp(0.0, 1000.0) / 1000.0;
    2 + ((1.0 - alpha) * 8.0) as i32
}

/// Seconds spent lingering, shorter for jobs that roam well
pub fn roam_duration_s(job_multiplier: f64) -> f64 {
    50.0 + 250.0 / job_multiplier.max(f64::EPSILON)
}

impl Action for RoamAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn is_valid_actor(&self, _zone: &Zone, actor: &Entity) -> bool {
        actor.stats.is_some()
    }

    fn is_valid_target(&self, _zone: &Zone, _candidate: &Entity) -> bool {
        false
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        let actor_id = self.core.actor;
        let Some((origin, ecto, job_multiplier)) = ctx.zone.entity(actor_id).map(|actor| {
            (
                actor.position,
                actor.stats.as_ref().and_then(|s| s.try_get(Stat::Ecto)).unwrap_or(0.0),
                actor.job_multiplier(ActionKind::Roam),
            )
        }) else {
            return;
        };

        self.timer_s = roam_duration_s(job_multiplier);
        let radius = roam_radius(ecto);
        match ctx
            .zone
            .find_nearby_available_position(origin, radius, 1, ctx.rng)
        {
            Some(destination) => {
                ctx.zone.move_entity(actor_id, destination);
                debug!(actor = %actor_id, %destination, "Roaming");
            }
            None => debug!(actor = %actor_id, radius, "Nowhere to roam"),
        }
        if let Some(actor) = ctx.zone.entity_mut(actor_id) {
            if actor.vital().is_some() {
                actor.delta_stat(Stat::Pulse, -ROAM_PULSE_COST);
            }
        }
    }

    fn update(&mut self, _ctx: &mut ActionContext<'_>, dt: f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        self.timer_s -= dt;
        self.timer_s <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{SimRng, TilePos, ZoneId};
    use crate::entity::{Job, Stats};
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn test_radius_and_duration() {
        assert_eq!(roam_radius(1000.0), 2);
        assert_eq!(roam_radius(0.0), 10);
        assert_eq!(roam_radius(500.0), 6);
        assert_eq!(roam_duration_s(1.0), 300.0);
        assert!((roam_duration_s(7.0) - (50.0 + 250.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_roam_needs_no_target() {
        let mut zone = Zone::new(ZoneId(0), TilePos::new(0, 0), 32, 32, 8);
        let me = zone.add_entity(
            Entity::new("gotchi", TilePos::new(16, 16))
                .with_stats(Stats::new().with(Stat::Ecto, 1000.0).with(Stat::Pulse, 10.0))
                .with_job(Job::Explorer),
        )
        .unwrap();
        let action = RoamAction::new(me, 1.0);
        assert!(action.can_execute(&zone));

        let mut rng = SimRng::seed_from_u64(11);
        let config = SimulationConfig::default();
        let mut ctx = ActionContext {
            zone: &mut zone,
            rng: &mut rng,
            now: Duration::ZERO,
            config: &config,
        };
        let mut action = action;
        action.start(&mut ctx);

        let actor = ctx.zone.entity(me).unwrap();
        assert!(actor.position.manhattan(&TilePos::new(16, 16)) <= 4);
        assert_eq!(actor.vital(), Some(9.5));

        let ticks = (1..=200).find(|_| action.update(&mut ctx, 1.0)).unwrap();
        assert_eq!(ticks, 86);
    }
}
