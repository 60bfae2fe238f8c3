//! Melee attack
//!
//! The attacker must stay orthogonally adjacent to its target. Every elapsed
//! simulated second it deals `(0.1 + 0.9 * vital / 1000) * job multiplier`
//! damage to the target's pulse until the target is vanquished.

use tracing::{debug, warn};

use crate::actions::action::{
    can_move_to_target, is_adjacent_to_target, try_move_to_target, Action, ActionContext,
    ActionCore,
};
use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::core::types::EntityId;
use crate::entity::{Entity, Stat};
use crate::world::zone::Zone;

/// Ecto drained from the attacker per simulated second
pub const ECTO_DRAIN_PER_S: f64 = 0.1;

#[derive(Debug)]
pub struct AttackAction {
    core: ActionCore,
    /// Seconds until the next hit
    timer_s: f64,
}

impl AttackAction {
    pub fn new(
        actor: EntityId,
        target: Option<EntityId>,
        weighting: f64,
        target_spec: Option<TargetSpec>,
    ) -> Self {
        Self {
            core: ActionCore::new(ActionKind::Attack, actor, target, weighting, target_spec),
            timer_s: 1.0,
        }
    }

    pub fn boxed(
        actor: EntityId,
        target: Option<EntityId>,
        weighting: f64,
        target_spec: Option<TargetSpec>,
    ) -> Box<dyn Action> {
        Box::new(Self::new(actor, target, weighting, target_spec))
    }
}

/// Damage per hit for an attacker with the given vital
pub fn damage_per_hit(attacker_vital: f64, job_multiplier: f64) -> f64 {
    let alpha = attacker_vital.clamp(0.0, 1000.0) / 1000.0;
    (0.1 + 0.9 * alpha) * job_multiplier
}

impl Action for AttackAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn is_valid_actor(&self, _zone: &Zone, actor: &Entity) -> bool {
        actor.stats.is_some()
    }

    fn is_valid_target(&self, zone: &Zone, candidate: &Entity) -> bool {
        let Some(actor) = zone.entity(self.core.actor) else {
            return false;
        };
        candidate.stats.is_some()
            && candidate.state.is_some()
            && !candidate.is_dead()
            && candidate.vital().map_or(false, |v| v > 0.0)
            && can_move_to_target(zone, actor, candidate)
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        self.timer_s = 1.0;
        if let Some(target) = self.core.target {
            try_move_to_target(ctx.zone, ctx.rng, self.core.actor, target);
        }
    }

    fn update(&mut self, ctx: &mut ActionContext<'_>, dt: f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        let actor_id = self.core.actor;
        let Some(target_id) = self.core.target else {
            return true;
        };

        let (attacker_vital, job_multiplier) = {
            let (Some(actor), Some(target)) = (ctx.zone.entity(actor_id), ctx.zone.entity(target_id))
            else {
                debug!(actor = %actor_id, "Attack target gone");
                return true;
            };
            if actor.stats.is_none() || target.stats.is_none() {
                warn!(actor = %actor_id, target = %target_id, "Attack participant lost stats");
                return true;
            }
            if target.vital().map_or(true, |v| v <= 0.0) {
                return true;
            }
            (actor.vital().unwrap_or(0.0), actor.job_multiplier(ActionKind::Attack))
        };

        if !is_adjacent_to_target(ctx.zone, actor_id, target_id) {
            debug!(actor = %actor_id, target = %target_id, "Attack target out of reach");
            return true;
        }

        if let Some(actor) = ctx.zone.entity_mut(actor_id) {
            if actor.stats.as_ref().map_or(false, |s| s.has(Stat::Ecto)) {
                actor.delta_stat(Stat::Ecto, -ECTO_DRAIN_PER_S * dt);
            }
        }

        let damage = damage_per_hit(attacker_vital, job_multiplier);
        self.timer_s -= dt;
        while self.timer_s <= 0.0 {
            self.timer_s += 1.0;

            let Some(target) = ctx.zone.entity_mut(target_id) else {
                return true;
            };
            let remaining = target.delta_stat(Stat::Pulse, -damage).unwrap_or(0.0);
            if remaining <= 0.0 {
                target.set_stat(Stat::Pulse, 0.0);
                let vanquished = target.kind.clone();
                let now = ctx.now;
                if let Some(actor) = ctx.zone.entity_mut(actor_id) {
                    actor.log_activity(format!("Vanquished {vanquished}"), now);
                }
                debug!(actor = %actor_id, target = %target_id, "Target vanquished");
                return true;
            }
        }
        false
    }
}
