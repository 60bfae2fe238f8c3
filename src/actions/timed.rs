//! Shared countdown template for gather, repair, rebuild and sell actions
//!
//! `start` makes one adjacency move toward the target and arms the timer.
//! `update` counts the timer down by `dt * job multiplier` and applies the
//! effect exactly once when it reaches zero.

use tracing::{debug, warn};

use crate::actions::action::{
    can_move_to_target, is_adjacent_to_target, try_move_to_target, Action, ActionContext,
    ActionCore,
};
use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::core::config::StallPolicy;
use crate::core::types::EntityId;
use crate::entity::Entity;
use crate::world::zone::Zone;

/// The domain-specific half of a timed action
pub trait TimedEffect: Send + std::fmt::Debug {
    fn kind(&self) -> ActionKind;

    /// Selection-time actor check
    fn is_valid_actor(&self, actor: &Entity) -> bool;

    /// Selection-time target check, excluding reachability
    fn is_valid_target(&self, target: &Entity) -> bool;

    /// Components that must still exist while the action runs
    fn has_capabilities(&self, actor: &Entity, target: &Entity) -> bool;

    /// Countdown length in simulated seconds, fixed at start
    fn duration_s(&self, actor: &Entity) -> f64;

    /// Apply the effect once; the returned text goes to the actor's log
    fn apply(&mut self, ctx: &mut ActionContext<'_>, actor: EntityId, target: EntityId)
        -> Option<String>;
}

#[derive(Debug)]
pub struct TimedAction<E: TimedEffect> {
    core: ActionCore,
    effect: E,
    timer_s: f64,
}

impl<E: TimedEffect> TimedAction<E> {
    pub fn new(
        effect: E,
        actor: EntityId,
        target: Option<EntityId>,
        weighting: f64,
        target_spec: Option<TargetSpec>,
    ) -> Self {
        let core = ActionCore::new(effect.kind(), actor, target, weighting, target_spec);
        Self {
            core,
            effect,
            timer_s: 0.0,
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn remaining_s(&self) -> f64 {
        self.timer_s
    }
}

impl<E: TimedEffect> Action for TimedAction<E> {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn is_valid_actor(&self, _zone: &Zone, actor: &Entity) -> bool {
        self.effect.is_valid_actor(actor)
    }

    fn is_valid_target(&self, zone: &Zone, candidate: &Entity) -> bool {
        let Some(actor) = zone.entity(self.core.actor) else {
            return false;
        };
        self.effect.is_valid_target(candidate) && can_move_to_target(zone, actor, candidate)
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(target) = self.core.target {
            try_move_to_target(ctx.zone, ctx.rng, self.core.actor, target);
        }
        self.timer_s = ctx
            .zone
            .entity(self.core.actor)
            .map_or(0.0, |actor| self.effect.duration_s(actor));
    }

    fn update(&mut self, ctx: &mut ActionContext<'_>, dt: f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        let actor_id = self.core.actor;
        let Some(target_id) = self.core.target else {
            warn!(kind = %self.core.kind, actor = %actor_id, "Timed action has no target");
            return true;
        };

        let job_multiplier = {
            let (Some(actor), Some(target)) = (ctx.zone.entity(actor_id), ctx.zone.entity(target_id))
            else {
                warn!(kind = %self.core.kind, actor = %actor_id, "Actor or target vanished");
                return true;
            };
            if !self.effect.has_capabilities(actor, target) {
                warn!(
                    kind = %self.core.kind,
                    actor = %actor_id,
                    target = %target_id,
                    "Actor or target lost a required capability"
                );
                return true;
            }
            actor.job_multiplier(self.core.kind)
        };

        if ctx.config.stall_policy == StallPolicy::AbortWhenDetached
            && !is_adjacent_to_target(ctx.zone, actor_id, target_id)
        {
            debug!(kind = %self.core.kind, actor = %actor_id, "Not adjacent to target, aborting");
            return true;
        }

        self.timer_s -= dt * job_multiplier;
        if self.timer_s > 0.0 {
            return false;
        }

        if let Some(description) = self.effect.apply(ctx, actor_id, target_id) {
            let now = ctx.now;
            if let Some(actor) = ctx.zone.entity_mut(actor_id) {
                actor.log_activity(description, now);
            }
        }
        true
    }
}
