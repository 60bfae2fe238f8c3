//! Forage, chop and mine

use crate::actions::action::{Action, ActionContext};
use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::actions::timed::{TimedAction, TimedEffect};
use crate::core::types::EntityId;
use crate::entity::{Entity, Stat};

/// Seconds a zero-spark actor needs per harvest
pub const BASE_HARVEST_S: f64 = 5.0;
/// Extra seconds at full spark
pub const SPARK_HARVEST_S: f64 = 25.0;

/// Harvest from a resource node into the actor's inventory
#[derive(Debug, Clone)]
pub struct GatherEffect {
    kind: ActionKind,
}

impl GatherEffect {
    /// `kind` must be one of forage, chop or mine
    pub fn new(kind: ActionKind) -> Self {
        debug_assert!(kind.resource_kind().is_some(), "{kind} is not a gather action");
        Self { kind }
    }
}

impl TimedEffect for GatherEffect {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn is_valid_actor(&self, actor: &Entity) -> bool {
        actor.inventory.is_some()
    }

    fn is_valid_target(&self, target: &Entity) -> bool {
        self.kind
            .resource_kind()
            .map_or(false, |kind| target.can_be_harvested(kind))
    }

    fn has_capabilities(&self, actor: &Entity, target: &Entity) -> bool {
        actor.inventory.is_some()
            && target
                .resource
                .as_ref()
                .map_or(false, |node| Some(node.kind) == self.kind.resource_kind())
    }

    fn duration_s(&self, actor: &Entity) -> f64 {
        let spark = actor.stat(Stat::Spark).clamp(0.0, 1000.0);
        BASE_HARVEST_S + SPARK_HARVEST_S * spark / 1000.0
    }

    fn apply(
        &mut self,
        ctx: &mut ActionContext<'_>,
        actor: EntityId,
        target: EntityId,
    ) -> Option<String> {
        let (item, amount) = ctx.zone.entity_mut(target)?.harvest()?;
        if amount == 0 {
            return None;
        }
        let actor = ctx.zone.entity_mut(actor)?;
        actor.inventory.as_mut()?.add(&item, amount);
        if actor.stats.is_some() {
            actor.delta_stat(Stat::Spark, -1.0);
            actor.delta_stat(Stat::Pulse, -1.0);
        }
        Some(format!("{} {} {}", self.kind.past_tense(), amount, item))
    }
}

pub type GatherAction = TimedAction<GatherEffect>;

/// Boxed forage/chop/mine action ready to add to a plan
pub fn gather_action(
    kind: ActionKind,
    actor: EntityId,
    target: Option<EntityId>,
    weighting: f64,
    target_spec: Option<TargetSpec>,
) -> Box<dyn Action> {
    Box::new(GatherAction::new(
        GatherEffect::new(kind),
        actor,
        target,
        weighting,
        target_spec,
    ))
}
