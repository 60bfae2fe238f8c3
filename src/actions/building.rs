//! Structure upkeep: maintain (repair an Active structure) and rebuild (a Dead one)
//!
//! Both consume one unit of each building material from the actor.

use crate::actions::action::{Action, ActionContext};
use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::actions::timed::{TimedAction, TimedEffect};
use crate::core::types::EntityId;
use crate::entity::{Entity, Stat};

pub const WOOD: &str = "kekwood";
pub const STONE: &str = "alphaslate";
pub const BUILDER_TOKEN: &str = "buildertoken";

/// Pulse restored by one maintain cycle
pub const MAINTAIN_PULSE: f64 = 100.0;
/// Fixed rebuild time in simulated seconds
pub const REBUILD_S: f64 = 30.0;

fn has_materials(actor: &Entity) -> bool {
    actor.item_quantity(WOOD) > 0 && actor.item_quantity(STONE) > 0
}

fn consume_materials(actor: &mut Entity) -> bool {
    let Some(inventory) = actor.inventory.as_mut() else {
        return false;
    };
    if !(inventory.has(WOOD, 1) && inventory.has(STONE, 1)) {
        return false;
    }
    inventory.remove(WOOD, 1);
    inventory.remove(STONE, 1);
    true
}

/// Restore pulse to a damaged but standing structure
#[derive(Debug, Clone, Default)]
pub struct MaintainEffect;

impl TimedEffect for MaintainEffect {
    fn kind(&self) -> ActionKind {
        ActionKind::Maintain
    }

    fn is_valid_actor(&self, actor: &Entity) -> bool {
        actor.inventory.is_some() && has_materials(actor)
    }

    fn is_valid_target(&self, target: &Entity) -> bool {
        target.can_be_maintained()
    }

    fn has_capabilities(&self, actor: &Entity, target: &Entity) -> bool {
        actor.inventory.is_some() && target.structure.is_some() && target.stats.is_some()
    }

    /// Repair rate runs from 0.1 to 1.0 pulse per second with ecto
    fn duration_s(&self, actor: &Entity) -> f64 {
        let ecto = actor.stat(Stat::Ecto).clamp(0.0, 1000.0);
        MAINTAIN_PULSE / (0.1 + 0.9 * ecto / 1000.0)
    }

    fn apply(
        &mut self,
        ctx: &mut ActionContext<'_>,
        actor_id: EntityId,
        target_id: EntityId,
    ) -> Option<String> {
        if !consume_materials(ctx.zone.entity_mut(actor_id)?) {
            return None;
        }
        let target = ctx.zone.entity_mut(target_id)?;
        let restored = target.restore_vital(MAINTAIN_PULSE);
        let target_kind = target.kind.clone();

        let tokens = (restored / 100.0) as u32 + 1;
        let actor = ctx.zone.entity_mut(actor_id)?;
        if let Some(inventory) = actor.inventory.as_mut() {
            inventory.add(BUILDER_TOKEN, tokens);
        }
        Some(format!(
            "Restored {} Pulse to {} during maintenance and received {} {}",
            restored as i64, target_kind, tokens, BUILDER_TOKEN
        ))
    }
}

/// Bring a Dead structure back to full pulse
#[derive(Debug, Clone, Default)]
pub struct RebuildEffect;

impl TimedEffect for RebuildEffect {
    fn kind(&self) -> ActionKind {
        ActionKind::Rebuild
    }

    fn is_valid_actor(&self, actor: &Entity) -> bool {
        actor.inventory.is_some() && has_materials(actor)
    }

    fn is_valid_target(&self, target: &Entity) -> bool {
        target.can_be_rebuilt()
    }

    fn has_capabilities(&self, actor: &Entity, target: &Entity) -> bool {
        actor.inventory.is_some() && target.structure.is_some() && target.stats.is_some()
    }

    fn duration_s(&self, _actor: &Entity) -> f64 {
        REBUILD_S
    }

    fn apply(
        &mut self,
        ctx: &mut ActionContext<'_>,
        actor_id: EntityId,
        target_id: EntityId,
    ) -> Option<String> {
        if !ctx.zone.entity(target_id)?.can_be_rebuilt() {
            return None;
        }
        if !consume_materials(ctx.zone.entity_mut(actor_id)?) {
            return None;
        }
        let target = ctx.zone.entity_mut(target_id)?;
        target.rebuild();
        Some(format!("Rebuilt {}", target.kind))
    }
}

pub type MaintainAction = TimedAction<MaintainEffect>;
pub type RebuildAction = TimedAction<RebuildEffect>;

pub fn maintain_action(
    actor: EntityId,
    target: Option<EntityId>,
    weighting: f64,
    target_spec: Option<TargetSpec>,
) -> Box<dyn Action> {
    Box::new(MaintainAction::new(MaintainEffect, actor, target, weighting, target_spec))
}

pub fn rebuild_action(
    actor: EntityId,
    target: Option<EntityId>,
    weighting: f64,
    target_spec: Option<TargetSpec>,
) -> Box<dyn Action> {
    Box::new(RebuildAction::new(RebuildEffect, actor, target, weighting, target_spec))
}
