//! Fallback target resolution
//!
//! When an action has no target, or its target stopped being valid, the plan
//! asks the resolver to pick a fresh one from the zone using the action's
//! [`TargetSpec`]. Candidates are scanned in zone insertion order so ties go
//! to the entity that was added first.

use rand::seq::SliceRandom;
use tracing::{trace, warn};

use crate::actions::action::Action;
use crate::actions::target::TargetCriterion;
use crate::core::types::{EntityId, SimRng};
use crate::entity::Entity;
use crate::world::zone::Zone;

/// Pick a fallback target for `action`, or None if nothing qualifies
pub fn resolve(action: &dyn Action, zone: &Zone, rng: &mut SimRng) -> Option<EntityId> {
    let spec = action.target_spec()?;
    let actor = zone.entity(action.actor())?;

    let target = match spec.criterion {
        TargetCriterion::Nearest => nearest(action, zone, actor, &spec.target_kind),
        TargetCriterion::LowestVital => lowest_vital(action, zone, actor, &spec.target_kind),
        TargetCriterion::ResourceRichest => {
            resource_richest(action, zone, actor, &spec.target_kind)
        }
        TargetCriterion::HasItem => match spec.param.as_deref() {
            Some(item) => has_item(zone, actor, &spec.target_kind, item),
            None => {
                warn!(kind = %action.kind(), "has_item target spec without an item name");
                None
            }
        },
        TargetCriterion::Random => random(action, zone, actor, &spec.target_kind, rng),
    };

    trace!(
        kind = %action.kind(),
        criterion = ?spec.criterion,
        found = target.is_some(),
        "Resolved fallback target"
    );
    target
}

/// Entities of `kind` other than the actor that the action accepts as targets
fn valid_candidates<'z>(
    action: &'z dyn Action,
    zone: &'z Zone,
    actor: &'z Entity,
    kind: &'z str,
) -> impl Iterator<Item = &'z Entity> + 'z {
    zone.entities_by_kind(kind)
        .filter(move |c| c.id != actor.id && action.is_valid_target(zone, c))
}

fn nearest(action: &dyn Action, zone: &Zone, actor: &Entity, kind: &str) -> Option<EntityId> {
    let mut best: Option<(i32, EntityId)> = None;
    for candidate in valid_candidates(action, zone, actor, kind) {
        let d = zone.distance(actor.position, candidate.position);
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}

fn lowest_vital(action: &dyn Action, zone: &Zone, actor: &Entity, kind: &str) -> Option<EntityId> {
    let mut best: Option<(f64, EntityId)> = None;
    for candidate in valid_candidates(action, zone, actor, kind) {
        let Some(vital) = candidate.vital() else {
            continue;
        };
        if best.map_or(true, |(bv, _)| vital < bv) {
            best = Some((vital, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}

fn resource_richest(
    action: &dyn Action,
    zone: &Zone,
    actor: &Entity,
    kind: &str,
) -> Option<EntityId> {
    let mut best: Option<(u32, EntityId)> = None;
    for candidate in valid_candidates(action, zone, actor, kind) {
        let Some(node) = candidate.resource.as_ref() else {
            continue;
        };
        let available = node.peek_yield();
        if available > 0 && best.map_or(true, |(ba, _)| available > ba) {
            best = Some((available, candidate.id));
        }
    }
    best.map(|(_, id)| id)
}

/// First holder of `item`, ignoring target validity
fn has_item(zone: &Zone, actor: &Entity, kind: &str, item: &str) -> Option<EntityId> {
    zone.entities_by_kind(kind)
        .find(|c| c.id != actor.id && c.item_quantity(item) > 0)
        .map(|c| c.id)
}

fn random(
    action: &dyn Action,
    zone: &Zone,
    actor: &Entity,
    kind: &str,
    rng: &mut SimRng,
) -> Option<EntityId> {
    let candidates: Vec<EntityId> = valid_candidates(action, zone, actor, kind)
        .map(|c| c.id)
        .collect();
    candidates.choose(rng).copied()
}
