//! The action state machine contract
//!
//! An action is owned by exactly one actor's plan. The plan selects it,
//! calls `start` once, then `update` every tick until it reports completion.
//! Actions address the actor and target by id and look them up in the zone
//! on every call, so an entity removed mid-action is simply not found.

use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::actions::catalog::ActionKind;
use crate::actions::target::TargetSpec;
use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, SimRng};
use crate::entity::Entity;
use crate::world::zone::Zone;

/// Everything an action may touch while it runs
pub struct ActionContext<'a> {
    pub zone: &'a mut Zone,
    pub rng: &'a mut SimRng,
    /// Simulated time at the start of this tick
    pub now: Duration,
    pub config: &'a SimulationConfig,
}

/// State shared by every action
#[derive(Debug, Clone)]
pub struct ActionCore {
    pub kind: ActionKind,
    pub weighting: f64,
    pub actor: EntityId,
    pub target: Option<EntityId>,
    /// Kind of `target` when it was last seen in the zone
    pub target_kind: Option<String>,
    pub target_spec: Option<TargetSpec>,
}

impl ActionCore {
    /// Negative or non-finite weights are stored as 0
    pub fn new(
        kind: ActionKind,
        actor: EntityId,
        target: Option<EntityId>,
        weighting: f64,
        target_spec: Option<TargetSpec>,
    ) -> Self {
        let weighting = if weighting.is_finite() && weighting >= 0.0 {
            weighting
        } else {
            warn!(%kind, weighting, "Invalid action weighting, using 0");
            0.0
        };
        Self {
            kind,
            weighting,
            actor,
            target,
            target_kind: None,
            target_spec,
        }
    }
}

pub trait Action: Send + fmt::Debug {
    fn core(&self) -> &ActionCore;
    fn core_mut(&mut self) -> &mut ActionCore;

    /// Whether `actor` can perform this action right now
    fn is_valid_actor(&self, zone: &Zone, actor: &Entity) -> bool;

    /// Whether `candidate` is an acceptable target right now
    fn is_valid_target(&self, zone: &Zone, candidate: &Entity) -> bool;

    /// Called once when the plan selects this action
    fn start(&mut self, ctx: &mut ActionContext<'_>);

    /// Advance by `dt` simulated seconds; true when the action is finished
    fn update(&mut self, ctx: &mut ActionContext<'_>, dt: f64) -> bool;

    fn kind(&self) -> ActionKind {
        self.core().kind
    }

    fn weighting(&self) -> f64 {
        self.core().weighting
    }

    fn actor(&self) -> EntityId {
        self.core().actor
    }

    fn target(&self) -> Option<EntityId> {
        self.core().target
    }

    /// Point at `target`, remembering its kind while it is still in `zone`
    fn set_target(&mut self, target: Option<EntityId>, zone: &Zone) {
        let core = self.core_mut();
        core.target = target;
        core.target_kind = target
            .and_then(|id| zone.entity(id))
            .map(|entity| entity.kind.clone());
    }

    fn target_kind(&self) -> Option<&str> {
        self.core().target_kind.as_deref()
    }

    fn target_spec(&self) -> Option<&TargetSpec> {
        self.core().target_spec.as_ref()
    }

    fn requires_target(&self) -> bool {
        self.kind().requires_target()
    }

    /// The current target exists and is valid, or none is needed
    fn has_valid_target(&self, zone: &Zone) -> bool {
        match self.target() {
            Some(id) => zone
                .entity(id)
                .map_or(false, |target| self.is_valid_target(zone, target)),
            None => !self.requires_target(),
        }
    }

    /// Actor is present and valid and the target check passes
    fn can_execute(&self, zone: &Zone) -> bool {
        let Some(actor) = zone.entity(self.actor()) else {
            return false;
        };
        self.is_valid_actor(zone, actor) && self.has_valid_target(zone)
    }
}

/// Whether `actor` is next to `target` or could step onto a free tile beside it
pub fn can_move_to_target(zone: &Zone, actor: &Entity, target: &Entity) -> bool {
    if actor.position.is_adjacent(&target.position) {
        return true;
    }
    target
        .position
        .neighbors4()
        .iter()
        .any(|tile| zone.is_position_available(*tile))
}

/// One best-effort move onto a random free tile beside the target
///
/// Returns true if the actor ends up adjacent.
pub fn try_move_to_target(
    zone: &mut Zone,
    rng: &mut SimRng,
    actor: EntityId,
    target: EntityId,
) -> bool {
    let (Some(actor_pos), Some(target_pos)) = (
        zone.entity(actor).map(|e| e.position),
        zone.entity(target).map(|e| e.position),
    ) else {
        return false;
    };
    if actor_pos.is_adjacent(&target_pos) {
        return true;
    }
    match zone.free_tile_adjacent_to(target_pos, rng) {
        Some(tile) => zone.move_entity(actor, tile),
        None => {
            debug!(%actor, %target, "No free tile next to target");
            false
        }
    }
}

/// Actor and target are both present and orthogonally adjacent
pub fn is_adjacent_to_target(zone: &Zone, actor: EntityId, target: EntityId) -> bool {
    match (zone.entity(actor), zone.entity(target)) {
        (Some(a), Some(t)) => a.position.is_adjacent(&t.position),
        _ => false,
    }
}
