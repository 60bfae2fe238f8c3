//! Per-agent candidate actions and weighted selection
//!
//! Each tick an idle plan refreshes fallback targets, filters its candidates
//! to the ones that can execute, and draws one with probability proportional
//! to its weighting. A busy plan advances its current action instead; the
//! tick that selects an action never also updates it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::actions::action::{Action, ActionContext};
use crate::actions::resolver;
use crate::core::types::EntityId;
use crate::world::zone::Zone;

/// Ordered candidate actions plus the index of the one in progress
#[derive(Debug, Default)]
pub struct ActionPlan {
    actions: Vec<Box<dyn Action>>,
    current: Option<usize>,
}

impl ActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate; insertion order decides roulette order
    pub fn add_action_to_plan(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    pub fn with_action(mut self, action: Box<dyn Action>) -> Self {
        self.add_action_to_plan(action);
        self
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    pub fn current_action(&self) -> Option<&dyn Action> {
        self.current.map(|i| self.actions[i].as_ref())
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Choose and start a new current action; returns its index
    pub fn select_next_action(&mut self, ctx: &mut ActionContext<'_>) -> Option<usize> {
        let mut eligible: Vec<(usize, f64)> = Vec::new();

        for (index, action) in self.actions.iter_mut().enumerate() {
            if !action.has_valid_target(ctx.zone) {
                let fallback = resolver::resolve(action.as_ref(), ctx.zone, ctx.rng);
                action.set_target(fallback, ctx.zone);
            } else if action.target().is_some() && action.target_kind().is_none() {
                let target = action.target();
                action.set_target(target, ctx.zone);
            }
            let weighting = action.weighting();
            if weighting > 0.0 && action.can_execute(ctx.zone) {
                eligible.push((index, weighting));
            }
        }

        let total: f64 = eligible.iter().map(|(_, w)| w).sum();
        if eligible.is_empty() || total <= 0.0 {
            trace!(candidates = self.actions.len(), "No executable action this round");
            return None;
        }

        let draw = ctx.rng.gen_range(0.0..total);
        let chosen = pick_weighted(&eligible, draw)?;
        let action = &mut self.actions[chosen];
        debug!(
            actor = %action.actor(),
            kind = %action.kind(),
            target = ?action.target(),
            "Selected action"
        );
        action.start(ctx);
        self.current = Some(chosen);
        Some(chosen)
    }

    /// Select when idle, otherwise advance the current action
    ///
    /// `dt` is scaled by the actor's speed multiplier before the action sees
    /// it. Returns true when the current action completed this call. A
    /// non-positive `dt` neither selects nor advances anything.
    pub fn process_actions(&mut self, ctx: &mut ActionContext<'_>, dt: f64) -> bool {
        if dt <= 0.0 {
            return false;
        }
        let Some(index) = self.current else {
            self.select_next_action(ctx);
            return false;
        };

        let action = &mut self.actions[index];
        let speed = ctx
            .zone
            .entity(action.actor())
            .map_or(1.0, |actor| actor.speed_multiplier());
        let complete = action.update(ctx, dt * speed);
        if complete {
            debug!(actor = %action.actor(), kind = %action.kind(), "Action complete");
            self.current = None;
        }
        complete
    }

    /// Serializable view for the external snapshot layer
    pub fn to_report(&self, zone: &Zone) -> ActionPlanReport {
        ActionPlanReport {
            actions: self
                .actions
                .iter()
                .map(|a| ActionReport::from_action(a.as_ref(), zone))
                .collect(),
            current_action: self
                .current_action()
                .map(|a| ActionReport::from_action(a, zone)),
        }
    }
}

/// Roulette pick: first candidate whose running weight total reaches `draw`
///
/// Falls back to the last candidate when rounding leaves the draw above the
/// final running total.
pub fn pick_weighted(candidates: &[(usize, f64)], draw: f64) -> Option<usize> {
    let mut running = 0.0;
    for &(index, weighting) in candidates {
        running += weighting;
        if running >= draw {
            return Some(index);
        }
    }
    candidates.last().map(|&(index, _)| index)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReport {
    #[serde(rename = "type")]
    pub kind: String,
    pub actor_type: String,
    pub actor_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<EntityId>,
    pub weighting: f64,
}

impl ActionReport {
    /// Target id and type are reported together or not at all; a target
    /// removed from the zone keeps the kind recorded when it was set
    fn from_action(action: &dyn Action, zone: &Zone) -> Self {
        let kind_of = |id: EntityId| zone.entity(id).map(|e| e.kind.clone());
        let target = action.target().and_then(|id| {
            let kind = kind_of(id).or_else(|| action.target_kind().map(str::to_string))?;
            Some((id, kind))
        });
        let (target_id, target_type) = target.unzip();
        Self {
            kind: action.kind().as_str().to_string(),
            actor_type: kind_of(action.actor()).unwrap_or_default(),
            actor_id: action.actor(),
            target_type,
            target_id,
            weighting: action.weighting(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanReport {
    pub actions: Vec<ActionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_action: Option<ActionReport>,
}
