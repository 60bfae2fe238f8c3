//! Agent actions: the state machine contract, concrete actions, fallback
//! target resolution and the weighted per-agent plan

pub mod action;
pub mod building;
pub mod catalog;
pub mod combat;
pub mod gather;
pub mod plan;
pub mod resolver;
pub mod roam;
pub mod target;
pub mod timed;
pub mod trade;

pub use action::{Action, ActionContext, ActionCore};
pub use catalog::ActionKind;
pub use plan::{ActionPlan, ActionPlanReport, ActionReport};
pub use target::{TargetCriterion, TargetSpec};
