//! Action kinds and their static properties

use serde::{Deserialize, Serialize};

use crate::entity::resource::ResourceKind;

/// Type tag of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Attack,
    Forage,
    Chop,
    Mine,
    Maintain,
    Rebuild,
    Sell,
    Roam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Combat,
    Gathering,
    Building,
    Trade,
    Exploration,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Attack,
        ActionKind::Forage,
        ActionKind::Chop,
        ActionKind::Mine,
        ActionKind::Maintain,
        ActionKind::Rebuild,
        ActionKind::Sell,
        ActionKind::Roam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Attack => "attack",
            ActionKind::Forage => "forage",
            ActionKind::Chop => "chop",
            ActionKind::Mine => "mine",
            ActionKind::Maintain => "maintain",
            ActionKind::Rebuild => "rebuild",
            ActionKind::Sell => "sell",
            ActionKind::Roam => "roam",
        }
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::Attack => ActionCategory::Combat,
            ActionKind::Forage | ActionKind::Chop | ActionKind::Mine => ActionCategory::Gathering,
            ActionKind::Maintain | ActionKind::Rebuild => ActionCategory::Building,
            ActionKind::Sell => ActionCategory::Trade,
            ActionKind::Roam => ActionCategory::Exploration,
        }
    }

    /// Whether the action is meaningless without a target entity
    pub fn requires_target(&self) -> bool {
        !matches!(self, ActionKind::Roam)
    }

    /// Resource node kind harvested by a gather action
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            ActionKind::Forage => Some(ResourceKind::Forage),
            ActionKind::Chop => Some(ResourceKind::Chop),
            ActionKind::Mine => Some(ResourceKind::Mine),
            _ => None,
        }
    }

    /// Past-tense verb used in activity log entries
    pub fn past_tense(&self) -> &'static str {
        match self {
            ActionKind::Attack => "Attacked",
            ActionKind::Forage => "Foraged",
            ActionKind::Chop => "Chopped",
            ActionKind::Mine => "Mined",
            ActionKind::Maintain => "Maintained",
            ActionKind::Rebuild => "Rebuilt",
            ActionKind::Sell => "Sold",
            ActionKind::Roam => "Roamed",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
