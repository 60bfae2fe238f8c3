//! Fallback target descriptions

use serde::{Deserialize, Serialize};

/// How to choose among candidate targets of the right kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCriterion {
    /// Closest by Manhattan distance
    Nearest,
    /// Lowest current vital stat
    LowestVital,
    /// Largest next-harvest yield
    ResourceRichest,
    /// Holds at least one of the item named by `param`
    HasItem,
    /// Uniformly random
    Random,
}

/// Target type filter plus a selection criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub target_kind: String,
    pub criterion: TargetCriterion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl TargetSpec {
    pub fn new(target_kind: &str, criterion: TargetCriterion) -> Self {
        Self {
            target_kind: target_kind.to_string(),
            criterion,
            param: None,
        }
    }

    pub fn nearest(target_kind: &str) -> Self {
        Self::new(target_kind, TargetCriterion::Nearest)
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }
}
