//! Named numeric stats (ecto, spark, pulse...)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Returned by [`Stats::get`] for a stat the entity does not carry
pub const MISSING_STAT: f64 = -1.0;

/// Stat names known to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    /// Energy drained by combat, drives repair rate and roam radius
    Ecto,
    /// Focus spent per harvest, drives harvest duration
    Spark,
    /// The vital stat: damage target, death at zero
    Pulse,
    /// Upper bound for pulse on repairable structures
    MaxPulse,
}

impl Stat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Ecto => "ecto",
            Stat::Spark => "spark",
            Stat::Pulse => "pulse",
            Stat::MaxPulse => "maxpulse",
        }
    }
}

/// Stat block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    values: BTreeMap<Stat, f64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.values.insert(stat, value);
        self
    }

    /// Current value, or [`MISSING_STAT`] with a warning
    pub fn get(&self, stat: Stat) -> f64 {
        match self.values.get(&stat) {
            Some(value) => *value,
            None => {
                warn!(stat = stat.as_str(), "Stat not found");
                MISSING_STAT
            }
        }
    }

    /// Current value without the missing-stat warning
    pub fn try_get(&self, stat: Stat) -> Option<f64> {
        self.values.get(&stat).copied()
    }

    pub fn has(&self, stat: Stat) -> bool {
        self.values.contains_key(&stat)
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.values.insert(stat, value);
    }

    /// Add `amount` to an existing stat and return the new value
    ///
    /// Unknown stats are left absent and yield None.
    pub fn delta(&mut self, stat: Stat, amount: f64) -> Option<f64> {
        match self.values.get_mut(&stat) {
            Some(value) => {
                *value += amount;
                Some(*value)
            }
            None => {
                warn!(stat = stat.as_str(), amount, "Cannot apply delta to missing stat");
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}
