//! Proximity speed buffs
//!
//! Providers (altars) speed up nearby consumers (agents). The zone refreshes
//! every consumer's multiplier once per tick before entities update.

use serde::{Deserialize, Serialize};

/// Consumer side: the multiplier applied to the owner's action dt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBuff {
    pub multiplier: f64,
}

impl Default for SpeedBuff {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SpeedBuff {
    pub fn reset(&mut self) {
        self.multiplier = 1.0;
    }

    /// Keep the strongest buff seen this tick
    pub fn offer(&mut self, multiplier: f64) {
        if multiplier.is_finite() && multiplier > self.multiplier {
            self.multiplier = multiplier;
        }
    }
}

/// Provider side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffProvider {
    /// Manhattan range in tiles
    pub range: i32,
    pub multiplier: f64,
}

impl BuffProvider {
    pub fn new(range: i32, multiplier: f64) -> Self {
        Self { range, multiplier }
    }
}
