//! Agent jobs and their per-action speed multipliers

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::catalog::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Job {
    Mercenary,
    Warden,
    Thief,
    Beastmaster,
    Medic,
    Merchant,
    Crafter,
    Farmer,
    Minerjack,
    Builder,
    Alchemist,
    Explorer,
    Scout,
}

impl Job {
    pub const ALL: [Job; 13] = [
        Job::Mercenary,
        Job::Warden,
        Job::Thief,
        Job::Beastmaster,
        Job::Medic,
        Job::Merchant,
        Job::Crafter,
        Job::Farmer,
        Job::Minerjack,
        Job::Builder,
        Job::Alchemist,
        Job::Explorer,
        Job::Scout,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Job {
        Job::ALL[rng.gen_range(0..Job::ALL.len())]
    }

    /// How much faster this job performs an action (1 = baseline)
    pub fn action_multiplier(&self, action: ActionKind) -> f64 {
        use ActionKind::*;
        match (self, action) {
            (Job::Mercenary, Attack) => 7.0,
            (Job::Mercenary, Roam) => 3.0,

            (Job::Crafter, Maintain | Rebuild | Chop | Mine) => 2.0,
            (Job::Crafter, Forage) => 5.0,

            (Job::Minerjack, Chop | Mine) => 5.0,

            (Job::Builder, Maintain | Rebuild) => 5.0,

            (Job::Explorer, Attack) => 3.0,
            (Job::Explorer, Roam) => 7.0,

            _ => 1.0,
        }
    }
}
