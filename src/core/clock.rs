//! Simulated clock driven by real elapsed time and a speed multiplier

use std::time::Duration;
use tracing::warn;

/// Monotonic simulated time
#[derive(Debug, Clone)]
pub struct SimClock {
    game_time: Duration,
    speed_multiplier: f64,
}

impl SimClock {
    /// A clock at time zero. Invalid multipliers fall back to 1.0.
    pub fn new(speed_multiplier: f64) -> Self {
        let mut clock = Self {
            game_time: Duration::ZERO,
            speed_multiplier: 1.0,
        };
        clock.set_speed_multiplier(speed_multiplier);
        clock
    }

    /// Advance by `real_dt` wall seconds and return the simulated delta
    ///
    /// Negative or non-finite inputs advance nothing.
    pub fn advance(&mut self, real_dt: f64) -> f64 {
        if !real_dt.is_finite() || real_dt <= 0.0 {
            return 0.0;
        }
        let sim_dt = real_dt * self.speed_multiplier;
        self.game_time += Duration::from_secs_f64(sim_dt);
        sim_dt
    }

    pub fn now(&self) -> Duration {
        self.game_time
    }

    /// Elapsed simulated time since `t`, zero if `t` lies in the future
    pub fn since(&self, t: Duration) -> Duration {
        self.game_time.saturating_sub(t)
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Returns false and leaves the multiplier unchanged for values <= 0
    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> bool {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            warn!(multiplier, "Rejected simulation speed multiplier, must be > 0");
            return false;
        }
        self.speed_multiplier = multiplier;
        true
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}
