//! Fixed-period tick driver
//!
//! Runs on the tokio runtime and hands each tick to the blocking pool, where
//! the world manager fans the zone updates out to its rayon workers.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::error::{Result, SimError};
use crate::world::manager::{TickReport, WorldManager};

/// Tick `world` every `period` until `shutdown` resolves or `max_ticks` ran
///
/// `on_tick` sees every report on the async side. Returns the number of
/// ticks driven.
pub async fn run_tick_loop<F>(
    world: Arc<Mutex<WorldManager>>,
    period: Duration,
    max_ticks: Option<u64>,
    shutdown: F,
    mut on_tick: impl FnMut(&TickReport),
) -> Result<u64>
where
    F: Future<Output = ()>,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    info!(period_ms = period.as_millis() as u64, ?max_ticks, "Tick loop started");

    loop {
        if max_ticks.is_some_and(|max| ticks >= max) {
            debug!(ticks, "Tick cap reached");
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(ticks, "Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                let shared = Arc::clone(&world);
                let report = tokio::task::spawn_blocking(move || {
                    let mut world = shared.lock().map_err(|_| SimError::Poisoned)?;
                    Ok::<_, SimError>(world.tick())
                })
                .await
                .map_err(|e| SimError::TickTask(e.to_string()))??;

                ticks += 1;
                on_tick(&report);
            }
        }
    }

    info!(ticks, "Tick loop stopped");
    Ok(ticks)
}
