use std::time::Duration;

use crate::timer::Timestamp;
use crate::types::PlayerId;

/// Source of wall-clock time for every engine call.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Parameters of the repeating guidance cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CuePlan {
    pub interval: Duration,
    pub duration: Duration,
    pub spacing: f64,
}

impl CuePlan {
    /// Number of emissions before the task ends on its own.
    pub fn steps(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        u32::try_from(self.duration.as_millis() / interval).unwrap_or(u32::MAX)
    }
}

/// Cancellable handle to a running background task.
pub trait TaskHandle: Send {
    fn cancel(&self);

    fn is_finished(&self) -> bool;
}

/// Starts a guidance cue task for one player.
///
/// The task stops on its own after `plan.duration`, when the player goes
/// offline, or when no hazard remains in the player's zone.
pub trait CueScheduler: Send + Sync {
    fn start(&self, player: PlayerId, plan: CuePlan) -> Box<dyn TaskHandle>;
}
