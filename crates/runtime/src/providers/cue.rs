//! Guidance cues as spawned tokio tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use essence_core::{
    CuePlan, CueScheduler, EffectCommand, HazardRegistry, PlayerId, TaskHandle, WorldHost,
    guide_cue,
};

const NO_STORMS: &str = "No storms nearby";

/// Spawns one task per cue on the current tokio runtime.
///
/// Each task emits a [`EffectCommand::GuideCue`] every `plan.interval` until
/// `plan.duration` has passed. It ends early when the player goes offline or
/// the zone has no hazards left.
#[derive(Clone)]
pub struct TokioCueScheduler {
    hazards: Arc<dyn HazardRegistry>,
    world: Arc<dyn WorldHost>,
}

impl TokioCueScheduler {
    pub fn new(hazards: Arc<dyn HazardRegistry>, world: Arc<dyn WorldHost>) -> Self {
        Self { hazards, world }
    }
}

impl CueScheduler for TokioCueScheduler {
    fn start(&self, player: PlayerId, plan: CuePlan) -> Box<dyn TaskHandle> {
        let hazards = Arc::clone(&self.hazards);
        let world = Arc::clone(&self.world);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(plan.interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            for _ in 0..plan.steps() {
                ticker.tick().await;
                if !world.is_online(player) {
                    break;
                }
                let Some(location) = world.location(player) else {
                    break;
                };
                match guide_cue(player, &location, &hazards.active_hazards(), plan.spacing) {
                    Some(cue) => world.dispatch(EffectCommand::GuideCue(cue)),
                    None => {
                        world.dispatch(EffectCommand::Notify {
                            player,
                            message: NO_STORMS.to_string(),
                        });
                        break;
                    }
                }
            }
            tracing::trace!(target: "runtime::cue", %player, "Guidance cue finished");
        });

        Box::new(CueTask(handle))
    }
}

/// Handle to a spawned cue. Cancelling aborts the task.
pub struct CueTask(JoinHandle<()>);

impl TaskHandle for CueTask {
    fn cancel(&self) {
        self.0.abort();
    }

    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}
