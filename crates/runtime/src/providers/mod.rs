//! Runtime implementations of engine collaborators.
//!
//! - [`TokioCueScheduler`] runs guidance cues as spawned tasks
//! - [`SystemClock`] and [`ManualClock`] supply timestamps
//! - [`InMemoryBalanceStore`] stands in for an external economy

mod clock;
mod cue;
mod ledger;

pub use clock::{ManualClock, SystemClock};
pub use cue::{CueTask, TokioCueScheduler};
pub use ledger::InMemoryBalanceStore;
