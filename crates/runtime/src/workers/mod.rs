//! Worker tasks that back the runtime orchestration.
//!
//! The essence worker owns the engine and runs the periodic drain and
//! pedestal display loops alongside command processing.

mod essence;

pub use essence::{Collaborators, Command, EssenceWorker, WorkerIntervals};
