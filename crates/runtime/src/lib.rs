//! Runtime orchestration for the storm essence engine.
//!
//! This crate wires the synchronous [`essence_core::EssenceEngine`] into an
//! async service: a single worker task owns the engine, a cloneable
//! [`RuntimeHandle`] sends it commands, and a topic-based [`EventBus`] reports
//! what happened. Consumers embed [`Runtime`] and supply the balance store,
//! hazard registry and world host their server provides.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`providers`] implements engine collaborators on tokio
//! - [`repository`] persists player records
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{
    AbilityEvent, EconomyEvent, Event, EventBus, PedestalEvent, PersistenceEvent, Topic,
};
pub use providers::{CueTask, InMemoryBalanceStore, ManualClock, SystemClock, TokioCueScheduler};
pub use repository::{FilePlayerRepository, InMemoryPlayerRepo, PlayerRepository, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
