//! High-level runtime orchestrator.
//!
//! The runtime owns the essence worker, wires up the command channel and the
//! event bus, and exposes a builder-based API for hosts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use essence_core::{BalanceStore, Clock, EssenceConfig, EssenceEngine, HazardRegistry, WorldHost};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::providers::{SystemClock, TokioCueScheduler};
use crate::repository::{InMemoryPlayerRepo, PlayerRepository};
use crate::workers::{Collaborators, Command, EssenceWorker, WorkerIntervals};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub essence: EssenceConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub fn new(essence: EssenceConfig) -> Self {
        Self {
            essence,
            ..Self::default()
        }
    }

    /// Period of the passive drain loop.
    pub fn drain_interval(&self) -> Duration {
        self.essence.drain.interval().max(MIN_INTERVAL)
    }

    /// Period of the pedestal display refresh loop.
    pub fn display_refresh_interval(&self) -> Duration {
        self.essence.infusion.display_refresh().max(MIN_INTERVAL)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            essence: EssenceConfig::default(),
            event_buffer_size: 256,
            command_buffer_size: 64,
        }
    }
}

/// Main runtime that orchestrates the essence engine
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade for
/// event listeners and command sources.
pub struct Runtime {
    handle: RuntimeHandle,
    shutdown_tx: oneshot::Sender<()>,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Cancels every guidance cue, clears transient state and flushes all
    /// loaded records before returning. Handles still held elsewhere fail
    /// with [`RuntimeError::CommandChannelClosed`] afterwards.
    pub async fn shutdown(self) -> Result<()> {
        if self.shutdown_tx.send(()).is_err() {
            tracing::debug!("essence worker already stopped");
        }
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
///
/// The balance store, hazard registry and world host are required. The
/// clock defaults to [`SystemClock`] and the repository to an
/// [`InMemoryPlayerRepo`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    balance: Option<Arc<dyn BalanceStore>>,
    hazards: Option<Arc<dyn HazardRegistry>>,
    world: Option<Arc<dyn WorldHost>>,
    clock: Option<Arc<dyn Clock>>,
    repository: Option<Arc<dyn PlayerRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            balance: None,
            hazards: None,
            world: None,
            clock: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine configuration
    pub fn essence_config(mut self, essence: EssenceConfig) -> Self {
        self.config.essence = essence;
        self
    }

    pub fn balance_store(mut self, balance: Arc<dyn BalanceStore>) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn hazards(mut self, hazards: Arc<dyn HazardRegistry>) -> Self {
        self.hazards = Some(hazards);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldHost>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn repository(mut self, repository: Arc<dyn PlayerRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the runtime and spawn the essence worker.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let balance = self
            .balance
            .ok_or(RuntimeError::MissingCollaborator("balance store"))?;
        let hazards = self
            .hazards
            .ok_or(RuntimeError::MissingCollaborator("hazard registry"))?;
        let world = self
            .world
            .ok_or(RuntimeError::MissingCollaborator("world host"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryPlayerRepo::new()));

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let intervals = WorkerIntervals {
            drain: self.config.drain_interval(),
            display_refresh: self.config.display_refresh_interval(),
        };
        let host = Collaborators {
            cues: TokioCueScheduler::new(Arc::clone(&hazards), Arc::clone(&world)),
            balance,
            hazards,
            world,
            clock,
        };
        let worker = EssenceWorker::new(
            EssenceEngine::new(self.config.essence),
            host,
            repository,
            command_rx,
            shutdown_rx,
            event_bus,
            intervals,
        );

        tracing::info!(
            target: "runtime",
            drain_ms = intervals.drain.as_millis() as u64,
            display_ms = intervals.display_refresh.as_millis() as u64,
            "Starting essence runtime"
        );
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            shutdown_tx,
            worker_handle,
        })
    }
}
