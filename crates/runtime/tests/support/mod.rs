#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use essence_core::{
    BlockPos, EffectCommand, EssenceConfig, Hazard, HazardId, HazardRegistry, Location,
    PlayerId, Position, Timestamp, WorldHost, ZoneId,
};
use essence_runtime::{
    Event, InMemoryBalanceStore, InMemoryPlayerRepo, ManualClock, PlayerRepository, Runtime,
    RuntimeHandle,
};
use tokio::sync::broadcast;

pub const ALEX: PlayerId = PlayerId(0xa1e5);
pub const SAM: PlayerId = PlayerId(0x5a3);

#[derive(Default)]
pub struct TestHazards {
    pub hazards: Mutex<Vec<Hazard>>,
    pub retargets: Mutex<Vec<(HazardId, Position)>>,
}

impl TestHazards {
    pub fn add(&self, id: u64, center: Position, radius: f64) {
        self.hazards.lock().unwrap().push(Hazard {
            id: HazardId(id),
            zone: ZoneId(0),
            center,
            radius,
        });
    }

    pub fn clear(&self) {
        self.hazards.lock().unwrap().clear();
    }
}

impl HazardRegistry for TestHazards {
    fn active_hazards(&self) -> Vec<Hazard> {
        self.hazards.lock().unwrap().clone()
    }

    fn retarget(&self, hazard: HazardId, target: Position) {
        self.retargets.lock().unwrap().push((hazard, target));
    }

    fn boost_speed(&self, _hazard: HazardId, _multiplier: f64, _until: Timestamp) {}
}

#[derive(Default)]
pub struct TestWorld {
    pub locations: Mutex<HashMap<PlayerId, Location>>,
    pub aim: Mutex<Option<Location>>,
    pub occupied: Mutex<HashSet<BlockPos>>,
    pub commands: Mutex<Vec<EffectCommand>>,
}

impl TestWorld {
    pub fn place(&self, player: PlayerId, x: f64, z: f64) {
        self.locations.lock().unwrap().insert(
            player,
            Location::new(ZoneId(0), Position::new(x, 64.0, z)),
        );
    }

    pub fn remove(&self, player: PlayerId) {
        self.locations.lock().unwrap().remove(&player);
    }

    pub fn commands(&self) -> Vec<EffectCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn guide_cues(&self) -> usize {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, EffectCommand::GuideCue(_)))
            .count()
    }
}

impl WorldHost for TestWorld {
    fn is_online(&self, player: PlayerId) -> bool {
        self.locations.lock().unwrap().contains_key(&player)
    }

    fn location(&self, player: PlayerId) -> Option<Location> {
        self.locations.lock().unwrap().get(&player).copied()
    }

    fn aim_target(&self, _player: PlayerId, _max_range: f64) -> Option<Location> {
        *self.aim.lock().unwrap()
    }

    fn is_block_empty(&self, block: &BlockPos) -> bool {
        !self.occupied.lock().unwrap().contains(block)
    }

    fn equipped_infusion_tiers(&self, _player: PlayerId) -> Vec<u8> {
        Vec::new()
    }

    fn dispatch(&self, command: EffectCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

pub struct Fixture {
    pub runtime: Runtime,
    pub handle: RuntimeHandle,
    pub ledger: Arc<InMemoryBalanceStore>,
    pub hazards: Arc<TestHazards>,
    pub world: Arc<TestWorld>,
    pub clock: ManualClock,
}

impl Fixture {
    pub async fn start(config: EssenceConfig) -> Self {
        Self::with_repository(config, Arc::new(InMemoryPlayerRepo::new())).await
    }

    pub async fn with_repository(
        config: EssenceConfig,
        repository: Arc<dyn PlayerRepository>,
    ) -> Self {
        let ledger = Arc::new(InMemoryBalanceStore::new());
        let hazards = Arc::new(TestHazards::default());
        let world = Arc::new(TestWorld::default());
        let clock = ManualClock::new(Timestamp::from_millis(1_000_000));

        let runtime = Runtime::builder()
            .essence_config(config)
            .balance_store(ledger.clone())
            .hazards(hazards.clone())
            .world(world.clone())
            .clock(Arc::new(clock.clone()))
            .repository(repository)
            .build()
            .await
            .expect("runtime should build");
        let handle = runtime.handle();

        Self {
            runtime,
            handle,
            ledger,
            hazards,
            world,
            clock,
        }
    }

    /// Connects `player` and grants enough essence to reach `level`.
    pub async fn player_at_level(&self, player: PlayerId, level: u32) {
        self.world.place(player, 0.0, 0.0);
        self.handle.connect(player).await.unwrap();
        if level > 0 {
            let total = 10.0 * f64::from(level).powi(2);
            self.handle.award_essence(player, total).await.unwrap();
        }
    }
}

/// Config with loops slow enough not to interfere unless a test shortens them.
pub fn quiet_config() -> EssenceConfig {
    let mut config = EssenceConfig::default();
    config.drain.interval_ms = 3_600_000;
    config.infusion.display_refresh_secs = 3_600;
    config
}

/// Waits for the first event matching `pred`, failing after two seconds.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<Event>, mut pred: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Polls `check` until it holds, failing after two seconds.
pub async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
