//! In-memory collaborators for unit tests.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::effect::EffectCommand;
use crate::env::{
    BalanceError, BalanceStore, CuePlan, CueScheduler, Env, Hazard, HazardRegistry, TaskHandle,
    WorldHost,
};
use crate::timer::Timestamp;
use crate::types::{BlockPos, HazardId, Location, PlayerId, Position, ZoneId};

#[derive(Default)]
pub(crate) struct FakeBalance {
    balances: Mutex<HashMap<PlayerId, f64>>,
    pub reject_withdrawals: AtomicBool,
    pub reject_deposits: AtomicBool,
}

impl FakeBalance {
    pub fn set(&self, player: PlayerId, amount: f64) {
        self.balances.lock().unwrap().insert(player, amount);
    }
}

impl BalanceStore for FakeBalance {
    fn balance(&self, player: PlayerId) -> f64 {
        self.balances
            .lock()
            .unwrap()
            .get(&player)
            .copied()
            .unwrap_or(0.0)
    }

    fn withdraw(&self, player: PlayerId, amount: f64) -> Result<(), BalanceError> {
        if self.reject_withdrawals.load(Ordering::SeqCst) {
            return Err(BalanceError::Rejected("frozen".into()));
        }
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(player).or_insert(0.0);
        if *balance < amount {
            return Err(BalanceError::Insufficient {
                player,
                balance: *balance,
                amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn deposit(&self, player: PlayerId, amount: f64) -> Result<(), BalanceError> {
        if self.reject_deposits.load(Ordering::SeqCst) {
            return Err(BalanceError::Rejected("offline".into()));
        }
        *self.balances.lock().unwrap().entry(player).or_insert(0.0) += amount;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeHazards {
    pub hazards: Mutex<Vec<Hazard>>,
    pub retargets: Mutex<Vec<(HazardId, Position)>>,
    pub boosts: Mutex<Vec<(HazardId, f64, Timestamp)>>,
}

impl FakeHazards {
    pub fn add(&self, id: u64, center: Position, radius: f64) {
        self.hazards.lock().unwrap().push(Hazard {
            id: HazardId(id),
            zone: ZoneId(0),
            center,
            radius,
        });
    }
}

impl HazardRegistry for FakeHazards {
    fn active_hazards(&self) -> Vec<Hazard> {
        self.hazards.lock().unwrap().clone()
    }

    fn retarget(&self, hazard: HazardId, target: Position) {
        self.retargets.lock().unwrap().push((hazard, target));
    }

    fn boost_speed(&self, hazard: HazardId, multiplier: f64, until: Timestamp) {
        self.boosts.lock().unwrap().push((hazard, multiplier, until));
    }
}

#[derive(Default)]
pub(crate) struct FakeWorld {
    pub locations: Mutex<HashMap<PlayerId, Location>>,
    pub aim: Mutex<Option<Location>>,
    pub occupied: Mutex<HashSet<BlockPos>>,
    pub tiers: Mutex<Vec<u8>>,
    pub commands: Mutex<Vec<EffectCommand>>,
}

impl FakeWorld {
    pub fn place_player(&self, player: PlayerId, position: Position) {
        self.locations
            .lock()
            .unwrap()
            .insert(player, Location::new(ZoneId(0), position));
    }

    pub fn take_commands(&self) -> Vec<EffectCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }
}

impl WorldHost for FakeWorld {
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
        self.tiers.lock().unwrap().clone()
    }

    fn dispatch(&self, command: EffectCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

pub(crate) struct FlagTask(pub Arc<AtomicBool>);

impl TaskHandle for FlagTask {
    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct FakeCues {
    pub started: Mutex<Vec<(PlayerId, CuePlan)>>,
    pub cancelled: Mutex<Vec<Arc<AtomicBool>>>,
}

impl FakeCues {
    pub fn cancelled_count(&self) -> usize {
        self.cancelled
            .lock()
            .unwrap()
            .iter()
            .filter(|flag| flag.load(Ordering::SeqCst))
            .count()
    }
}

impl CueScheduler for FakeCues {
    fn start(&self, player: PlayerId, plan: CuePlan) -> Box<dyn TaskHandle> {
        self.started.lock().unwrap().push((player, plan));
        let flag = Arc::new(AtomicBool::new(false));
        self.cancelled.lock().unwrap().push(Arc::clone(&flag));
        Box::new(FlagTask(flag))
    }
}

#[derive(Default)]
pub(crate) struct Harness {
    pub balance: FakeBalance,
    pub hazards: FakeHazards,
    pub world: FakeWorld,
    pub cues: FakeCues,
}

impl Harness {
    pub fn env(&self) -> Env<'_> {
        Env::new(&self.balance, &self.hazards, &self.world, &self.cues)
    }
}
