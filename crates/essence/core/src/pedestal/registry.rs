use std::collections::BTreeMap;
use std::time::Duration;

use super::error::PedestalError;
use super::item::{Infusion, Item};
use super::progress::{level_cap, progress, protection_percent, tier_for_progress, time_to_next_tier};
use crate::timer::Timestamp;
use crate::types::{BlockPos, PlayerId};

/// A placed pedestal.
#[derive(Clone, Debug, PartialEq)]
pub struct InfusionPedestal {
    pub block: BlockPos,
    pub owner: PlayerId,
    /// Owner level when placed. Fixes the progress cap for the pedestal's lifetime.
    pub owner_level: u32,
    pub placed_at: Timestamp,
    pub items: Vec<Item>,
}

impl InfusionPedestal {
    pub fn new(block: BlockPos, owner: PlayerId, owner_level: u32, placed_at: Timestamp) -> Self {
        Self {
            block,
            owner,
            owner_level,
            placed_at,
            items: Vec::new(),
        }
    }

    pub fn cap(&self) -> f64 {
        level_cap(self.owner_level)
    }

    pub fn progress(&self, now: Timestamp) -> f64 {
        progress(now.saturating_since(self.placed_at), self.owner_level)
    }

    pub fn tier(&self, now: Timestamp) -> u8 {
        tier_for_progress(self.progress(now))
    }

    pub fn time_to_next_tier(&self, now: Timestamp) -> Duration {
        time_to_next_tier(self.progress(now), self.owner_level)
    }

    pub fn info(&self, now: Timestamp) -> PedestalInfo {
        let progress = self.progress(now);
        PedestalInfo {
            block: self.block,
            owner: self.owner,
            owner_level: self.owner_level,
            progress,
            tier: tier_for_progress(progress),
            cap: self.cap(),
            item_count: self.items.len(),
            time_to_next_tier: time_to_next_tier(progress, self.owner_level),
        }
    }
}

/// Read-only snapshot of a pedestal at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct PedestalInfo {
    pub block: BlockPos,
    pub owner: PlayerId,
    pub owner_level: u32,
    pub progress: f64,
    pub tier: u8,
    pub cap: f64,
    pub item_count: usize,
    pub time_to_next_tier: Duration,
}

impl PedestalInfo {
    /// Progress as a whole percentage, rounded down.
    pub fn progress_percent(&self) -> u8 {
        (self.progress * 100.0).floor().clamp(0.0, 100.0) as u8
    }
}

/// Items handed back by a successful retrieval.
#[derive(Clone, Debug, PartialEq)]
pub struct Retrieval {
    pub tier: u8,
    pub items: Vec<Item>,
}

/// All placed pedestals, keyed by block.
#[derive(Clone, Debug, Default)]
pub struct PedestalRegistry {
    pedestals: BTreeMap<BlockPos, InfusionPedestal>,
}

impl PedestalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pedestal. The caller has already checked the block is empty.
    pub fn place(
        &mut self,
        owner: PlayerId,
        owner_level: u32,
        block: BlockPos,
        now: Timestamp,
    ) -> Result<&InfusionPedestal, PedestalError> {
        if self.pedestals.contains_key(&block) {
            return Err(PedestalError::AlreadyExists { block });
        }
        let pedestal = InfusionPedestal::new(block, owner, owner_level, now);
        Ok(self.pedestals.entry(block).or_insert(pedestal))
    }

    /// Appends an item, returning how many items the pedestal now holds.
    pub fn add_item(
        &mut self,
        owner: PlayerId,
        block: BlockPos,
        item: Item,
    ) -> Result<usize, PedestalError> {
        let pedestal = self.owned_mut(owner, block)?;
        if !item.is_infusable() {
            return Err(PedestalError::NotInfusable {
                material: item.material,
            });
        }
        pedestal.items.push(item);
        Ok(pedestal.items.len())
    }

    /// Infuses every stored item with the current tier and removes the pedestal.
    ///
    /// Below tier 1 nothing changes and the remaining time is reported.
    pub fn retrieve(
        &mut self,
        owner: PlayerId,
        block: BlockPos,
        now: Timestamp,
    ) -> Result<Retrieval, PedestalError> {
        let pedestal = self.owned_mut(owner, block)?;
        let progress = pedestal.progress(now);
        let tier = tier_for_progress(progress);
        if tier == 0 {
            return Err(PedestalError::NotReady {
                block,
                progress,
                time_to_next_tier: time_to_next_tier(progress, pedestal.owner_level),
            });
        }

        let Some(pedestal) = self.pedestals.remove(&block) else {
            return Err(PedestalError::NotFound { block });
        };
        let infusion = Infusion {
            tier,
            protection_percent: protection_percent(tier),
        };
        let items = pedestal
            .items
            .into_iter()
            .map(|mut item| {
                item.infusion = Some(infusion);
                item
            })
            .collect();

        Ok(Retrieval { tier, items })
    }

    pub fn remove(&mut self, block: &BlockPos) -> Option<InfusionPedestal> {
        self.pedestals.remove(block)
    }

    pub fn get(&self, block: &BlockPos) -> Option<&InfusionPedestal> {
        self.pedestals.get(block)
    }

    pub fn contains(&self, block: &BlockPos) -> bool {
        self.pedestals.contains_key(block)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InfusionPedestal> {
        self.pedestals.values()
    }

    pub fn len(&self) -> usize {
        self.pedestals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pedestals.is_empty()
    }

    fn owned_mut(
        &mut self,
        owner: PlayerId,
        block: BlockPos,
    ) -> Result<&mut InfusionPedestal, PedestalError> {
        let pedestal = self
            .pedestals
            .get_mut(&block)
            .ok_or(PedestalError::NotFound { block })?;
        if pedestal.owner != owner {
            return Err(PedestalError::NotOwner { block });
        }
        Ok(pedestal)
    }
}
