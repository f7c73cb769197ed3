//! Event types for different topics.

use essence_core::{
    AbilityActivation, AbilityError, AbilityId, BlockPos, PedestalInfo, PlayerId,
};

/// Balance, accrual and drain events.
#[derive(Debug, Clone, PartialEq)]
pub enum EconomyEvent {
    EssenceAwarded {
        player: PlayerId,
        amount: f64,
        /// False when the grant only reached the balance.
        accrued: bool,
        level: u32,
        leveled_up: bool,
    },

    PassiveToggled {
        player: PlayerId,
        ability: AbilityId,
        enabled: bool,
        drain_rate: f64,
    },

    Drained { player: PlayerId, amount: f64 },

    /// A drain tick could not be paid; every passive was switched off.
    PassivesDisabled {
        player: PlayerId,
        disabled: Vec<AbilityId>,
        rate: f64,
        balance: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbilityEvent {
    Activated {
        player: PlayerId,
        activation: AbilityActivation,
    },

    Rejected {
        player: PlayerId,
        /// `None` when the selected-ability trigger found nothing to use.
        ability: Option<AbilityId>,
        error: AbilityError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PedestalEvent {
    Placed { info: PedestalInfo },

    ItemAdded {
        block: BlockPos,
        owner: PlayerId,
        item_count: usize,
    },

    Retrieved {
        block: BlockPos,
        owner: PlayerId,
        tier: u8,
        item_count: usize,
    },

    Removed { block: BlockPos },
}

/// Repository outcomes. Failures never roll back in-memory state.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceEvent {
    Saved { player: PlayerId },

    SaveFailed { player: PlayerId, error: String },

    /// The player continues with a fresh default record.
    LoadFailed { player: PlayerId, error: String },
}
