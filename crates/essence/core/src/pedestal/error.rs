use std::time::Duration;

use crate::error::{ErrorSeverity, EssenceError};
use crate::timer::format_remaining;
use crate::types::BlockPos;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PedestalError {
    #[error("pedestals must be placed on an empty block ({block})")]
    LocationOccupied { block: BlockPos },

    #[error("a pedestal already exists at {block}")]
    AlreadyExists { block: BlockPos },

    #[error("no pedestal found at {block}")]
    NotFound { block: BlockPos },

    #[error("the pedestal at {block} belongs to another player")]
    NotOwner { block: BlockPos },

    #[error("{material} cannot be infused")]
    NotInfusable { material: String },

    #[error("infusion has not reached tier 1 yet ({} remaining)", format_remaining(.time_to_next_tier))]
    NotReady {
        block: BlockPos,
        progress: f64,
        time_to_next_tier: Duration,
    },
}

impl EssenceError for PedestalError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotReady { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LocationOccupied { .. } => "PEDESTAL_LOCATION_OCCUPIED",
            Self::AlreadyExists { .. } => "PEDESTAL_ALREADY_EXISTS",
            Self::NotFound { .. } => "PEDESTAL_NOT_FOUND",
            Self::NotOwner { .. } => "PEDESTAL_NOT_OWNER",
            Self::NotInfusable { .. } => "PEDESTAL_NOT_INFUSABLE",
            Self::NotReady { .. } => "PEDESTAL_NOT_READY",
        }
    }
}
