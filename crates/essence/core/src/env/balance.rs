use crate::error::{ErrorSeverity, EssenceError};
use crate::types::PlayerId;

/// External currency store backing essence balances.
///
/// Withdrawals are authoritative: a failed withdrawal is treated as
/// insufficient funds by every caller, and no caller retries.
pub trait BalanceStore: Send + Sync {
    fn balance(&self, player: PlayerId) -> f64;

    fn has(&self, player: PlayerId, amount: f64) -> bool {
        self.balance(player) >= amount
    }

    fn withdraw(&self, player: PlayerId, amount: f64) -> Result<(), BalanceError>;

    fn deposit(&self, player: PlayerId, amount: f64) -> Result<(), BalanceError>;
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BalanceError {
    #[error("balance of {player} is {balance:.2}, cannot withdraw {amount:.2}")]
    Insufficient {
        player: PlayerId,
        balance: f64,
        amount: f64,
    },

    #[error("invalid transaction amount {0}")]
    InvalidAmount(f64),

    #[error("balance store rejected the transaction: {0}")]
    Rejected(String),
}

impl EssenceError for BalanceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Insufficient { .. } => ErrorSeverity::Recoverable,
            Self::InvalidAmount(_) => ErrorSeverity::Validation,
            Self::Rejected(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Insufficient { .. } => "BALANCE_INSUFFICIENT",
            Self::InvalidAmount(_) => "BALANCE_INVALID_AMOUNT",
            Self::Rejected(_) => "BALANCE_REJECTED",
        }
    }
}
