use std::collections::HashMap;
use std::sync::RwLock;

use essence_core::{BalanceError, BalanceStore, PlayerId};

/// Process-local balances for hosts without an external economy.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    balances: RwLock<HashMap<PlayerId, f64>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a balance. Returns false if the lock was poisoned.
    pub fn set_balance(&self, player: PlayerId, amount: f64) -> bool {
        match self.balances.write() {
            Ok(mut balances) => {
                balances.insert(player, amount);
                true
            }
            Err(_) => false,
        }
    }

    fn validate(amount: f64) -> Result<(), BalanceError> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(())
        } else {
            Err(BalanceError::InvalidAmount(amount))
        }
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn balance(&self, player: PlayerId) -> f64 {
        self.balances
            .read()
            .ok()
            .and_then(|balances| balances.get(&player).copied())
            .unwrap_or(0.0)
    }

    fn withdraw(&self, player: PlayerId, amount: f64) -> Result<(), BalanceError> {
        Self::validate(amount)?;
        let mut balances = self
            .balances
            .write()
            .map_err(|_| BalanceError::Rejected("ledger lock poisoned".into()))?;
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
        Self::validate(amount)?;
        let mut balances = self
            .balances
            .write()
            .map_err(|_| BalanceError::Rejected("ledger lock poisoned".into()))?;
        *balances.entry(player).or_insert(0.0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_never_overdraws() {
        let ledger = InMemoryBalanceStore::new();
        ledger.deposit(PlayerId(1), 10.0).unwrap();

        assert!(ledger.has(PlayerId(1), 10.0));
        assert!(matches!(
            ledger.withdraw(PlayerId(1), 10.5),
            Err(BalanceError::Insufficient { .. })
        ));
        ledger.withdraw(PlayerId(1), 4.0).unwrap();
        assert_eq!(ledger.balance(PlayerId(1)), 6.0);
    }

    #[test]
    fn rejects_non_finite_amounts() {
        let ledger = InMemoryBalanceStore::new();
        assert_eq!(
            ledger.deposit(PlayerId(1), f64::NAN).unwrap_err().to_string(),
            "invalid transaction amount NaN"
        );
        assert_eq!(ledger.balance(PlayerId(2)), 0.0);
    }
}
