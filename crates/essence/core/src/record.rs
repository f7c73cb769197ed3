//! Per-player resource record.
//!
//! Only `lifetime_total` and `active_passives` outlive a session. Everything
//! else (selection, cooldowns, immunity, traversal, the cue task) is rebuilt
//! from scratch when the player reconnects.
use std::collections::BTreeSet;
use std::fmt;

use crate::ability::AbilityId;
use crate::env::TaskHandle;
use crate::progression::level_for_total;
use crate::timer::{ExpiryTable, Timestamp};
use crate::types::PlayerId;

pub struct PlayerRecord {
    id: PlayerId,
    lifetime_total: f64,
    active_passives: BTreeSet<AbilityId>,
    selected_active: Option<AbilityId>,
    cooldowns: ExpiryTable<AbilityId>,
    immunity_expiry: Option<Timestamp>,
    traversal_enabled: bool,
    cue_task: Option<Box<dyn TaskHandle>>,
}

impl PlayerRecord {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            lifetime_total: 0.0,
            active_passives: BTreeSet::new(),
            selected_active: None,
            cooldowns: ExpiryTable::new(),
            immunity_expiry: None,
            traversal_enabled: false,
            cue_task: None,
        }
    }

    /// Rebuilds a record from its persisted form.
    ///
    /// Returns the record together with every passive name that was skipped
    /// because it is unknown or not a passive ability.
    pub fn from_persisted(id: PlayerId, persisted: &PersistedRecord) -> (Self, Vec<String>) {
        let mut record = Self::new(id);
        record.lifetime_total = if persisted.total_storm_essence.is_finite() {
            persisted.total_storm_essence.max(0.0)
        } else {
            0.0
        };

        let mut skipped = Vec::new();
        for name in &persisted.active_passives {
            match name.parse::<AbilityId>() {
                Ok(ability) if ability.is_passive() => {
                    record.active_passives.insert(ability);
                }
                _ => skipped.push(name.clone()),
            }
        }
        (record, skipped)
    }

    pub fn persisted(&self) -> PersistedRecord {
        PersistedRecord {
            total_storm_essence: self.lifetime_total,
            active_passives: self
                .active_passives
                .iter()
                .map(|ability| ability.to_string())
                .collect(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn lifetime_total(&self) -> f64 {
        self.lifetime_total
    }

    pub fn level(&self) -> u32 {
        level_for_total(self.lifetime_total)
    }

    /// Adds to the lifetime total unless a passive is enabled.
    ///
    /// Returns whether the amount was accrued.
    pub fn accrue(&mut self, amount: f64) -> bool {
        if !self.active_passives.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.lifetime_total += amount;
        true
    }

    pub fn active_passives(&self) -> &BTreeSet<AbilityId> {
        &self.active_passives
    }

    pub fn is_passive_enabled(&self, ability: AbilityId) -> bool {
        self.active_passives.contains(&ability)
    }

    pub(crate) fn set_passive(&mut self, ability: AbilityId, enabled: bool) {
        debug_assert!(ability.is_passive());
        if enabled {
            self.active_passives.insert(ability);
        } else {
            self.active_passives.remove(&ability);
        }
    }

    /// Disables every passive, returning the ones that were enabled.
    pub(crate) fn clear_passives(&mut self) -> Vec<AbilityId> {
        std::mem::take(&mut self.active_passives).into_iter().collect()
    }

    pub fn selected_active(&self) -> Option<AbilityId> {
        self.selected_active
    }

    pub(crate) fn select(&mut self, ability: AbilityId) {
        debug_assert!(ability.is_active());
        self.selected_active = Some(ability);
    }

    pub fn cooldowns(&self) -> &ExpiryTable<AbilityId> {
        &self.cooldowns
    }

    pub(crate) fn cooldowns_mut(&mut self) -> &mut ExpiryTable<AbilityId> {
        &mut self.cooldowns
    }

    pub(crate) fn grant_immunity(&mut self, until: Timestamp) {
        self.immunity_expiry = Some(until);
    }

    /// Lazily clears an expired immunity.
    pub fn has_immunity(&mut self, now: Timestamp) -> bool {
        match self.immunity_expiry {
            Some(expiry) if now < expiry => true,
            Some(_) => {
                self.immunity_expiry = None;
                false
            }
            None => false,
        }
    }

    pub fn immunity_expiry(&self) -> Option<Timestamp> {
        self.immunity_expiry
    }

    pub fn is_traversal_enabled(&self) -> bool {
        self.traversal_enabled
    }

    /// Flips traversal mode and returns the new state.
    pub(crate) fn toggle_traversal(&mut self) -> bool {
        self.traversal_enabled = !self.traversal_enabled;
        self.traversal_enabled
    }

    /// Stores a new cue task, cancelling the previous one first.
    pub(crate) fn replace_cue_task(&mut self, task: Box<dyn TaskHandle>) {
        self.cancel_cue_task();
        self.cue_task = Some(task);
    }

    pub(crate) fn cancel_cue_task(&mut self) {
        if let Some(task) = self.cue_task.take() {
            task.cancel();
        }
    }

    pub fn has_running_cue(&self) -> bool {
        self.cue_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Drops all session-only state.
    pub(crate) fn clear_transient(&mut self) {
        self.cancel_cue_task();
        self.selected_active = None;
        self.cooldowns.clear_all();
        self.immunity_expiry = None;
        self.traversal_enabled = false;
    }
}

impl fmt::Debug for PlayerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerRecord")
            .field("id", &self.id)
            .field("lifetime_total", &self.lifetime_total)
            .field("active_passives", &self.active_passives)
            .field("selected_active", &self.selected_active)
            .field("cooldowns", &self.cooldowns.len())
            .field("immunity_expiry", &self.immunity_expiry)
            .field("traversal_enabled", &self.traversal_enabled)
            .field("cue_task", &self.cue_task.is_some())
            .finish()
    }
}

/// Stored form of a player record.
///
/// Passive names are kept as strings so that unknown names from older data
/// can be skipped instead of failing the whole load.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct PersistedRecord {
    pub total_storm_essence: f64,
    pub active_passives: Vec<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    struct FlagTask(Arc<AtomicBool>);

    impl TaskHandle for FlagTask {
        fn cancel(&self) {
            self.0.store(true, Ordering::SeqCst);
        }

        fn is_finished(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn accrual_pauses_while_passives_enabled() {
        let mut record = PlayerRecord::new(PlayerId(1));
        assert!(record.accrue(100.0));
        record.set_passive(AbilityId::StormResistance, true);
        assert!(!record.accrue(100.0));
        assert_eq!(record.lifetime_total(), 100.0);
    }

    #[test]
    fn persisted_round_trip_skips_unknown_names() {
        let persisted = PersistedRecord {
            total_storm_essence: 2500.0,
            active_passives: vec![
                "STORMBORN".into(),
                "THUNDER_FISTS".into(),
                "STORM_SENSE".into(),
            ],
        };
        let (record, skipped) = PlayerRecord::from_persisted(PlayerId(2), &persisted);

        assert_eq!(record.level(), 15);
        assert!(record.is_passive_enabled(AbilityId::Stormborn));
        assert_eq!(skipped, vec!["THUNDER_FISTS", "STORM_SENSE"]);
        assert_eq!(record.persisted().active_passives, vec!["STORMBORN"]);
    }

    #[test]
    fn replacing_cue_task_cancels_previous() {
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));
        let mut record = PlayerRecord::new(PlayerId(3));

        record.replace_cue_task(Box::new(FlagTask(Arc::clone(&first))));
        record.replace_cue_task(Box::new(FlagTask(Arc::clone(&second))));

        assert!(first.load(Ordering::SeqCst));
        assert!(!second.load(Ordering::SeqCst));
        assert!(record.has_running_cue());
    }

    #[test]
    fn clearing_transient_state_keeps_persisted_fields() {
        let mut record = PlayerRecord::new(PlayerId(4));
        record.accrue(640.0);
        record.set_passive(AbilityId::StormResistance, true);
        record.grant_immunity(Timestamp(10_000));
        record.toggle_traversal();
        record
            .cooldowns_mut()
            .start(AbilityId::StormSense, Timestamp(0), Duration::from_secs(60));

        record.clear_transient();

        assert!(!record.has_immunity(Timestamp(0)));
        assert!(!record.is_traversal_enabled());
        assert!(record.cooldowns().is_empty());
        assert_eq!(record.persisted().total_storm_essence, 640.0);
        assert_eq!(record.active_passives().len(), 1);
    }
}
