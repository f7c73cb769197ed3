//! Storm exposure level derived from lifetime essence.
use crate::ability::AbilityDefinition;

/// `floor(sqrt(total / 10))`. Negative or non-finite totals map to level 0.
pub fn level_for_total(total: f64) -> u32 {
    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    (total / 10.0).sqrt().floor() as u32
}

pub fn is_unlocked(definition: &AbilityDefinition, total: f64) -> bool {
    level_for_total(total) >= definition.unlock_level
}
