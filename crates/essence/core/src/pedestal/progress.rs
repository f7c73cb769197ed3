//! Piecewise infusion progress.
//!
//! The first day fills 70% of the bar, the second day the remaining 30%.
//! Progress is then clamped to the owner-level cap.
use std::time::Duration;

pub const ONE_DAY: Duration = Duration::from_secs(86_400);
pub const FIRST_PHASE_SHARE: f64 = 0.70;
/// Minimum progress for tiers 1..=5.
pub const TIER_THRESHOLDS: [f64; 5] = [0.15, 0.35, 0.55, 0.75, 0.95];

/// Highest progress a pedestal can reach for an owner level.
pub fn level_cap(level: u32) -> f64 {
    match level {
        100.. => 1.00,
        75.. => 0.80,
        50.. => 0.60,
        25.. => 0.40,
        10.. => 0.20,
        _ => 0.00,
    }
}

fn uncapped(elapsed: Duration) -> f64 {
    let day = ONE_DAY.as_secs_f64();
    let elapsed = elapsed.as_secs_f64();
    if elapsed < day {
        (elapsed / day) * FIRST_PHASE_SHARE
    } else {
        FIRST_PHASE_SHARE + ((elapsed - day) / day).min(1.0) * (1.0 - FIRST_PHASE_SHARE)
    }
}

pub fn progress(elapsed: Duration, owner_level: u32) -> f64 {
    uncapped(elapsed).min(level_cap(owner_level))
}

pub fn tier_for_progress(progress: f64) -> u8 {
    TIER_THRESHOLDS
        .iter()
        .take_while(|threshold| progress >= **threshold)
        .count() as u8
}

pub fn protection_percent(tier: u8) -> u8 {
    match tier {
        1 => 20,
        2 => 40,
        3 => 60,
        4 => 80,
        5 => 95,
        _ => 0,
    }
}

/// Integer average protection over the infused pieces (tier > 0).
pub fn average_protection(tiers: &[u8]) -> u8 {
    let infused: Vec<u32> = tiers
        .iter()
        .filter(|tier| **tier > 0)
        .map(|tier| protection_percent(*tier) as u32)
        .collect();
    if infused.is_empty() {
        return 0;
    }
    (infused.iter().sum::<u32>() / infused.len() as u32) as u8
}

/// Time until the next tier, zero once progress has reached the cap.
///
/// The next threshold is clamped to the cap and the gap is divided by the
/// slope of the phase the pedestal is currently in.
pub fn time_to_next_tier(progress: f64, owner_level: u32) -> Duration {
    let cap = level_cap(owner_level);
    if progress >= cap {
        return Duration::ZERO;
    }
    let tier = tier_for_progress(progress) as usize;
    let next = TIER_THRESHOLDS.get(tier).copied().unwrap_or(1.0).min(cap);
    let needed = (next - progress).max(0.0);
    let per_day = if progress < FIRST_PHASE_SHARE {
        FIRST_PHASE_SHARE
    } else {
        1.0 - FIRST_PHASE_SHARE
    };
    Duration::from_secs((needed / per_day * ONE_DAY.as_secs_f64()) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3_600);

    #[test]
    fn low_level_owner_never_progresses() {
        for hours in [0, 6, 24, 48, 480] {
            assert_eq!(progress(HOUR * hours, 5), 0.0);
        }
    }

    #[test]
    fn progress_is_monotone_and_capped() {
        let mut previous = 0.0;
        for hours in 0..=72 {
            let value = progress(HOUR * hours, 30);
            assert!(value >= previous);
            assert!(value <= 0.40);
            previous = value;
        }
        assert_eq!(progress(HOUR * 48, 30), 0.40);
    }

    #[test]
    fn full_level_owner_completes_after_two_days() {
        assert!((progress(ONE_DAY, 100) - 0.70).abs() < 1e-9);
        assert!((progress(ONE_DAY * 2, 100) - 1.0).abs() < 1e-9);
        assert!((progress(ONE_DAY * 5, 100) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(tier_for_progress(0.0), 0);
        assert_eq!(tier_for_progress(0.149), 0);
        assert_eq!(tier_for_progress(0.15), 1);
        assert_eq!(tier_for_progress(0.40), 2);
        assert_eq!(tier_for_progress(1.0), 5);
        assert_eq!(protection_percent(tier_for_progress(0.80)), 80);
    }

    #[test]
    fn average_protection_ignores_plain_pieces() {
        assert_eq!(average_protection(&[]), 0);
        assert_eq!(average_protection(&[0, 0]), 0);
        assert_eq!(average_protection(&[1, 2, 0, 0]), 30);
        assert_eq!(average_protection(&[5, 4, 4]), 85);
    }

    #[test]
    fn next_tier_time_uses_current_phase_slope() {
        // 0.0 -> 0.15 at 0.70/day
        let secs = time_to_next_tier(0.0, 100).as_secs();
        assert_eq!(secs, (0.15 / 0.70 * 86_400.0) as u64);

        // 0.80 -> 0.95 at 0.30/day
        let secs = time_to_next_tier(0.80, 100).as_secs();
        assert_eq!(secs, ((0.95 - 0.80) / 0.30 * 86_400.0) as u64);

        assert_eq!(time_to_next_tier(0.40, 30), Duration::ZERO);
    }

    #[test]
    fn next_tier_is_clamped_to_cap() {
        // Level 10 caps at 0.20, which lies beyond tier 1 but short of tier 2.
        let secs = time_to_next_tier(0.15, 10).as_secs();
        assert_eq!(secs, ((0.20 - 0.15) / 0.70 * 86_400.0) as u64);
    }
}
