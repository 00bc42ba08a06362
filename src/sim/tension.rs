//! Heartbeat tempo derivation
//!
//! Maps the round countdown onto a heartbeat interval. Pure apart from the
//! last computed tier, which lets the playback side tell a tempo change from
//! an ordinary tick.

use serde::{Deserialize, Serialize};

use super::state::RunPhase;
use crate::tuning::Difficulty;

/// Ratio above which the heartbeat is slow
pub const SLOW_TIER_RATIO: f64 = 0.66;
/// Ratio below which the heartbeat is fast
pub const FAST_TIER_RATIO: f64 = 0.33;

/// Heartbeat tempo band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensionTier {
    Slow,
    Medium,
    Fast,
}

impl TensionTier {
    pub fn from_ratio(remaining_ratio: f64) -> Self {
        if remaining_ratio > SLOW_TIER_RATIO {
            TensionTier::Slow
        } else if remaining_ratio >= FAST_TIER_RATIO {
            TensionTier::Medium
        } else {
            TensionTier::Fast
        }
    }

    /// Fraction of the difficulty's base interval
    pub fn interval_scale(&self) -> f64 {
        match self {
            TensionTier::Slow => 1.0,
            TensionTier::Medium => 0.7,
            TensionTier::Fast => 0.45,
        }
    }

    /// Beat interval for this tier at `difficulty`
    pub fn beat_interval_ms(&self, difficulty: Difficulty) -> f64 {
        difficulty.profile().beat_base_ms * self.interval_scale()
    }
}

/// Round state the clock reads (emitted by the round controller)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionSignal {
    pub remaining_ms: u32,
    pub total_ms: u32,
    pub phase: RunPhase,
    pub scare_active: bool,
}

impl TensionSignal {
    pub fn remaining_ratio(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.total_ms as f64).clamp(0.0, 1.0)
    }
}

/// Tempo derived for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionProfile {
    pub remaining_ratio: f64,
    pub tier: TensionTier,
    pub beat_interval_ms: f64,
}

/// What the playback side should do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionReading {
    pub profile: TensionProfile,
    /// False while scared, locked, or out of the run: do not schedule beats
    pub schedule: bool,
    /// Tier differs from the previous scheduling reading
    pub tier_changed: bool,
}

/// Derives heartbeat cadence from the countdown
#[derive(Debug, Clone)]
pub struct TensionClock {
    difficulty: Difficulty,
    last_tier: Option<TensionTier>,
}

impl TensionClock {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            last_tier: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.last_tier = None;
    }

    pub fn last_tier(&self) -> Option<TensionTier> {
        self.last_tier
    }

    /// Tempo for `signal`, without touching the tier memory
    pub fn profile(&self, signal: &TensionSignal) -> TensionProfile {
        let remaining_ratio = signal.remaining_ratio();
        let tier = TensionTier::from_ratio(remaining_ratio);
        TensionProfile {
            remaining_ratio,
            tier,
            beat_interval_ms: tier.beat_interval_ms(self.difficulty),
        }
    }

    /// Evaluate one tick. Suspension forgets the tier so the first reading
    /// after it is a fresh start rather than a change.
    pub fn evaluate(&mut self, signal: &TensionSignal, audio_unlocked: bool) -> TensionReading {
        let profile = self.profile(signal);
        let schedule =
            audio_unlocked && signal.phase == RunPhase::Playing && !signal.scare_active;

        if !schedule {
            self.last_tier = None;
            return TensionReading {
                profile,
                schedule,
                tier_changed: false,
            };
        }

        let tier_changed = self.last_tier.is_some_and(|t| t != profile.tier);
        self.last_tier = Some(profile.tier);
        TensionReading {
            profile,
            schedule,
            tier_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signal(remaining_ms: u32) -> TensionSignal {
        TensionSignal {
            remaining_ms,
            total_ms: 15_000,
            phase: RunPhase::Playing,
            scare_active: false,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(TensionTier::from_ratio(1.0), TensionTier::Slow);
        assert_eq!(TensionTier::from_ratio(0.67), TensionTier::Slow);
        assert_eq!(TensionTier::from_ratio(0.66), TensionTier::Medium);
        assert_eq!(TensionTier::from_ratio(0.33), TensionTier::Medium);
        assert_eq!(TensionTier::from_ratio(0.32), TensionTier::Fast);
        assert_eq!(TensionTier::from_ratio(0.0), TensionTier::Fast);
    }

    #[test]
    fn test_easier_beats_are_longer() {
        for tier in [TensionTier::Slow, TensionTier::Medium, TensionTier::Fast] {
            assert!(tier.beat_interval_ms(Difficulty::Easy) > tier.beat_interval_ms(Difficulty::Normal));
            assert!(tier.beat_interval_ms(Difficulty::Normal) > tier.beat_interval_ms(Difficulty::Hard));
        }
    }

    #[test]
    fn test_suspension_reasons() {
        let mut clock = TensionClock::new(Difficulty::Normal);
        assert!(!clock.evaluate(&signal(15_000), false).schedule);

        let scared = TensionSignal {
            scare_active: true,
            ..signal(15_000)
        };
        assert!(!clock.evaluate(&scared, true).schedule);

        let out = TensionSignal {
            phase: RunPhase::Out,
            ..signal(15_000)
        };
        assert!(!clock.evaluate(&out, true).schedule);

        assert!(clock.evaluate(&signal(15_000), true).schedule);
    }

    #[test]
    fn test_tier_change_detection() {
        let mut clock = TensionClock::new(Difficulty::Normal);
        assert!(!clock.evaluate(&signal(15_000), true).tier_changed);
        assert!(!clock.evaluate(&signal(12_000), true).tier_changed);
        let reading = clock.evaluate(&signal(9_000), true);
        assert!(reading.tier_changed);
        assert_eq!(reading.profile.tier, TensionTier::Medium);

        // After a suspension the next reading starts fresh.
        let scared = TensionSignal {
            scare_active: true,
            ..signal(3_000)
        };
        clock.evaluate(&scared, true);
        assert_eq!(clock.last_tier(), None);
        assert!(!clock.evaluate(&signal(3_000), true).tier_changed);
    }

    proptest! {
        #[test]
        fn prop_tempo_ordering(idx in 0usize..3) {
            let d = Difficulty::ALL[idx];
            let slow = TensionTier::Slow.beat_interval_ms(d);
            let medium = TensionTier::Medium.beat_interval_ms(d);
            let fast = TensionTier::Fast.beat_interval_ms(d);
            prop_assert!(slow > medium && medium > fast);
        }

        #[test]
        fn prop_interval_never_grows_as_time_runs_out(a in 0u32..=15_000, b in 0u32..=15_000) {
            let clock = TensionClock::new(Difficulty::Normal);
            let (more, less) = if a >= b { (a, b) } else { (b, a) };
            prop_assert!(
                clock.profile(&signal(less)).beat_interval_ms
                    <= clock.profile(&signal(more)).beat_interval_ms
            );
        }
    }
}
