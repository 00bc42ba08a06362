//! Data-driven game balance
//!
//! Difficulty presets and the rule numbers a run is played under.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" | "med" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Like [`Difficulty::from_str`], but reports the unknown name
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| Error::UnknownDifficulty {
            name: s.to_string(),
        })
    }

    /// Balance numbers for this preset
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                beat_base_ms: 1200.0,
                round_ms_multiplier: 1.3,
                critical_chance: 0.0,
                extra_damage_chance: 0.0,
            },
            Difficulty::Normal => DifficultyProfile {
                beat_base_ms: 1000.0,
                round_ms_multiplier: 1.0,
                critical_chance: 0.0,
                extra_damage_chance: 0.0,
            },
            Difficulty::Hard => DifficultyProfile {
                beat_base_ms: 850.0,
                round_ms_multiplier: 0.8,
                critical_chance: 0.25,
                extra_damage_chance: 0.5,
            },
        }
    }
}

/// Per-difficulty balance numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Heartbeat interval in the slow tier; faster tiers scale down from it
    pub beat_base_ms: f64,
    /// Scales every round's countdown (easier = longer)
    pub round_ms_multiplier: f64,
    /// Chance that a damaging pick is flagged critical
    pub critical_chance: f64,
    /// Chance that a critical pick deals one extra damage
    pub extra_damage_chance: f64,
}

/// Countdown length for a round at `level`
pub fn calc_round_ms(level: u32, difficulty: Difficulty) -> u32 {
    let steps = level.saturating_sub(1);
    let base = ROUND_BASE_MS
        .saturating_sub(steps.saturating_mul(ROUND_STEP_MS))
        .max(ROUND_MIN_MS);
    (base as f64 * difficulty.profile().round_ms_multiplier).round() as u32
}

/// Rules a run is played under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub door_count: usize,
    pub max_lives: u8,
    pub max_level: u32,
    pub checkpoint_level: u32,
    pub difficulty: Difficulty,

    // === Timing ===
    pub tick_step_ms: u32,
    pub reveal_delay_ms: u32,
    pub round_transition_ms: u32,
    pub scare_duration_ms: u32,
    pub critical_scare_duration_ms: u32,
    pub win_pause_ms: u32,
    pub ad_watch_delay_ms: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            door_count: DOOR_COUNT,
            max_lives: MAX_LIVES,
            max_level: MAX_LEVEL,
            checkpoint_level: CHECKPOINT_LEVEL,
            difficulty: Difficulty::Normal,

            tick_step_ms: TICK_STEP_MS,
            reveal_delay_ms: REVEAL_DELAY_MS,
            round_transition_ms: ROUND_TRANSITION_MS,
            scare_duration_ms: SCARE_DURATION_MS,
            critical_scare_duration_ms: CRITICAL_SCARE_DURATION_MS,
            win_pause_ms: WIN_PAUSE_MS,
            ad_watch_delay_ms: AD_WATCH_DELAY_MS,
        }
    }
}

impl RulesConfig {
    /// Default rules at the given difficulty
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Countdown length for a round at `level` under these rules
    pub fn round_ms(&self, level: u32) -> u32 {
        calc_round_ms(level, self.difficulty)
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.difficulty.profile()
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: &str| {
            Err(Error::InvalidRules {
                reason: reason.to_string(),
            })
        };
        if self.door_count < 2 {
            return fail("door_count must be at least 2 (one safe, one curse)");
        }
        if self.max_lives == 0 {
            return fail("max_lives must be at least 1");
        }
        if self.max_level == 0 {
            return fail("max_level must be at least 1");
        }
        if self.checkpoint_level == 0 || self.checkpoint_level > self.max_level {
            return fail("checkpoint_level must lie in 1..=max_level");
        }
        if self.tick_step_ms == 0 {
            return fail("tick_step_ms must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_ms_level_one_normal() {
        assert_eq!(calc_round_ms(1, Difficulty::Normal), 15_000);
    }

    #[test]
    fn test_round_ms_shrinks_then_floors() {
        assert!(calc_round_ms(2, Difficulty::Normal) < calc_round_ms(1, Difficulty::Normal));
        assert_eq!(calc_round_ms(100, Difficulty::Normal), ROUND_MIN_MS);
    }

    #[test]
    fn test_easier_rounds_last_longer() {
        for level in 1..=MAX_LEVEL {
            let easy = calc_round_ms(level, Difficulty::Easy);
            let normal = calc_round_ms(level, Difficulty::Normal);
            let hard = calc_round_ms(level, Difficulty::Hard);
            assert!(easy > normal && normal > hard);
        }
    }

    #[test]
    fn test_only_hard_has_criticals() {
        assert_eq!(Difficulty::Easy.profile().critical_chance, 0.0);
        assert_eq!(Difficulty::Normal.profile().critical_chance, 0.0);
        assert!(Difficulty::Hard.profile().critical_chance > 0.0);
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("norm"), Some(Difficulty::Normal));
        assert!(Difficulty::parse("nightmare").is_err());
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_validate() {
        assert!(RulesConfig::default().validate().is_ok());

        let bad_doors = RulesConfig {
            door_count: 1,
            ..Default::default()
        };
        assert!(bad_doors.validate().is_err());

        let bad_checkpoint = RulesConfig {
            checkpoint_level: 11,
            ..Default::default()
        };
        assert!(bad_checkpoint.validate().is_err());
    }
}
