//! Run state and round-scoped types
//!
//! `RunState` survives across rounds and is what gets persisted; `RoundTimer`
//! is rebuilt at every round start.

use serde::{Deserialize, Serialize};

use super::layout::DoorOutcome;
use crate::consts::WARD_STREAK;
use crate::tuning::RulesConfig;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Rounds are being played
    Playing,
    /// Out of lives; only explicit operator actions leave this phase
    Out,
}

/// Session-scoped run progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub level: u32,
    pub max_level: u32,
    pub lives_remaining: u8,
    pub max_lives: u8,
    pub checkpoint_level: u32,
    pub checkpoint_unlocked: bool,
    /// Highest level reached this session (never decreases)
    pub max_reached_level: u32,
    /// Consecutive safe picks since the last damage or ward grant
    pub streak_count: u32,
    /// Shield charges; each absorbs one damaging outcome
    pub ward_charges: u32,
    pub phase: RunPhase,
}

impl RunState {
    /// Fresh level-1 run under `rules`
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            level: 1,
            max_level: rules.max_level,
            lives_remaining: rules.max_lives,
            max_lives: rules.max_lives,
            checkpoint_level: rules.checkpoint_level,
            checkpoint_unlocked: false,
            max_reached_level: 1,
            streak_count: 0,
            ward_charges: 0,
            phase: RunPhase::Playing,
        }
    }

    /// The persisted subset
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            level: self.level,
            lives_remaining: self.lives_remaining,
            max_reached_level: self.max_reached_level,
            checkpoint_unlocked: self.checkpoint_unlocked,
            phase: self.phase,
            ward_charges: self.ward_charges,
            streak_count: self.streak_count,
        }
    }

    /// Rehydrate from a snapshot; `None` if it does not fit `rules`
    pub fn from_snapshot(snapshot: &RunSnapshot, rules: &RulesConfig) -> Option<Self> {
        if !snapshot.is_well_formed(rules) {
            return None;
        }
        Some(Self {
            level: snapshot.level,
            lives_remaining: snapshot.lives_remaining,
            checkpoint_unlocked: snapshot.checkpoint_unlocked,
            max_reached_level: snapshot.max_reached_level,
            streak_count: snapshot.streak_count,
            ward_charges: snapshot.ward_charges,
            phase: snapshot.phase,
            ..Self::new(rules)
        })
    }

    pub fn is_playing(&self) -> bool {
        self.phase == RunPhase::Playing
    }
}

/// Persisted view of [`RunState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub level: u32,
    pub lives_remaining: u8,
    pub max_reached_level: u32,
    pub checkpoint_unlocked: bool,
    pub phase: RunPhase,
    pub ward_charges: u32,
    pub streak_count: u32,
}

impl RunSnapshot {
    /// Range checks against the rules the snapshot will be played under
    pub fn is_well_formed(&self, rules: &RulesConfig) -> bool {
        (1..=rules.max_level).contains(&self.level)
            && self.lives_remaining <= rules.max_lives
            && (self.phase == RunPhase::Out) == (self.lives_remaining == 0)
            && self.max_reached_level >= self.level
            && self.max_reached_level <= rules.max_level
            && self.streak_count < WARD_STREAK
    }
}

/// Round countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTimer {
    pub total_ms: u32,
    pub remaining_ms: u32,
    pub tick_step_ms: u32,
    /// One-shot guard so a zero crossing is applied once per round
    pub expiry_locked: bool,
}

impl RoundTimer {
    pub fn new(total_ms: u32, tick_step_ms: u32) -> Self {
        Self {
            total_ms,
            remaining_ms: total_ms,
            tick_step_ms,
            expiry_locked: false,
        }
    }

    /// Count down, clamped at zero. Returns true on the first arrival at zero.
    pub fn advance(&mut self, delta_ms: u32) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(delta_ms);
        if self.remaining_ms == 0 && !self.expiry_locked {
            self.expiry_locked = true;
            return true;
        }
        false
    }

    /// Remaining fraction of the round in [0, 1]
    pub fn remaining_ratio(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        self.remaining_ms as f64 / self.total_ms as f64
    }
}

/// A resolved pick; consumed immediately, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeEvent {
    pub door_index: usize,
    pub kind: DoorOutcome,
    pub damage: u8,
    pub is_critical: bool,
}

/// What the render layer needs per door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorView {
    pub is_picked: bool,
    pub is_revealed: bool,
    /// Outcome once revealed
    pub outcome: Option<DoorOutcome>,
}

impl DoorView {
    /// Placeholder for unrevealed doors, outcome name otherwise
    pub fn label(&self, index: usize) -> String {
        match self.outcome {
            Some(kind) if self.is_revealed => kind.as_str().to_string(),
            _ => format!("DOOR {}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_expires_once() {
        let mut timer = RoundTimer::new(100, 50);
        assert!(!timer.advance(50));
        assert!(timer.advance(80));
        assert_eq!(timer.remaining_ms, 0);
        assert!(timer.expiry_locked);
        assert!(!timer.advance(50));
        assert!(!timer.advance(50));
    }

    #[test]
    fn test_snapshot_round_trip_into_state() {
        let rules = RulesConfig::default();
        let mut state = RunState::new(&rules);
        state.level = 6;
        state.max_reached_level = 7;
        state.checkpoint_unlocked = true;
        state.ward_charges = 2;

        let restored = RunState::from_snapshot(&state.snapshot(), &rules).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_malformed_snapshots_rejected() {
        let rules = RulesConfig::default();
        let good = RunState::new(&rules).snapshot();

        let level_zero = RunSnapshot { level: 0, ..good.clone() };
        assert!(RunState::from_snapshot(&level_zero, &rules).is_none());

        let too_many_lives = RunSnapshot {
            lives_remaining: rules.max_lives + 1,
            ..good.clone()
        };
        assert!(RunState::from_snapshot(&too_many_lives, &rules).is_none());

        let dead_but_playing = RunSnapshot {
            lives_remaining: 0,
            ..good.clone()
        };
        assert!(RunState::from_snapshot(&dead_but_playing, &rules).is_none());

        let out = RunSnapshot {
            lives_remaining: 0,
            phase: RunPhase::Out,
            ..good
        };
        assert!(RunState::from_snapshot(&out, &rules).is_some());
    }

    #[test]
    fn test_door_labels() {
        let hidden = DoorView {
            is_picked: false,
            is_revealed: false,
            outcome: None,
        };
        assert_eq!(hidden.label(0), "DOOR 1");

        let curse = DoorView {
            is_picked: true,
            is_revealed: true,
            outcome: Some(DoorOutcome::Curse),
        };
        assert_eq!(curse.label(3), "CURSE");
    }
}
