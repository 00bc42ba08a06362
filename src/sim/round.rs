//! Round controller
//!
//! Owns the run state, the current round's layout and countdown, and every
//! delayed effect. All mutation of `RunState` happens here; other systems
//! read [`GameEvent`]s and [`TensionSignal`]s.
//!
//! A round moves `Open → PickPending → Resolved`. Picks are only accepted
//! while `Open`, the countdown only runs while `Open`, and every delayed
//! effect carries the round id it was scheduled for.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::layout::{DoorOutcome, RoundLayout};
use super::schedule::{TaskQueue, TaskToken};
use super::state::{DoorView, OutcomeEvent, RoundTimer, RunPhase, RunSnapshot, RunState};
use super::tension::TensionSignal;
use crate::audio::Cue;
use crate::consts::{AD_REWARD_LIVES, MONSTER_DAMAGE, WARD_STREAK};
use crate::error::Result;
use crate::tuning::RulesConfig;

/// Signals for render, audio and persistence layers
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// New layout and full countdown; render resets all doors
    RoundStarted { level: u32, total_ms: u32 },
    /// A door was chosen; input is locked until the next round
    DoorPicked { door_index: usize },
    /// The pick resolved; doors are revealed
    Resolved(OutcomeEvent),
    /// Countdown ran out before a pick
    TimedOut,
    /// Lives lost (`strength` 1 = monster-grade hit, 2 = curse-grade)
    Damaged {
        amount: u8,
        lives_remaining: u8,
        strength: u8,
        critical: bool,
    },
    WardGranted { ward_charges: u32 },
    WardConsumed { ward_charges: u32 },
    LevelAdvanced { level: u32 },
    CheckpointUnlocked { level: u32 },
    /// Final level reached; a fresh run follows after the win pause
    Won { wins: u32 },
    /// Out of lives
    RunOut,
    Restarted { level: u32 },
    AdRewardGranted { lives_remaining: u8 },
    ScareStarted { critical: bool },
    ScareEnded,
    /// Sound request for the playback scheduler
    PlayCue(Cue),
    /// Persisted fields changed
    Persist(RunSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundStatus {
    Open,
    PickPending,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingEffect {
    Resolve { round_id: u64, door_index: usize },
    NextRound { round_id: u64 },
    ScareEnd,
    WinLoop,
    AdWatchFinished,
}

/// Round/tension engine root
#[derive(Debug)]
pub struct RoundController {
    rules: RulesConfig,
    seed: u64,
    rng: Pcg32,
    state: RunState,
    layout: RoundLayout,
    timer: RoundTimer,
    round_id: u64,
    status: RoundStatus,
    picked: Option<usize>,
    revealed: bool,
    scare_active: bool,
    wins: u32,
    tasks: TaskQueue<PendingEffect>,
    reveal_token: Option<TaskToken>,
    transition_token: Option<TaskToken>,
    scare_token: Option<TaskToken>,
    win_token: Option<TaskToken>,
    ad_token: Option<TaskToken>,
    events: Vec<GameEvent>,
    last_snapshot: Option<RunSnapshot>,
}

impl RoundController {
    /// Fresh level-1 run. Fails with `Error::InvalidRules` on rules the
    /// engine cannot run.
    pub fn new(rules: RulesConfig, seed: u64) -> Result<Self> {
        let state = RunState::new(&rules);
        Self::resume(rules, seed, state)
    }

    /// Continue a rehydrated run (a fresh round at the saved level)
    pub fn resume(rules: RulesConfig, seed: u64, state: RunState) -> Result<Self> {
        rules.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = RoundLayout::generate(&mut rng, rules.door_count);
        let timer = RoundTimer::new(rules.round_ms(state.level), rules.tick_step_ms);
        let mut ctl = Self {
            rules,
            seed,
            rng,
            state,
            layout,
            timer,
            round_id: 0,
            status: RoundStatus::Open,
            picked: None,
            revealed: false,
            scare_active: false,
            wins: 0,
            tasks: TaskQueue::new(),
            reveal_token: None,
            transition_token: None,
            scare_token: None,
            win_token: None,
            ad_token: None,
            events: Vec::new(),
            last_snapshot: None,
        };
        log::info!(
            "Run at level {} (seed {}, {})",
            ctl.state.level,
            seed,
            ctl.rules.difficulty.as_str()
        );
        ctl.start_round(ctl.state.level);
        Ok(ctl)
    }

    // === Accessors ===

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn layout(&self) -> &RoundLayout {
        &self.layout
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn scare_active(&self) -> bool {
        self.scare_active
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// True while a pick is accepted
    pub fn accepts_picks(&self) -> bool {
        self.state.is_playing() && self.status == RoundStatus::Open
    }

    /// True while a simulated ad watch is running
    pub fn ad_watch_pending(&self) -> bool {
        self.ad_token.is_some_and(|t| self.tasks.is_pending(t))
    }

    /// Per-door render state
    pub fn door_views(&self) -> Vec<DoorView> {
        (0..self.layout.door_count)
            .map(|i| DoorView {
                is_picked: self.picked == Some(i),
                is_revealed: self.revealed,
                outcome: self.revealed.then(|| self.layout.outcome(i)),
            })
            .collect()
    }

    /// Countdown state for the tension clock
    pub fn tension_signal(&self) -> TensionSignal {
        TensionSignal {
            remaining_ms: self.timer.remaining_ms,
            total_ms: self.timer.total_ms,
            phase: self.state.phase,
            scare_active: self.scare_active,
        }
    }

    /// Take all signals emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the current round's hidden layout (scripted sessions and tests).
    /// Ignored unless the round is open and the layout fits the rules.
    pub fn force_layout(&mut self, layout: RoundLayout) -> bool {
        if self.status != RoundStatus::Open
            || layout.door_count != self.rules.door_count
            || !layout.is_valid()
        {
            return false;
        }
        self.layout = layout;
        true
    }

    // === Round lifecycle ===

    /// Begin a round at `level`: new layout, full countdown, cleared expiry
    /// lock. Cancels the previous round's pending reveal/transition.
    pub fn start_round(&mut self, level: u32) {
        self.cancel_round_tasks();
        self.round_id += 1;
        self.state.level = level.clamp(1, self.rules.max_level);
        self.layout = RoundLayout::generate(&mut self.rng, self.rules.door_count);
        self.timer = RoundTimer::new(self.rules.round_ms(self.state.level), self.rules.tick_step_ms);
        self.status = RoundStatus::Open;
        self.picked = None;
        self.revealed = false;

        log::debug!(
            "Round {} at level {} ({} ms)",
            self.round_id,
            self.state.level,
            self.timer.total_ms
        );
        self.events.push(GameEvent::RoundStarted {
            level: self.state.level,
            total_ms: self.timer.total_ms,
        });
        self.persist_if_changed();
    }

    /// Choose a door. Dropped while locked, resolved, out of the run, or out of range.
    pub fn pick_door(&mut self, index: usize) -> bool {
        if !self.accepts_picks() {
            log::debug!("Pick {} ignored (input locked)", index);
            return false;
        }
        if index >= self.layout.door_count {
            log::debug!("Pick {} ignored (out of range)", index);
            return false;
        }

        self.status = RoundStatus::PickPending;
        self.picked = Some(index);
        self.events.push(GameEvent::DoorPicked { door_index: index });
        self.events.push(GameEvent::PlayCue(Cue::DoorCreak));

        let task = PendingEffect::Resolve {
            round_id: self.round_id,
            door_index: index,
        };
        self.reveal_token = Some(self.tasks.schedule(self.rules.reveal_delay_ms, task));
        true
    }

    /// Advance pending effects and the countdown by one step. A round that
    /// opens during this step starts counting on the next one.
    pub fn advance(&mut self, delta_ms: u32) {
        let counting = self.accepts_picks();
        let round_before = self.round_id;

        self.tasks.advance(delta_ms);
        while let Some((token, effect)) = self.tasks.pop_due() {
            self.run_effect(token, effect);
        }

        if counting && self.round_id == round_before {
            self.tick(delta_ms);
        }
    }

    /// Count the round down. Ticks after the round resolved are dropped; the
    /// first arrival at zero costs one life (or a ward).
    pub fn tick(&mut self, delta_ms: u32) {
        if !self.state.is_playing() || self.status != RoundStatus::Open {
            return;
        }
        if !self.timer.advance(delta_ms) {
            return;
        }

        log::debug!("Round {} timed out", self.round_id);
        self.status = RoundStatus::Resolved;
        self.events.push(GameEvent::TimedOut);
        self.start_scare(false);
        self.apply_damage(MONSTER_DAMAGE, false);
    }

    /// Apply a damaging outcome. A ward absorbs it entirely; otherwise lives
    /// drop (plus a possible critical bonus point) and the run may end.
    pub fn apply_damage(&mut self, amount: u8, is_critical: bool) {
        if !self.state.is_playing() {
            return;
        }
        self.status = RoundStatus::Resolved;

        let mut total = amount;
        if is_critical && self.rng.random_bool(self.rules.profile().extra_damage_chance) {
            total = total.saturating_add(1);
        }

        self.state.streak_count = 0;
        if self.state.ward_charges > 0 {
            self.state.ward_charges -= 1;
            log::debug!("Ward absorbed {} damage", total);
            self.events.push(GameEvent::WardConsumed {
                ward_charges: self.state.ward_charges,
            });
            self.queue_next_round();
            self.persist_if_changed();
            return;
        }

        self.state.lives_remaining = self.state.lives_remaining.saturating_sub(total);
        self.events.push(GameEvent::Damaged {
            amount: total,
            lives_remaining: self.state.lives_remaining,
            strength: total.clamp(1, 2),
            critical: is_critical,
        });

        if self.state.lives_remaining == 0 {
            self.state.phase = RunPhase::Out;
            self.cancel_round_tasks();
            log::info!("Out of lives at level {}", self.state.level);
            self.events.push(GameEvent::RunOut);
        } else {
            self.queue_next_round();
        }
        self.persist_if_changed();
    }

    /// Move one level up. Arriving at the final level wins the run.
    pub fn advance_level(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.status = RoundStatus::Resolved;
        self.state.level = (self.state.level + 1).min(self.rules.max_level);
        self.state.max_reached_level = self.state.max_reached_level.max(self.state.level);
        self.events.push(GameEvent::LevelAdvanced {
            level: self.state.level,
        });

        if self.state.level >= self.state.checkpoint_level && !self.state.checkpoint_unlocked {
            self.state.checkpoint_unlocked = true;
            log::info!("Checkpoint unlocked at level {}", self.state.level);
            self.events.push(GameEvent::CheckpointUnlocked {
                level: self.state.checkpoint_level,
            });
        }

        if self.state.level == self.rules.max_level {
            self.win();
        } else {
            self.queue_next_round();
        }
        self.persist_if_changed();
    }

    /// Full lives at the checkpoint (if unlocked and reached), else level 1
    pub fn restart_from_checkpoint(&mut self) {
        let level = if self.state.checkpoint_unlocked
            && self.state.max_reached_level >= self.state.checkpoint_level
        {
            self.state.checkpoint_level
        } else {
            1
        };
        self.restart_at(level);
    }

    /// Full lives at level 1
    pub fn restart_from_level1(&mut self) {
        self.restart_at(1);
    }

    /// Revive an ended run on the same round layout
    pub fn grant_ad_reward(&mut self) -> bool {
        if self.state.phase != RunPhase::Out {
            log::debug!("Ad reward ignored (run not over)");
            return false;
        }
        if let Some(token) = self.ad_token.take() {
            self.tasks.cancel(token);
        }

        self.state.phase = RunPhase::Playing;
        self.state.lives_remaining = AD_REWARD_LIVES.min(self.rules.max_lives);
        self.status = RoundStatus::Open;
        self.picked = None;
        self.revealed = false;
        if self.timer.remaining_ms == 0 {
            self.timer.remaining_ms = self.timer.total_ms;
        }
        self.timer.expiry_locked = false;

        log::info!("Ad reward: resuming level {}", self.state.level);
        self.events.push(GameEvent::AdRewardGranted {
            lives_remaining: self.state.lives_remaining,
        });
        self.persist_if_changed();
        true
    }

    /// Start a simulated ad watch; completion grants the reward
    pub fn request_ad_reward(&mut self) -> bool {
        if self.state.phase != RunPhase::Out || self.ad_watch_pending() {
            return false;
        }
        let delay = self.rules.ad_watch_delay_ms;
        self.ad_token = Some(self.tasks.schedule(delay, PendingEffect::AdWatchFinished));
        true
    }

    /// Result of an external ad provider; failure leaves the run untouched
    pub fn resolve_ad_reward(&mut self, success: bool) -> bool {
        if let Some(token) = self.ad_token.take() {
            self.tasks.cancel(token);
        }
        if success {
            self.grant_ad_reward()
        } else {
            log::info!("Ad not completed; run unchanged");
            false
        }
    }

    /// Ambient listen burst while a round is live
    pub fn listen(&mut self) -> bool {
        if !self.accepts_picks() {
            return false;
        }
        self.events.push(GameEvent::PlayCue(Cue::Listen));
        true
    }

    /// Cancel every outstanding effect and lock input (teardown)
    pub fn dispose(&mut self) {
        let dropped = self.tasks.cancel_all();
        self.clear_tokens();
        self.status = RoundStatus::Resolved;
        self.scare_active = false;
        log::debug!("Round controller disposed ({} pending effects dropped)", dropped);
    }

    // === Internals ===

    fn run_effect(&mut self, token: TaskToken, effect: PendingEffect) {
        match effect {
            PendingEffect::Resolve {
                round_id,
                door_index,
            } => {
                self.reveal_token = None;
                if round_id != self.round_id || self.status != RoundStatus::PickPending {
                    log::debug!("Stale reveal for round {} dropped", round_id);
                    return;
                }
                self.resolve_pick(door_index);
            }
            PendingEffect::NextRound { round_id } => {
                self.transition_token = None;
                if round_id != self.round_id || !self.state.is_playing() {
                    log::debug!("Stale round transition for round {} dropped", round_id);
                    return;
                }
                self.start_round(self.state.level);
            }
            PendingEffect::ScareEnd => {
                if self.scare_token != Some(token) {
                    return;
                }
                self.scare_token = None;
                self.scare_active = false;
                self.events.push(GameEvent::ScareEnded);
            }
            PendingEffect::WinLoop => {
                self.win_token = None;
                log::info!("Win loop: fresh run");
                self.restart_at(1);
            }
            PendingEffect::AdWatchFinished => {
                self.ad_token = None;
                self.grant_ad_reward();
            }
        }
    }

    fn resolve_pick(&mut self, door_index: usize) {
        let kind = self.layout.outcome(door_index);
        let profile = self.rules.profile();
        let is_critical = kind.is_damaging()
            && profile.critical_chance > 0.0
            && self.rng.random_bool(profile.critical_chance);
        let outcome = OutcomeEvent {
            door_index,
            kind,
            damage: kind.base_damage(),
            is_critical,
        };

        self.revealed = true;
        self.events.push(GameEvent::Resolved(outcome));

        match kind {
            DoorOutcome::Safe => {
                self.state.streak_count += 1;
                if self.state.streak_count % WARD_STREAK == 0 {
                    self.state.ward_charges += 1;
                    self.state.streak_count = 0;
                    self.events.push(GameEvent::WardGranted {
                        ward_charges: self.state.ward_charges,
                    });
                }
                self.advance_level();
            }
            DoorOutcome::Monster | DoorOutcome::Curse => {
                self.start_scare(is_critical);
                self.apply_damage(outcome.damage, is_critical);
            }
        }
    }

    fn start_scare(&mut self, critical: bool) {
        if let Some(token) = self.scare_token.take() {
            self.tasks.cancel(token);
        }
        let duration = if critical {
            self.rules.critical_scare_duration_ms
        } else {
            self.rules.scare_duration_ms
        };
        self.scare_active = true;
        self.scare_token = Some(self.tasks.schedule(duration, PendingEffect::ScareEnd));
        self.events.push(GameEvent::ScareStarted { critical });
        self.events.push(GameEvent::PlayCue(Cue::MonsterScare));
    }

    fn win(&mut self) {
        self.wins += 1;
        log::info!("Run won ({} total)", self.wins);
        self.events.push(GameEvent::Won { wins: self.wins });
        if let Some(token) = self.win_token.take() {
            self.tasks.cancel(token);
        }
        let delay = self.rules.win_pause_ms;
        self.win_token = Some(self.tasks.schedule(delay, PendingEffect::WinLoop));
    }

    fn queue_next_round(&mut self) {
        if let Some(token) = self.transition_token.take() {
            self.tasks.cancel(token);
        }
        let task = PendingEffect::NextRound {
            round_id: self.round_id,
        };
        self.transition_token = Some(self.tasks.schedule(self.rules.round_transition_ms, task));
    }

    fn restart_at(&mut self, level: u32) {
        self.tasks.cancel_all();
        self.clear_tokens();
        self.scare_active = false;

        self.state.phase = RunPhase::Playing;
        self.state.lives_remaining = self.rules.max_lives;
        self.state.streak_count = 0;
        self.state.ward_charges = 0;

        log::info!("Restarting at level {}", level);
        self.events.push(GameEvent::Restarted { level });
        self.start_round(level);
    }

    fn cancel_round_tasks(&mut self) {
        for token in [self.reveal_token.take(), self.transition_token.take()]
            .into_iter()
            .flatten()
        {
            self.tasks.cancel(token);
        }
    }

    fn clear_tokens(&mut self) {
        self.reveal_token = None;
        self.transition_token = None;
        self.scare_token = None;
        self.win_token = None;
        self.ad_token = None;
    }

    fn persist_if_changed(&mut self) {
        let snapshot = self.state.snapshot();
        if self.last_snapshot.as_ref() != Some(&snapshot) {
            self.last_snapshot = Some(snapshot.clone());
            self.events.push(GameEvent::Persist(snapshot));
        }
    }
}
