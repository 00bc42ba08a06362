//! Cooperative frame loop
//!
//! One `update` per host frame: fixed countdown steps through the round
//! controller, then event routing (cues to the scheduler, snapshots to the
//! store), then tension evaluation and the heartbeat. Everything runs on one
//! thread; the only ordering is the order of calls in here.

use crate::audio::{AudioOutput, AudioSynthesizer, Channel, PlaybackScheduler};
use crate::consts::MAX_SUBSTEPS;
use crate::error::Result;
use crate::persistence::{KeyValueStore, clear_snapshot, load_snapshot, save_snapshot};
use crate::settings::Settings;
use crate::sim::{GameEvent, RoundController, TensionClock, TensionReading};
use crate::tuning::{Difficulty, RulesConfig};

/// Seed stride between consecutive new games
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A running game: controller, heartbeat and storage wired together
pub struct Session<O: AudioOutput> {
    controller: RoundController,
    clock: TensionClock,
    playback: PlaybackScheduler<O>,
    synth: AudioSynthesizer,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
    accumulator_ms: f64,
    /// Events for the render layer, drained by the host
    outbox: Vec<GameEvent>,
    last_reading: Option<TensionReading>,
}

impl<O: AudioOutput> Session<O> {
    /// Load settings and any saved run from `store`, then open a round.
    /// Audio stays locked until `unlock_audio`.
    pub fn boot(
        store: Box<dyn KeyValueStore>,
        seed: u64,
        make_output: impl FnMut(Channel) -> O,
    ) -> Result<Self> {
        let settings = Settings::load(store.as_ref());
        let rules = RulesConfig::with_difficulty(settings.difficulty);
        let controller = match load_snapshot(store.as_ref(), &rules) {
            Some(state) => RoundController::resume(rules, seed, state)?,
            None => RoundController::new(rules, seed)?,
        };
        let mut playback = PlaybackScheduler::new(make_output);
        playback.apply_settings(&settings);

        let mut session = Self {
            clock: TensionClock::new(controller.rules().difficulty),
            controller,
            playback,
            synth: AudioSynthesizer::default(),
            store,
            settings,
            accumulator_ms: 0.0,
            outbox: Vec::new(),
            last_reading: None,
        };
        session.route_events();
        Ok(session)
    }

    // === Accessors ===

    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    pub fn playback(&self) -> &PlaybackScheduler<O> {
        &self.playback
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Tension reading from the most recent step
    pub fn last_reading(&self) -> Option<&TensionReading> {
        self.last_reading.as_ref()
    }

    /// Render-facing events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    // === Frame loop ===

    /// Advance by one host frame of `frame_ms`. Non-finite deltas count as 0.
    pub fn update(&mut self, frame_ms: f64) {
        let step = self.controller.rules().tick_step_ms;
        let max_frame = (step * MAX_SUBSTEPS) as f64;
        let frame_ms = if frame_ms.is_finite() { frame_ms } else { 0.0 };
        self.accumulator_ms += frame_ms.clamp(0.0, max_frame);

        let mut substeps = 0;
        while self.accumulator_ms >= step as f64 && substeps < MAX_SUBSTEPS {
            self.step(step);
            self.accumulator_ms -= step as f64;
            substeps += 1;
        }
    }

    fn step(&mut self, step_ms: u32) {
        self.controller.advance(step_ms);
        self.route_events();

        let signal = self.controller.tension_signal();
        let reading = self.clock.evaluate(&signal, self.playback.is_unlocked());
        self.playback.update_heartbeat(step_ms as f64, &reading);
        self.last_reading = Some(reading);
    }

    fn route_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                GameEvent::PlayCue(cue) => {
                    self.playback.trigger(cue);
                }
                GameEvent::Persist(snapshot) => save_snapshot(self.store.as_mut(), &snapshot),
                other => self.outbox.push(other),
            }
        }
    }

    // === Input ===

    /// Unlock audio; call from a user gesture
    pub fn unlock_audio(&mut self) -> bool {
        self.playback.unlock(&self.synth)
    }

    pub fn pick_door(&mut self, index: usize) -> bool {
        let accepted = self.controller.pick_door(index);
        self.route_events();
        accepted
    }

    pub fn listen(&mut self) -> bool {
        let accepted = self.controller.listen();
        self.route_events();
        accepted
    }

    pub fn restart_from_checkpoint(&mut self) {
        self.controller.restart_from_checkpoint();
        self.route_events();
    }

    pub fn restart_from_level1(&mut self) {
        self.controller.restart_from_level1();
        self.route_events();
    }

    pub fn request_ad_reward(&mut self) -> bool {
        let started = self.controller.request_ad_reward();
        self.route_events();
        started
    }

    pub fn resolve_ad_reward(&mut self, success: bool) -> bool {
        let granted = self.controller.resolve_ad_reward(success);
        self.route_events();
        granted
    }

    /// Forget the saved run and start over under the current settings.
    /// On error the current run is left untouched.
    pub fn new_game(&mut self) -> Result<()> {
        let rules = RulesConfig::with_difficulty(self.settings.difficulty);
        let seed = self.controller.seed().wrapping_add(SEED_STRIDE);
        let difficulty = rules.difficulty;
        let controller = RoundController::new(rules, seed)?;

        self.controller.dispose();
        clear_snapshot(self.store.as_mut());
        self.clock = TensionClock::new(difficulty);
        self.controller = controller;
        self.accumulator_ms = 0.0;
        self.route_events();
        Ok(())
    }

    // === Settings ===

    /// Replace settings, apply volumes and persist
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.playback.apply_settings(&self.settings);
        self.settings.save(self.store.as_mut());
    }

    /// Difficulty applies from the next new game
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        let settings = Settings {
            difficulty,
            ..self.settings.clone()
        };
        self.set_settings(settings);
    }
}

impl<O: AudioOutput> Drop for Session<O> {
    fn drop(&mut self) {
        self.controller.dispose();
        self.playback.teardown();
    }
}
