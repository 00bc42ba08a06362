//! Dread Doors entry point
//!
//! The web build starts from `platform::wasm_start`. Natively this plays a
//! headless autopilot session on a simulated clock, and can dump every cue
//! as a `.wav` file.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::{Path, PathBuf};

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use dread_doors::audio::{AudioSynthesizer, Cue, SilentOutput, wav};
    use dread_doors::persistence::{KeyValueStore, MemoryStore};
    use dread_doors::platform;
    use dread_doors::sim::{DoorOutcome, GameEvent, RunPhase};
    use dread_doors::{Difficulty, Session, Settings};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Debug)]
    pub struct Options {
        pub seed: u64,
        pub minutes: f64,
        pub difficulty: Option<Difficulty>,
        pub save_dir: Option<PathBuf>,
        pub dump_cues: Option<PathBuf>,
    }

    const USAGE: &str = "usage: dread-doors [--seed N] [--minutes M] [--difficulty easy|normal|hard] \
                         [--save-dir DIR] [--dump-cues DIR]";

    pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
        let mut opts = Options {
            seed: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            minutes: 5.0,
            difficulty: None,
            save_dir: None,
            dump_cues: None,
        };
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{} needs a value\n{}", arg, USAGE));
            match arg.as_str() {
                "--seed" => opts.seed = value()?.parse().map_err(|e| format!("bad seed: {}", e))?,
                "--minutes" => {
                    opts.minutes = value()?.parse().map_err(|e| format!("bad minutes: {}", e))?
                }
                "--difficulty" => {
                    opts.difficulty = Some(Difficulty::parse(&value()?).map_err(|e| e.to_string())?)
                }
                "--save-dir" => opts.save_dir = Some(PathBuf::from(value()?)),
                "--dump-cues" => opts.dump_cues = Some(PathBuf::from(value()?)),
                "-h" | "--help" => return Err(USAGE.to_string()),
                other => return Err(format!("unknown argument {}\n{}", other, USAGE)),
            }
        }
        Ok(opts)
    }

    pub fn dump_cues(dir: &Path) -> dread_doors::Result<()> {
        std::fs::create_dir_all(dir)?;
        let synth = AudioSynthesizer::default();
        for cue in Cue::ALL {
            let buffer = cue.render(&synth)?;
            wav::write_file(&dir.join(format!("{}.wav", cue.as_str())), &buffer)?;
        }
        Ok(())
    }

    #[derive(Debug, Default)]
    struct Tally {
        rounds: u32,
        safe: u32,
        monsters: u32,
        curses: u32,
        timeouts: u32,
        wards_used: u32,
        runs_out: u32,
        wins: u32,
        best_level: u32,
    }

    pub fn run(opts: &Options) -> dread_doors::Result<()> {
        let store: Box<dyn KeyValueStore> = match &opts.save_dir {
            Some(dir) => platform::default_store(dir),
            None => Box::new(MemoryStore::new()),
        };
        let mut session = Session::boot(store, opts.seed, |_| SilentOutput::new())?;
        if let Some(difficulty) = opts.difficulty {
            if session.settings().difficulty != difficulty {
                session.set_difficulty(difficulty);
                session.new_game()?;
            }
        }
        // the autopilot's click counts as the unlocking gesture
        session.unlock_audio();

        let mut rng = Pcg32::seed_from_u64(opts.seed ^ 0xD00D);
        let mut tally = Tally::default();
        let mut think_ms = 0.0;
        let mut ad_used = false;
        let total_frames = (opts.minutes * 60_000.0 / FRAME_MS) as u64;

        for _ in 0..total_frames {
            session.update(FRAME_MS);
            think_ms -= FRAME_MS;

            for event in session.drain_events() {
                match event {
                    GameEvent::RoundStarted { level, total_ms } => {
                        tally.rounds += 1;
                        tally.best_level = tally.best_level.max(level);
                        // mostly decisive, occasionally frozen past the deadline
                        think_ms = total_ms as f64 * rng.random_range(0.05..1.05);
                    }
                    GameEvent::Resolved(outcome) => match outcome.kind {
                        DoorOutcome::Safe => tally.safe += 1,
                        DoorOutcome::Monster => tally.monsters += 1,
                        DoorOutcome::Curse => tally.curses += 1,
                    },
                    GameEvent::TimedOut => tally.timeouts += 1,
                    GameEvent::WardConsumed { .. } => tally.wards_used += 1,
                    GameEvent::Won { wins } => tally.wins = wins,
                    GameEvent::RunOut => tally.runs_out += 1,
                    GameEvent::Restarted { .. } | GameEvent::AdRewardGranted { .. } => {
                        think_ms = 0.0;
                    }
                    _ => {}
                }
            }

            let controller = session.controller();
            if controller.state().phase == RunPhase::Out {
                if controller.ad_watch_pending() {
                    continue;
                }
                if !ad_used {
                    ad_used = session.request_ad_reward();
                } else {
                    ad_used = false;
                    session.restart_from_checkpoint();
                }
                continue;
            }
            if controller.accepts_picks() && think_ms <= 0.0 {
                let door = rng.random_range(0..controller.rules().door_count);
                if rng.random_bool(0.2) {
                    session.listen();
                }
                session.pick_door(door);
            }
        }

        let state = session.controller().state();
        log::info!(
            "Autopilot finished: {} rounds, {} safe / {} monster / {} curse, {} timeouts",
            tally.rounds,
            tally.safe,
            tally.monsters,
            tally.curses,
            tally.timeouts
        );
        log::info!(
            "Wards used: {}, runs lost: {}, wins: {}, best level: {}, heartbeats: {}",
            tally.wards_used,
            tally.runs_out,
            tally.wins,
            tally.best_level,
            session.playback().beats_played()
        );
        log::info!(
            "Final state: level {}, lives {}, checkpoint {}",
            state.level,
            state.lives_remaining,
            if state.checkpoint_unlocked { "unlocked" } else { "locked" }
        );
        Ok(())
    }

    pub fn main() {
        platform::init_logging();
        let opts = match parse_args(std::env::args().skip(1)) {
            Ok(opts) => opts,
            Err(msg) => {
                eprintln!("{}", msg);
                std::process::exit(2);
            }
        };
        log::info!("Dread Doors (native) starting with seed {}", opts.seed);
        log::debug!("Default settings: {:?}", Settings::default());

        if let Some(dir) = &opts.dump_cues {
            if let Err(e) = dump_cues(dir) {
                log::error!("Cue dump failed: {}", e);
                std::process::exit(1);
            }
        }
        if let Err(e) = run(&opts) {
            log::error!("Session failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::wasm_start, this is just to satisfy the compiler
}
