//! Round/tension engine
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Seeded RNG only
//! - Time advances only through explicit `advance`/`tick` calls
//! - Delayed effects only through cancellable `TaskQueue` tokens
//! - No rendering, storage or platform dependencies

pub mod layout;
pub mod round;
pub mod schedule;
pub mod state;
pub mod tension;

pub use layout::{DoorOutcome, RoundLayout};
pub use round::{GameEvent, RoundController};
pub use schedule::{TaskQueue, TaskToken};
pub use state::{DoorView, OutcomeEvent, RoundTimer, RunPhase, RunSnapshot, RunState};
pub use tension::{TensionClock, TensionProfile, TensionReading, TensionSignal, TensionTier};
