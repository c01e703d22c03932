//! CRABS: a multiplayer craps table (§4.4).
//!
//! The engine is a pure state machine — bet validation, dice resolution,
//! and phase transitions only. It never touches the ledger; the game
//! runtime debits/credits around each call and turns the returned events
//! into wire messages.

pub mod bets;
pub mod engine;
pub mod errors;
pub mod events;
pub mod state;
pub mod types;

pub use engine::RollOutcome;
pub use errors::CrapsError;
pub use events::CrapsEvent;
pub use state::CrapsTable;
pub use types::{Bet, BetId, BetKind, Dice, Outcome, Phase, Point, Resolution};
