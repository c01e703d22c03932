//! The game runtime: the per-table layer that drives a pure engine
//! (craps or poker) together with the ledger and the event bus under
//! the concurrency discipline of §5 — one lock per table, ledger debit
//! before the engine call, refund on engine rejection, events published
//! before the lock is released.

pub mod craps_table;
pub mod errors;
pub mod poker_table;

pub use craps_table::CrapsRuntime;
pub use errors::RuntimeError;
pub use poker_table::PokerRuntime;
