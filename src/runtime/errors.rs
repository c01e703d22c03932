use thiserror::Error;

use crate::auth::RateLimitError;
use crate::craps::CrapsError;
use crate::ledger::LedgerError;
use crate::poker::TableError;

/// Everything a table runtime operation can fail with, collapsed into
/// one enum so the transport layer has a single place to map errors to
/// responses (§7 "the runtime maps to transport-appropriate responses").
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("wallet has insufficient chips for this action")]
    InsufficientChips,
    #[error(transparent)]
    Craps(#[from] CrapsError),
    #[error(transparent)]
    Poker(#[from] TableError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("chat message exceeds the maximum length")]
    ChatTooLong,
    #[error("wallet must leave the table before requesting a cashout")]
    SeatedCannotCashout,
}
