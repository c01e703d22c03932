use thiserror::Error;

use crate::ledger::types::CashoutId;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount is below the configured minimum")]
    BelowMinimum,
    #[error("wallet does not have enough chips")]
    InsufficientChips,
    #[error("cashout {0} is unknown")]
    UnknownCashout(CashoutId),
    #[error("durable write failed: {0}")]
    Durability(String),
    #[error("failed to load ledger journal: {0}")]
    Load(String),
}
