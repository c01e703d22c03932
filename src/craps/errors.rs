use thiserror::Error;

use crate::craps::types::{BetKind, Phase};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrapsError {
    #[error("only the current shooter may roll")]
    NotShooter,
    #[error("bet kind {kind:?} cannot be placed during {phase:?}")]
    BadPhase { kind: BetKind, phase: Phase },
    #[error("a contract bet of this kind is already active for this wallet")]
    DuplicateBet,
    #[error("wallet has active bets and cannot leave the table")]
    ActiveBets,
    #[error("amount must be greater than zero")]
    BadAmount,
    #[error("table has no seated shooter to roll")]
    NoShooter,
    #[error("wallet is not seated at this table")]
    NotSeated,
    #[error("wallet is already seated at this table")]
    AlreadySeated,
}
