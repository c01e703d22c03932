use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("it is not this seat's turn to act")]
    NotPlayersTurn,
    #[error("this seat cannot act (folded, all-in, or sitting out)")]
    ActorCannotAct,
    #[error("action is not legal in the current betting state")]
    IllegalAction,
    #[error("cannot check while facing a bet")]
    CannotCheckFacingBet,
    #[error("cannot open a bet once the pot is already opened")]
    CannotBetWhenOpened,
    #[error("call amount does not match the price to call")]
    BadCallAmount,
    #[error("raise is below the minimum legal raise size")]
    RaiseBelowMinimum,
    #[error("stack is insufficient for this action")]
    InsufficientChips,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no further street to advance to")]
    InvalidTransition,
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table already has a hand in progress")]
    HandInProgress,
    #[error("at least two seated players are required to start a hand")]
    NotEnoughPlayers,
    #[error("seat is already occupied")]
    SeatTaken,
    #[error("table is full")]
    TableFull,
    #[error("wallet is not seated at this table")]
    NotSeated,
    #[error("wallet has chips committed to the current hand and cannot leave")]
    HandInProgressForWallet,
    #[error("buy-in must be between the table's minimum and maximum")]
    BadBuyIn,
    #[error("no hand is in progress at this table")]
    NoHandInProgress,
    #[error("it is not this wallet's turn to act")]
    NotYourTurn,
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    State(#[from] StateError),
}
