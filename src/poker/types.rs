//! Betting-round state shapes, grounded on the teacher's no-limit
//! engine types, widened from a raw `u64` chip count to the ledger's
//! [`Chips`] newtype and from an opaque `PlayerId` to a [`Wallet`].

use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::poker::card::Card;
use crate::wallet::Wallet;

pub type SeatId = u8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Folded,
    AllIn,
    SittingOut,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub seat: SeatId,
    pub wallet: Wallet,

    pub stack: Chips,
    pub committed_this_round: Chips,
    pub committed_total: Chips,

    pub status: PlayerStatus,
    pub has_acted_this_round: bool,
    pub hole_cards: Option<[Card; 2]>,
}

impl PlayerState {
    pub fn new(seat: SeatId, wallet: Wallet, stack: Chips) -> Self {
        Self {
            seat,
            wallet,
            stack,
            committed_this_round: Chips::ZERO,
            committed_total: Chips::ZERO,
            status: PlayerStatus::Active,
            has_acted_this_round: false,
            hole_cards: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<SeatId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pots {
    pub main: Option<Pot>,
    pub sides: Vec<Pot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStakes {
    pub small_blind: Chips,
    pub big_blind: Chips,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandConfig {
    pub stakes: TableStakes,
    pub button: SeatId,
    pub small_blind_seat: SeatId,
    pub big_blind_seat: SeatId,
    /// Total seat slots at the table, fixed for the table's lifetime.
    /// Seat walks wrap modulo this rather than `players.len()` so empty
    /// seats are skipped correctly.
    pub total_seats: SeatId,
    /// Heads-up exception (§4.5 open question): with exactly two
    /// players the button posts the small blind and acts first
    /// preflop, last postflop.
    pub heads_up: bool,
}
