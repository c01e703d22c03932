use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::poker::card::Card;
use crate::poker::legals::LegalActions;
use crate::poker::types::{Pots, SeatId, Street};
use crate::wallet::Wallet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedAction {
    Fold,
    Check,
    Call { call_amount: Chips, full_call: bool },
    Bet { to: Chips },
    Raise { to: Chips, raise_amount: Chips, full_raise: bool },
    AllInAsCall { call_amount: Chips, full_call: bool },
    AllInAsBet { to: Chips },
    AllInAsRaise { to: Chips, raise_amount: Chips, full_raise: bool },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PokerEvent {
    HandStarted { button: SeatId, small_blind: SeatId, big_blind: SeatId },
    /// `cards` carries the seat's actual hole cards in the engine's own
    /// truth stream; the event bus redacts it to `None` for anyone but
    /// the owning wallet before fan-out (§4.6 visibility discipline).
    HoleCardsDealt { seat: SeatId, wallet: Wallet, cards: Option<[Card; 2]> },
    BlindPosted { seat: SeatId, wallet: Wallet, amount: Chips },
    /// `legal_actions` is likewise redacted to `None` for anyone but the
    /// acting wallet; spectators only learn whose turn it is.
    ActionOn { seat: SeatId, wallet: Wallet, legal_actions: Option<LegalActions> },
    ActionApplied { seat: SeatId, wallet: Wallet, action: NormalizedAction },
    PotUpdated { pots: Pots },
    StreetEnded { street: Street },
    StreetStarted { street: Street, board: Vec<Card> },
    AllPlayersAllIn,
    HandEndedByFolds { winner_seat: SeatId, winner: Wallet, pots: Pots },
    Showdown { results: Vec<ShowdownEntry> },
    HandComplete,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShowdownEntry {
    pub seat: SeatId,
    pub wallet: Wallet,
    pub hole_cards: Option<[Card; 2]>,
    pub won: Chips,
}
