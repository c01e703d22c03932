use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::wallet::Wallet;

pub type BetId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    WaitingForShooter,
    ComeOutBetting,
    ComeOutRoll,
    PointSetBetting,
    PointRoll,
}

/// A table point: 4, 5, 6, 8, 9, or 10.
pub type Point = Option<u8>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub a: u8,
    pub b: u8,
}

impl Dice {
    pub fn total(self) -> u8 {
        self.a + self.b
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    PassLine,
    DontPass,
    Come,
    DontCome,
    Place4,
    Place5,
    Place6,
    Place8,
    Place9,
    Place10,
    CeCraps,
    CeEleven,
}

impl BetKind {
    pub const ALL: [BetKind; 12] = [
        BetKind::PassLine,
        BetKind::DontPass,
        BetKind::Come,
        BetKind::DontCome,
        BetKind::Place4,
        BetKind::Place5,
        BetKind::Place6,
        BetKind::Place8,
        BetKind::Place9,
        BetKind::Place10,
        BetKind::CeCraps,
        BetKind::CeEleven,
    ];

    /// Place-bet target number, if this kind is a place bet.
    pub fn place_number(self) -> Option<u8> {
        match self {
            BetKind::Place4 => Some(4),
            BetKind::Place5 => Some(5),
            BetKind::Place6 => Some(6),
            BetKind::Place8 => Some(8),
            BetKind::Place9 => Some(9),
            BetKind::Place10 => Some(10),
            _ => None,
        }
    }

    /// 9:5, 7:5, or 7:6 payout ratio for place bets (numerator, denominator).
    pub fn place_ratio(self) -> Option<(u128, u128)> {
        match self.place_number()? {
            4 | 10 => Some((9, 5)),
            5 | 9 => Some((7, 5)),
            6 | 8 => Some((7, 6)),
            _ => unreachable!(),
        }
    }

    /// Phases in which this kind may be newly placed (§4.4).
    pub fn placeable_in(self, phase: Phase) -> bool {
        match self {
            BetKind::PassLine | BetKind::DontPass => phase == Phase::ComeOutBetting,
            BetKind::Come | BetKind::DontCome => phase == Phase::PointSetBetting,
            BetKind::Place4
            | BetKind::Place5
            | BetKind::Place6
            | BetKind::Place8
            | BetKind::Place9
            | BetKind::Place10 => phase == Phase::PointSetBetting,
            BetKind::CeCraps | BetKind::CeEleven => {
                matches!(phase, Phase::ComeOutBetting | Phase::PointSetBetting)
            }
        }
    }

    /// "Contract" bets: at most one active per (owner, kind) per the table
    /// invariant in §3.
    pub fn is_contract(self) -> bool {
        !matches!(self, BetKind::CeCraps | BetKind::CeEleven)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub owner: Wallet,
    pub kind: BetKind,
    pub amount: Chips,
    pub come_point: Option<u8>,
    pub first_roll: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won { payout: Chips },
    Lost,
    Pushed { refund: Chips },
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub bet_id: BetId,
    pub owner: Wallet,
    pub kind: BetKind,
    pub outcome: Outcome,
}
