use serde::{Deserialize, Serialize};

use crate::craps::types::{Bet, BetKind, Dice, Phase, Resolution};
use crate::wallet::Wallet;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrapsEvent {
    PlayerJoined { wallet: Wallet },
    PlayerLeft { wallet: Wallet },
    BetPlaced { bet: Bet },
    BetRemoved { bet_id: u64, owner: Wallet, kind: BetKind },
    DiceRolled {
        dice: Dice,
        shooter: Wallet,
        phase_before: Phase,
        phase_after: Phase,
        point_before: Option<u8>,
        point_after: Option<u8>,
    },
    BetsResolved { resolutions: Vec<Resolution> },
    ShooterChanged { previous: Wallet, next: Wallet },
    PointEstablished { point: u8 },
    PointMade { point: u8 },
    SevenOut,
}
