//! Request/response bodies for the HTTP surface (§6). Plain
//! serde structs translating the wire shapes into/out of the domain
//! types the runtime and engines already speak.

use serde::{Deserialize, Serialize};

use crate::craps::BetKind;
use crate::money::Chips;
use crate::poker::PlayerAction;
use crate::wallet::Wallet;

#[derive(Deserialize)]
pub struct ChallengeQuery {
    pub wallet: String,
}

#[derive(Serialize)]
pub struct ChallengeResponse {
    pub nonce: u64,
    pub message: String,
    pub expiry: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub wallet: String,
    pub signature: String,
    pub nonce: u64,
    pub message: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expiry: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
pub struct CashoutRequestBody {
    pub amount: Chips,
    #[serde(default)]
    pub to_address: Option<String>,
}

#[derive(Serialize)]
pub struct PlayerPublicResponse {
    pub wallet: String,
    pub balance: Chips,
}

#[derive(Deserialize)]
pub struct PlaceBetRequest {
    pub kind: BetKind,
    pub amount: Chips,
}

#[derive(Deserialize)]
pub struct SitRequest {
    /// Accepted but currently ignored: seats are auto-assigned to the
    /// first open slot (see DESIGN.md).
    #[serde(default)]
    pub seat: Option<u8>,
    pub buy_in: Chips,
}

#[derive(Deserialize)]
pub struct ActionRequest {
    pub action: WireAction,
    #[serde(default)]
    pub amount: Option<Chips>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl ActionRequest {
    pub fn into_player_action(self) -> Result<PlayerAction, &'static str> {
        match self.action {
            WireAction::Fold => Ok(PlayerAction::Fold),
            WireAction::Check => Ok(PlayerAction::Check),
            WireAction::Call => Ok(PlayerAction::Call),
            WireAction::Bet => self
                .amount
                .map(|to| PlayerAction::BetTo { to })
                .ok_or("bet requires an amount"),
            WireAction::Raise => self
                .amount
                .map(|to| PlayerAction::RaiseTo { to })
                .ok_or("raise requires an amount"),
            WireAction::AllIn => Ok(PlayerAction::AllIn),
        }
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct OperatorDepositRequest {
    pub wallet: String,
    pub amount: Chips,
    pub tx_ref: String,
}

#[derive(Deserialize)]
pub struct OperatorCompleteCashoutRequest {
    pub id: u64,
    pub tx_ref: String,
}

pub fn parse_wallet(raw: &str) -> Result<Wallet, &'static str> {
    if raw.trim().is_empty() {
        return Err("wallet must not be empty");
    }
    Ok(Wallet::new(raw))
}
