use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::wallet::Wallet;

pub type DepositId = u64;
pub type CashoutId = u64;
pub type JournalId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    pub id: DepositId,
    pub wallet: Wallet,
    pub amount: Chips,
    pub tx_ref: String,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashoutRecord {
    pub id: CashoutId,
    pub wallet: Wallet,
    pub amount: Chips,
    pub to_address: Wallet,
    pub requested_at: DateTime<Utc>,
    pub status: CashoutStatus,
    pub tx_ref: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Deposit,
    WagerPlaced,
    WagerWon,
    WagerLost,
    WagerPushed,
    WagerRefunded,
    Cashout,
}

impl JournalKind {
    /// Credits increase balance, debits decrease it — the invariant in §3:
    /// `balance(w) = sum(credits) - sum(debits)`.
    pub fn is_credit(self) -> bool {
        matches!(
            self,
            JournalKind::Deposit
                | JournalKind::WagerWon
                | JournalKind::WagerPushed
                | JournalKind::WagerRefunded
        )
    }

    pub fn is_debit(self) -> bool {
        matches!(self, JournalKind::WagerPlaced | JournalKind::Cashout)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalId,
    pub wallet: Wallet,
    pub kind: JournalKind,
    pub amount: Chips,
    pub resulting_balance: Chips,
    pub timestamp: DateTime<Utc>,
    pub reference: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStats {
    pub deposited: Chips,
    pub withdrawn: Chips,
    pub won: Chips,
    pub lost: Chips,
    pub wagered: Chips,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousePnL {
    pub total_deposited: Chips,
    pub total_withdrawn: Chips,
    pub total_wagered: Chips,
    pub total_won_by_players: Chips,
    /// total_wagered - total_won_by_players, i.e. the house's take. Can
    /// read negative in spirit but `Chips` is unsigned, so this is reported
    /// as `house_edge` only when wagered >= won; otherwise zero (the house
    /// ran a deficit this sample, which is a reportable, not fatal, fact).
    pub house_edge: Chips,
}
