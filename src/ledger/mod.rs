//! Off-chain chip ledger: per-wallet balances, deposit/cashout lifecycle,
//! durable journaling, and aggregate house P&L. See SPEC_FULL.md §4.2.

pub mod errors;
pub mod journal;
pub mod types;

use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{info, warn};

pub use errors::LedgerError;
use journal::{JournalState, JournalStore};
pub use types::{
    CashoutId, CashoutRecord, CashoutStatus, DepositId, DepositRecord, HousePnL, JournalEntry,
    JournalId, JournalKind, WalletStats,
};

use crate::money::Chips;
use crate::wallet::Wallet;

const LOG_TARGET: &str = "ledger";

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub min_deposit: Chips,
    pub min_cashout: Chips,
    pub journal_path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_deposit: Chips::new(1),
            min_cashout: Chips::new(1),
            journal_path: PathBuf::from("ledger.journal.json"),
        }
    }
}

/// Per-process chip ledger. All mutating operations serialize under a single
/// lock and durably append before returning success (§4.2, §5).
pub struct Ledger {
    config: LedgerConfig,
    store: JournalStore,
    state: Mutex<JournalState>,
}

impl Ledger {
    pub fn open(config: LedgerConfig) -> Result<Self, LedgerError> {
        let store = JournalStore::new(config.journal_path.clone());
        let state = store
            .load()
            .map_err(|e| LedgerError::Load(e.to_string()))?;
        info!(
            target: LOG_TARGET,
            wallets = state.balances.len(),
            journal_entries = state.journal.len(),
            "ledger loaded"
        );
        Ok(Self {
            config,
            store,
            state: Mutex::new(state),
        })
    }

    // ---- public operations (§4.2) ---------------------------------------

    pub fn confirm_deposit(
        &self,
        wallet: &Wallet,
        amount: Chips,
        tx_ref: &str,
    ) -> Result<DepositRecord, LedgerError> {
        if amount < self.config.min_deposit {
            return Err(LedgerError::BelowMinimum);
        }
        let mut guard = self.state.lock();

        if let Some(existing) = guard
            .deposits
            .iter()
            .find(|d| &d.wallet == wallet && d.tx_ref == tx_ref)
        {
            return Ok(existing.clone());
        }

        let id = next_id(&mut guard.next_deposit_id);
        let record = DepositRecord {
            id,
            wallet: wallet.clone(),
            amount,
            tx_ref: tx_ref.to_string(),
            confirmed_at: Utc::now(),
        };

        let resulting = credit(&mut guard, wallet, amount);
        guard.stats.entry(wallet.clone()).or_default().deposited += amount;
        append_journal(&mut guard, wallet, JournalKind::Deposit, amount, resulting, tx_ref);
        guard.deposits.push(record.clone());

        self.persist(&guard)?;
        info!(target: LOG_TARGET, %wallet, %amount, %tx_ref, "deposit confirmed");
        Ok(record)
    }

    /// Atomic debit. Returns `Ok(false)` without mutation if the balance is
    /// insufficient — this is a normal outcome, not an error (§4.2).
    pub fn place_wager(
        &self,
        wallet: &Wallet,
        amount: Chips,
        reference: &str,
    ) -> Result<bool, LedgerError> {
        let mut guard = self.state.lock();
        let balance = guard.balances.get(wallet).copied().unwrap_or(Chips::ZERO);
        if balance < amount {
            return Ok(false);
        }

        let resulting = debit(&mut guard, wallet, amount);
        guard.stats.entry(wallet.clone()).or_default().wagered += amount;
        append_journal(
            &mut guard,
            wallet,
            JournalKind::WagerPlaced,
            amount,
            resulting,
            reference,
        );

        self.persist(&guard)?;
        Ok(true)
    }

    pub fn settle_won(
        &self,
        wallet: &Wallet,
        payout: Chips,
        reference: &str,
    ) -> Result<(), LedgerError> {
        let mut guard = self.state.lock();
        let resulting = credit(&mut guard, wallet, payout);
        guard.stats.entry(wallet.clone()).or_default().won += payout;
        append_journal(&mut guard, wallet, JournalKind::WagerWon, payout, resulting, reference);
        self.persist(&guard)
    }

    /// Purely informational: the stake was already debited at placement, so
    /// a loss moves no chips. Still journaled for the audit trail (§4.2).
    pub fn settle_lost(
        &self,
        wallet: &Wallet,
        amount: Chips,
        reference: &str,
    ) -> Result<(), LedgerError> {
        let mut guard = self.state.lock();
        let resulting = guard.balances.get(wallet).copied().unwrap_or(Chips::ZERO);
        guard.stats.entry(wallet.clone()).or_default().lost += amount;
        append_journal(&mut guard, wallet, JournalKind::WagerLost, amount, resulting, reference);
        self.persist(&guard)
    }

    pub fn settle_pushed(
        &self,
        wallet: &Wallet,
        amount: Chips,
        reference: &str,
    ) -> Result<(), LedgerError> {
        let mut guard = self.state.lock();
        let resulting = credit(&mut guard, wallet, amount);
        append_journal(&mut guard, wallet, JournalKind::WagerPushed, amount, resulting, reference);
        self.persist(&guard)
    }

    /// Used when the engine cannot accept a wager after it was already
    /// placed; reverses the `wagered` stat increment from `place_wager`.
    pub fn refund_wager(
        &self,
        wallet: &Wallet,
        amount: Chips,
        reference: &str,
    ) -> Result<(), LedgerError> {
        let mut guard = self.state.lock();
        let resulting = credit(&mut guard, wallet, amount);
        if let Some(stats) = guard.stats.get_mut(wallet) {
            stats.wagered = stats.wagered.saturating_sub(amount);
        }
        append_journal(
            &mut guard,
            wallet,
            JournalKind::WagerRefunded,
            amount,
            resulting,
            reference,
        );
        self.persist(&guard)
    }

    pub fn request_cashout(
        &self,
        wallet: &Wallet,
        amount: Chips,
        to_address: &Wallet,
    ) -> Result<CashoutRecord, LedgerError> {
        if amount < self.config.min_cashout {
            return Err(LedgerError::BelowMinimum);
        }
        let mut guard = self.state.lock();
        let balance = guard.balances.get(wallet).copied().unwrap_or(Chips::ZERO);
        if balance < amount {
            return Err(LedgerError::InsufficientChips);
        }

        let id = next_id(&mut guard.next_cashout_id);
        let resulting = debit(&mut guard, wallet, amount);
        append_journal(&mut guard, wallet, JournalKind::Cashout, amount, resulting, &id.to_string());

        let record = CashoutRecord {
            id,
            wallet: wallet.clone(),
            amount,
            to_address: to_address.clone(),
            requested_at: Utc::now(),
            status: CashoutStatus::Pending,
            tx_ref: None,
        };
        guard.cashouts.push(record.clone());

        self.persist(&guard)?;
        info!(target: LOG_TARGET, %wallet, %amount, cashout_id = id, "cashout requested");
        Ok(record)
    }

    pub fn complete_cashout(
        &self,
        id: CashoutId,
        tx_ref: &str,
    ) -> Result<CashoutRecord, LedgerError> {
        let mut guard = self.state.lock();
        let record = guard
            .cashouts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(LedgerError::UnknownCashout(id))?;
        record.status = CashoutStatus::Completed;
        record.tx_ref = Some(tx_ref.to_string());
        let wallet = record.wallet.clone();
        let amount = record.amount;
        let updated = record.clone();

        guard.stats.entry(wallet).or_default().withdrawn += amount;

        self.persist(&guard)?;
        info!(target: LOG_TARGET, cashout_id = id, %tx_ref, "cashout completed");
        Ok(updated)
    }

    pub fn list_pending(&self) -> Vec<CashoutRecord> {
        self.state
            .lock()
            .cashouts
            .iter()
            .filter(|c| c.status == CashoutStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn balance(&self, wallet: &Wallet) -> Chips {
        self.state
            .lock()
            .balances
            .get(wallet)
            .copied()
            .unwrap_or(Chips::ZERO)
    }

    pub fn summary(&self, wallet: &Wallet) -> WalletStats {
        self.state
            .lock()
            .stats
            .get(wallet)
            .copied()
            .unwrap_or_default()
    }

    pub fn journal(&self, wallet: Option<&Wallet>, limit: usize) -> Vec<JournalEntry> {
        let guard = self.state.lock();
        let mut entries: Vec<JournalEntry> = guard
            .journal
            .iter()
            .filter(|e| wallet.is_none_or_eq(&e.wallet))
            .cloned()
            .collect();
        if entries.len() > limit {
            let start = entries.len() - limit;
            entries = entries.split_off(start);
        }
        entries
    }

    pub fn house_pnl(&self) -> HousePnL {
        let guard = self.state.lock();
        let mut pnl = HousePnL::default();
        for stats in guard.stats.values() {
            pnl.total_deposited += stats.deposited;
            pnl.total_withdrawn += stats.withdrawn;
            pnl.total_wagered += stats.wagered;
            pnl.total_won_by_players += stats.won;
        }
        pnl.house_edge = pnl.total_wagered.saturating_sub(pnl.total_won_by_players);
        pnl
    }

    fn persist(&self, state: &JournalState) -> Result<(), LedgerError> {
        self.store.save(state).map_err(|e| {
            warn!(target: LOG_TARGET, error = %e, "ledger durable write failed");
            LedgerError::Durability(e.to_string())
        })
    }
}

fn credit(guard: &mut JournalState, wallet: &Wallet, amount: Chips) -> Chips {
    let entry = guard.balances.entry(wallet.clone()).or_insert(Chips::ZERO);
    *entry += amount;
    *entry
}

fn debit(guard: &mut JournalState, wallet: &Wallet, amount: Chips) -> Chips {
    let entry = guard.balances.entry(wallet.clone()).or_insert(Chips::ZERO);
    *entry -= amount;
    *entry
}

fn append_journal(
    guard: &mut JournalState,
    wallet: &Wallet,
    kind: JournalKind,
    amount: Chips,
    resulting_balance: Chips,
    reference: &str,
) {
    let id = next_id(&mut guard.next_journal_id);
    guard.journal.push(JournalEntry {
        id,
        wallet: wallet.clone(),
        kind,
        amount,
        resulting_balance,
        timestamp: Utc::now(),
        reference: reference.to_string(),
    });
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

trait OptionWalletExt {
    fn is_none_or_eq(&self, wallet: &Wallet) -> bool;
}

impl OptionWalletExt for Option<&Wallet> {
    fn is_none_or_eq(&self, wallet: &Wallet) -> bool {
        match self {
            None => true,
            Some(w) => *w == wallet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger() -> Ledger {
        let dir = std::env::temp_dir().join(format!("ledger-unit-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Ledger::open(LedgerConfig {
            min_deposit: Chips::new(1),
            min_cashout: Chips::new(1),
            journal_path: dir.join("journal.json"),
        })
        .unwrap()
    }

    #[test]
    fn deposit_credits_balance_and_is_idempotent_on_tx_ref() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xaaa");
        ledger.confirm_deposit(&wallet, Chips::new(1_000_000), "tx1").unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(1_000_000));

        // re-submission is a no-op
        ledger.confirm_deposit(&wallet, Chips::new(1_000_000), "tx1").unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(1_000_000));
    }

    #[test]
    fn wager_debit_fails_without_mutation_when_insufficient() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xbbb");
        let ok = ledger.place_wager(&wallet, Chips::new(10), "w1").unwrap();
        assert!(!ok);
        assert_eq!(ledger.balance(&wallet), Chips::ZERO);
    }

    #[test]
    fn place_then_refund_restores_balance_and_wagered_stat() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xccc");
        ledger.confirm_deposit(&wallet, Chips::new(500), "tx1").unwrap();
        ledger.place_wager(&wallet, Chips::new(200), "w1").unwrap();
        ledger.refund_wager(&wallet, Chips::new(200), "w1").unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(500));
        assert_eq!(ledger.summary(&wallet).wagered, Chips::ZERO);
    }

    #[test]
    fn craps_pass_line_roundtrip() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xddd");
        ledger.confirm_deposit(&wallet, Chips::new(1_000_000), "tx1").unwrap();
        ledger.place_wager(&wallet, Chips::new(100_000), "bet1").unwrap();
        ledger.settle_won(&wallet, Chips::new(200_000), "bet1").unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(1_100_000));
    }

    #[test]
    fn cashout_below_minimum_rejected() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xeee");
        ledger.confirm_deposit(&wallet, Chips::new(10), "tx1").unwrap();
        let err = ledger
            .request_cashout(&wallet, Chips::new(0), &wallet)
            .unwrap_err();
        assert!(matches!(err, LedgerError::BelowMinimum));
    }

    #[test]
    fn cashout_lifecycle() {
        let ledger = temp_ledger();
        let wallet = Wallet::new("0xfff");
        ledger.confirm_deposit(&wallet, Chips::new(500), "tx1").unwrap();
        let record = ledger.request_cashout(&wallet, Chips::new(200), &wallet).unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(300));
        assert_eq!(ledger.list_pending().len(), 1);

        let completed = ledger.complete_cashout(record.id, "tx-out").unwrap();
        assert_eq!(completed.status, CashoutStatus::Completed);
        assert!(ledger.list_pending().is_empty());
        assert_eq!(ledger.summary(&wallet).withdrawn, Chips::new(200));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("ledger-persist-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("journal.json");
        let wallet = Wallet::new("0x123");

        {
            let ledger = Ledger::open(LedgerConfig {
                journal_path: path.clone(),
                ..LedgerConfig::default()
            })
            .unwrap();
            ledger.confirm_deposit(&wallet, Chips::new(300), "tx1").unwrap();
            ledger.place_wager(&wallet, Chips::new(100), "w1").unwrap();
        }

        let reopened = Ledger::open(LedgerConfig {
            journal_path: path,
            ..LedgerConfig::default()
        })
        .unwrap();
        assert_eq!(reopened.balance(&wallet), Chips::new(200));
        assert_eq!(reopened.journal(Some(&wallet), 10).len(), 2);
    }
}
