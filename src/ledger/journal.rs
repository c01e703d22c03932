//! Durable, file-backed persistence for the ledger's in-memory state.
//!
//! Every mutating ledger call serializes the *entire* state to disk before
//! returning success (§4.2). We write to a sibling temp file and `rename`
//! over the real path so a crash mid-write cannot leave a torn journal —
//! `rename` within the same directory is atomic on every platform this
//! server targets.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ledger::types::{CashoutRecord, DepositRecord, JournalEntry, WalletStats};
use crate::money::Chips;
use crate::wallet::Wallet;

/// The on-disk shape: `{balances, stats, deposits, cashouts, journal}` per
/// §6, plus the monotonic id counters needed to keep ids unique across a
/// restart.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JournalState {
    pub balances: HashMap<Wallet, Chips>,
    pub stats: HashMap<Wallet, WalletStats>,
    pub deposits: Vec<DepositRecord>,
    pub cashouts: Vec<CashoutRecord>,
    pub journal: Vec<JournalEntry>,
    pub next_deposit_id: u64,
    pub next_cashout_id: u64,
    pub next_journal_id: u64,
}

pub struct JournalStore {
    path: PathBuf,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the journal from disk. An absent file means a fresh ledger,
    /// per §4.2 — this is the only "not found" case that is not an error.
    pub fn load(&self) -> io::Result<JournalState> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(JournalState::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, state: &JournalState) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{JournalEntry, JournalKind};
    use chrono::Utc;

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("ledger-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = JournalStore::new(dir.join("journal.json"));

        let mut state = store.load().unwrap();
        assert!(state.balances.is_empty());

        let wallet = Wallet::new("0xabc");
        state.balances.insert(wallet.clone(), Chips::new(100));
        state.journal.push(JournalEntry {
            id: 1,
            wallet: wallet.clone(),
            kind: JournalKind::Deposit,
            amount: Chips::new(100),
            resulting_balance: Chips::new(100),
            timestamp: Utc::now(),
            reference: "tx1".into(),
        });
        state.next_journal_id = 2;
        store.save(&state).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.balances.get(&wallet), Some(&Chips::new(100)));
        assert_eq!(reloaded.journal.len(), 1);
        assert_eq!(reloaded.next_journal_id, 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_a_fresh_ledger() {
        let dir = std::env::temp_dir().join(format!("ledger-test-{}", uuid::Uuid::new_v4()));
        let store = JournalStore::new(dir.join("absent.json"));
        let state = store.load().unwrap();
        assert!(state.balances.is_empty());
        assert!(state.journal.is_empty());
    }
}
