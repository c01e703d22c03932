//! The ledger journal must survive a process restart: §4.2 "every
//! mutating operation durably appends before returning success".

use crabs_moltem::ledger::{Ledger, LedgerConfig};
use crabs_moltem::money::Chips;
use crabs_moltem::wallet::Wallet;

fn config_at(path: std::path::PathBuf) -> LedgerConfig {
    LedgerConfig {
        min_deposit: Chips::new(1),
        min_cashout: Chips::new(1),
        journal_path: path,
    }
}

#[test]
fn balance_and_journal_survive_reopening_the_same_file() {
    let path = std::env::temp_dir().join(format!("crabs_ledger_restart_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let wallet = Wallet::new("0xdddddddddddddddddddddddddddddddddddddd");

    {
        let ledger = Ledger::open(config_at(path.clone())).unwrap();
        ledger.confirm_deposit(&wallet, Chips::new(300), "dep1").unwrap();
        ledger.place_wager(&wallet, Chips::new(50), "wager1").unwrap();
        ledger.settle_lost(&wallet, Chips::new(50), "wager1").unwrap();
        assert_eq!(ledger.balance(&wallet), Chips::new(250));
    }

    // Fresh `Ledger` instance, same path: state must be identical.
    let reopened = Ledger::open(config_at(path.clone())).unwrap();
    assert_eq!(reopened.balance(&wallet), Chips::new(250));
    assert_eq!(reopened.journal(Some(&wallet), 10).len(), 2);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn a_repeated_deposit_tx_ref_is_idempotent() {
    let path = std::env::temp_dir().join(format!("crabs_ledger_idempotent_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let wallet = Wallet::new("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

    let ledger = Ledger::open(config_at(path.clone())).unwrap();
    ledger.confirm_deposit(&wallet, Chips::new(100), "tx-1").unwrap();
    ledger.confirm_deposit(&wallet, Chips::new(100), "tx-1").unwrap();
    assert_eq!(ledger.balance(&wallet), Chips::new(100));

    let _ = std::fs::remove_file(&path);
}
