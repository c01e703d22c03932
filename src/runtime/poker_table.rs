//! Molt'em game runtime: wires [`crate::poker::PokerTable`] to the
//! ledger and the event bus with the same per-table serialization
//! discipline as the craps runtime (§5).

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::events::{EventBus, GameEvent, Subscription, Viewer};
use crate::ledger::Ledger;
use crate::money::Chips;
use crate::poker::{PlayerAction, PokerEvent, PokerTable, TableStakes};
use crate::runtime::errors::RuntimeError;
use crate::wallet::Wallet;

const MAX_CHAT_LEN: usize = 500;

pub struct PokerRuntime {
    pub table_id: String,
    ledger: Arc<Ledger>,
    bus: EventBus,
    table: Mutex<PokerTable>,
}

impl PokerRuntime {
    pub fn new(
        table_id: impl Into<String>,
        stakes: TableStakes,
        total_seats: u8,
        min_buy_in: Chips,
        max_buy_in: Chips,
        ledger: Arc<Ledger>,
    ) -> Self {
        let table_id = table_id.into();
        Self {
            bus: EventBus::new(table_id.clone()),
            table: Mutex::new(PokerTable::new(table_id.clone(), stakes, total_seats, min_buy_in, max_buy_in)),
            table_id,
            ledger,
        }
    }

    /// Debits `buy_in` from the wallet's ledger balance and seats it; on
    /// engine rejection (seat taken, table full, buy-in out of range)
    /// the debit is refunded (§4.6 reconciliation contract).
    pub async fn sit(&self, wallet: Wallet, buy_in: Chips) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let reference = format!("{}:sit:{}", self.table_id, wallet);
        if !self.ledger.place_wager(&wallet, buy_in, &reference)? {
            return Err(RuntimeError::InsufficientChips);
        }
        match table.sit(wallet.clone(), buy_in) {
            Ok(()) => {
                self.maybe_start_hand(&mut table);
                Ok(())
            }
            Err(err) => {
                self.ledger.refund_wager(&wallet, buy_in, &reference)?;
                Err(err.into())
            }
        }
    }

    /// Refuses while the seat holds hole cards in an active hand;
    /// credits the remaining stack back to the ledger.
    pub async fn stand(&self, wallet: &Wallet) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let stack = table.stand(wallet)?;
        self.ledger
            .settle_won(wallet, stack, &format!("{}:stand:{}", self.table_id, wallet))?;
        Ok(())
    }

    pub async fn act(&self, wallet: &Wallet, action: PlayerAction) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let events = table.act(wallet, action)?;
        let hand_over = events.iter().any(|e| matches!(e, PokerEvent::HandComplete));
        self.bus.publish(events.into_iter().map(GameEvent::Poker));
        if hand_over {
            self.maybe_start_hand(&mut table);
        }
        Ok(())
    }

    /// Starts the next hand automatically once at least two seats are
    /// ready — the runtime drives hand-to-hand pacing, not callers.
    fn maybe_start_hand(&self, table: &mut PokerTable) {
        if let Ok(events) = table.start_hand() {
            self.bus.publish(events.into_iter().map(GameEvent::Poker));
        }
    }

    pub async fn force_timeout_fold(&self) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let events = table.force_timeout_fold()?;
        let hand_over = events.iter().any(|e| matches!(e, PokerEvent::HandComplete));
        self.bus.publish(events.into_iter().map(GameEvent::Poker));
        if hand_over {
            self.maybe_start_hand(&mut table);
        }
        Ok(())
    }

    pub async fn chat(&self, wallet: &Wallet, message: String) -> Result<(), RuntimeError> {
        if message.len() > MAX_CHAT_LEN {
            return Err(RuntimeError::ChatTooLong);
        }
        let table = self.table.lock().await;
        if !table.is_seated(wallet) {
            return Err(RuntimeError::Poker(crate::poker::TableError::NotSeated));
        }
        drop(table);
        self.bus.publish([GameEvent::Chat {
            wallet: wallet.clone(),
            message,
        }]);
        Ok(())
    }

    pub async fn cashout_request(
        &self,
        wallet: &Wallet,
        amount: Chips,
        to_address: &Wallet,
    ) -> Result<(), RuntimeError> {
        let table = self.table.lock().await;
        if table.is_seated(wallet) {
            return Err(RuntimeError::SeatedCannotCashout);
        }
        drop(table);
        let record = self.ledger.request_cashout(wallet, amount, to_address)?;
        self.bus.publish([GameEvent::CashoutRequested {
            wallet: wallet.clone(),
            amount: record.amount,
        }]);
        Ok(())
    }

    pub async fn subscribe(&self, viewer: Viewer) -> Subscription {
        let table = self.table.lock().await;
        let snapshot = self.snapshot(&table, &viewer);
        self.bus.subscribe(viewer, snapshot)
    }

    pub fn unsubscribe(&self, id: crate::events::SubscriberId) {
        self.bus.unsubscribe(id);
    }

    fn snapshot(&self, table: &PokerTable, viewer: &Viewer) -> serde_json::Value {
        let own_legal_actions = match viewer {
            Viewer::Player(wallet) => Some(table.legal_actions(wallet)),
            _ => None,
        };
        serde_json::json!({
            "id": table.id,
            "phase": table.phase(),
            "turn_deadline": table.turn_deadline(),
            "legal_actions": own_legal_actions,
        })
    }

    pub async fn public_state(&self) -> serde_json::Value {
        let table = self.table.lock().await;
        self.snapshot(&table, &Viewer::Spectator)
    }

    pub async fn player_state(&self, wallet: &Wallet) -> serde_json::Value {
        let table = self.table.lock().await;
        serde_json::json!({
            "seated": table.is_seated(wallet),
            "stack": table.stack_of(wallet),
            "legal_actions": table.legal_actions(wallet),
            "balance": self.ledger.balance(wallet),
        })
    }
}
