//! CRABS game runtime: wires the pure [`crate::craps`] state machine to
//! the ledger and the event bus under the per-table serialization model
//! of §5 — one `tokio::sync::Mutex` held across an entire action, ledger
//! debit before the engine call, events published before the lock is
//! released (but subscriber delivery itself never blocks on it).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::craps::{Bet, BetId, BetKind, CrapsEvent, CrapsTable, Outcome, RollOutcome};
use crate::events::{EventBus, GameEvent, Subscription, Viewer};
use crate::ledger::Ledger;
use crate::money::Chips;
use crate::runtime::errors::RuntimeError;
use crate::wallet::Wallet;

const MAX_CHAT_LEN: usize = 500;

pub struct CrapsRuntime {
    pub table_id: String,
    ledger: Arc<Ledger>,
    bus: EventBus,
    table: Mutex<CrapsTable>,
}

impl CrapsRuntime {
    pub fn new(table_id: impl Into<String>, min_bet: Chips, max_bet: Chips, ledger: Arc<Ledger>) -> Self {
        let table_id = table_id.into();
        Self {
            bus: EventBus::new(table_id.clone()),
            table: Mutex::new(CrapsTable::new(table_id.clone(), min_bet, max_bet)),
            table_id,
            ledger,
        }
    }

    pub async fn join(&self, wallet: Wallet) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let events = table.join(wallet)?;
        self.bus.publish(events.into_iter().map(GameEvent::Craps));
        Ok(())
    }

    /// Refuses while `wallet` has any active bet (exit-scam prevention).
    pub async fn leave(&self, wallet: &Wallet) -> Result<(), RuntimeError> {
        let mut table = self.table.lock().await;
        let events = table.leave(wallet)?;
        self.bus.publish(events.into_iter().map(GameEvent::Craps));
        Ok(())
    }

    pub async fn place_bet(&self, wallet: Wallet, kind: BetKind, amount: Chips) -> Result<Bet, RuntimeError> {
        let mut table = self.table.lock().await;
        let reference = format!("{}:place_bet:{}", self.table_id, wallet);
        if !self.ledger.place_wager(&wallet, amount, &reference)? {
            return Err(RuntimeError::InsufficientChips);
        }
        match table.place_bet(wallet.clone(), kind, amount) {
            Ok((bet, event)) => {
                self.bus.publish([GameEvent::Craps(event)]);
                Ok(bet)
            }
            Err(err) => {
                self.ledger.refund_wager(&wallet, amount, &reference)?;
                Err(err.into())
            }
        }
    }

    /// Drives a full roll: resolves every active bet against the engine,
    /// settles each resolution with the ledger, then publishes the
    /// derived event set (§4.6 "roll" reconciliation contract).
    pub async fn roll(&self, wallet: &Wallet) -> Result<RollOutcome, RuntimeError> {
        let mut table = self.table.lock().await;
        let bet_amounts: HashMap<BetId, Chips> =
            table.bets.iter().map(|b| (b.id, b.amount)).collect();
        let outcome = table.roll(wallet)?;

        for res in &outcome.resolutions {
            let reference = format!("{}:bet:{}", self.table_id, res.bet_id);
            match res.outcome {
                Outcome::Won { payout } => self.ledger.settle_won(&res.owner, payout, &reference)?,
                Outcome::Pushed { refund } => self.ledger.settle_pushed(&res.owner, refund, &reference)?,
                Outcome::Lost => {
                    let amount = bet_amounts.get(&res.bet_id).copied().unwrap_or(Chips::ZERO);
                    self.ledger.settle_lost(&res.owner, amount, &reference)?;
                }
                Outcome::Active => {}
            }
        }

        self.bus.publish(self.roll_events(wallet, &outcome));
        Ok(outcome)
    }

    /// Translates a [`RollOutcome`] into the table-order event sequence
    /// a subscriber expects (§4.7): the roll itself, any resolutions,
    /// then whichever of point-established / point-made / seven-out /
    /// shooter-changed actually applies.
    fn roll_events(&self, wallet: &Wallet, outcome: &RollOutcome) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::Craps(CrapsEvent::DiceRolled {
            dice: outcome.dice,
            shooter: wallet.clone(),
            phase_before: outcome.phase_before,
            phase_after: outcome.phase_after,
            point_before: outcome.point_before,
            point_after: outcome.point_after,
        })];

        if outcome.resolutions.iter().any(|r| r.outcome != Outcome::Active) {
            events.push(GameEvent::Craps(CrapsEvent::BetsResolved {
                resolutions: outcome.resolutions.clone(),
            }));
        }

        let total = outcome.dice.total();
        match (outcome.point_before, outcome.point_after) {
            (None, Some(point)) => events.push(GameEvent::Craps(CrapsEvent::PointEstablished { point })),
            (Some(point), None) if total == point => {
                events.push(GameEvent::Craps(CrapsEvent::PointMade { point }))
            }
            (Some(_), None) if total == 7 => events.push(GameEvent::Craps(CrapsEvent::SevenOut)),
            _ => {}
        }

        if let Some((previous, next)) = outcome.shooter_changed.clone() {
            events.push(GameEvent::Craps(CrapsEvent::ShooterChanged { previous, next }));
        }

        events
    }

    pub async fn chat(&self, wallet: &Wallet, message: String) -> Result<(), RuntimeError> {
        if message.len() > MAX_CHAT_LEN {
            return Err(RuntimeError::ChatTooLong);
        }
        let table = self.table.lock().await;
        if !table.is_seated(wallet) {
            return Err(RuntimeError::Craps(crate::craps::CrapsError::NotSeated));
        }
        drop(table);
        self.bus.publish([GameEvent::Chat {
            wallet: wallet.clone(),
            message,
        }]);
        Ok(())
    }

    /// Must not be seated at the table; delegates straight to the ledger.
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
        let snapshot = self.snapshot(&table);
        self.bus.subscribe(viewer, snapshot)
    }

    pub fn unsubscribe(&self, id: crate::events::SubscriberId) {
        self.bus.unsubscribe(id);
    }

    fn snapshot(&self, table: &CrapsTable) -> serde_json::Value {
        serde_json::json!({
            "id": table.id,
            "phase": table.phase,
            "point": table.point,
            "seated": table.seated,
            "shooter": table.current_shooter(),
            "last_roll": table.last_roll,
            "roll_count": table.roll_count,
        })
    }

    pub async fn public_state(&self) -> serde_json::Value {
        let table = self.table.lock().await;
        self.snapshot(&table)
    }

    pub async fn player_state(&self, wallet: &Wallet) -> serde_json::Value {
        let table = self.table.lock().await;
        let bets: Vec<&Bet> = table.bets_for(wallet).collect();
        serde_json::json!({
            "seated": table.is_seated(wallet),
            "bets": bets,
            "balance": self.ledger.balance(wallet),
        })
    }
}
