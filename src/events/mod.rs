//! The typed per-table event bus (§4.7): a monotonic logical sequence
//! plus a wall-clock timestamp on every event, snapshot-then-stream
//! semantics on subscribe, and visibility-filtered fan-out so a
//! spectator and a seated player receive different projections of the
//! same underlying event.
//!
//! Grounded on the teacher's `demo/in_memory_stream.rs` + `stream.rs`
//! broadcast-to-subscribers shape, generalized from a single demo
//! session's phase stream to per-table subscriber registries keyed by
//! viewer identity.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::warn;

use crate::craps::CrapsEvent;
use crate::money::Chips;
use crate::poker::events::PokerEvent;
use crate::wallet::Wallet;

const LOG_TARGET: &str = "events";

/// Bounded per-subscriber queue depth. A subscriber that falls this far
/// behind is disconnected rather than allowed to stall publication for
/// everyone else (§4.7 "a slow subscriber is disconnected, not allowed
/// to block the table").
const SUBSCRIBER_QUEUE_DEPTH: usize = 256;

pub type SubscriberId = u64;

/// Who is on the receiving end of a projected event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Viewer {
    /// Not seated/playing at this table: sees only public information.
    Spectator,
    /// A specific wallet's own view: sees its own private fields (hole
    /// cards, its own legal-action menu) in addition to everything public.
    Player(Wallet),
    /// The operator console: sees everything, unredacted.
    OperatorObserver,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Craps(CrapsEvent),
    Poker(PokerEvent),
    Chat { wallet: Wallet, message: String },
    DepositConfirmed { wallet: Wallet, amount: Chips },
    CashoutRequested { wallet: Wallet, amount: Chips },
    CashoutCompleted { wallet: Wallet, amount: Chips },
    /// Sent once, immediately on subscribe, carrying a full snapshot of
    /// the table's current state (§4.7 "snapshot then stream").
    Snapshot { state: Value },
}

impl GameEvent {
    /// The projection of this event visible to `viewer`: poker hole
    /// cards and legal-action menus are redacted to `None` for anyone
    /// but the owning wallet (or the operator console).
    pub fn project(&self, viewer: &Viewer) -> GameEvent {
        match self {
            GameEvent::Poker(PokerEvent::HoleCardsDealt { seat, wallet, cards }) => {
                GameEvent::Poker(PokerEvent::HoleCardsDealt {
                    seat: *seat,
                    wallet: wallet.clone(),
                    cards: if owns(viewer, wallet) { *cards } else { None },
                })
            }
            GameEvent::Poker(PokerEvent::ActionOn { seat, wallet, legal_actions }) => {
                GameEvent::Poker(PokerEvent::ActionOn {
                    seat: *seat,
                    wallet: wallet.clone(),
                    legal_actions: if owns(viewer, wallet) { legal_actions.clone() } else { None },
                })
            }
            other => other.clone(),
        }
    }
}

fn owns(viewer: &Viewer, wallet: &Wallet) -> bool {
    match viewer {
        Viewer::OperatorObserver => true,
        Viewer::Player(w) => w == wallet,
        Viewer::Spectator => false,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub table: String,
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub event: GameEvent,
}

struct SubscriberHandle {
    id: SubscriberId,
    viewer: Viewer,
    tx: mpsc::Sender<EventEnvelope>,
}

pub struct Subscription {
    pub id: SubscriberId,
    pub rx: mpsc::Receiver<EventEnvelope>,
}

/// One event bus per table. Owns the table's logical sequence counter
/// and its live subscriber registry.
pub struct EventBus {
    table: String,
    seq: AtomicU64,
    next_subscriber_id: AtomicU64,
    subscribers: Mutex<Vec<SubscriberHandle>>,
}

impl EventBus {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            seq: AtomicU64::new(0),
            next_subscriber_id: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a new subscriber and immediately delivers `snapshot` as
    /// its first message, before any live event can reach it — the
    /// registration and the snapshot send happen under the same lock so
    /// no event published concurrently can be missed or duplicated.
    pub fn subscribe(&self, viewer: Viewer, snapshot: Value) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            table: self.table.clone(),
            seq: self.seq.load(Ordering::SeqCst),
            at: Utc::now(),
            event: GameEvent::Snapshot { state: snapshot },
        };
        // best-effort: a fresh channel with full capacity cannot be full.
        let _ = tx.try_send(envelope);
        self.subscribers.lock().push(SubscriberHandle { id, viewer, tx });
        Subscription { id, rx }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    /// Publishes every event in `events`, each stamped with the next
    /// logical sequence number and the current wall clock, to every
    /// registered subscriber's own visibility-filtered projection.
    /// Subscribers whose queue is full or whose receiver has been
    /// dropped are removed from the registry.
    pub fn publish(&self, events: impl IntoIterator<Item = GameEvent>) {
        let mut subscribers = self.subscribers.lock();
        for event in events {
            let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            let at = Utc::now();
            subscribers.retain(|sub| {
                let envelope = EventEnvelope {
                    table: self.table.clone(),
                    seq,
                    at,
                    event: event.project(&sub.viewer),
                };
                match sub.tx.try_send(envelope) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(target: LOG_TARGET, table = %self.table, subscriber = sub.id, "dropping slow subscriber");
                        false
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => false,
                }
            });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_snapshot_before_live_events() {
        let bus = EventBus::new("t1");
        let mut sub = bus.subscribe(Viewer::Spectator, serde_json::json!({"phase": "waiting"}));
        bus.publish([GameEvent::Chat {
            wallet: Wallet::new("0xa"),
            message: "hi".into(),
        }]);

        let first = sub.rx.try_recv().unwrap();
        assert!(matches!(first.event, GameEvent::Snapshot { .. }));
        let second = sub.rx.try_recv().unwrap();
        assert!(matches!(second.event, GameEvent::Chat { .. }));
        assert_eq!(second.seq, 1);
    }

    #[test]
    fn spectator_does_not_see_hole_cards_but_owner_does() {
        let bus = EventBus::new("t1");
        let wallet = Wallet::new("0xa");
        let spectator = bus.subscribe(Viewer::Spectator, Value::Null);
        let mut owner = bus.subscribe(Viewer::Player(wallet.clone()), Value::Null);

        bus.publish([GameEvent::Poker(PokerEvent::HoleCardsDealt {
            seat: 0,
            wallet: wallet.clone(),
            cards: Some([
                crate::poker::card::Card::from_code("As").unwrap(),
                crate::poker::card::Card::from_code("Kd").unwrap(),
            ]),
        })]);

        let mut spectator_rx = spectator.rx;
        spectator_rx.try_recv().unwrap(); // snapshot
        let spectator_view = spectator_rx.try_recv().unwrap();
        match spectator_view.event {
            GameEvent::Poker(PokerEvent::HoleCardsDealt { cards, .. }) => assert!(cards.is_none()),
            _ => panic!("unexpected event"),
        }

        owner.rx.try_recv().unwrap(); // snapshot
        let owner_view = owner.rx.try_recv().unwrap();
        match owner_view.event {
            GameEvent::Poker(PokerEvent::HoleCardsDealt { cards, .. }) => assert!(cards.is_some()),
            _ => panic!("unexpected event"),
        }
    }

    #[test]
    fn unsubscribe_removes_the_subscriber() {
        let bus = EventBus::new("t1");
        let sub = bus.subscribe(Viewer::Spectator, Value::Null);
        assert_eq!(bus.subscriber_count(), 1);
        bus.unsubscribe(sub.id);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
