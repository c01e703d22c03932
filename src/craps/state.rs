use std::collections::VecDeque;

use crate::craps::types::{Bet, BetId, Dice, Phase};
use crate::wallet::Wallet;

/// In-memory state for a single craps table. Mutated only through
/// [`crate::craps::engine`] operations, all invoked under the table's
/// runtime-level lock (§5).
#[derive(Debug)]
pub struct CrapsTable {
    pub id: String,
    pub phase: Phase,
    pub point: Option<u8>,
    pub seated: Vec<Wallet>,
    pub shooter_queue: VecDeque<Wallet>,
    pub last_roll: Option<Dice>,
    pub roll_count: u64,
    pub bets: Vec<Bet>,
    pub min_bet: crate::money::Chips,
    pub max_bet: crate::money::Chips,
    next_bet_id: BetId,
}

impl CrapsTable {
    pub fn new(id: impl Into<String>, min_bet: crate::money::Chips, max_bet: crate::money::Chips) -> Self {
        Self {
            id: id.into(),
            phase: Phase::WaitingForShooter,
            point: None,
            seated: Vec::new(),
            shooter_queue: VecDeque::new(),
            last_roll: None,
            roll_count: 0,
            bets: Vec::new(),
            min_bet,
            max_bet,
            next_bet_id: 1,
        }
    }

    pub fn current_shooter(&self) -> Option<&Wallet> {
        self.shooter_queue.front()
    }

    pub fn is_seated(&self, wallet: &Wallet) -> bool {
        self.seated.contains(wallet)
    }

    pub fn bets_for(&self, wallet: &Wallet) -> impl Iterator<Item = &Bet> {
        self.bets.iter().filter(move |b| &b.owner == wallet)
    }

    pub fn has_contract_bet(&self, wallet: &Wallet, kind: crate::craps::types::BetKind) -> bool {
        self.bets.iter().any(|b| &b.owner == wallet && b.kind == kind)
    }

    pub(crate) fn alloc_bet_id(&mut self) -> BetId {
        let id = self.next_bet_id;
        self.next_bet_id += 1;
        id
    }
}
