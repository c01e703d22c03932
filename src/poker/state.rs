use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::poker::events::PokerEvent;
use crate::poker::seating::Seating;
use crate::poker::types::{HandConfig, PlayerState, PlayerStatus, Pots, SeatId, Street};

/// The state of a single hand's betting rounds. Owned by the table-level
/// [`crate::poker::table::PokerTable`], one instance per hand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BettingState {
    pub street: Street,
    pub button: SeatId,
    pub first_to_act: SeatId,
    pub to_act: SeatId,

    pub current_bet_to_match: Chips,
    pub last_full_raise_amount: Chips,
    pub last_aggressor: Option<SeatId>,
    pub voluntary_bet_opened: bool,

    pub players: Vec<PlayerState>,
    pub pots: Pots,

    pub cfg: HandConfig,

    pub pending_to_match: Vec<SeatId>,
    pub betting_locked_all_in: bool,
}

impl BettingState {
    pub fn player(&self, seat: SeatId) -> &PlayerState {
        self.players
            .iter()
            .find(|p| p.seat == seat)
            .expect("seat must be present in this hand's player list")
    }

    pub fn player_mut(&mut self, seat: SeatId) -> &mut PlayerState {
        self.players
            .iter_mut()
            .find(|p| p.seat == seat)
            .expect("seat must be present in this hand's player list")
    }

    pub fn seats_still_in(&self) -> Vec<SeatId> {
        self.players
            .iter()
            .filter(|p| p.status != PlayerStatus::Folded && p.status != PlayerStatus::SittingOut)
            .map(|p| p.seat)
            .collect()
    }

    pub fn refresh_pots(&mut self) {
        if let Ok(p) = self.compute_pots() {
            self.pots = p;
        }
    }

    /// Resets per-street bookkeeping and advances `to_act` to the first
    /// actor of `street`.
    pub fn reset_for_street(&mut self, street: Street) {
        for p in &mut self.players {
            // `committed_total` is kept current by every action/blind
            // call site as chips move, so this only clears the
            // per-street counter rather than flushing into it.
            p.committed_this_round = Chips::ZERO;
            if p.status == PlayerStatus::Active {
                p.has_acted_this_round = false;
            }
        }
        self.street = street;
        self.current_bet_to_match = Chips::ZERO;
        self.last_full_raise_amount = Chips::ZERO;
        self.last_aggressor = None;
        self.voluntary_bet_opened = false;

        self.first_to_act = self.compute_first_to_act(street);
        self.to_act = self.first_to_act;
        self.pending_to_match = self
            .players
            .iter()
            .filter(|p| p.status == PlayerStatus::Active)
            .map(|p| p.seat)
            .collect();

        self.refresh_pots();
    }
}

pub fn pot_updated_event(state: &BettingState) -> PokerEvent {
    PokerEvent::PotUpdated {
        pots: state.pots.clone(),
    }
}
