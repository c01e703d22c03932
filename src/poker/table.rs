//! Per-table lifecycle: seating, buy-ins, hand dealing, blind rotation
//! (including the heads-up exception), and showdown payout — the piece
//! that wraps the pure [`crate::poker::engine`] betting-round machinery
//! into something the game runtime can drive hand after hand. Grounded
//! on the teacher's `game/game_phases.rs` phase-machine shape and
//! `game/card_ranking.rs` showdown plumbing, widened to a full 7-card
//! evaluator and a real side-pot solver.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::poker::actions::PlayerAction;
use crate::poker::card::Card;
use crate::poker::deck::Deck;
use crate::poker::engine::{self, Transition};
use crate::poker::errors::TableError;
use crate::poker::evaluator::{evaluate_best, HandValue};
use crate::poker::events::{PokerEvent, ShowdownEntry};
use crate::poker::legals::{legal_actions_for, LegalActions};
use crate::poker::state::BettingState;
use crate::poker::types::{HandConfig, PlayerState, PlayerStatus, Pots, SeatId, Street, TableStakes};
use crate::wallet::Wallet;

pub const TURN_TIMER_SECS: i64 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TablePhase {
    WaitingForPlayers,
    HandInProgress,
}

struct Seat {
    wallet: Wallet,
    stack: Chips,
}

struct Hand {
    betting: BettingState,
    deck: Deck,
    board: Vec<Card>,
}

pub struct PokerTable {
    pub id: String,
    pub stakes: TableStakes,
    pub total_seats: SeatId,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    seats: Vec<Option<Seat>>,
    button: SeatId,
    hand: Option<Hand>,
    phase: TablePhase,
    turn_deadline: Option<DateTime<Utc>>,
}

impl PokerTable {
    pub fn new(
        id: impl Into<String>,
        stakes: TableStakes,
        total_seats: SeatId,
        min_buy_in: Chips,
        max_buy_in: Chips,
    ) -> Self {
        Self {
            id: id.into(),
            stakes,
            total_seats,
            min_buy_in,
            max_buy_in,
            seats: (0..total_seats).map(|_| None).collect(),
            button: 0,
            hand: None,
            phase: TablePhase::WaitingForPlayers,
            turn_deadline: None,
        }
    }

    pub fn is_seated(&self, wallet: &Wallet) -> bool {
        self.seats.iter().flatten().any(|s| &s.wallet == wallet)
    }

    pub fn stack_of(&self, wallet: &Wallet) -> Option<Chips> {
        self.seats.iter().flatten().find(|s| &s.wallet == wallet).map(|s| s.stack)
    }

    fn seat_of(&self, wallet: &Wallet) -> Option<SeatId> {
        self.seats
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.as_ref().filter(|s| &s.wallet == wallet).map(|_| i as SeatId))
    }

    fn seated_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Seats `wallet` with `buy_in` chips already debited from its
    /// ledger balance by the caller.
    pub fn sit(&mut self, wallet: Wallet, buy_in: Chips) -> Result<(), TableError> {
        if self.is_seated(&wallet) {
            return Err(TableError::SeatTaken);
        }
        if buy_in.as_u128() < self.min_buy_in.as_u128() || buy_in.as_u128() > self.max_buy_in.as_u128() {
            return Err(TableError::BadBuyIn);
        }
        let slot = self
            .seats
            .iter()
            .position(|s| s.is_none())
            .ok_or(TableError::TableFull)?;
        self.seats[slot] = Some(Seat { wallet, stack: buy_in });
        Ok(())
    }

    /// Removes `wallet` from the table, returning its remaining stack to
    /// be credited back to its ledger balance. Refused while the wallet
    /// has a live hand in progress — it must fold (or the hand must
    /// finish) first.
    pub fn stand(&mut self, wallet: &Wallet) -> Result<Chips, TableError> {
        let seat = self.seat_of(wallet).ok_or(TableError::NotSeated)?;
        if let Some(hand) = &self.hand {
            if let Some(p) = hand.betting.players.iter().find(|p| p.seat == seat) {
                if matches!(p.status, PlayerStatus::Active | PlayerStatus::AllIn) {
                    return Err(TableError::HandInProgressForWallet);
                }
            }
        }
        let stack = self.seats[seat as usize].take().map(|s| s.stack).unwrap_or(Chips::ZERO);
        Ok(stack)
    }

    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn legal_actions(&self, wallet: &Wallet) -> LegalActions {
        let Some(hand) = &self.hand else {
            return LegalActions::none();
        };
        let Some(seat) = self.seat_of(wallet) else {
            return LegalActions::none();
        };
        legal_actions_for(&hand.betting, seat)
    }

    pub fn turn_deadline(&self) -> Option<DateTime<Utc>> {
        self.turn_deadline
    }

    /// Starts a new hand. Requires at least two seated players with a
    /// non-zero stack. Rotates the button to the next occupied seat.
    pub fn start_hand(&mut self) -> Result<Vec<PokerEvent>, TableError> {
        if self.phase == TablePhase::HandInProgress {
            return Err(TableError::HandInProgress);
        }
        let occupied: Vec<SeatId> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().map(|s| !s.stack.is_zero()).unwrap_or(false))
            .map(|(i, _)| i as SeatId)
            .collect();
        if occupied.len() < 2 {
            return Err(TableError::NotEnoughPlayers);
        }

        self.button = next_occupied_seat(&occupied, self.button);
        let heads_up = occupied.len() == 2;
        let (sb_seat, bb_seat) = if heads_up {
            (self.button, next_occupied_seat(&occupied, self.button))
        } else {
            let sb = next_occupied_seat(&occupied, self.button);
            let bb = next_occupied_seat(&occupied, sb);
            (sb, bb)
        };

        let mut deck = Deck::fresh_shuffled();
        let mut players: Vec<PlayerState> = Vec::new();
        for &seat in &occupied {
            let s = self.seats[seat as usize].as_ref().expect("occupied seat has a player");
            let hole = [deck.deal_one().expect("fresh deck has enough cards"), deck.deal_one().expect("fresh deck has enough cards")];
            let mut p = PlayerState::new(seat, s.wallet.clone(), s.stack);
            p.hole_cards = Some(hole);
            players.push(p);
        }

        let mut events = vec![PokerEvent::HandStarted {
            button: self.button,
            small_blind: sb_seat,
            big_blind: bb_seat,
        }];
        for p in &players {
            events.push(PokerEvent::HoleCardsDealt {
                seat: p.seat,
                wallet: p.wallet.clone(),
                cards: p.hole_cards,
            });
        }

        post_blind(&mut players, sb_seat, self.stakes.small_blind, &mut events);
        post_blind(&mut players, bb_seat, self.stakes.big_blind, &mut events);

        let cfg = HandConfig {
            stakes: self.stakes.clone(),
            button: self.button,
            small_blind_seat: sb_seat,
            big_blind_seat: bb_seat,
            total_seats: self.total_seats,
            heads_up,
        };
        let current_bet_to_match = players.iter().map(|p| p.committed_this_round).max().unwrap_or(Chips::ZERO);
        let mut betting = BettingState {
            street: Street::Preflop,
            button: self.button,
            first_to_act: bb_seat,
            to_act: bb_seat,
            current_bet_to_match,
            last_full_raise_amount: self.stakes.big_blind,
            last_aggressor: Some(bb_seat),
            voluntary_bet_opened: false,
            players,
            pots: Pots::default(),
            cfg,
            pending_to_match: Vec::new(),
            betting_locked_all_in: false,
        };
        use crate::poker::seating::Seating;
        betting.first_to_act = betting.compute_first_to_act(Street::Preflop);
        betting.to_act = betting.first_to_act;
        betting.pending_to_match = betting
            .players
            .iter()
            .filter(|p| p.status == PlayerStatus::Active && p.committed_this_round.as_u128() < current_bet_to_match.as_u128())
            .map(|p| p.seat)
            .collect();
        betting.refresh_pots();

        self.phase = TablePhase::HandInProgress;
        self.turn_deadline = Some(Utc::now() + Duration::seconds(TURN_TIMER_SECS));
        self.hand = Some(Hand {
            betting,
            deck,
            board: Vec::new(),
        });
        events.push(self.action_on_event());
        Ok(events)
    }

    /// The `action_on` event for whoever the engine currently expects to
    /// act, carrying that seat's legal actions (redacted for everyone
    /// else by the event bus before fan-out).
    fn action_on_event(&self) -> PokerEvent {
        let hand = self.hand.as_ref().expect("hand in progress");
        let seat = hand.betting.to_act;
        let p = hand.betting.player(seat);
        PokerEvent::ActionOn {
            seat,
            wallet: p.wallet.clone(),
            legal_actions: Some(legal_actions_for(&hand.betting, seat)),
        }
    }

    /// Applies `wallet`'s action and runs whatever follows deterministically
    /// — street advances, auto-runout when all remaining players are
    /// all-in, and showdown — returning every event produced along the
    /// way in order.
    pub fn act(&mut self, wallet: &Wallet, action: PlayerAction) -> Result<Vec<PokerEvent>, TableError> {
        let seat = self.seat_of(wallet).ok_or(TableError::NotSeated)?;
        let hand = self.hand.as_mut().ok_or(TableError::NoHandInProgress)?;
        if hand.betting.to_act != seat {
            return Err(TableError::NotYourTurn);
        }

        let transition = engine::apply_action(&mut hand.betting, seat, action)?;
        let mut events = Vec::new();
        match transition {
            Transition::Continued { events: ev, .. } => {
                events.extend(ev);
                self.turn_deadline = Some(Utc::now() + Duration::seconds(TURN_TIMER_SECS));
                events.push(self.action_on_event());
            }
            Transition::StreetEnd { events: ev, .. } => {
                events.extend(ev);
                events.extend(self.advance_after_street_end()?);
            }
            Transition::HandEnd { events: ev, winner } => {
                events.extend(ev);
                events.extend(self.award_uncontested(winner));
            }
        }
        Ok(events)
    }

    /// Forces the current actor to fold — invoked by the runtime when a
    /// turn's deadline has passed (§4.5: "a turn timer that auto-folds").
    pub fn force_timeout_fold(&mut self) -> Result<Vec<PokerEvent>, TableError> {
        let seat = {
            let hand = self.hand.as_ref().ok_or(TableError::NoHandInProgress)?;
            hand.betting.to_act
        };
        let wallet = {
            let hand = self.hand.as_ref().unwrap();
            hand.betting.player(seat).wallet.clone()
        };
        self.act(&wallet, PlayerAction::Fold)
    }

    fn advance_after_street_end(&mut self) -> Result<Vec<PokerEvent>, TableError> {
        let mut events = Vec::new();
        loop {
            let street = {
                let hand = self.hand.as_ref().expect("hand in progress");
                hand.betting.street
            };
            if street == Street::River {
                events.extend(self.run_showdown());
                break;
            }
            let hand = self.hand.as_mut().expect("hand in progress");
            engine::advance_street(&mut hand.betting).map_err(TableError::from)?;
            let dealt = match hand.betting.street {
                Street::Flop => 3,
                Street::Turn | Street::River => 1,
                _ => 0,
            };
            for _ in 0..dealt {
                let card = hand.deck.deal_one().expect("deck has enough cards for the board");
                hand.board.push(card);
            }
            events.push(PokerEvent::StreetStarted {
                street: hand.betting.street,
                board: hand.board.clone(),
            });
            self.turn_deadline = Some(Utc::now() + Duration::seconds(TURN_TIMER_SECS));
            let no_one_can_act = hand
                .betting
                .players
                .iter()
                .filter(|p| p.status != PlayerStatus::Folded)
                .all(|p| p.status == PlayerStatus::AllIn);
            if no_one_can_act {
                // every remaining player is already all-in: keep running
                // the board out instead of waiting for an action.
                continue;
            }
            events.push(self.action_on_event());
            break;
        }
        Ok(events)
    }

    fn run_showdown(&mut self) -> Vec<PokerEvent> {
        let hand = self.hand.take().expect("hand in progress");
        let board = hand.board;
        let pots = hand.betting.pots.clone();
        let players = hand.betting.players;

        let values: HashMap<SeatId, HandValue> = players
            .iter()
            .filter(|p| p.status != PlayerStatus::Folded)
            .map(|p| {
                let mut cards = board.clone();
                if let Some(hole) = p.hole_cards {
                    cards.extend(hole);
                }
                (p.seat, evaluate_best(&cards))
            })
            .collect();

        let mut payouts: HashMap<SeatId, Chips> = HashMap::new();
        let all_pots = pots.main.into_iter().chain(pots.sides.into_iter());
        for pot in all_pots {
            distribute_pot(&pot, &values, &mut payouts);
        }

        let mut results = Vec::new();
        for p in &players {
            let won = payouts.get(&p.seat).copied().unwrap_or(Chips::ZERO);
            if let Some(seat) = self.seats.get_mut(p.seat as usize).and_then(|s| s.as_mut()) {
                seat.stack = seat.stack + won;
            }
            results.push(ShowdownEntry {
                seat: p.seat,
                wallet: p.wallet.clone(),
                hole_cards: if p.status == PlayerStatus::Folded { None } else { p.hole_cards },
                won,
            });
        }

        self.phase = TablePhase::WaitingForPlayers;
        self.turn_deadline = None;
        vec![PokerEvent::Showdown { results }, PokerEvent::HandComplete]
    }

    fn award_uncontested(&mut self, winner_seat: SeatId) -> Vec<PokerEvent> {
        let hand = self.hand.take().expect("hand in progress");
        let pots = hand.betting.pots.clone();
        let total: u128 = pots
            .main
            .iter()
            .chain(pots.sides.iter())
            .map(|p| p.amount.as_u128())
            .sum();
        let amount = Chips::new(total);
        let wallet = hand
            .betting
            .players
            .iter()
            .find(|p| p.seat == winner_seat)
            .map(|p| p.wallet.clone())
            .expect("winner seat exists");

        if let Some(seat) = self.seats.get_mut(winner_seat as usize).and_then(|s| s.as_mut()) {
            seat.stack = seat.stack + amount;
        }
        self.phase = TablePhase::WaitingForPlayers;
        self.turn_deadline = None;
        vec![PokerEvent::HandEndedByFolds {
            winner_seat,
            winner: wallet,
            pots: Pots::default(),
        }]
    }
}

fn next_occupied_seat(occupied: &[SeatId], from: SeatId) -> SeatId {
    let pos = occupied.iter().position(|&s| s == from).unwrap_or(0);
    occupied[(pos + 1) % occupied.len()]
}

fn post_blind(players: &mut [PlayerState], seat: SeatId, amount: Chips, events: &mut Vec<PokerEvent>) {
    let p = players.iter_mut().find(|p| p.seat == seat).expect("blind seat exists");
    let posted = if amount.as_u128() < p.stack.as_u128() { amount } else { p.stack };
    p.stack = p.stack - posted;
    p.committed_this_round = p.committed_this_round + posted;
    p.committed_total = p.committed_total + posted;
    if p.stack.is_zero() {
        p.status = PlayerStatus::AllIn;
    }
    events.push(PokerEvent::BlindPosted {
        seat,
        wallet: p.wallet.clone(),
        amount: posted,
    });
}

/// Splits one pot among its eligible seats' best hand values. Ties split
/// the pot evenly; an indivisible remainder goes one chip at a time to
/// the tied winners in ascending seat order (the odd-chip rule).
fn distribute_pot(
    pot: &crate::poker::types::Pot,
    values: &HashMap<SeatId, HandValue>,
    payouts: &mut HashMap<SeatId, Chips>,
) {
    if pot.amount.is_zero() {
        return;
    }
    let mut best: Option<&HandValue> = None;
    let mut winners: Vec<SeatId> = Vec::new();
    for &seat in &pot.eligible {
        let Some(value) = values.get(&seat) else { continue };
        match best {
            None => {
                best = Some(value);
                winners = vec![seat];
            }
            Some(b) if value > b => {
                best = Some(value);
                winners = vec![seat];
            }
            Some(b) if value == b => winners.push(seat),
            _ => {}
        }
    }
    if winners.is_empty() {
        return;
    }
    winners.sort_unstable();
    let share = pot.amount.as_u128() / winners.len() as u128;
    let mut remainder = pot.amount.as_u128() % winners.len() as u128;
    for seat in winners {
        let mut amount = share;
        if remainder > 0 {
            amount += 1;
            remainder -= 1;
        }
        *payouts.entry(seat).or_insert(Chips::ZERO) += Chips::new(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stakes() -> TableStakes {
        TableStakes {
            small_blind: Chips::from(1),
            big_blind: Chips::from(2),
        }
    }

    #[test]
    fn heads_up_hand_deals_blinds_and_hole_cards() {
        let mut table = PokerTable::new("t1", stakes(), 6, Chips::from(50), Chips::from(500));
        table.sit(Wallet::new("0xa"), Chips::from(100)).unwrap();
        table.sit(Wallet::new("0xb"), Chips::from(100)).unwrap();
        let events = table.start_hand().unwrap();
        assert!(events.iter().any(|e| matches!(e, PokerEvent::HandStarted { .. })));
        assert_eq!(table.phase(), TablePhase::HandInProgress);

        // small blind 1 + big blind 2, nothing more yet: the pot must
        // reflect exactly the chips posted, not a doubled count.
        let hand = table.hand.as_ref().unwrap();
        let posted: u128 = hand
            .betting
            .pots
            .main
            .iter()
            .chain(hand.betting.pots.sides.iter())
            .map(|p| p.amount.as_u128())
            .sum();
        assert_eq!(posted, 3);
    }

    #[test]
    fn cannot_start_a_hand_with_one_player() {
        let mut table = PokerTable::new("t1", stakes(), 6, Chips::from(50), Chips::from(500));
        table.sit(Wallet::new("0xa"), Chips::from(100)).unwrap();
        let err = table.start_hand().unwrap_err();
        assert!(matches!(err, TableError::NotEnoughPlayers));
    }

    #[test]
    fn buy_in_outside_bounds_is_rejected() {
        let mut table = PokerTable::new("t1", stakes(), 6, Chips::from(50), Chips::from(500));
        let err = table.sit(Wallet::new("0xa"), Chips::from(10)).unwrap_err();
        assert!(matches!(err, TableError::BadBuyIn));
    }

    #[test]
    fn folding_to_a_single_player_awards_the_pot_uncontested() {
        let mut table = PokerTable::new("t1", stakes(), 6, Chips::from(50), Chips::from(500));
        let a = Wallet::new("0xa");
        let b = Wallet::new("0xb");
        table.sit(a.clone(), Chips::from(100)).unwrap();
        table.sit(b.clone(), Chips::from(100)).unwrap();
        table.start_hand().unwrap();

        // small blind (button, heads-up) acts first preflop
        let events = table.act(&a, PlayerAction::Fold).unwrap();
        assert!(events.iter().any(|e| matches!(e, PokerEvent::HandEndedByFolds { .. })));
        assert_eq!(table.phase(), TablePhase::WaitingForPlayers);
        assert_eq!(table.stack_of(&b), Some(Chips::from(101)));
        assert_eq!(table.stack_of(&a), Some(Chips::from(99)));
    }
}
