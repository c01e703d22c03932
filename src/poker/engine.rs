//! No-limit betting-round engine: legal action generation, action
//! application, and street advancement. Grounded closely on the
//! teacher's `engine/nl/engine.rs`, widened to move real [`Chips`]
//! instead of a raw `u64` counter and to carry [`Wallet`] identity
//! through to emitted events.

use crate::money::Chips;
use crate::poker::actions::PlayerAction;
use crate::poker::errors::{ActionError, StateError};
use crate::poker::events::{NormalizedAction, PokerEvent};
use crate::poker::legals::{legal_actions_for, LegalActions};
use crate::poker::rules::NoLimitRules;
use crate::poker::seating::Seating;
use crate::poker::state::{pot_updated_event, BettingState};
use crate::poker::types::{PlayerStatus, SeatId, Street};

#[derive(Clone, Debug)]
pub enum Transition {
    Continued { events: Vec<PokerEvent>, next_to_act: SeatId },
    StreetEnd { events: Vec<PokerEvent>, street: Street },
    HandEnd { events: Vec<PokerEvent>, winner: SeatId },
}

pub fn legal_actions(state: &BettingState, seat: SeatId) -> LegalActions {
    legal_actions_for(state, seat)
}

fn only_one_player_remaining(state: &BettingState) -> Option<SeatId> {
    let mut remaining = state.seats_still_in().into_iter();
    let first = remaining.next()?;
    if remaining.next().is_none() {
        Some(first)
    } else {
        None
    }
}

fn all_players_all_in(state: &BettingState) -> bool {
    state
        .players
        .iter()
        .filter(|p| p.status != PlayerStatus::Folded)
        .all(|p| p.status == PlayerStatus::AllIn)
}

pub fn apply_action(
    state: &mut BettingState,
    seat: SeatId,
    wallet_action: PlayerAction,
) -> Result<Transition, ActionError> {
    if state.to_act != seat {
        return Err(ActionError::NotPlayersTurn);
    }
    let price = <BettingState as NoLimitRules>::price_to_call(state, seat);
    if state.player(seat).status != PlayerStatus::Active {
        return Err(ActionError::ActorCannotAct);
    }

    let normalized = match wallet_action {
        PlayerAction::Fold => apply_fold(state, seat),
        PlayerAction::Check => apply_check(state, seat, price)?,
        PlayerAction::Call => apply_call(state, seat, price),
        PlayerAction::BetTo { to } => apply_bet(state, seat, to)?,
        PlayerAction::RaiseTo { to } => apply_raise(state, seat, to)?,
        PlayerAction::AllIn => apply_all_in(state, seat, price),
    };

    let wallet = state.player(seat).wallet.clone();
    let mut events = vec![PokerEvent::ActionApplied {
        seat,
        wallet,
        action: normalized,
    }];

    let before_pots = state.pots.clone();
    state.refresh_pots();
    if state.pots != before_pots {
        events.push(pot_updated_event(state));
    }

    if let Some(winner) = only_one_player_remaining(state) {
        return Ok(Transition::HandEnd { events, winner });
    }
    if all_players_all_in(state) {
        state.betting_locked_all_in = true;
        events.push(PokerEvent::AllPlayersAllIn);
        events.push(PokerEvent::StreetEnded { street: state.street });
        return Ok(Transition::StreetEnd {
            events,
            street: state.street,
        });
    }

    let next = state.next_actor(seat);
    state.to_act = next;
    if state.pending_to_match.is_empty() && seat == state.last_aggressor.unwrap_or(seat) {
        events.push(PokerEvent::StreetEnded { street: state.street });
        return Ok(Transition::StreetEnd {
            events,
            street: state.street,
        });
    }
    Ok(Transition::Continued {
        events,
        next_to_act: next,
    })
}

fn apply_fold(state: &mut BettingState, seat: SeatId) -> NormalizedAction {
    let p = state.player_mut(seat);
    p.status = PlayerStatus::Folded;
    p.has_acted_this_round = true;
    state.pending_to_match.retain(|s| *s != seat);
    NormalizedAction::Fold
}

fn apply_check(state: &mut BettingState, seat: SeatId, price: Chips) -> Result<NormalizedAction, ActionError> {
    if !price.is_zero() {
        return Err(ActionError::CannotCheckFacingBet);
    }
    state.player_mut(seat).has_acted_this_round = true;
    state.pending_to_match.retain(|s| *s != seat);
    Ok(NormalizedAction::Check)
}

fn apply_call(state: &mut BettingState, seat: SeatId, price: Chips) -> NormalizedAction {
    let p = state.player_mut(seat);
    let call_amt = if price.as_u128() < p.stack.as_u128() { price } else { p.stack };
    p.stack = p.stack - call_amt;
    p.committed_this_round = p.committed_this_round + call_amt;
    p.committed_total = p.committed_total + call_amt;
    let full = call_amt == price;
    if p.stack.is_zero() {
        p.status = PlayerStatus::AllIn;
    }
    p.has_acted_this_round = true;
    state.pending_to_match.retain(|s| *s != seat);
    NormalizedAction::Call {
        call_amount: call_amt,
        full_call: full,
    }
}

fn apply_bet(state: &mut BettingState, seat: SeatId, to: Chips) -> Result<NormalizedAction, ActionError> {
    if !state.current_bet_to_match.is_zero() {
        return Err(ActionError::CannotBetWhenOpened);
    }
    let p = state.player(seat);
    let needed = to.saturating_sub(p.committed_this_round);
    if needed.as_u128() > p.stack.as_u128() {
        return Err(ActionError::InsufficientChips);
    }
    if to.as_u128() < state.cfg.stakes.big_blind.as_u128() {
        return Err(ActionError::IllegalAction);
    }
    let p = state.player_mut(seat);
    p.stack = p.stack - needed;
    p.committed_this_round = to;
    p.committed_total = p.committed_total + needed;
    p.has_acted_this_round = true;
    if p.stack.is_zero() {
        p.status = PlayerStatus::AllIn;
    }
    state.current_bet_to_match = to;
    state.last_full_raise_amount = to;
    state.last_aggressor = Some(seat);
    state.voluntary_bet_opened = true;
    state.pending_to_match = state
        .players
        .iter()
        .filter(|p| p.seat != seat && p.status == PlayerStatus::Active)
        .map(|p| p.seat)
        .collect();
    Ok(NormalizedAction::Bet { to })
}

fn apply_raise(state: &mut BettingState, seat: SeatId, to: Chips) -> Result<NormalizedAction, ActionError> {
    if state.current_bet_to_match.is_zero() {
        return Err(ActionError::IllegalAction);
    }
    let min_to = state.current_bet_to_match + state.last_full_raise_amount;
    if to.as_u128() < min_to.as_u128() {
        return Err(ActionError::RaiseBelowMinimum);
    }
    let p = state.player(seat);
    let needed = to.saturating_sub(p.committed_this_round);
    if needed.as_u128() > p.stack.as_u128() {
        return Err(ActionError::InsufficientChips);
    }
    let raise_amt = to.saturating_sub(state.current_bet_to_match);
    let full = <BettingState as NoLimitRules>::is_full_raise(state, raise_amt);

    let p = state.player_mut(seat);
    p.stack = p.stack - needed;
    p.committed_this_round = to;
    p.committed_total = p.committed_total + needed;
    p.has_acted_this_round = true;
    if p.stack.is_zero() {
        p.status = PlayerStatus::AllIn;
    }

    if full {
        state.last_full_raise_amount = raise_amt;
        state.last_aggressor = Some(seat);
    }
    state.current_bet_to_match = to;
    state.voluntary_bet_opened = true;
    state.pending_to_match = state
        .players
        .iter()
        .filter(|p| p.seat != seat && p.status == PlayerStatus::Active && p.committed_this_round.as_u128() < to.as_u128())
        .map(|p| p.seat)
        .collect();
    Ok(NormalizedAction::Raise {
        to,
        raise_amount: raise_amt,
        full_raise: full,
    })
}

fn apply_all_in(state: &mut BettingState, seat: SeatId, price: Chips) -> NormalizedAction {
    let p = state.player(seat);
    let total_to = p.committed_this_round + p.stack;
    let stack = p.stack;

    if state.current_bet_to_match.is_zero() {
        let p = state.player_mut(seat);
        p.committed_this_round = total_to;
        p.committed_total = p.committed_total + stack;
        p.stack = Chips::ZERO;
        p.status = PlayerStatus::AllIn;
        p.has_acted_this_round = true;
        state.current_bet_to_match = total_to;
        state.last_full_raise_amount = total_to;
        state.last_aggressor = Some(seat);
        state.voluntary_bet_opened = true;
        state.pending_to_match = state
            .players
            .iter()
            .filter(|p| p.seat != seat && p.status == PlayerStatus::Active)
            .map(|p| p.seat)
            .collect();
        return NormalizedAction::AllInAsBet { to: total_to };
    }

    let needed = total_to.saturating_sub(state.player(seat).committed_this_round);
    let p = state.player_mut(seat);
    p.stack = Chips::ZERO;
    p.committed_this_round = total_to;
    p.committed_total = p.committed_total + needed;
    p.status = PlayerStatus::AllIn;
    p.has_acted_this_round = true;

    if total_to.as_u128() <= state.current_bet_to_match.as_u128() {
        let call_amt = if needed.as_u128() < price.as_u128() { needed } else { price };
        let full = total_to == state.current_bet_to_match;
        state.pending_to_match.retain(|s| *s != seat);
        NormalizedAction::AllInAsCall {
            call_amount: call_amt,
            full_call: full,
        }
    } else {
        let raise_amt = total_to.saturating_sub(state.current_bet_to_match);
        let full = <BettingState as NoLimitRules>::is_full_raise(state, raise_amt);
        if full {
            state.last_full_raise_amount = raise_amt;
            state.last_aggressor = Some(seat);
        }
        state.current_bet_to_match = total_to;
        state.pending_to_match = state
            .players
            .iter()
            .filter(|p| p.seat != seat && p.status == PlayerStatus::Active && p.committed_this_round.as_u128() < total_to.as_u128())
            .map(|p| p.seat)
            .collect();
        NormalizedAction::AllInAsRaise {
            to: total_to,
            raise_amount: raise_amt,
            full_raise: full,
        }
    }
}

pub fn advance_street(state: &mut BettingState) -> Result<(), StateError> {
    let next = match state.street {
        Street::Preflop => Street::Flop,
        Street::Flop => Street::Turn,
        Street::Turn => Street::River,
        Street::River | Street::Showdown => return Err(StateError::InvalidTransition),
    };
    state.reset_for_street(next);
    state.betting_locked_all_in = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::types::{HandConfig, PlayerState, Pots, TableStakes};
    use crate::wallet::Wallet;

    fn heads_up_preflop() -> BettingState {
        let stakes = TableStakes {
            small_blind: Chips::from(1),
            big_blind: Chips::from(2),
        };
        let cfg = HandConfig {
            stakes: stakes.clone(),
            button: 0,
            small_blind_seat: 0,
            big_blind_seat: 1,
            total_seats: 2,
            heads_up: true,
        };
        let mut sb = PlayerState::new(0, Wallet::new("0xsb"), Chips::from(99));
        sb.committed_this_round = Chips::from(1);
        sb.committed_total = Chips::from(1);
        let mut bb = PlayerState::new(1, Wallet::new("0xbb"), Chips::from(98));
        bb.committed_this_round = Chips::from(2);
        bb.committed_total = Chips::from(2);
        BettingState {
            street: Street::Preflop,
            button: 0,
            first_to_act: 0,
            to_act: 0,
            current_bet_to_match: Chips::from(2),
            last_full_raise_amount: Chips::from(2),
            last_aggressor: Some(1),
            voluntary_bet_opened: false,
            players: vec![sb, bb],
            pots: Pots::default(),
            cfg,
            pending_to_match: vec![0],
            betting_locked_all_in: false,
        }
    }

    #[test]
    fn heads_up_small_blind_acts_first_preflop() {
        let state = heads_up_preflop();
        assert_eq!(state.compute_first_to_act(Street::Preflop), 0);
    }

    #[test]
    fn small_blind_call_gives_big_blind_the_option() {
        let mut state = heads_up_preflop();
        let transition = apply_action(&mut state, 0, PlayerAction::Call).unwrap();
        assert!(matches!(transition, Transition::Continued { next_to_act: 1, .. }));

        let transition = apply_action(&mut state, 1, PlayerAction::Check).unwrap();
        assert!(matches!(transition, Transition::StreetEnd { .. }));
    }

    #[test]
    fn folding_heads_up_ends_the_hand() {
        let mut state = heads_up_preflop();
        let transition = apply_action(&mut state, 0, PlayerAction::Fold).unwrap();
        match transition {
            Transition::HandEnd { winner, .. } => assert_eq!(winner, 1),
            other => panic!("expected hand end, got {other:?}"),
        }
    }

    #[test]
    fn raise_below_minimum_is_rejected() {
        let mut state = heads_up_preflop();
        let err = apply_action(&mut state, 0, PlayerAction::RaiseTo { to: Chips::from(3) }).unwrap_err();
        assert!(matches!(err, ActionError::RaiseBelowMinimum));
    }
}
