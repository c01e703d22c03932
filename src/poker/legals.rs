use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::poker::rules::NoLimitRules;
use crate::poker::state::BettingState;
use crate::poker::types::{PlayerStatus, SeatId, Street};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegalActions {
    pub may_fold: bool,
    pub may_check: bool,
    pub call_amount: Option<Chips>,
    pub bet_to_range: Option<(Chips, Chips)>,
    pub raise_to_range: Option<(Chips, Chips)>,
}

impl LegalActions {
    pub fn none() -> Self {
        Self::default()
    }
}

pub fn legal_actions_for(state: &BettingState, seat: SeatId) -> LegalActions {
    let Some(p) = state.players.iter().find(|p| p.seat == seat) else {
        return LegalActions::none();
    };
    if p.status != PlayerStatus::Active || state.betting_locked_all_in {
        return LegalActions::none();
    }
    if seat != state.to_act {
        return LegalActions::none();
    }

    let price = <BettingState as NoLimitRules>::price_to_call(state, seat);
    let mut legals = LegalActions {
        may_fold: !price.is_zero(),
        may_check: price.is_zero(),
        call_amount: Some(price),
        bet_to_range: None,
        raise_to_range: None,
    };

    if !state.voluntary_bet_opened {
        // Preflop big blind may check or raise (not open a bet) when
        // nobody has voluntarily bet yet — the blind already opened the
        // pot for them.
        let is_bb_preflop = state.street == Street::Preflop && seat == state.cfg.big_blind_seat;
        if is_bb_preflop {
            legals.raise_to_range = <BettingState as NoLimitRules>::raise_to_bounds_opened(state, seat);
        } else {
            legals.bet_to_range = <BettingState as NoLimitRules>::bet_to_bounds_unopened(state, seat);
        }
    } else {
        legals.raise_to_range = <BettingState as NoLimitRules>::raise_to_bounds_opened(state, seat);
    }

    legals
}
