use crate::money::Chips;
use crate::poker::errors::StateError;
use crate::poker::state::BettingState;
use crate::poker::types::{Pot, Pots, PlayerStatus, SeatId};

pub trait NoLimitRules {
    fn price_to_call(state: &BettingState, seat: SeatId) -> Chips;
    fn bet_to_bounds_unopened(state: &BettingState, seat: SeatId) -> Option<(Chips, Chips)>;
    fn raise_to_bounds_opened(state: &BettingState, seat: SeatId) -> Option<(Chips, Chips)>;
    fn is_full_raise(state: &BettingState, raise_amount: Chips) -> bool;
}

impl NoLimitRules for BettingState {
    fn price_to_call(state: &BettingState, seat: SeatId) -> Chips {
        let p = state.player(seat);
        if p.status != PlayerStatus::Active {
            return Chips::ZERO;
        }
        state
            .current_bet_to_match
            .saturating_sub(p.committed_this_round)
    }

    fn bet_to_bounds_unopened(state: &BettingState, seat: SeatId) -> Option<(Chips, Chips)> {
        if state.voluntary_bet_opened {
            return None;
        }
        let p = state.players.iter().find(|p| p.seat == seat)?;
        if p.status != PlayerStatus::Active {
            return None;
        }
        let min = state.cfg.stakes.big_blind;
        let max = p.committed_this_round + p.stack;
        if max.as_u128() < min.as_u128() {
            return None;
        }
        Some((min, max))
    }

    fn raise_to_bounds_opened(state: &BettingState, seat: SeatId) -> Option<(Chips, Chips)> {
        use crate::poker::types::Street;
        let is_bb_preflop_unopened = state.street == Street::Preflop
            && !state.voluntary_bet_opened
            && seat == state.cfg.big_blind_seat;
        if !state.voluntary_bet_opened && !is_bb_preflop_unopened {
            return None;
        }
        let p = state.players.iter().find(|p| p.seat == seat)?;
        if p.status != PlayerStatus::Active {
            return None;
        }
        if state.current_bet_to_match.is_zero() {
            return None;
        }
        let min = state.current_bet_to_match + state.last_full_raise_amount;
        let max = p.committed_this_round + p.stack;
        if max.as_u128() <= state.current_bet_to_match.as_u128() {
            return None;
        }
        Some((min, max))
    }

    fn is_full_raise(state: &BettingState, raise_amount: Chips) -> bool {
        (raise_amount.as_u128() >= state.last_full_raise_amount.as_u128()
            && !state.last_full_raise_amount.is_zero())
            || (!state.voluntary_bet_opened && !raise_amount.is_zero())
    }
}

impl BettingState {
    /// Splits total contributions into a main pot plus side pots, one
    /// per distinct all-in investment level. Eligibility for a pot is
    /// every non-folded seat that contributed at least that level; the
    /// odd chip from an indivisible split is handled by the caller at
    /// showdown (§4.5 side-pot solver).
    pub fn compute_pots(&self) -> Result<Pots, StateError> {
        let contrib: Vec<(SeatId, Chips, PlayerStatus)> = self
            .players
            .iter()
            .map(|p| (p.seat, p.committed_total, p.status))
            .collect();

        let total_on_table: u128 = contrib.iter().map(|(_, c, _)| c.as_u128()).sum();
        if total_on_table == 0 {
            return Ok(Pots::default());
        }

        let mut thresholds: Vec<u128> = contrib
            .iter()
            .filter(|(_, c, _)| !c.is_zero())
            .map(|(_, c, _)| c.as_u128())
            .collect();
        thresholds.sort_unstable();
        thresholds.dedup();
        if thresholds.is_empty() {
            return Ok(Pots {
                main: Some(Pot {
                    amount: Chips::new(total_on_table),
                    eligible: vec![],
                }),
                sides: vec![],
            });
        }

        let mut pots: Vec<Pot> = Vec::new();
        let mut prev_cap: u128 = 0;
        for cap in thresholds.iter().copied() {
            let mut amount: u128 = 0;
            for (_, c, _) in contrib.iter() {
                let tier = cap.saturating_sub(prev_cap);
                let contrib_in_tier = c.as_u128().saturating_sub(prev_cap).min(tier);
                amount = amount.saturating_add(contrib_in_tier);
            }
            let mut eligible: Vec<SeatId> = contrib
                .iter()
                .filter(|(_, c, s)| *s != PlayerStatus::Folded && c.as_u128() >= cap)
                .map(|(sid, _, _)| *sid)
                .collect();
            eligible.sort_unstable();
            pots.push(Pot {
                amount: Chips::new(amount),
                eligible,
            });
            prev_cap = cap;
        }

        let main = pots.remove(0);
        Ok(Pots {
            main: Some(main),
            sides: pots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::state::BettingState;
    use crate::poker::types::{HandConfig, PlayerState, Street, TableStakes};
    use crate::wallet::Wallet;

    fn state_with(players: Vec<PlayerState>) -> BettingState {
        let cfg = HandConfig {
            stakes: TableStakes {
                small_blind: Chips::from(1),
                big_blind: Chips::from(2),
            },
            button: 0,
            small_blind_seat: 1,
            big_blind_seat: 2,
            total_seats: 3,
            heads_up: false,
        };
        BettingState {
            street: Street::River,
            button: 0,
            first_to_act: 0,
            to_act: 0,
            current_bet_to_match: Chips::ZERO,
            last_full_raise_amount: Chips::ZERO,
            last_aggressor: None,
            voluntary_bet_opened: false,
            players,
            pots: Pots::default(),
            cfg,
            pending_to_match: Vec::new(),
            betting_locked_all_in: false,
        }
    }

    #[test]
    fn three_way_all_in_produces_main_and_side_pots() {
        let mut p0 = PlayerState::new(0, Wallet::new("0xa"), Chips::ZERO);
        p0.committed_total = Chips::from(300);
        let mut p1 = PlayerState::new(1, Wallet::new("0xb"), Chips::ZERO);
        p1.committed_total = Chips::from(100);
        p1.status = PlayerStatus::AllIn;
        let mut p2 = PlayerState::new(2, Wallet::new("0xc"), Chips::ZERO);
        p2.committed_total = Chips::from(300);

        let state = state_with(vec![p0, p1, p2]);
        let pots = state.compute_pots().unwrap();
        assert_eq!(pots.main.as_ref().unwrap().amount, Chips::from(300));
        assert_eq!(pots.main.as_ref().unwrap().eligible, vec![0, 1, 2]);
        assert_eq!(pots.sides.len(), 1);
        assert_eq!(pots.sides[0].amount, Chips::from(400));
        assert_eq!(pots.sides[0].eligible, vec![0, 2]);
    }

    #[test]
    fn a_folded_players_chips_stay_in_the_pot_but_not_the_eligible_set() {
        let mut p0 = PlayerState::new(0, Wallet::new("0xa"), Chips::ZERO);
        p0.committed_total = Chips::from(20);
        p0.status = PlayerStatus::Folded;
        let mut p1 = PlayerState::new(1, Wallet::new("0xb"), Chips::ZERO);
        p1.committed_total = Chips::from(20);

        let state = state_with(vec![p0, p1]);
        let pots = state.compute_pots().unwrap();
        let main = pots.main.as_ref().unwrap();
        assert_eq!(main.amount, Chips::from(40));
        assert_eq!(main.eligible, vec![1]);
    }

    #[test]
    fn heads_up_blinds_alone_do_not_double_count_the_current_streets_chips() {
        let mut sb = PlayerState::new(0, Wallet::new("0xa"), Chips::from(99));
        sb.committed_this_round = Chips::from(1);
        sb.committed_total = Chips::from(1);
        let mut bb = PlayerState::new(1, Wallet::new("0xb"), Chips::from(98));
        bb.committed_this_round = Chips::from(2);
        bb.committed_total = Chips::from(2);

        let state = state_with(vec![sb, bb]);
        let pots = state.compute_pots().unwrap();
        let total: u128 = pots
            .main
            .iter()
            .chain(pots.sides.iter())
            .map(|p| p.amount.as_u128())
            .sum();
        assert_eq!(total, 3);
    }
}
