use crate::craps::bets::resolve_bet;
use crate::craps::errors::CrapsError;
use crate::craps::events::CrapsEvent;
use crate::craps::state::CrapsTable;
use crate::craps::types::{Bet, BetKind, Dice, Outcome, Phase, Resolution};
use crate::money::Chips;
use crate::rng;
use crate::wallet::Wallet;

impl CrapsTable {
    /// Seats `wallet`. The first seated player becomes shooter and the
    /// table opens its first come-out betting window.
    pub fn join(&mut self, wallet: Wallet) -> Result<Vec<CrapsEvent>, CrapsError> {
        if self.is_seated(&wallet) {
            return Err(CrapsError::AlreadySeated);
        }
        self.seated.push(wallet.clone());
        self.shooter_queue.push_back(wallet.clone());
        let events = vec![CrapsEvent::PlayerJoined {
            wallet: wallet.clone(),
        }];
        if self.phase == Phase::WaitingForShooter {
            self.phase = Phase::ComeOutBetting;
        }
        Ok(events)
    }

    /// Removes `wallet` from the table. Refuses if the wallet still has
    /// unresolved bets — exit-scam prevention (§4.4 invariants).
    pub fn leave(&mut self, wallet: &Wallet) -> Result<Vec<CrapsEvent>, CrapsError> {
        if !self.is_seated(wallet) {
            return Err(CrapsError::NotSeated);
        }
        if self.bets_for(wallet).next().is_some() {
            return Err(CrapsError::ActiveBets);
        }
        self.seated.retain(|w| w != wallet);
        self.shooter_queue.retain(|w| w != wallet);
        if self.shooter_queue.is_empty() {
            self.phase = Phase::WaitingForShooter;
            self.point = None;
        }
        Ok(vec![CrapsEvent::PlayerLeft {
            wallet: wallet.clone(),
        }])
    }

    /// Places a new bet. The caller (game runtime) has already reserved
    /// `amount` against the wallet's ledger balance before calling this.
    pub fn place_bet(
        &mut self,
        wallet: Wallet,
        kind: BetKind,
        amount: Chips,
    ) -> Result<(Bet, CrapsEvent), CrapsError> {
        if !self.is_seated(&wallet) {
            return Err(CrapsError::NotSeated);
        }
        if amount.is_zero() {
            return Err(CrapsError::BadAmount);
        }
        if amount.as_u128() < self.min_bet.as_u128() || amount.as_u128() > self.max_bet.as_u128() {
            return Err(CrapsError::BadAmount);
        }
        if !kind.placeable_in(self.phase) {
            return Err(CrapsError::BadPhase {
                kind,
                phase: self.phase,
            });
        }
        if kind.is_contract() && self.has_contract_bet(&wallet, kind) {
            return Err(CrapsError::DuplicateBet);
        }

        let id = self.alloc_bet_id();
        let bet = Bet {
            id,
            owner: wallet,
            kind,
            amount,
            come_point: None,
            first_roll: true,
        };
        self.bets.push(bet.clone());
        Ok((bet.clone(), CrapsEvent::BetPlaced { bet }))
    }

    /// Rolls the dice for the current shooter, resolving every active bet
    /// against the pre-transition phase and then advancing the state
    /// machine (§4.4 ordering rule: resolve bets before rotating phase or
    /// shooter).
    pub fn roll(&mut self, wallet: &Wallet) -> Result<RollOutcome, CrapsError> {
        let shooter = self.current_shooter().cloned().ok_or(CrapsError::NoShooter)?;
        if &shooter != wallet {
            return Err(CrapsError::NotShooter);
        }

        let phase_before = self.phase;
        let point_before = self.point;
        let is_come_out = matches!(phase_before, Phase::ComeOutBetting);

        let dice = Dice {
            a: rng::uniform_int(1, 7) as u8,
            b: rng::uniform_int(1, 7) as u8,
        };
        let total = dice.total();
        self.roll_count += 1;
        self.last_roll = Some(dice);

        let mut resolutions = Vec::new();
        let mut settled_ids = Vec::new();

        for bet in &mut self.bets {
            let outcome = resolve_bet(bet, total, is_come_out, point_before);
            match outcome {
                Outcome::Active => {
                    if matches!(bet.kind, BetKind::Come | BetKind::DontCome) && bet.come_point.is_none() {
                        bet.come_point = Some(total);
                        bet.first_roll = false;
                    }
                }
                Outcome::Won { .. } | Outcome::Lost | Outcome::Pushed { .. } => {
                    settled_ids.push(bet.id);
                }
            }
            resolutions.push(Resolution {
                bet_id: bet.id,
                owner: bet.owner.clone(),
                kind: bet.kind,
                outcome,
            });
        }
        self.bets.retain(|b| !settled_ids.contains(&b.id));

        let mut shooter_changed = None;
        let (phase_after, point_after) = if is_come_out {
            match total {
                4 | 5 | 6 | 8 | 9 | 10 => (Phase::PointSetBetting, Some(total)),
                _ => (Phase::ComeOutBetting, None),
            }
        } else if total == 7 {
            let previous = self.shooter_queue.pop_front().expect("shooter queue non-empty");
            self.shooter_queue.push_back(previous.clone());
            if let Some(next) = self.shooter_queue.front() {
                shooter_changed = Some((previous, next.clone()));
            }
            (Phase::ComeOutBetting, None)
        } else if point_before == Some(total) {
            (Phase::ComeOutBetting, None)
        } else {
            (phase_before, point_before)
        };

        self.phase = phase_after;
        self.point = point_after;

        Ok(RollOutcome {
            dice,
            resolutions,
            phase_before,
            phase_after,
            point_before,
            point_after,
            shooter_changed,
        })
    }
}

#[derive(Debug)]
pub struct RollOutcome {
    pub dice: Dice,
    pub resolutions: Vec<Resolution>,
    pub phase_before: Phase,
    pub phase_after: Phase,
    pub point_before: Option<u8>,
    pub point_after: Option<u8>,
    pub shooter_changed: Option<(Wallet, Wallet)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CrapsTable {
        CrapsTable::new("t1", Chips::from(1), Chips::from(1_000_000))
    }

    #[test]
    fn first_joiner_becomes_shooter_and_opens_come_out() {
        let mut t = table();
        let w = Wallet::new("0xaaa");
        t.join(w.clone()).unwrap();
        assert_eq!(t.phase, Phase::ComeOutBetting);
        assert_eq!(t.current_shooter(), Some(&w));
    }

    #[test]
    fn leave_with_active_bet_is_rejected() {
        let mut t = table();
        let w = Wallet::new("0xaaa");
        t.join(w.clone()).unwrap();
        t.place_bet(w.clone(), BetKind::PassLine, Chips::from(10)).unwrap();
        let err = t.leave(&w).unwrap_err();
        assert!(matches!(err, CrapsError::ActiveBets));
    }

    #[test]
    fn duplicate_contract_bet_is_rejected() {
        let mut t = table();
        let w = Wallet::new("0xaaa");
        t.join(w.clone()).unwrap();
        t.place_bet(w.clone(), BetKind::PassLine, Chips::from(10)).unwrap();
        let err = t
            .place_bet(w, BetKind::PassLine, Chips::from(10))
            .unwrap_err();
        assert!(matches!(err, CrapsError::DuplicateBet));
    }

    #[test]
    fn only_shooter_may_roll() {
        let mut t = table();
        let shooter = Wallet::new("0xaaa");
        let other = Wallet::new("0xbbb");
        t.join(shooter).unwrap();
        t.join(other.clone()).unwrap();
        let err = t.roll(&other).unwrap_err();
        assert!(matches!(err, CrapsError::NotShooter));
    }

    #[test]
    fn place_bet_rejected_outside_its_phase() {
        let mut t = table();
        let w = Wallet::new("0xaaa");
        t.join(w.clone()).unwrap();
        let err = t.place_bet(w, BetKind::Place6, Chips::from(60)).unwrap_err();
        assert!(matches!(err, CrapsError::BadPhase { .. }));
    }
}
