//! Per-kind bet resolution (§4.4).
//!
//! The come/don't-come "travel" rule applies the standard convention:
//! a don't-come bet loses on 7 or 11 and wins on 2 or 3, symmetric with
//! come, with 12 a push — mirroring the pass-line/don't-pass pair. This
//! is the documented resolution of the come/don't-come open question.

use crate::craps::types::{Bet, BetKind, Outcome};
use crate::money::Chips;

/// Whether this roll is the table's come-out roll (no point established),
/// and the table's current point (`None` during come-out).
pub fn resolve_bet(bet: &Bet, total: u8, is_come_out: bool, point: Option<u8>) -> Outcome {
    match bet.kind {
        BetKind::PassLine => resolve_line(total, is_come_out, point, bet.amount, false),
        BetKind::DontPass => resolve_line(total, is_come_out, point, bet.amount, true),
        BetKind::Come => resolve_travel(bet, total, false),
        BetKind::DontCome => resolve_travel(bet, total, true),
        BetKind::Place4 | BetKind::Place5 | BetKind::Place6 | BetKind::Place8 | BetKind::Place9
        | BetKind::Place10 => resolve_place(bet, total, is_come_out),
        BetKind::CeCraps => resolve_any_craps(bet, total),
        BetKind::CeEleven => resolve_yo_eleven(bet, total),
    }
}

/// 1:1 payout is stake-inclusive: a winning pass/don't-pass/come/don't-come
/// bet returns double the stake (§4.4 "payout = 2·stake on win").
fn resolve_line(total: u8, is_come_out: bool, point: Option<u8>, amount: Chips, is_dont: bool) -> Outcome {
    let win = Outcome::Won { payout: amount + amount };
    if is_come_out {
        match total {
            7 | 11 => {
                if is_dont {
                    Outcome::Lost
                } else {
                    win
                }
            }
            12 if is_dont => Outcome::Pushed { refund: amount },
            2 | 3 | 12 => {
                if is_dont {
                    win
                } else {
                    Outcome::Lost
                }
            }
            _ => Outcome::Active,
        }
    } else if total == 7 {
        if is_dont {
            win
        } else {
            Outcome::Lost
        }
    } else if point == Some(total) {
        if is_dont {
            Outcome::Lost
        } else {
            win
        }
    } else {
        Outcome::Active
    }
}

/// Come/don't-come travel: the bet establishes its own "come point" on
/// the roll after it's placed, then behaves like a personal pass/don't
/// pass line against that point.
fn resolve_travel(bet: &Bet, total: u8, is_dont: bool) -> Outcome {
    let win = Outcome::Won { payout: bet.amount + bet.amount };
    match bet.come_point {
        None => resolve_line(total, true, None, bet.amount, is_dont),
        Some(point) => {
            if total == point {
                if is_dont {
                    Outcome::Lost
                } else {
                    win
                }
            } else if total == 7 {
                if is_dont {
                    win
                } else {
                    Outcome::Lost
                }
            } else {
                Outcome::Active
            }
        }
    }
}

fn resolve_place(bet: &Bet, total: u8, is_come_out: bool) -> Outcome {
    if is_come_out {
        return Outcome::Active;
    }
    let number = bet
        .kind
        .place_number()
        .expect("resolve_place only called for place-bet kinds");
    if total == 7 {
        return Outcome::Lost;
    }
    if total == number {
        let (num, den) = bet
            .kind
            .place_ratio()
            .expect("place bets always have a payout ratio");
        let profit = bet.amount.mul_div_floor(num, den);
        return Outcome::Won {
            payout: bet.amount + profit,
        };
    }
    Outcome::Active
}

fn resolve_any_craps(bet: &Bet, total: u8) -> Outcome {
    if matches!(total, 2 | 3 | 12) {
        Outcome::Won {
            payout: bet.amount + bet.amount.mul_div_floor(7, 1),
        }
    } else {
        Outcome::Lost
    }
}

fn resolve_yo_eleven(bet: &Bet, total: u8) -> Outcome {
    if total == 11 {
        Outcome::Won {
            payout: bet.amount + bet.amount.mul_div_floor(7, 1),
        }
    } else {
        Outcome::Lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    fn bet(kind: BetKind, amount: u64) -> Bet {
        Bet {
            id: 1,
            owner: Wallet::new("0xabc"),
            kind,
            amount: Chips::from(amount),
            come_point: None,
            first_roll: true,
        }
    }

    #[test]
    fn pass_line_wins_on_natural_come_out() {
        let b = bet(BetKind::PassLine, 100);
        assert_eq!(
            resolve_bet(&b, 7, true, None),
            Outcome::Won {
                payout: Chips::from(200)
            }
        );
    }

    #[test]
    fn come_bet_travels_then_wins_against_its_own_point() {
        let mut b = bet(BetKind::Come, 100);
        // first roll after placement establishes the come-point
        assert_eq!(resolve_bet(&b, 5, false, Some(6)), Outcome::Active);
        b.come_point = Some(5);
        assert_eq!(
            resolve_bet(&b, 5, false, Some(6)),
            Outcome::Won {
                payout: Chips::from(200)
            }
        );
    }

    #[test]
    fn dont_pass_pushes_on_twelve_come_out() {
        let b = bet(BetKind::DontPass, 100);
        assert_eq!(
            resolve_bet(&b, 12, true, None),
            Outcome::Pushed {
                refund: Chips::from(100)
            }
        );
    }

    #[test]
    fn place_six_pays_seven_to_six() {
        let b = bet(BetKind::Place6, 60);
        assert_eq!(
            resolve_bet(&b, 6, false, Some(6)),
            Outcome::Won {
                payout: Chips::from(130)
            }
        );
    }

    #[test]
    fn dont_come_loses_on_eleven_standard_rule() {
        let b = bet(BetKind::DontCome, 50);
        assert_eq!(resolve_bet(&b, 11, false, Some(6)), Outcome::Lost);
    }

    #[test]
    fn pass_line_stays_active_on_an_unrelated_point_round_total() {
        let b = bet(BetKind::PassLine, 100);
        assert_eq!(resolve_bet(&b, 5, false, Some(6)), Outcome::Active);
    }
}
