use crate::poker::state::BettingState;
use crate::poker::types::{PlayerStatus, SeatId, Street};

pub trait Seating {
    fn next_actor(&self, from: SeatId) -> SeatId;
    fn compute_first_to_act(&self, street: Street) -> SeatId;
}

impl Seating for BettingState {
    /// Walks seats forward from `from`, wrapping at the table's seat
    /// count, returning the first `Active` seat found. With two players
    /// this naturally alternates between them, which is what gives the
    /// heads-up exception (button acts first preflop, last postflop) for
    /// free — no special-casing needed here (§4.5 open question).
    fn next_actor(&self, from: SeatId) -> SeatId {
        let seat_count = self.cfg.total_seats;
        let mut seat = from;
        for _ in 0..seat_count {
            seat = (seat + 1) % seat_count;
            if let Some(p) = self.players.iter().find(|p| p.seat == seat) {
                if p.status == PlayerStatus::Active {
                    return seat;
                }
            }
        }
        from
    }

    fn compute_first_to_act(&self, street: Street) -> SeatId {
        match street {
            Street::Preflop => self.next_actor(self.cfg.big_blind_seat),
            _ => self.next_actor(self.cfg.button),
        }
    }
}
