//! Seven-card hand evaluation for showdown (§4.5).
//!
//! The teacher's card model only ever compares a single highest card;
//! this widens that into the full Texas Hold'em hand-ranking hierarchy,
//! evaluated by exhaustively scoring every 5-card subset of the 7
//! available cards and keeping the best, which keeps the comparator
//! itself trivial (`HandValue` is just `Ord`).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::poker::card::{Card, Rank};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// Ranked hand strength. Ordered first by category, then by descending
/// tiebreak ranks (the ranks that decide the hand, high to low).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
}

impl PartialOrd for HandValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreakers.cmp(&other.tiebreakers))
    }
}

/// Best 5-of-`cards.len()` hand value. `cards` must have at least 5
/// entries (hole cards + board).
pub fn evaluate_best(cards: &[Card]) -> HandValue {
    assert!(cards.len() >= 5, "need at least 5 cards to evaluate a hand");
    let mut best: Option<HandValue> = None;
    for combo in combinations5(cards) {
        let value = evaluate_five(&combo);
        if best.as_ref().map(|b| value > *b).unwrap_or(true) {
            best = Some(value);
        }
    }
    best.expect("at least one 5-card combination always exists")
}

fn combinations5(cards: &[Card]) -> Vec<[Card; 5]> {
    let mut out = Vec::new();
    let n = cards.len();
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        out.push([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    out
}

fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.0).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high_card(&ranks);

    if is_flush {
        if let Some(high) = straight_high {
            return HandValue {
                category: HandCategory::StraightFlush,
                tiebreakers: vec![high],
            };
        }
    }

    let mut counts: Vec<(u8, u8)> = rank_counts(&ranks);
    // sort by count desc, then rank desc
    counts.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    match counts[0].0 {
        4 => HandValue {
            category: HandCategory::FourOfAKind,
            tiebreakers: vec![counts[0].1, counts[1].1],
        },
        3 if counts.len() > 1 && counts[1].0 >= 2 => HandValue {
            category: HandCategory::FullHouse,
            tiebreakers: vec![counts[0].1, counts[1].1],
        },
        3 => HandValue {
            category: HandCategory::ThreeOfAKind,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1],
        },
        2 if counts.len() > 1 && counts[1].0 == 2 => HandValue {
            category: HandCategory::TwoPair,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1],
        },
        2 => HandValue {
            category: HandCategory::Pair,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1, counts[3].1],
        },
        _ => {
            if is_flush {
                HandValue {
                    category: HandCategory::Flush,
                    tiebreakers: ranks,
                }
            } else if let Some(high) = straight_high {
                HandValue {
                    category: HandCategory::Straight,
                    tiebreakers: vec![high],
                }
            } else {
                HandValue {
                    category: HandCategory::HighCard,
                    tiebreakers: ranks,
                }
            }
        }
    }
}

fn rank_counts(sorted_desc_ranks: &[u8]) -> Vec<(u8, u8)> {
    let mut counts: Vec<(u8, u8)> = Vec::new();
    for &r in sorted_desc_ranks {
        if let Some(entry) = counts.iter_mut().find(|(_, rank)| *rank == r) {
            entry.0 += 1;
        } else {
            counts.push((1, r));
        }
    }
    counts
}

/// Returns the high card of a straight, if the five ranks form one.
/// Handles the wheel (A-2-3-4-5, high card 5) as the one low-Ace case.
fn straight_high_card(sorted_desc_ranks: &[u8]) -> Option<u8> {
    let mut uniq: Vec<u8> = sorted_desc_ranks.to_vec();
    uniq.dedup();
    if uniq.len() != 5 {
        return None;
    }
    if uniq[0] - uniq[4] == 4 {
        return Some(uniq[0]);
    }
    // wheel: A,5,4,3,2
    if uniq == [Rank::ACE.0, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::card::Suit;

    fn c(rank: u8, suit: Suit) -> Card {
        Card::new(Rank(rank), suit)
    }

    #[test]
    fn recognizes_a_straight_flush() {
        let hand = [
            c(9, Suit::Hearts),
            c(8, Suit::Hearts),
            c(7, Suit::Hearts),
            c(6, Suit::Hearts),
            c(5, Suit::Hearts),
        ];
        let value = evaluate_five(&hand);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.tiebreakers, vec![9]);
    }

    #[test]
    fn wheel_straight_is_five_high() {
        let hand = [
            c(14, Suit::Hearts),
            c(2, Suit::Clubs),
            c(3, Suit::Diamonds),
            c(4, Suit::Spades),
            c(5, Suit::Hearts),
        ];
        let value = evaluate_five(&hand);
        assert_eq!(value.category, HandCategory::Straight);
        assert_eq!(value.tiebreakers, vec![5]);
    }

    #[test]
    fn full_house_beats_flush() {
        let full_house = [
            c(5, Suit::Hearts),
            c(5, Suit::Clubs),
            c(5, Suit::Diamonds),
            c(9, Suit::Spades),
            c(9, Suit::Hearts),
        ];
        let flush = [
            c(2, Suit::Hearts),
            c(5, Suit::Hearts),
            c(8, Suit::Hearts),
            c(11, Suit::Hearts),
            c(13, Suit::Hearts),
        ];
        assert!(evaluate_five(&full_house) > evaluate_five(&flush));
    }

    #[test]
    fn best_of_seven_picks_the_strongest_five() {
        let cards = vec![
            c(14, Suit::Spades),
            c(14, Suit::Hearts),
            c(14, Suit::Clubs),
            c(14, Suit::Diamonds),
            c(2, Suit::Hearts),
            c(3, Suit::Hearts),
            c(4, Suit::Hearts),
        ];
        let value = evaluate_best(&cards);
        assert_eq!(value.category, HandCategory::FourOfAKind);
    }
}
