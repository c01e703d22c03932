use crate::poker::card::{Card, Rank, Suit};
use crate::rng;

/// A shuffled deck, dealt from the top (`cards.pop()`).
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn fresh_shuffled() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank_val in 2..=14u8 {
                cards.push(Card::new(Rank(rank_val), suit));
            }
        }
        rng::shuffle(&mut cards);
        Self { cards }
    }

    pub fn deal_one(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fresh_deck_has_fifty_two_unique_cards() {
        let deck = Deck::fresh_shuffled();
        assert_eq!(deck.remaining(), 52);
        let set: HashSet<Card> = deck.cards.iter().copied().collect();
        assert_eq!(set.len(), 52);
    }

    #[test]
    fn dealing_reduces_remaining_count() {
        let mut deck = Deck::fresh_shuffled();
        let first = deck.deal_one();
        assert!(first.is_some());
        assert_eq!(deck.remaining(), 51);
    }
}
