//! Playing cards. Grounded in the rank/suit split the teacher's card
//! model uses, widened from a single `0..52` index to explicit
//! rank/suit fields because the wire encoding (§6) sends them
//! separately and the evaluator wants them separately too.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn as_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub fn from_char(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'c' => Some(Suit::Clubs),
            'd' => Some(Suit::Diamonds),
            'h' => Some(Suit::Hearts),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// 2..=14, Ace high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u8);

impl Rank {
    pub const TWO: Rank = Rank(2);
    pub const ACE: Rank = Rank(14);

    pub fn as_char(self) -> char {
        match self.0 {
            2..=9 => (b'0' + self.0) as char,
            10 => 'T',
            11 => 'J',
            12 => 'Q',
            13 => 'K',
            14 => 'A',
            _ => '?',
        }
    }

    pub fn from_char(c: char) -> Option<Rank> {
        match c.to_ascii_uppercase() {
            '2'..='9' => Some(Rank(c as u8 - b'0')),
            'T' => Some(Rank(10)),
            'J' => Some(Rank(11)),
            'Q' => Some(Rank(12)),
            'K' => Some(Rank(13)),
            'A' => Some(Rank(14)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// `"Ah"`, `"Td"`, `"2c"` — the wire encoding in §6.
    pub fn to_code(self) -> String {
        format!("{}{}", self.rank.as_char(), self.suit.as_char())
    }

    pub fn from_code(code: &str) -> Option<Card> {
        let mut chars = code.chars();
        let rank = Rank::from_char(chars.next()?)?;
        let suit = Suit::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Card::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_codes_round_trip() {
        for suit in Suit::ALL {
            for rank_val in 2..=14u8 {
                let card = Card::new(Rank(rank_val), suit);
                let code = card.to_code();
                assert_eq!(Card::from_code(&code), Some(card));
            }
        }
    }

    #[test]
    fn ace_is_the_high_rank() {
        assert!(Rank::ACE > Rank(13));
    }
}
