// src/poker_types.rs
// Core card / street / action / position types shared by the parser and stats layers

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat number as emitted by the log ("Player 3"). Negative means unknown;
/// the log itself only ever emits non-negative seats.
pub type SeatId = i32;

/// Sentinel for "no seat identified yet".
pub const NO_SEAT: SeatId = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Grid index 0..=12 with Two = 0 and Ace = 12.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Rank> {
        use Rank::*;
        const ORDER: [Rank; 13] = [
            Two, Three, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
        ];
        ORDER.get(idx).copied()
    }

    /// Parses the rank token as it appears in the log ("2".."9", "10", "J",
    /// "Q", "K", "A"); "T" is accepted as the short form of ten.
    pub fn parse(s: &str) -> Option<Rank> {
        use Rank::*;
        match s {
            "2" => Some(Two),
            "3" => Some(Three),
            "4" => Some(Four),
            "5" => Some(Five),
            "6" => Some(Six),
            "7" => Some(Seven),
            "8" => Some(Eight),
            "9" => Some(Nine),
            "10" | "T" => Some(Ten),
            "J" => Some(Jack),
            "Q" => Some(Queen),
            "K" => Some(King),
            "A" => Some(Ace),
            _ => None,
        }
    }

    pub fn to_str(self) -> &'static str {
        use Rank::*;
        match self {
            Two => "2",
            Three => "3",
            Four => "4",
            Five => "5",
            Six => "6",
            Seven => "7",
            Eight => "8",
            Nine => "9",
            Ten => "T",
            Jack => "J",
            Queen => "Q",
            King => "K",
            Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub fn parse(s: &str) -> Option<Suit> {
        match s {
            "h" => Some(Suit::Hearts),
            "d" => Some(Suit::Diamonds),
            "c" => Some(Suit::Clubs),
            "s" => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Suit::Hearts => "h",
            Suit::Diamonds => "d",
            Suit::Clubs => "c",
            Suit::Spades => "s",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// Parses a single card token like "7d", "10h" or "Ah". The rank is
    /// everything up to the final character, the suit is the final character.
    pub fn parse(s: &str) -> Option<Card> {
        let s = s.trim();
        if s.len() < 2 || !s.is_ascii() {
            return None;
        }
        let (rank_str, suit_str) = s.split_at(s.len() - 1);
        Some(Card {
            rank: Rank::parse(rank_str)?,
            suit: Suit::parse(suit_str)?,
        })
    }

    /// Parses a comma-separated card list like "Ah, Kd". Any invalid token
    /// fails the whole list so the caller can drop the line.
    pub fn parse_list(s: &str) -> Option<Vec<Card>> {
        s.split(',').map(Card::parse).collect()
    }

    pub fn to_display(&self) -> String {
        let suit_symbol = match self.suit {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        };
        format!("{}{}", self.rank.to_str(), suit_symbol)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_str(), self.suit.to_str())
    }
}

/// Betting rounds in chronological order. Ordering is meaningful: a later
/// street compares greater than an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub fn to_str(self) -> &'static str {
        match self {
            Street::PreFlop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    BlindSb,
    BlindBb,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
    Fold,
}

impl ActionKind {
    /// True for a bet, raise or all-in.
    pub fn is_aggressive(self) -> bool {
        matches!(self, ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn)
    }

    /// True for a forced blind post.
    pub fn is_blind(self) -> bool {
        matches!(self, ActionKind::BlindSb | ActionKind::BlindBb)
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::BlindSb => "SB",
            ActionKind::BlindBb => "BB",
            ActionKind::Check => "Check",
            ActionKind::Call => "Call",
            ActionKind::Bet => "Bet",
            ActionKind::Raise => "Raise",
            ActionKind::AllIn => "All-in",
            ActionKind::Fold => "Fold",
        }
    }
}

/// One observed action by one seat, stamped with the street that was active
/// at the instant it was logged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub timestamp: NaiveDateTime,
    pub player_id: SeatId,
    pub street: Street,
    pub kind: ActionKind,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Sb,
    Bb,
    Utg,
    Utg1,
    Mp,
    Hj,
    Co,
    Btn,
    Unknown,
}

impl Default for Position {
    fn default() -> Position {
        Position::Unknown
    }
}

impl Position {
    pub fn to_str(self) -> &'static str {
        match self {
            Position::Sb => "SB",
            Position::Bb => "BB",
            Position::Utg => "UTG",
            Position::Utg1 => "UTG+1",
            Position::Mp => "MP",
            Position::Hj => "HJ",
            Position::Co => "CO",
            Position::Btn => "BTN",
            Position::Unknown => "?",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
