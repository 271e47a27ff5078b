// src/log_events.rs
// Line tokenizer: recognizes poker-relevant VRChat log lines and emits typed events

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::poker_types::{Card, SeatId};

/// Timestamp layout of the VRChat log prefix, e.g. "2026.02.21 00:18:29".
pub const TIMESTAMP_LAYOUT: &str = "%Y.%m.%d %H:%M:%S";

/// World id of the VRPoker world. Joining any other world leaves poker mode.
pub const VRPOKER_WORLD_ID: &str = "wrld_8b4e21a3-27cf-4b3b-bb55-7e9d2c8f10ab";

// Prefix: "2026.02.21 00:18:29 Debug      -  <body>"
static RE_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}\.\d{2}\.\d{2} \d{2}:\d{2}:\d{2}) \w+\s+-\s+(.+)$").expect("prefix regex")
});

static RE_WORLD_JOINING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Joining (wrld_[a-f0-9-]+)").expect("world regex"));
static RE_WORLD_LEAVING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Behaviour\] OnLeftRoom").expect("leave regex"));

static RE_NEW_GAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Table\]: Preparing for New Game").expect("new game regex"));
static RE_NEW_COMMUNITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Table\]: New Community Card: (.+)").expect("community regex"));
static RE_FOLD_TO_ONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Table\]: Fold to One Condition").expect("fold-to-one regex"));
static RE_NEXT_PHASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Table\]: Next phase\.True - (\d+)").expect("phase regex"));
static RE_COLLECTING_BETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Table\]: Collecting Bets").expect("collect regex"));

static RE_DRAW_LOCAL_HOLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Seat\]: Draw Local Hole Cards: (.+)").expect("draw regex"));
static RE_SB_BET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Seat\]: Player (\d+) SB BET IN = (\d+)").expect("sb regex"));
static RE_BB_BET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Seat\]: Player (\d+) BB BET IN = (\d+)").expect("bb regex"));
static RE_PLAYER_FOLDED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Seat\]: Player (\d+) Folded\.").expect("fold regex"));
static RE_PLAYER_END_TURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[Seat\]: Player (\d+) End Turn with BET IN = (\d+)").expect("end turn regex")
});
static RE_SHOW_HOLE_CARDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[Seat\]: Player (\d+) Show hole cards: (.+)").expect("show regex")
});

static RE_POT_WINNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Pot\]: Winner: (\d+) Pot Amount: (\d+)").expect("winner regex"));
static RE_POT_MANAGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[PotManager\]: All players folded, player (\d+) won (\d+)").expect("pot regex")
});

/// One poker-relevant event extracted from a log line. Each variant maps to
/// exactly one recognized line shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    WorldJoin { world_id: String },
    WorldLeave,
    NewHand,
    CommunityCard { card: Card },
    FoldToOne,
    StreetBoundary,
    DrawLocalHoleCards { cards: Vec<Card> },
    PostSmallBlind { seat: SeatId, amount: u32 },
    PostBigBlind { seat: SeatId, amount: u32 },
    PlayerFolded { seat: SeatId },
    EndTurn { seat: SeatId, amount: u32 },
    ShowHoleCards { seat: SeatId, cards: Vec<Card> },
    ShowdownWinner { seat: SeatId, amount: u32 },
    FoldWinner { seat: SeatId, amount: u32 },
}

/// A tokenized line: the parsed prefix timestamp plus the recognized event.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedLine {
    pub timestamp: NaiveDateTime,
    pub event: LogEvent,
}

/// Tokenizes one raw log line. Returns `None` for anything that is not a
/// well-formed, recognized poker event — lines are dropped silently because
/// the VRChat log interleaves arbitrary engine output with table events.
pub fn tokenize_line(line: &str) -> Option<TokenizedLine> {
    let caps = RE_TIMESTAMP.captures(line)?;
    let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_LAYOUT).ok()?;
    let body = caps[2].trim();
    let event = match_body(body)?;
    Some(TokenizedLine { timestamp, event })
}

fn match_body(body: &str) -> Option<LogEvent> {
    if let Some(m) = RE_WORLD_JOINING.captures(body) {
        return Some(LogEvent::WorldJoin {
            world_id: m[1].to_string(),
        });
    }
    if RE_WORLD_LEAVING.is_match(body) {
        return Some(LogEvent::WorldLeave);
    }
    if RE_NEW_GAME.is_match(body) {
        return Some(LogEvent::NewHand);
    }
    if let Some(m) = RE_NEW_COMMUNITY.captures(body) {
        let card = Card::parse(&m[1])?;
        return Some(LogEvent::CommunityCard { card });
    }
    if RE_FOLD_TO_ONE.is_match(body) {
        return Some(LogEvent::FoldToOne);
    }
    if RE_NEXT_PHASE.is_match(body) || RE_COLLECTING_BETS.is_match(body) {
        return Some(LogEvent::StreetBoundary);
    }
    if let Some(m) = RE_DRAW_LOCAL_HOLE.captures(body) {
        let cards = Card::parse_list(&m[1])?;
        return Some(LogEvent::DrawLocalHoleCards { cards });
    }
    if let Some(m) = RE_SB_BET.captures(body) {
        let (seat, amount) = seat_amount(&m[1], &m[2])?;
        return Some(LogEvent::PostSmallBlind { seat, amount });
    }
    if let Some(m) = RE_BB_BET.captures(body) {
        let (seat, amount) = seat_amount(&m[1], &m[2])?;
        return Some(LogEvent::PostBigBlind { seat, amount });
    }
    if let Some(m) = RE_PLAYER_FOLDED.captures(body) {
        return Some(LogEvent::PlayerFolded {
            seat: m[1].parse().ok()?,
        });
    }
    if let Some(m) = RE_PLAYER_END_TURN.captures(body) {
        let (seat, amount) = seat_amount(&m[1], &m[2])?;
        return Some(LogEvent::EndTurn { seat, amount });
    }
    if let Some(m) = RE_SHOW_HOLE_CARDS.captures(body) {
        let seat: SeatId = m[1].parse().ok()?;
        let cards = Card::parse_list(&m[2])?;
        return Some(LogEvent::ShowHoleCards { seat, cards });
    }
    if let Some(m) = RE_POT_WINNER.captures(body) {
        let (seat, amount) = seat_amount(&m[1], &m[2])?;
        return Some(LogEvent::ShowdownWinner { seat, amount });
    }
    if let Some(m) = RE_POT_MANAGER.captures(body) {
        let (seat, amount) = seat_amount(&m[1], &m[2])?;
        return Some(LogEvent::FoldWinner { seat, amount });
    }
    None
}

fn seat_amount(seat: &str, amount: &str) -> Option<(SeatId, u32)> {
    Some((seat.parse().ok()?, amount.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker_types::{Rank, Suit};

    fn line(body: &str) -> String {
        format!("2026.02.21 00:18:29 Debug      -  {}", body)
    }

    #[test]
    fn test_timestamp_prefix_required() {
        assert!(tokenize_line("[Table]: Preparing for New Game").is_none());
        assert!(tokenize_line("garbage").is_none());
        assert!(tokenize_line("").is_none());
        // Malformed date field
        assert!(tokenize_line("2026.13.45 99:00:00 Debug      -  [Table]: Preparing for New Game")
            .is_none());
    }

    #[test]
    fn test_new_game_line() {
        let t = tokenize_line(&line("[Table]: Preparing for New Game")).unwrap();
        assert_eq!(t.event, LogEvent::NewHand);
        assert_eq!(
            t.timestamp,
            NaiveDateTime::parse_from_str("2026.02.21 00:18:29", TIMESTAMP_LAYOUT).unwrap()
        );
    }

    #[test]
    fn test_world_events() {
        let t = tokenize_line(&line("Joining wrld_12ab34cd-0000-1111-2222-333344445555")).unwrap();
        assert_eq!(
            t.event,
            LogEvent::WorldJoin {
                world_id: "wrld_12ab34cd-0000-1111-2222-333344445555".to_string()
            }
        );

        let t = tokenize_line(&line("[Behaviour] OnLeftRoom")).unwrap();
        assert_eq!(t.event, LogEvent::WorldLeave);
    }

    #[test]
    fn test_blind_and_action_lines() {
        let t = tokenize_line(&line("[Seat]: Player 3 SB BET IN = 10")).unwrap();
        assert_eq!(t.event, LogEvent::PostSmallBlind { seat: 3, amount: 10 });

        let t = tokenize_line(&line("[Seat]: Player 5 BB BET IN = 20")).unwrap();
        assert_eq!(t.event, LogEvent::PostBigBlind { seat: 5, amount: 20 });

        let t = tokenize_line(&line("[Seat]: Player 3 End Turn with BET IN = 60")).unwrap();
        assert_eq!(t.event, LogEvent::EndTurn { seat: 3, amount: 60 });

        let t = tokenize_line(&line("[Seat]: Player 5 Folded.")).unwrap();
        assert_eq!(t.event, LogEvent::PlayerFolded { seat: 5 });
    }

    #[test]
    fn test_card_lines() {
        let t = tokenize_line(&line("[Table]: New Community Card: 10h")).unwrap();
        assert_eq!(
            t.event,
            LogEvent::CommunityCard {
                card: Card::new(Rank::Ten, Suit::Hearts)
            }
        );

        let t = tokenize_line(&line("[Seat]: Draw Local Hole Cards: Ah, Kd")).unwrap();
        match t.event {
            LogEvent::DrawLocalHoleCards { cards } => {
                assert_eq!(cards.len(), 2);
                assert_eq!(cards[0], Card::new(Rank::Ace, Suit::Hearts));
            }
            other => panic!("unexpected event {:?}", other),
        }

        let t = tokenize_line(&line("[Seat]: Player 7 Show hole cards: Ah, Ad")).unwrap();
        match t.event {
            LogEvent::ShowHoleCards { seat, cards } => {
                assert_eq!(seat, 7);
                assert_eq!(cards.len(), 2);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_bad_card_drops_line() {
        assert!(tokenize_line(&line("[Table]: New Community Card: 1x")).is_none());
        assert!(tokenize_line(&line("[Seat]: Draw Local Hole Cards: Ah, ZZ")).is_none());
    }

    #[test]
    fn test_winner_lines() {
        let t = tokenize_line(&line("[Pot]: Winner: 7 Pot Amount: 400")).unwrap();
        assert_eq!(t.event, LogEvent::ShowdownWinner { seat: 7, amount: 400 });

        let t = tokenize_line(&line("[PotManager]: All players folded, player 3 won 30")).unwrap();
        assert_eq!(t.event, LogEvent::FoldWinner { seat: 3, amount: 30 });
    }

    #[test]
    fn test_street_boundary_lines() {
        let t = tokenize_line(&line("[Table]: Next phase.True - 2")).unwrap();
        assert_eq!(t.event, LogEvent::StreetBoundary);

        let t = tokenize_line(&line("[Table]: Collecting Bets")).unwrap();
        assert_eq!(t.event, LogEvent::StreetBoundary);

        let t = tokenize_line(&line("[Table]: Fold to One Condition")).unwrap();
        assert_eq!(t.event, LogEvent::FoldToOne);
    }

    #[test]
    fn test_unknown_body_dropped() {
        assert!(tokenize_line(&line("[Table]: Shuffling deck")).is_none());
        assert!(tokenize_line(&line("[Behaviour] Initialized PlayerAPI")).is_none());
    }
}
