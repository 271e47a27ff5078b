// src/parser/hand.rs
// Reconstructed hand records: per-seat info, the hand itself, and parse results

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::poker_types::{ActionKind, Card, PlayerAction, Position, SeatId, Street, NO_SEAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    Showdown,
    Fold,
}

/// Everything reconstructed about one seat within one hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerHandInfo {
    pub seat_id: SeatId,
    pub actions: Vec<PlayerAction>,
    /// Two cards iff revealed (or attributed to the local player).
    pub hole_cards: Vec<Card>,
    pub position: Position,
    pub vpip: bool,
    pub pfr: bool,
    pub three_bet: bool,
    pub folded_preflop: bool,
    pub fold_to_3bet: bool,
    pub showed_down: bool,
    pub won: bool,
    pub pot_won: u32,
}

impl PlayerHandInfo {
    pub fn new(seat_id: SeatId) -> PlayerHandInfo {
        PlayerHandInfo {
            seat_id,
            actions: Vec::new(),
            hole_cards: Vec::new(),
            position: Position::Unknown,
            vpip: false,
            pfr: false,
            three_bet: false,
            folded_preflop: false,
            fold_to_3bet: false,
            showed_down: false,
            won: false,
            pot_won: 0,
        }
    }

    /// True if the seat made at least one call on the given street.
    pub fn called_on(&self, street: Street) -> bool {
        self.actions
            .iter()
            .any(|a| a.street == street && a.kind == ActionKind::Call)
    }

    /// Total chips this seat committed across the whole hand.
    pub fn invested(&self) -> u32 {
        self.actions.iter().map(|a| a.amount).sum()
    }
}

/// One reconstructed poker hand. Built incrementally by the parser while it
/// is the "current hand", immutable once finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    pub id: u64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub local_player_seat: SeatId,
    pub sb_seat: SeatId,
    pub bb_seat: SeatId,
    /// Last declared winner. Split pots keep every share in the per-seat
    /// records; see `winners`.
    pub winner_seat: SeatId,
    pub win_type: Option<WinType>,
    pub total_pot: u32,
    pub community_cards: Vec<Card>,
    /// Seats that acted, posted a blind, or were declared a winner, in order
    /// of first appearance.
    pub active_seats: Vec<SeatId>,
    /// BTreeMap keeps snapshots and serialized output deterministic.
    pub players: BTreeMap<SeatId, PlayerHandInfo>,
    pub num_players: usize,
    pub is_complete: bool,
    pub is_stats_eligible: bool,
}

impl Hand {
    pub fn new(id: u64, start_time: NaiveDateTime, local_player_seat: SeatId) -> Hand {
        Hand {
            id,
            start_time,
            end_time: start_time,
            local_player_seat,
            sb_seat: NO_SEAT,
            bb_seat: NO_SEAT,
            winner_seat: NO_SEAT,
            win_type: None,
            total_pot: 0,
            community_cards: Vec::new(),
            active_seats: Vec::new(),
            players: BTreeMap::new(),
            num_players: 0,
            is_complete: false,
            is_stats_eligible: false,
        }
    }

    /// Creates the seat's record if it does not exist yet and tracks it in
    /// the active set.
    pub fn ensure_player(&mut self, seat: SeatId) -> &mut PlayerHandInfo {
        if !self.players.contains_key(&seat) && !self.active_seats.contains(&seat) {
            self.active_seats.push(seat);
        }
        self.players
            .entry(seat)
            .or_insert_with(|| PlayerHandInfo::new(seat))
    }

    /// The amount posted as the big blind, 0 if no BB line was seen.
    pub fn bb_amount(&self) -> u32 {
        if self.bb_seat < 0 {
            return 0;
        }
        let Some(bb) = self.players.get(&self.bb_seat) else {
            return 0;
        };
        bb.actions
            .iter()
            .find(|a| a.kind == ActionKind::BlindBb)
            .map(|a| a.amount)
            .unwrap_or(0)
    }

    /// All seats that won a share of the pot, in seat order.
    pub fn winners(&self) -> Vec<SeatId> {
        self.players
            .values()
            .filter(|p| p.won)
            .map(|p| p.seat_id)
            .collect()
    }

    /// Checks the structural invariants a finalized hand is expected to hold
    /// and returns any violations as issue strings. Never fatal; callers log
    /// or assert on the result.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for seat in &self.active_seats {
            if !self.players.contains_key(seat) {
                issues.push(format!("active_seat_without_record: {}", seat));
            }
        }

        if self.win_type == Some(WinType::Showdown)
            && !matches!(self.community_cards.len(), 3 | 4 | 5)
        {
            issues.push(format!(
                "showdown_with_short_board: {} cards",
                self.community_cards.len()
            ));
        }

        let winner_total: u32 = self.players.values().map(|p| p.pot_won).sum();
        if winner_total != self.total_pot {
            issues.push(format!(
                "pot_mismatch: total {} vs winner shares {}",
                self.total_pot, winner_total
            ));
        }

        for p in self.players.values() {
            if p.pfr && !p.vpip {
                issues.push(format!("pfr_without_vpip: seat {}", p.seat_id));
            }
            if p.three_bet && !p.vpip {
                issues.push(format!("three_bet_without_vpip: seat {}", p.seat_id));
            }
            if p.fold_to_3bet && !p.pfr {
                issues.push(format!("fold_to_3bet_without_pfr: seat {}", p.seat_id));
            }
            if p.won && p.pot_won == 0 {
                issues.push(format!("winner_without_pot: seat {}", p.seat_id));
            }
            if !p.hole_cards.is_empty() && p.hole_cards.len() != 2 {
                issues.push(format!(
                    "invalid_hole_card_count: seat {} has {}",
                    p.seat_id,
                    p.hole_cards.len()
                ));
            }
        }

        issues
    }
}

/// Outcome of parsing a line stream: the sticky local seat, the finalized
/// hands in chronological order, and whether the player is currently inside
/// the poker world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub local_player_seat: SeatId,
    pub hands: Vec<Hand>,
    pub in_poker_world: bool,
}

impl ParseResult {
    pub fn new() -> ParseResult {
        ParseResult {
            local_player_seat: NO_SEAT,
            hands: Vec::new(),
            in_poker_world: false,
        }
    }
}
