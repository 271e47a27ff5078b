// src/parser/blinds.rs
// Recovers missing SB/BB seats when the log dropped one or both blind lines

use crate::parser::hand::Hand;
use crate::parser::preflop::PreflopAction;

/// Fills in missing blind seats on `hand`.
///
/// With one blind known, the other is its neighbor in the seat-sorted active
/// set (SB precedes BB). With neither known, the first voluntary pre-flop
/// actor is taken as UTG: BB sits one before it, SB two before it, modulo
/// the table size. Returns true if anything was inferred.
pub fn infer_blinds(hand: &mut Hand, preflop_actions: &[PreflopAction]) -> bool {
    if hand.sb_seat >= 0 && hand.bb_seat >= 0 {
        return false;
    }

    let mut seats = hand.active_seats.clone();
    seats.sort_unstable();
    let n = seats.len();
    if n < 2 {
        return false;
    }

    if hand.sb_seat >= 0 && hand.bb_seat < 0 {
        if let Some(idx) = seats.iter().position(|&s| s == hand.sb_seat) {
            hand.bb_seat = seats[(idx + 1) % n];
            return true;
        }
        return false;
    }
    if hand.bb_seat >= 0 && hand.sb_seat < 0 {
        if let Some(idx) = seats.iter().position(|&s| s == hand.bb_seat) {
            hand.sb_seat = seats[(idx + n - 1) % n];
            return true;
        }
        return false;
    }

    // Neither blind logged: locate the first voluntary actor.
    let first_seat = preflop_actions
        .iter()
        .find(|a| !a.kind.is_blind())
        .map(|a| a.seat);
    let Some(first_seat) = first_seat else {
        return false;
    };
    let Some(idx) = seats.iter().position(|&s| s == first_seat) else {
        return false;
    };

    hand.bb_seat = seats[(idx + n - 1) % n];
    hand.sb_seat = seats[(idx + n - 2) % n];
    true
}
