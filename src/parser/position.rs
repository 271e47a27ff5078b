// src/parser/position.rs
// Table-position assignment: rotate the active set so SB leads, then label by table size

use crate::parser::hand::Hand;
use crate::poker_types::Position;

/// Position labels for `n` seated players, in seat order starting from SB.
/// Heads-up the small blind is the button and acts first pre-flop.
pub fn position_order(n: usize) -> Vec<Position> {
    use Position::*;
    match n {
        2 => vec![Sb, Btn],
        3 => vec![Sb, Bb, Btn],
        4 => vec![Sb, Bb, Utg, Btn],
        5 => vec![Sb, Bb, Utg, Mp, Btn],
        6 => vec![Sb, Bb, Utg, Hj, Co, Btn],
        7 => vec![Sb, Bb, Utg, Utg1, Hj, Co, Btn],
        8 => vec![Sb, Bb, Utg, Utg1, Mp, Hj, Co, Btn],
        n => {
            // Oversized tables: pin the anchor positions, leave the interior unknown.
            let mut order = vec![Unknown; n];
            if n > 0 {
                order[0] = Sb;
            }
            if n > 1 {
                order[1] = Bb;
            }
            if n > 2 {
                order[n - 1] = Btn;
            }
            if n > 3 {
                order[n - 2] = Co;
            }
            if n > 4 {
                order[n - 3] = Mp;
            }
            order
        }
    }
}

/// Assigns a position to every seated player. Requires both blinds to be
/// known (directly or inferred); otherwise positions stay unknown.
pub fn assign_positions(hand: &mut Hand) {
    if hand.sb_seat < 0 || hand.bb_seat < 0 {
        return;
    }

    let mut seats = hand.active_seats.clone();
    seats.sort_unstable();

    let Some(sb_idx) = seats.iter().position(|&s| s == hand.sb_seat) else {
        return;
    };

    seats.rotate_left(sb_idx);
    let order = position_order(seats.len());

    for (i, seat) in seats.iter().enumerate() {
        if let Some(info) = hand.players.get_mut(seat) {
            if let Some(&pos) = order.get(i) {
                info.position = pos;
            }
        }
    }
}
