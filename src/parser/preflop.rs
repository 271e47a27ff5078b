// src/parser/preflop.rs
// Pre-flop aggression pass: VPIP / PFR / 3-bet / fold-to-3-bet flags

use std::collections::HashMap;

use crate::parser::hand::Hand;
use crate::poker_types::{ActionKind, SeatId};

/// One entry of the dense pre-flop replay buffer the parser keeps while a
/// hand is in progress. Consumed once at finalize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreflopAction {
    pub seat: SeatId,
    pub kind: ActionKind,
    pub amount: u32,
}

/// Replays the pre-flop buffer and sets the aggression flags on each seat.
///
/// The bet level `L` counts committed bet sizes: blinds occupy level 1, a
/// logged BB lifts it to 2, and every voluntary aggressive action adds one.
/// Flags follow the aggression ordinal — the first voluntary raise is the
/// open (PFR), the second is the 3-bet — while `L` and the raiser-at-level
/// map drive fold-to-3-bet detection. Calls are VPIP except the SB
/// completion and the BB closing a raise-free pot.
pub fn apply_preflop_stats(hand: &mut Hand, actions: &[PreflopAction]) {
    if actions.is_empty() {
        return;
    }

    let bb_amount = hand.bb_amount();
    let mut level: u32 = 1;
    let mut aggressions: u32 = 0;
    let mut raiser_at: HashMap<u32, SeatId> = HashMap::new();

    for act in actions {
        let is_sb = act.seat == hand.sb_seat;
        let is_bb = act.seat == hand.bb_seat;
        let Some(info) = hand.players.get_mut(&act.seat) else {
            continue;
        };

        match act.kind {
            ActionKind::BlindSb => {
                level = level.max(1);
            }
            ActionKind::BlindBb => {
                level = level.max(2);
            }
            ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn => {
                level += 1;
                aggressions += 1;
                raiser_at.insert(level, act.seat);
                match aggressions {
                    1 => {
                        info.pfr = true;
                        info.vpip = true;
                    }
                    2 => {
                        info.three_bet = true;
                        info.vpip = true;
                    }
                    _ => info.vpip = true,
                }
            }
            ActionKind::Call => {
                if is_sb && act.amount <= bb_amount && level <= 2 {
                    // SB completing to the BB: forced money, not voluntary.
                } else if is_bb && level <= 2 {
                    // BB closing an unraised pot.
                } else {
                    info.vpip = true;
                }
            }
            ActionKind::Check => {}
            ActionKind::Fold => {
                if level >= 3
                    && raiser_at.get(&(level - 1)) == Some(&act.seat)
                    && info.pfr
                {
                    info.fold_to_3bet = true;
                }
            }
        }
    }
}
