// src/stats/opportunities.rs
// Pre-flop opportunity predicates derived by replaying a finalized hand

use crate::parser::hand::{Hand, PlayerHandInfo};
use crate::poker_types::{ActionKind, PlayerAction, Position, SeatId, Street};

/// Per-player opportunity flags for one finalized hand: whether each
/// situation arose, and whether the player took the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Opportunities {
    pub rfi_opportunity: bool,
    pub rfi: bool,
    pub three_bet_opportunity: bool,
    pub fold_to_3bet_opportunity: bool,
    pub four_bet_opportunity: bool,
    pub four_bet: bool,
    pub squeeze_opportunity: bool,
    pub squeeze: bool,
    pub steal_opportunity: bool,
    pub steal_attempt: bool,
    pub fold_to_steal_opportunity: bool,
    pub three_bet_vs_steal_opportunity: bool,
    pub three_bet_vs_steal: bool,
    pub cold_call: bool,
}

/// One entry of the voluntary pre-flop sequence: blinds excluded, ordered by
/// timestamp with seat id as a stable tiebreak.
#[derive(Debug, Clone, Copy)]
struct SeqAction {
    seat: SeatId,
    action: PlayerAction,
}

/// Derives all opportunity predicates for `seat` in `hand`.
pub fn analyze(hand: &Hand, seat: SeatId) -> Opportunities {
    let Some(info) = hand.players.get(&seat) else {
        return Opportunities::default();
    };
    let seq = preflop_sequence(hand);

    let rfi_opportunity = has_rfi_opportunity(&seq, seat);
    let rfi = rfi_opportunity && first_voluntary_is_aggressive(info);
    let fold_to_3bet_opportunity = has_fold_to_3bet_opportunity(hand, info);
    let four_bet_opportunity = fold_to_3bet_opportunity;
    let squeeze_opportunity = has_squeeze_opportunity(&seq, seat);
    let steal_opportunity = is_steal_position(info.position) && rfi_opportunity;
    let fold_to_steal_opportunity = has_fold_to_steal_opportunity(hand, &seq, info);
    let three_bet_vs_steal_opportunity = has_three_bet_vs_steal_opportunity(hand, &seq, info);

    Opportunities {
        rfi_opportunity,
        rfi,
        three_bet_opportunity: has_three_bet_opportunity(hand, info),
        fold_to_3bet_opportunity,
        four_bet_opportunity,
        four_bet: four_bet_opportunity
            && first_aggression_level(&seq, seat).is_some_and(|level| level >= 3),
        squeeze_opportunity,
        squeeze: squeeze_opportunity && first_voluntary_is_aggressive(info),
        steal_opportunity,
        steal_attempt: first_voluntary_is_aggressive(info),
        fold_to_steal_opportunity,
        three_bet_vs_steal_opportunity,
        three_bet_vs_steal: did_three_bet_vs_steal(hand, &seq, info),
        cold_call: is_cold_call(hand, info),
    }
}

fn preflop_sequence(hand: &Hand) -> Vec<SeqAction> {
    let mut out: Vec<SeqAction> = Vec::new();
    for (seat, info) in &hand.players {
        for action in &info.actions {
            if action.street != Street::PreFlop || action.kind.is_blind() {
                continue;
            }
            out.push(SeqAction {
                seat: *seat,
                action: *action,
            });
        }
    }
    out.sort_by(|a, b| {
        a.action
            .timestamp
            .cmp(&b.action.timestamp)
            .then(a.seat.cmp(&b.seat))
    });
    out
}

fn is_steal_position(pos: Position) -> bool {
    matches!(pos, Position::Co | Position::Btn | Position::Sb)
}

/// No voluntary action happened before this seat's first pre-flop turn.
fn has_rfi_opportunity(seq: &[SeqAction], seat: SeatId) -> bool {
    for sa in seq {
        if sa.seat == seat {
            return true;
        }
        if sa.action.kind == ActionKind::Call || sa.action.kind.is_aggressive() {
            return false;
        }
    }
    false
}

/// The seat's first voluntary pre-flop action is a bet/raise/all-in.
fn first_voluntary_is_aggressive(info: &PlayerHandInfo) -> bool {
    for action in &info.actions {
        if action.street != Street::PreFlop || action.kind.is_blind() {
            continue;
        }
        return action.kind.is_aggressive();
    }
    false
}

fn has_three_bet_opportunity(hand: &Hand, info: &PlayerHandInfo) -> bool {
    if info.three_bet {
        return true;
    }
    for (seat, other) in &hand.players {
        if *seat == info.seat_id {
            continue;
        }
        if other.pfr {
            return info.called_on(Street::PreFlop) || info.folded_preflop;
        }
    }
    false
}

fn has_fold_to_3bet_opportunity(hand: &Hand, info: &PlayerHandInfo) -> bool {
    if info.fold_to_3bet {
        return true;
    }
    if !info.pfr {
        return false;
    }
    hand.players
        .iter()
        .any(|(seat, other)| *seat != info.seat_id && other.three_bet)
}

/// Before this seat's turn: exactly one raise and at least one caller.
fn has_squeeze_opportunity(seq: &[SeqAction], seat: SeatId) -> bool {
    let mut open_seen = false;
    let mut open_calls = 0;
    let mut raise_count = 0;
    for sa in seq {
        if sa.seat == seat {
            return open_seen && open_calls > 0 && raise_count == 1;
        }
        if sa.action.kind.is_aggressive() {
            raise_count += 1;
            if raise_count == 1 {
                open_seen = true;
                continue;
            }
            return false;
        }
        if open_seen && sa.action.kind == ActionKind::Call {
            open_calls += 1;
        }
    }
    false
}

/// 1-indexed ordinal of the seat's first aggressive pre-flop action among
/// all aggressive pre-flop actions.
fn first_aggression_level(seq: &[SeqAction], seat: SeatId) -> Option<u32> {
    let mut level = 0;
    for sa in seq {
        if !sa.action.kind.is_aggressive() {
            continue;
        }
        if sa.seat == seat {
            return Some(level + 1);
        }
        level += 1;
    }
    None
}

/// First pre-flop aggressor, if it came from a steal position with no caller
/// before it.
fn detect_steal_open_seat(hand: &Hand, seq: &[SeqAction]) -> Option<SeatId> {
    for sa in seq {
        if sa.action.kind == ActionKind::Call {
            return None;
        }
        if sa.action.kind.is_aggressive() {
            let info = hand.players.get(&sa.seat)?;
            if is_steal_position(info.position) {
                return Some(sa.seat);
            }
            return None;
        }
    }
    None
}

fn has_fold_to_steal_opportunity(hand: &Hand, seq: &[SeqAction], info: &PlayerHandInfo) -> bool {
    if !matches!(info.position, Position::Sb | Position::Bb) {
        return false;
    }
    let Some(open_seat) = detect_steal_open_seat(hand, seq) else {
        return false;
    };
    if open_seat == info.seat_id {
        return false;
    }
    let mut seen_open = false;
    for sa in seq {
        if sa.seat == open_seat && sa.action.kind.is_aggressive() {
            seen_open = true;
            continue;
        }
        if !seen_open {
            continue;
        }
        if sa.seat == info.seat_id {
            return true;
        }
    }
    false
}

fn has_three_bet_vs_steal_opportunity(
    hand: &Hand,
    seq: &[SeqAction],
    info: &PlayerHandInfo,
) -> bool {
    if !matches!(info.position, Position::Sb | Position::Bb) {
        return false;
    }
    let Some(open_seat) = detect_steal_open_seat(hand, seq) else {
        return false;
    };
    if open_seat == info.seat_id {
        return false;
    }
    let mut seen_open = false;
    for sa in seq {
        if sa.seat == open_seat && sa.action.kind.is_aggressive() {
            seen_open = true;
            continue;
        }
        if !seen_open {
            continue;
        }
        if sa.seat == info.seat_id {
            return true;
        }
        if sa.action.kind.is_aggressive() {
            return false;
        }
    }
    false
}

fn did_three_bet_vs_steal(hand: &Hand, seq: &[SeqAction], info: &PlayerHandInfo) -> bool {
    if !has_three_bet_vs_steal_opportunity(hand, seq, info) {
        return false;
    }
    let Some(open_seat) = detect_steal_open_seat(hand, seq) else {
        return false;
    };
    let mut seen_open = false;
    for sa in seq {
        if sa.seat == open_seat && sa.action.kind.is_aggressive() {
            seen_open = true;
            continue;
        }
        if !seen_open {
            continue;
        }
        if sa.seat == info.seat_id {
            return sa.action.kind.is_aggressive();
        }
        if sa.action.kind.is_aggressive() {
            return false;
        }
    }
    false
}

/// Calling a raise without prior investment beyond a forced blind.
fn is_cold_call(hand: &Hand, info: &PlayerHandInfo) -> bool {
    if info.pfr || info.three_bet || !info.vpip {
        return false;
    }
    match info.position {
        Position::Sb => {
            if !info.called_on(Street::PreFlop) {
                return false;
            }
            let bb = hand.bb_amount();
            if bb == 0 {
                return false;
            }
            info.actions.iter().any(|a| {
                a.street == Street::PreFlop && a.kind == ActionKind::Call && a.amount > bb
            })
        }
        Position::Bb => {
            let other_raised = hand
                .players
                .iter()
                .any(|(seat, other)| *seat != info.seat_id && other.pfr);
            other_raised && info.called_on(Street::PreFlop)
        }
        _ => info.called_on(Street::PreFlop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker_types::NO_SEAT;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 21)
            .unwrap()
            .and_hms_opt(1, 0, secs)
            .unwrap()
    }

    struct HandBuilder {
        hand: Hand,
        clock: u32,
    }

    impl HandBuilder {
        fn new() -> HandBuilder {
            HandBuilder {
                hand: Hand::new(1, ts(0), NO_SEAT),
                clock: 0,
            }
        }

        fn blinds(mut self, sb: SeatId, bb: SeatId, bb_amount: u32) -> Self {
            self.hand.sb_seat = sb;
            self.hand.bb_seat = bb;
            let t = ts(self.clock);
            self.clock += 1;
            self.hand.ensure_player(sb).actions.push(PlayerAction {
                timestamp: t,
                player_id: sb,
                street: Street::PreFlop,
                kind: ActionKind::BlindSb,
                amount: bb_amount / 2,
            });
            let t = ts(self.clock);
            self.clock += 1;
            self.hand.ensure_player(bb).actions.push(PlayerAction {
                timestamp: t,
                player_id: bb,
                street: Street::PreFlop,
                kind: ActionKind::BlindBb,
                amount: bb_amount,
            });
            self
        }

        fn act(mut self, seat: SeatId, kind: ActionKind, amount: u32) -> Self {
            let t = ts(self.clock);
            self.clock += 1;
            let info = self.hand.ensure_player(seat);
            info.actions.push(PlayerAction {
                timestamp: t,
                player_id: seat,
                street: Street::PreFlop,
                kind,
                amount,
            });
            match kind {
                ActionKind::Fold => info.folded_preflop = true,
                ActionKind::Call | ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn => {
                    info.vpip = true
                }
                _ => {}
            }
            self
        }

        fn position(mut self, seat: SeatId, pos: Position) -> Self {
            self.hand.ensure_player(seat).position = pos;
            self
        }

        fn pfr(mut self, seat: SeatId) -> Self {
            let info = self.hand.ensure_player(seat);
            info.pfr = true;
            info.vpip = true;
            self
        }

        fn three_bet(mut self, seat: SeatId) -> Self {
            let info = self.hand.ensure_player(seat);
            info.three_bet = true;
            info.vpip = true;
            self
        }

        fn build(self) -> Hand {
            self.hand
        }
    }

    #[test]
    fn test_rfi_opportunity_first_in() {
        // Folds before the seat do not spoil RFI.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Fold, 0)
            .act(4, ActionKind::Raise, 60)
            .pfr(4)
            .build();
        let opp = analyze(&hand, 4);
        assert!(opp.rfi_opportunity);
        assert!(opp.rfi);
    }

    #[test]
    fn test_no_rfi_after_caller() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Call, 20)
            .act(4, ActionKind::Raise, 60)
            .pfr(4)
            .build();
        let opp = analyze(&hand, 4);
        assert!(!opp.rfi_opportunity);
        assert!(!opp.rfi);
    }

    #[test]
    fn test_three_bet_opportunity_for_caller_and_folder() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(4, ActionKind::Call, 60)
            .act(5, ActionKind::Fold, 0)
            .build();
        assert!(analyze(&hand, 4).three_bet_opportunity);
        assert!(analyze(&hand, 5).three_bet_opportunity);
        // The opener does not 3-bet against themself.
        assert!(!analyze(&hand, 3).three_bet_opportunity);
    }

    #[test]
    fn test_fold_to_3bet_and_four_bet_opportunity() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(4, ActionKind::Raise, 180)
            .three_bet(4)
            .act(3, ActionKind::Fold, 0)
            .build();
        let opp = analyze(&hand, 3);
        assert!(opp.fold_to_3bet_opportunity);
        assert!(opp.four_bet_opportunity);
        assert!(!opp.four_bet);

        // The 3-bettor had no fold-to-3-bet opportunity.
        assert!(!analyze(&hand, 4).fold_to_3bet_opportunity);
    }

    #[test]
    fn test_four_bet_measured_by_first_aggression_ordinal() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(4, ActionKind::Raise, 180)
            .three_bet(4)
            .act(3, ActionKind::Raise, 540)
            .build();
        // The opener's first aggression is ordinal 1, so the 4-bet flag keys
        // off the first aggression only.
        let opp = analyze(&hand, 3);
        assert!(opp.four_bet_opportunity);
        assert!(!opp.four_bet);
    }

    #[test]
    fn test_squeeze_opportunity() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(4, ActionKind::Call, 60)
            .act(5, ActionKind::Raise, 240)
            .build();
        let opp = analyze(&hand, 5);
        assert!(opp.squeeze_opportunity);
        assert!(opp.squeeze);

        // The flat-caller had no squeeze spot: no caller existed yet.
        assert!(!analyze(&hand, 4).squeeze_opportunity);
    }

    #[test]
    fn test_steal_opportunity_by_position() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(5, ActionKind::Raise, 50)
            .pfr(5)
            .position(5, Position::Btn)
            .build();
        let opp = analyze(&hand, 5);
        assert!(opp.steal_opportunity);
        assert!(opp.steal_attempt);

        // Same spot from an early position is not a steal.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(5, ActionKind::Raise, 50)
            .pfr(5)
            .position(5, Position::Utg)
            .build();
        assert!(!analyze(&hand, 5).steal_opportunity);
    }

    #[test]
    fn test_fold_to_steal_and_three_bet_vs_steal() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .position(1, Position::Sb)
            .position(2, Position::Bb)
            .position(5, Position::Btn)
            .act(5, ActionKind::Raise, 50)
            .pfr(5)
            .act(1, ActionKind::Fold, 0)
            .act(2, ActionKind::Raise, 150)
            .three_bet(2)
            .build();

        let sb = analyze(&hand, 1);
        assert!(sb.fold_to_steal_opportunity);
        assert!(sb.three_bet_vs_steal_opportunity);
        assert!(!sb.three_bet_vs_steal);

        let bb = analyze(&hand, 2);
        assert!(bb.fold_to_steal_opportunity);
        assert!(bb.three_bet_vs_steal);

        // The stealer itself gets no fold-to-steal opportunity.
        assert!(!analyze(&hand, 5).fold_to_steal_opportunity);
    }

    #[test]
    fn test_no_steal_open_after_limper() {
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .position(1, Position::Sb)
            .position(2, Position::Bb)
            .position(5, Position::Btn)
            .act(4, ActionKind::Call, 20)
            .act(5, ActionKind::Raise, 50)
            .pfr(5)
            .act(1, ActionKind::Fold, 0)
            .build();
        assert!(!analyze(&hand, 1).fold_to_steal_opportunity);
    }

    #[test]
    fn test_cold_call_variants() {
        // Plain position cold-call.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(4, ActionKind::Call, 60)
            .position(4, Position::Co)
            .build();
        assert!(analyze(&hand, 4).cold_call);

        // SB calling more than the BB counts.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .position(1, Position::Sb)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(1, ActionKind::Call, 60)
            .build();
        assert!(analyze(&hand, 1).cold_call);

        // SB merely completing does not.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .position(1, Position::Sb)
            .act(1, ActionKind::Call, 20)
            .build();
        assert!(!analyze(&hand, 1).cold_call);

        // BB needs an opener elsewhere.
        let hand = HandBuilder::new()
            .blinds(1, 2, 20)
            .position(2, Position::Bb)
            .act(3, ActionKind::Raise, 60)
            .pfr(3)
            .act(2, ActionKind::Call, 60)
            .build();
        assert!(analyze(&hand, 2).cold_call);
    }

    #[test]
    fn test_unknown_seat_yields_defaults() {
        let hand = HandBuilder::new().blinds(1, 2, 20).build();
        assert_eq!(analyze(&hand, 99), Opportunities::default());
    }
}
