// src/stats/calculator.rs
// Folds finalized hands into aggregate statistics for the local player:
// headline counters, per-position breakdowns, opportunity metrics, and the
// 13x13 starting-hand grid

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::parser::hand::{Hand, PlayerHandInfo};
use crate::poker_types::{ActionKind, Position, Rank, SeatId, Street};
use crate::stats::opportunities::{analyze, Opportunities};

pub const GRID_SIZE: usize = 13;

/// Bet-size buckets used by the range grid histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeActionBucket {
    Fold,
    Check,
    Call,
    BetSmall,
    BetHalf,
    BetTwoThird,
    BetPot,
    BetOver,
}

impl RangeActionBucket {
    pub const COUNT: usize = 8;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeActionBucket::Fold => "fold",
            RangeActionBucket::Check => "check",
            RangeActionBucket::Call => "call",
            RangeActionBucket::BetSmall => "bet_small",
            RangeActionBucket::BetHalf => "bet_half",
            RangeActionBucket::BetTwoThird => "bet_two_third",
            RangeActionBucket::BetPot => "bet_pot",
            RangeActionBucket::BetOver => "bet_over",
        }
    }
}

/// Fixed-size histogram over `RangeActionBucket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHistogram([u32; RangeActionBucket::COUNT]);

impl Default for ActionHistogram {
    fn default() -> ActionHistogram {
        ActionHistogram([0; RangeActionBucket::COUNT])
    }
}

impl ActionHistogram {
    pub fn add(&mut self, bucket: RangeActionBucket) {
        self.0[bucket.index()] += 1;
    }

    pub fn count(&self, bucket: RangeActionBucket) -> u32 {
        self.0[bucket.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Opportunity-based metrics tracked alongside the headline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricId {
    Rfi,
    ThreeBet,
    FoldToThreeBet,
    FourBet,
    Squeeze,
    Steal,
    FoldToSteal,
    ThreeBetVsSteal,
    ColdCall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricCounter {
    pub opportunities: u32,
    pub taken: u32,
}

impl MetricCounter {
    fn record(&mut self, opportunity: bool, taken: bool) {
        if opportunity {
            self.opportunities += 1;
            if taken {
                self.taken += 1;
            }
        }
    }

    pub fn rate(&self) -> f64 {
        100.0 * f64::from(self.taken) / f64::from(self.opportunities.max(1))
    }
}

/// Counters for hands played from one position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionStats {
    pub position: Position,
    pub hands: u32,
    pub won: u32,
    pub vpip: u32,
    pub pfr: u32,
    pub three_bet: u32,
    pub three_bet_opp: u32,
    pub fold_to_3bet: u32,
    pub fold_to_3bet_opp: u32,
    pub showdowns: u32,
    pub won_showdowns: u32,
    pub invested: u64,
    pub pot_won: u64,
}

impl PositionStats {
    pub fn vpip_rate(&self) -> f64 {
        ratio(self.vpip, self.hands)
    }
    pub fn pfr_rate(&self) -> f64 {
        ratio(self.pfr, self.hands)
    }
    pub fn three_bet_rate(&self) -> f64 {
        ratio(self.three_bet, self.three_bet_opp)
    }
    pub fn fold_to_3bet_rate(&self) -> f64 {
        ratio(self.fold_to_3bet, self.fold_to_3bet_opp)
    }
    pub fn wsd_rate(&self) -> f64 {
        ratio(self.won_showdowns, self.showdowns)
    }
    pub fn win_rate(&self) -> f64 {
        ratio(self.won, self.hands)
    }
    pub fn profit(&self) -> i64 {
        self.pot_won as i64 - self.invested as i64
    }
}

/// One cell of the 13x13 starting-hand grid. Row and column are rank indices
/// (Two = 0 .. Ace = 12); the upper triangle holds suited combos, the lower
/// triangle offsuit, the diagonal pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRangeCell {
    pub rank_high: Rank,
    pub rank_low: Rank,
    pub suited: bool,
    pub is_pair: bool,
    pub dealt: u32,
    pub won: u32,
    pub actions: ActionHistogram,
    pub by_position: HashMap<Position, HandRangePositionCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandRangePositionCell {
    pub dealt: u32,
    pub won: u32,
    pub actions: ActionHistogram,
}

/// Per starting-hand-class counters, bucketed by overall (pot-fraction) size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandClassStats {
    pub hands: u32,
    pub actions: ActionHistogram,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRangeTable {
    pub cells: Vec<Vec<HandRangeCell>>,
    pub total_actions: ActionHistogram,
    pub by_class: HashMap<String, HandClassStats>,
}

impl Default for HandRangeTable {
    fn default() -> HandRangeTable {
        let mut cells = Vec::with_capacity(GRID_SIZE);
        for i in 0..GRID_SIZE {
            let mut row = Vec::with_capacity(GRID_SIZE);
            for j in 0..GRID_SIZE {
                let low = Rank::from_index(i.min(j)).unwrap_or(Rank::Two);
                let high = Rank::from_index(i.max(j)).unwrap_or(Rank::Two);
                row.push(HandRangeCell {
                    rank_high: high,
                    rank_low: low,
                    suited: i < j,
                    is_pair: i == j,
                    dealt: 0,
                    won: 0,
                    actions: ActionHistogram::default(),
                    by_position: HashMap::new(),
                });
            }
            cells.push(row);
        }
        HandRangeTable {
            cells,
            total_actions: ActionHistogram::default(),
            by_class: HashMap::new(),
        }
    }
}

impl HandRangeTable {
    /// Grid coordinates for a two-card holding: suited combos and pairs land
    /// at (low-rank index, high-rank index), offsuit combos mirror below the
    /// diagonal.
    pub fn cell_coords(ranks: (Rank, Rank), suited: bool) -> (usize, usize) {
        let (a, b) = (ranks.0.index(), ranks.1.index());
        let (row, col) = if a <= b { (a, b) } else { (b, a) };
        if row == col || suited {
            (row, col)
        } else {
            (col, row)
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&HandRangeCell> {
        self.cells.get(row)?.get(col)
    }
}

/// Aggregated statistics for the local player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_hands: u32,
    pub won_hands: u32,
    pub vpip_hands: u32,
    pub pfr_hands: u32,
    pub three_bet_hands: u32,
    pub three_bet_opportunities: u32,
    pub fold_to_3bet_hands: u32,
    pub fold_to_3bet_opportunities: u32,
    pub showdown_hands: u32,
    pub won_showdowns: u32,
    pub total_invested: u64,
    pub total_pot_won: u64,
    pub by_position: HashMap<Position, PositionStats>,
    pub hand_range: HandRangeTable,
    pub metrics: HashMap<MetricId, MetricCounter>,
    /// Net result in big-blind units, summed over hands with a known BB.
    pub bb_units_won: f64,
}

impl Stats {
    pub fn win_rate(&self) -> f64 {
        ratio(self.won_hands, self.total_hands)
    }
    pub fn vpip_rate(&self) -> f64 {
        ratio(self.vpip_hands, self.total_hands)
    }
    pub fn pfr_rate(&self) -> f64 {
        ratio(self.pfr_hands, self.total_hands)
    }
    pub fn three_bet_rate(&self) -> f64 {
        ratio(self.three_bet_hands, self.three_bet_opportunities)
    }
    pub fn fold_to_3bet_rate(&self) -> f64 {
        ratio(self.fold_to_3bet_hands, self.fold_to_3bet_opportunities)
    }
    pub fn wsd_rate(&self) -> f64 {
        ratio(self.won_showdowns, self.showdown_hands)
    }
    pub fn profit(&self) -> i64 {
        self.total_pot_won as i64 - self.total_invested as i64
    }
    /// Big blinds won per 100 hands.
    pub fn bb_per_100(&self) -> f64 {
        100.0 * self.bb_units_won / f64::from(self.total_hands.max(1))
    }
    pub fn metric(&self, id: MetricId) -> MetricCounter {
        self.metrics.get(&id).copied().unwrap_or_default()
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    100.0 * f64::from(numerator) / f64::from(denominator.max(1))
}

/// Computes full statistics from finalized hands for the local player.
/// `local_seat` is the fallback for hands that carry no per-hand local seat.
pub fn calculate(hands: &[Hand], local_seat: SeatId) -> Stats {
    let mut stats = Stats::default();

    for hand in hands {
        if !hand.is_complete || !hand.is_stats_eligible {
            continue;
        }
        let hand_seat = if hand.local_player_seat >= 0 {
            hand.local_player_seat
        } else {
            local_seat
        };
        if hand_seat < 0 {
            continue;
        }
        let Some(info) = hand.players.get(&hand_seat) else {
            continue;
        };

        stats.total_hands += 1;

        let invested = u64::from(info.invested());
        stats.total_invested += invested;
        stats.total_pot_won += u64::from(info.pot_won);

        let opp = analyze(hand, hand_seat);

        if info.won {
            stats.won_hands += 1;
        }
        if info.vpip {
            stats.vpip_hands += 1;
        }
        if info.pfr {
            stats.pfr_hands += 1;
        }
        if opp.three_bet_opportunity {
            stats.three_bet_opportunities += 1;
        }
        if info.three_bet {
            stats.three_bet_hands += 1;
        }
        if opp.fold_to_3bet_opportunity {
            stats.fold_to_3bet_opportunities += 1;
        }
        if info.fold_to_3bet {
            stats.fold_to_3bet_hands += 1;
        }
        if info.showed_down {
            stats.showdown_hands += 1;
            if info.won {
                stats.won_showdowns += 1;
            }
        }

        update_position_stats(&mut stats, info, &opp, invested);
        update_metrics(&mut stats, info, &opp);

        if info.hole_cards.len() == 2 {
            update_hand_range(&mut stats.hand_range, hand, info);
        }

        let bb = hand.bb_amount();
        if bb > 0 {
            let net = i64::from(info.pot_won) - invested as i64;
            stats.bb_units_won += net as f64 / f64::from(bb);
        }
    }

    stats
}

fn update_position_stats(stats: &mut Stats, info: &PlayerHandInfo, opp: &Opportunities, invested: u64) {
    let ps = stats
        .by_position
        .entry(info.position)
        .or_insert_with(|| PositionStats {
            position: info.position,
            ..PositionStats::default()
        });
    ps.hands += 1;
    ps.invested += invested;
    ps.pot_won += u64::from(info.pot_won);
    if info.won {
        ps.won += 1;
    }
    if info.vpip {
        ps.vpip += 1;
    }
    if info.pfr {
        ps.pfr += 1;
    }
    if opp.three_bet_opportunity {
        ps.three_bet_opp += 1;
    }
    if info.three_bet {
        ps.three_bet += 1;
    }
    if opp.fold_to_3bet_opportunity {
        ps.fold_to_3bet_opp += 1;
    }
    if info.fold_to_3bet {
        ps.fold_to_3bet += 1;
    }
    if info.showed_down {
        ps.showdowns += 1;
        if info.won {
            ps.won_showdowns += 1;
        }
    }
}

fn update_metrics(stats: &mut Stats, info: &PlayerHandInfo, opp: &Opportunities) {
    let m = &mut stats.metrics;
    m.entry(MetricId::Rfi)
        .or_default()
        .record(opp.rfi_opportunity, opp.rfi);
    m.entry(MetricId::ThreeBet)
        .or_default()
        .record(opp.three_bet_opportunity, info.three_bet);
    m.entry(MetricId::FoldToThreeBet)
        .or_default()
        .record(opp.fold_to_3bet_opportunity, info.fold_to_3bet);
    m.entry(MetricId::FourBet)
        .or_default()
        .record(opp.four_bet_opportunity, opp.four_bet);
    m.entry(MetricId::Squeeze)
        .or_default()
        .record(opp.squeeze_opportunity, opp.squeeze);
    m.entry(MetricId::Steal)
        .or_default()
        .record(opp.steal_opportunity, opp.steal_opportunity && opp.steal_attempt);
    m.entry(MetricId::FoldToSteal)
        .or_default()
        .record(
            opp.fold_to_steal_opportunity,
            opp.fold_to_steal_opportunity && info.folded_preflop,
        );
    m.entry(MetricId::ThreeBetVsSteal)
        .or_default()
        .record(opp.three_bet_vs_steal_opportunity, opp.three_bet_vs_steal);
    m.entry(MetricId::ColdCall)
        .or_default()
        .record(opp.three_bet_opportunity, opp.cold_call);
}

fn update_hand_range(table: &mut HandRangeTable, hand: &Hand, info: &PlayerHandInfo) {
    let card1 = info.hole_cards[0];
    let card2 = info.hole_cards[1];
    let suited = card1.suit == card2.suit;

    let (row, col) = HandRangeTable::cell_coords((card1.rank, card2.rank), suited);
    let preflop_bucket = preflop_action_summary(hand, info);

    let cell = &mut table.cells[row][col];
    cell.dealt += 1;
    if let Some(bucket) = preflop_bucket {
        cell.actions.add(bucket);
        table.total_actions.add(bucket);
    }
    if info.won {
        cell.won += 1;
    }

    let ppc = cell.by_position.entry(info.position).or_default();
    ppc.dealt += 1;
    if let Some(bucket) = preflop_bucket {
        ppc.actions.add(bucket);
    }
    if info.won {
        ppc.won += 1;
    }

    let overall_bucket = overall_action_summary(hand, info);
    for class in hand_classes(info) {
        let hcs = table.by_class.entry(class.to_string()).or_default();
        hcs.hands += 1;
        if let Some(bucket) = overall_bucket {
            hcs.actions.add(bucket);
        }
    }
}

/// The player's last voluntary pre-flop action, bucketed by BB multiple.
fn preflop_action_summary(hand: &Hand, info: &PlayerHandInfo) -> Option<RangeActionBucket> {
    let last = info
        .actions
        .iter()
        .filter(|a| a.street == Street::PreFlop && !a.kind.is_blind())
        .last();

    let Some(action) = last else {
        // No explicit action survived; fall back on the flags.
        if info.folded_preflop {
            return Some(RangeActionBucket::Fold);
        }
        if info.pfr || info.three_bet {
            return Some(RangeActionBucket::BetHalf);
        }
        if info.vpip {
            return Some(RangeActionBucket::Call);
        }
        return None;
    };

    match action.kind {
        ActionKind::Fold => Some(RangeActionBucket::Fold),
        ActionKind::Check => Some(RangeActionBucket::Check),
        ActionKind::Call => Some(RangeActionBucket::Call),
        ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn => {
            Some(bucket_by_bb_multiple(action.amount, hand.bb_amount()))
        }
        _ => None,
    }
}

/// The player's last voluntary action on any street, bucketed by pot fraction.
fn overall_action_summary(hand: &Hand, info: &PlayerHandInfo) -> Option<RangeActionBucket> {
    let action = info.actions.iter().filter(|a| !a.kind.is_blind()).last()?;
    match action.kind {
        ActionKind::Fold => Some(RangeActionBucket::Fold),
        ActionKind::Check => Some(RangeActionBucket::Check),
        ActionKind::Call => Some(RangeActionBucket::Call),
        ActionKind::Bet | ActionKind::Raise | ActionKind::AllIn => {
            Some(bucket_by_pot_fraction(action.amount, hand.total_pot))
        }
        _ => None,
    }
}

fn bucket_by_bb_multiple(amount: u32, bb: u32) -> RangeActionBucket {
    if amount == 0 {
        return RangeActionBucket::Check;
    }
    let bb = if bb == 0 { 20 } else { bb };
    let multiple = f64::from(amount) / f64::from(bb);
    match multiple {
        m if m <= 2.5 => RangeActionBucket::BetSmall,
        m if m <= 4.0 => RangeActionBucket::BetHalf,
        m if m <= 6.0 => RangeActionBucket::BetTwoThird,
        m if m <= 10.0 => RangeActionBucket::BetPot,
        _ => RangeActionBucket::BetOver,
    }
}

fn bucket_by_pot_fraction(amount: u32, pot: u32) -> RangeActionBucket {
    if amount == 0 {
        return RangeActionBucket::Check;
    }
    if pot == 0 {
        return RangeActionBucket::BetHalf;
    }
    let ratio = f64::from(amount) / f64::from(pot);
    match ratio {
        r if r <= 0.38 => RangeActionBucket::BetSmall,
        r if r <= 0.58 => RangeActionBucket::BetHalf,
        r if r <= 0.78 => RangeActionBucket::BetTwoThird,
        r if r <= 1.15 => RangeActionBucket::BetPot,
        _ => RangeActionBucket::BetOver,
    }
}

/// Coarse starting-hand classes for the class breakdown: pocket pair,
/// suited/offsuit broadway, suited ace, suited connector, with an "other"
/// residual per suitedness when nothing above matches. A non-pair holding
/// can match several classes; no board evaluation is involved.
fn hand_classes(info: &PlayerHandInfo) -> Vec<&'static str> {
    if info.hole_cards.len() != 2 {
        return Vec::new();
    }
    let a = info.hole_cards[0];
    let b = info.hole_cards[1];
    let suited = a.suit == b.suit;
    let (high, low) = if a.rank >= b.rank { (a.rank, b.rank) } else { (b.rank, a.rank) };

    if high == low {
        return vec!["pocket_pair"];
    }

    let mut classes = Vec::new();
    if low >= Rank::Ten {
        classes.push(if suited { "suited_broadway" } else { "offsuit_broadway" });
    }
    if suited {
        if high == Rank::Ace {
            classes.push("suited_ace");
        }
        if high.index() - low.index() == 1 {
            classes.push("suited_connector");
        }
    }
    if classes.is_empty() {
        classes.push(if suited { "other_suited" } else { "other_offsuit" });
    }
    classes
}
