// src/parser/state_machine.rs
// Incremental hand reconstruction: consumes tokenized log events and maintains
// the current hand plus the finalized hand history

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use chrono::NaiveDateTime;

use crate::log_events::{tokenize_line, LogEvent, VRPOKER_WORLD_ID};
use crate::parser::blinds::infer_blinds;
use crate::parser::hand::{Hand, ParseResult, WinType};
use crate::parser::position::assign_positions;
use crate::parser::preflop::{apply_preflop_stats, PreflopAction};
use crate::poker_types::{ActionKind, Card, PlayerAction, SeatId, Street, NO_SEAT};

#[derive(Debug, Clone, Copy)]
struct PendingWin {
    seat: SeatId,
    amount: u32,
}

/// Incremental log parser. Feed it lines in file order; it reconstructs every
/// hand the local player participated in.
///
/// All entry points run to completion without suspension. Callers sharing a
/// parser across threads wrap it in a mutex and hold the lock for each call.
#[derive(Debug)]
pub struct HandParser {
    result: ParseResult,
    current_hand: Option<Hand>,
    hand_id_counter: u64,
    world_id: String,

    current_street: Street,
    /// Highest amount any single seat has committed this street.
    street_bet_amount: u32,
    /// Per-seat committed amount this street.
    street_bets: HashMap<SeatId, u32>,
    folded_this_hand: HashSet<SeatId>,
    pending_winners: Vec<PendingWin>,
    /// Dense time-ordered pre-flop replay buffer, consumed at finalize.
    preflop_actions: Vec<PreflopAction>,
    /// Local hole cards not yet definitively attributed to a seat. Survives a
    /// tentative attachment so a later showdown reveal can correct it.
    pending_local_cards: Option<Vec<Card>>,
    tentative_local_seat: SeatId,
    /// Most recent seat that posted either blind; the local player's own
    /// blind post immediately precedes the "Draw Local Hole Cards" line.
    last_blind_seat: SeatId,
    last_timestamp: Option<NaiveDateTime>,
}

impl Default for HandParser {
    fn default() -> HandParser {
        HandParser::new()
    }
}

impl HandParser {
    pub fn new() -> HandParser {
        HandParser::with_world_id(VRPOKER_WORLD_ID)
    }

    /// Parser keyed to a different world id, for worlds hosting forks of the
    /// table prefab.
    pub fn with_world_id(world_id: &str) -> HandParser {
        HandParser {
            result: ParseResult::new(),
            current_hand: None,
            hand_id_counter: 0,
            world_id: world_id.to_string(),
            current_street: Street::PreFlop,
            street_bet_amount: 0,
            street_bets: HashMap::new(),
            folded_this_hand: HashSet::new(),
            pending_winners: Vec::new(),
            preflop_actions: Vec::new(),
            pending_local_cards: None,
            tentative_local_seat: NO_SEAT,
            last_blind_seat: NO_SEAT,
            last_timestamp: None,
        }
    }

    /// Processes a single log line. Malformed or unrecognized lines are
    /// dropped silently; this never fails.
    pub fn ingest_line(&mut self, line: &str) {
        let Some(tokenized) = tokenize_line(line) else {
            return;
        };
        self.last_timestamp = Some(tokenized.timestamp);
        self.handle_event(tokenized.timestamp, tokenized.event);
    }

    /// Finalizes any in-progress hand. Call at end-of-stream.
    pub fn finish(&mut self) {
        self.finalize_current_hand();
    }

    /// The sticky local seat, NO_SEAT until identified.
    pub fn local_seat(&self) -> SeatId {
        self.result.local_player_seat
    }

    /// Finalized hands in chronological order.
    pub fn hands(&self) -> &[Hand] {
        &self.result.hands
    }

    /// The hand currently in progress, if any.
    pub fn current_hand(&self) -> Option<&Hand> {
        self.current_hand.as_ref()
    }

    pub fn in_poker_world(&self) -> bool {
        self.result.in_poker_world
    }

    /// Snapshot of the full parse result.
    pub fn result(&self) -> ParseResult {
        self.result.clone()
    }

    fn handle_event(&mut self, ts: NaiveDateTime, event: LogEvent) {
        match event {
            LogEvent::WorldJoin { world_id } => {
                let entering_poker = world_id == self.world_id;
                if self.result.in_poker_world && !entering_poker {
                    self.finalize_current_hand();
                }
                self.result.in_poker_world = entering_poker;
            }
            LogEvent::WorldLeave => {
                if self.result.in_poker_world {
                    self.finalize_current_hand();
                }
                self.result.in_poker_world = false;
            }
            LogEvent::NewHand => {
                self.finalize_current_hand();
                self.start_new_hand(ts);
            }
            // Everything below needs a hand in progress.
            _ if self.current_hand.is_none() => {}
            LogEvent::DrawLocalHoleCards { cards } => self.on_draw_local_cards(cards),
            LogEvent::PostSmallBlind { seat, amount } => {
                self.on_blind(ts, seat, amount, ActionKind::BlindSb)
            }
            LogEvent::PostBigBlind { seat, amount } => {
                self.on_blind(ts, seat, amount, ActionKind::BlindBb)
            }
            LogEvent::CommunityCard { card } => self.on_community_card(card),
            LogEvent::StreetBoundary => {
                self.street_bets.clear();
                self.street_bet_amount = 0;
            }
            LogEvent::FoldToOne => self.current_street = Street::Showdown,
            LogEvent::PlayerFolded { seat } => self.on_fold(ts, seat),
            LogEvent::EndTurn { seat, amount } => self.on_end_turn(ts, seat, amount),
            LogEvent::ShowHoleCards { seat, cards } => self.on_show_hole_cards(seat, cards),
            LogEvent::ShowdownWinner { seat, amount } => {
                self.pending_winners.push(PendingWin { seat, amount });
                if let Some(hand) = self.current_hand.as_mut() {
                    if hand.win_type.is_none() {
                        hand.win_type = Some(WinType::Showdown);
                    }
                }
            }
            LogEvent::FoldWinner { seat, amount } => {
                self.pending_winners.push(PendingWin { seat, amount });
                if let Some(hand) = self.current_hand.as_mut() {
                    hand.win_type = Some(WinType::Fold);
                }
            }
        }
    }

    fn on_draw_local_cards(&mut self, cards: Vec<Card>) {
        self.pending_local_cards = Some(cards.clone());
        if self.result.local_player_seat >= 0 {
            // Already identified in a previous hand.
            let seat = self.result.local_player_seat;
            self.attach_local_cards(seat, &cards);
        } else if self.last_blind_seat >= 0 {
            // Best guess: the draw line follows the local player's own blind
            // post. A later reveal overrides this if it disagrees.
            let seat = self.last_blind_seat;
            self.attach_local_cards(seat, &cards);
            self.tentative_local_seat = seat;
        }
        // Neither known: wait for a matching "Show hole cards".
    }

    /// Attaches local hole cards to `seat` and records it as the local seat.
    /// The pending buffer is kept so a showdown reveal can still reassign.
    fn attach_local_cards(&mut self, seat: SeatId, cards: &[Card]) {
        let Some(hand) = self.current_hand.as_mut() else {
            return;
        };
        hand.ensure_player(seat).hole_cards = cards.to_vec();
        hand.local_player_seat = seat;
        self.result.local_player_seat = seat;
    }

    fn on_blind(&mut self, ts: NaiveDateTime, seat: SeatId, amount: u32, kind: ActionKind) {
        let Some(hand) = self.current_hand.as_mut() else {
            return;
        };
        match kind {
            ActionKind::BlindSb => hand.sb_seat = seat,
            _ => hand.bb_seat = seat,
        }
        hand.ensure_player(seat).actions.push(PlayerAction {
            timestamp: ts,
            player_id: seat,
            street: Street::PreFlop,
            kind,
            amount,
        });
        self.street_bets.insert(seat, amount);
        self.street_bet_amount = self.street_bet_amount.max(amount);
        self.preflop_actions.push(PreflopAction { seat, kind, amount });
        self.last_blind_seat = seat;
    }

    fn on_community_card(&mut self, card: Card) {
        let Some(hand) = self.current_hand.as_mut() else {
            return;
        };
        hand.community_cards.push(card);
        match hand.community_cards.len() {
            1..=3 => {
                if self.current_street < Street::Flop {
                    self.current_street = Street::Flop;
                }
            }
            4 => self.current_street = Street::Turn,
            5 => self.current_street = Street::River,
            _ => {}
        }
    }

    fn on_fold(&mut self, ts: NaiveDateTime, seat: SeatId) {
        self.folded_this_hand.insert(seat);
        let street = self.current_street;
        let Some(hand) = self.current_hand.as_mut() else {
            return;
        };
        let info = hand.ensure_player(seat);
        info.actions.push(PlayerAction {
            timestamp: ts,
            player_id: seat,
            street,
            kind: ActionKind::Fold,
            amount: 0,
        });
        if street == Street::PreFlop {
            info.folded_preflop = true;
            self.preflop_actions.push(PreflopAction {
                seat,
                kind: ActionKind::Fold,
                amount: 0,
            });
        }
    }

    fn on_end_turn(&mut self, ts: NaiveDateTime, seat: SeatId, amount: u32) {
        if self.folded_this_hand.contains(&seat) {
            // The table sometimes logs a stale "End Turn" after a fold.
            return;
        }
        let kind = self.classify_action(amount);
        let street = self.current_street;
        let Some(hand) = self.current_hand.as_mut() else {
            return;
        };
        hand.ensure_player(seat).actions.push(PlayerAction {
            timestamp: ts,
            player_id: seat,
            street,
            kind,
            amount,
        });
        self.street_bet_amount = self.street_bet_amount.max(amount);
        self.street_bets.insert(seat, amount);
        if street == Street::PreFlop {
            self.preflop_actions.push(PreflopAction { seat, kind, amount });
        }
    }

    /// Classifies an "End Turn with BET IN = a" line against the current
    /// street state. The committed amount is cumulative for the street.
    fn classify_action(&self, amount: u32) -> ActionKind {
        if amount == 0 {
            return ActionKind::Check;
        }
        if self.street_bet_amount == 0 {
            return ActionKind::Bet;
        }
        if amount > self.street_bet_amount {
            return ActionKind::Raise;
        }
        // Matching the current bet, or all-in for less.
        ActionKind::Call
    }

    fn on_show_hole_cards(&mut self, seat: SeatId, cards: Vec<Card>) {
        if self.current_hand.is_none() {
            return;
        }

        let pending_match = self
            .pending_local_cards
            .as_ref()
            .is_some_and(|pending| cards_match(pending, &cards));
        let tentative = self.tentative_local_seat;

        if let Some(hand) = self.current_hand.as_mut() {
            let info = hand.ensure_player(seat);
            info.showed_down = true;
            if !pending_match && info.hole_cards.is_empty() {
                info.hole_cards = cards.clone();
            }
            if pending_match && tentative >= 0 && tentative != seat {
                // The blind-order guess was wrong; take its cards back.
                if let Some(prev) = hand.players.get_mut(&tentative) {
                    prev.hole_cards.clear();
                }
            }
        }

        if pending_match {
            self.attach_local_cards(seat, &cards);
            self.pending_local_cards = None;
            self.tentative_local_seat = NO_SEAT;
        }
    }

    fn start_new_hand(&mut self, ts: NaiveDateTime) {
        self.hand_id_counter += 1;
        self.current_hand = Some(Hand::new(
            self.hand_id_counter,
            ts,
            self.result.local_player_seat,
        ));
        self.current_street = Street::PreFlop;
        self.street_bets.clear();
        self.street_bet_amount = 0;
        self.folded_this_hand.clear();
        self.pending_winners.clear();
        self.preflop_actions.clear();
        self.pending_local_cards = None;
        self.tentative_local_seat = NO_SEAT;
        self.last_blind_seat = NO_SEAT;
    }

    /// Completes the current hand: resolves winners, infers blinds and
    /// positions, runs the pre-flop pass, and appends the hand to the result
    /// iff the local player participated.
    fn finalize_current_hand(&mut self) {
        if self.current_hand.is_none() {
            return;
        }

        // Local cards that never matched a reveal go to the sticky seat.
        if let Some(cards) = self.pending_local_cards.clone() {
            if self.result.local_player_seat >= 0 {
                let seat = self.result.local_player_seat;
                self.attach_local_cards(seat, &cards);
            }
        }

        let Some(mut hand) = self.current_hand.take() else {
            return;
        };

        let mut total_pot = 0u32;
        for win in &self.pending_winners {
            let info = hand.ensure_player(win.seat);
            info.won = true;
            info.pot_won += win.amount;
            total_pot += win.amount;
            hand.winner_seat = win.seat;
        }
        hand.total_pot = total_pot;

        if hand.win_type.is_none() {
            hand.win_type = if hand.community_cards.len() >= 3 {
                Some(WinType::Showdown)
            } else {
                Some(WinType::Fold)
            };
        }

        hand.num_players = hand.active_seats.len();

        infer_blinds(&mut hand, &self.preflop_actions);
        assign_positions(&mut hand);
        apply_preflop_stats(&mut hand, &self.preflop_actions);

        hand.end_time = self.last_timestamp.unwrap_or(hand.start_time);
        hand.is_complete = !self.pending_winners.is_empty() || !hand.community_cards.is_empty();
        hand.is_stats_eligible = hand.is_complete && hand.num_players >= 2;

        let local = hand.local_player_seat;
        if local >= 0 && hand.players.contains_key(&local) {
            self.result.hands.push(hand);
        }

        self.pending_winners.clear();
        self.preflop_actions.clear();
        self.pending_local_cards = None;
        self.tentative_local_seat = NO_SEAT;
        self.folded_this_hand.clear();
    }
}

/// Order-insensitive comparison of two hole-card pairs.
fn cards_match(a: &[Card], b: &[Card]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|card| b.contains(card))
}

/// Parses an entire reader with a fresh parser and finalizes. Fails only if
/// the underlying reader fails; malformed content never errors.
pub fn parse_reader<R: BufRead>(reader: R) -> anyhow::Result<ParseResult> {
    let mut parser = HandParser::new();
    for line in reader.lines() {
        let line = line?;
        parser.ingest_line(&line);
    }
    parser.finish();
    Ok(parser.result())
}
