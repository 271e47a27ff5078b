// src/lib.rs
// Hand reconstruction and statistics for VRChat VRPoker world logs.
//
// The pipeline: `log_events` tokenizes raw log lines, `parser` folds the
// event stream into finalized hands around the local player, and `stats`
// aggregates those hands into session statistics. `store` and `watcher`
// define the persistence and tailing collaborator contracts; `service` binds
// everything behind one lock for the surrounding application.

pub mod log_events;
pub mod parser;
pub mod poker_types;
pub mod service;
pub mod stats;
pub mod store;
pub mod watcher;

pub use log_events::{tokenize_line, LogEvent, TokenizedLine};
pub use parser::{parse_reader, Hand, HandParser, ParseResult, PlayerHandInfo, WinType};
pub use poker_types::{ActionKind, Card, PlayerAction, Position, Rank, SeatId, Street, Suit, NO_SEAT};
pub use service::{Service, Snapshot};
pub use stats::{calculate, Stats};
pub use store::{HandFilter, HandStore, ImportCursor, MemoryHandStore, PersistedHand};
pub use watcher::{LogTail, TailEvent};
