// src/service.rs
// Application service: binds the parser, the hand store and the stats
// calculator behind a single lock, as the GUI/tailer-facing surface

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::RwLock;

use chrono::Utc;
use log::{debug, warn};

use crate::parser::hand::Hand;
use crate::parser::state_machine::HandParser;
use crate::poker_types::{SeatId, NO_SEAT};
use crate::stats::calculator::{calculate, Stats};
use crate::store::{HandFilter, HandStore, ImportCursor, PersistedHand};

/// Everything a UI refresh needs, produced in one locked read.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stats: Stats,
    pub hands: Vec<Hand>,
    pub local_seat: SeatId,
}

struct ServiceState {
    parser: HandParser,
    log_path: String,
    local_seat: SeatId,
}

/// Long-lived application service. The tail thread pushes line batches via
/// `import_lines`, the UI pulls `snapshot`, and hands flow into the store
/// after every ingest.
pub struct Service<S: HandStore> {
    state: RwLock<ServiceState>,
    store: RwLock<S>,
}

impl<S: HandStore> Service<S> {
    pub fn new(store: S) -> Service<S> {
        Service {
            state: RwLock::new(ServiceState {
                parser: HandParser::new(),
                log_path: String::new(),
                local_seat: NO_SEAT,
            }),
            store: RwLock::new(store),
        }
    }

    /// Switches to a different log file: parses it from the start with a
    /// fresh parser (the sticky local seat never carries across files) and
    /// upserts every reconstructed hand.
    pub fn change_log_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_str = path.as_ref().display().to_string();
        let file = File::open(path.as_ref())?;

        let mut parser = HandParser::new();
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line?;
            parser.ingest_line(&line);
        }
        // A hand cut off by the end of the file stays in progress: the tail
        // will continue it.
        debug!(
            "parsed {} with {} finalized hands",
            path_str,
            parser.hands().len()
        );

        self.persist_hands(parser.hands(), &path_str)?;

        let mut state = self.state.write().expect("service state lock");
        state.local_seat = parser.local_seat();
        state.parser = parser;
        state.log_path = path_str;
        Ok(())
    }

    /// Ingests a batch of freshly tailed lines and upserts any hands that
    /// finalized during the batch.
    pub fn import_lines(&self, lines: &[String]) -> anyhow::Result<()> {
        let (path, hands, local_seat) = {
            let mut state = self.state.write().expect("service state lock");
            for line in lines {
                state.parser.ingest_line(line);
            }
            state.local_seat = state.parser.local_seat();
            (
                state.log_path.clone(),
                state.parser.hands().to_vec(),
                state.local_seat,
            )
        };

        self.persist_hands(&hands, &path)?;
        debug!("imported {} lines (local seat {})", lines.len(), local_seat);
        Ok(())
    }

    /// Stats plus the hand list, computed from the store so history from
    /// earlier sessions is included.
    pub fn snapshot(&self) -> anyhow::Result<Snapshot> {
        let local_seat = self.state.read().expect("service state lock").local_seat;

        let filter = HandFilter {
            local_seat: if local_seat >= 0 { Some(local_seat) } else { None },
            only_complete: true,
        };
        let hands = self.store.read().expect("store lock").list_hands(&filter)?;

        for hand in &hands {
            let issues = hand.validation_issues();
            if !issues.is_empty() {
                warn!("hand {} has issues: {}", hand.id, issues.join(", "));
            }
        }

        let stats = calculate(&hands, local_seat);
        Ok(Snapshot {
            stats,
            hands,
            local_seat,
        })
    }

    /// Persists the tail's resume position for the active log file.
    pub fn save_cursor(&self, byte_offset: u64) -> anyhow::Result<()> {
        let path = self.state.read().expect("service state lock").log_path.clone();
        if path.is_empty() {
            return Ok(());
        }
        self.store
            .write()
            .expect("store lock")
            .save_cursor(ImportCursor {
                source_path: path,
                next_byte_offset: byte_offset,
                next_line_number: 0,
                updated_at: Utc::now().naive_utc(),
            })
    }

    pub fn log_path(&self) -> String {
        self.state.read().expect("service state lock").log_path.clone()
    }

    pub fn local_seat(&self) -> SeatId {
        self.state.read().expect("service state lock").local_seat
    }

    fn persist_hands(&self, hands: &[Hand], path: &str) -> anyhow::Result<()> {
        let upserts: Vec<PersistedHand> = hands
            .iter()
            .map(|hand| PersistedHand {
                hand: hand.clone(),
                source_path: path.to_string(),
            })
            .collect();
        if upserts.is_empty() {
            return Ok(());
        }
        self.store
            .write()
            .expect("store lock")
            .upsert_hands(&upserts)?;
        Ok(())
    }
}
