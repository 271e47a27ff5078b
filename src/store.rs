// src/store.rs
// Persistence collaborator contract plus an in-memory reference store

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::parser::hand::Hand;
use crate::poker_types::SeatId;

/// A finalized hand tagged with the log file it came from. Hand ids are
/// parser-lifetime, so the source path is part of the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedHand {
    pub hand: Hand,
    pub source_path: String,
}

/// Filter for `HandStore::list_hands`.
#[derive(Debug, Clone, Default)]
pub struct HandFilter {
    pub local_seat: Option<SeatId>,
    pub only_complete: bool,
}

/// Resume point for incremental imports of one log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCursor {
    pub source_path: String,
    pub next_byte_offset: u64,
    pub next_line_number: u64,
    pub updated_at: NaiveDateTime,
}

/// Contract the application layer expects from a hand store. The parser
/// never touches the store; the service transfers finalized hands into it
/// after each ingest batch.
pub trait HandStore {
    /// Inserts or updates hands keyed by (source path, hand id). Returns the
    /// number of newly inserted hands.
    fn upsert_hands(&mut self, hands: &[PersistedHand]) -> anyhow::Result<usize>;

    /// Returns hands matching the filter, in (source, id) order.
    fn list_hands(&self, filter: &HandFilter) -> anyhow::Result<Vec<Hand>>;

    /// Records the resume cursor for a source file.
    fn save_cursor(&mut self, cursor: ImportCursor) -> anyhow::Result<()>;
}

/// In-memory store for tests and small sessions; also serializable as JSON
/// so a session can be carried across restarts.
#[derive(Debug, Default)]
pub struct MemoryHandStore {
    hands: BTreeMap<(String, u64), PersistedHand>,
    cursors: BTreeMap<String, ImportCursor>,
}

/// JSON shape of an exported store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    hands: Vec<PersistedHand>,
    cursors: Vec<ImportCursor>,
}

impl MemoryHandStore {
    pub fn new() -> MemoryHandStore {
        MemoryHandStore::default()
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    pub fn cursor(&self, source_path: &str) -> Option<&ImportCursor> {
        self.cursors.get(source_path)
    }

    /// Serializes the whole store to JSON.
    pub fn export_json(&self) -> anyhow::Result<String> {
        let snapshot = StoreSnapshot {
            hands: self.hands.values().cloned().collect(),
            cursors: self.cursors.values().cloned().collect(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Restores a store previously produced by `export_json`.
    pub fn import_json(json: &str) -> anyhow::Result<MemoryHandStore> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;
        let mut store = MemoryHandStore::new();
        for ph in snapshot.hands {
            store.hands.insert((ph.source_path.clone(), ph.hand.id), ph);
        }
        for cursor in snapshot.cursors {
            store.cursors.insert(cursor.source_path.clone(), cursor);
        }
        Ok(store)
    }
}

impl HandStore for MemoryHandStore {
    fn upsert_hands(&mut self, hands: &[PersistedHand]) -> anyhow::Result<usize> {
        let mut inserted = 0;
        for ph in hands {
            let key = (ph.source_path.clone(), ph.hand.id);
            if self.hands.insert(key, ph.clone()).is_none() {
                inserted += 1;
            }
        }
        if inserted > 0 {
            debug!("stored {} new hands ({} total)", inserted, self.hands.len());
        }
        Ok(inserted)
    }

    fn list_hands(&self, filter: &HandFilter) -> anyhow::Result<Vec<Hand>> {
        let mut out = Vec::new();
        for ph in self.hands.values() {
            let hand = &ph.hand;
            if filter.only_complete && !hand.is_complete {
                continue;
            }
            if let Some(seat) = filter.local_seat {
                if hand.local_player_seat != seat {
                    continue;
                }
            }
            out.push(hand.clone());
        }
        Ok(out)
    }

    fn save_cursor(&mut self, cursor: ImportCursor) -> anyhow::Result<()> {
        self.cursors.insert(cursor.source_path.clone(), cursor);
        Ok(())
    }
}
