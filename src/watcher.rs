// src/watcher.rs
// Contract for the log-tailing collaborator that feeds the parser

/// What a tail implementation emits: ordered line batches, or an error the
/// application surfaces on its status bar. Lines arrive in file order with
/// no gaps and no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub enum TailEvent {
    Lines(Vec<String>),
    Error(String),
}

/// Contract for a file tailer. The concrete implementation (filesystem
/// watcher, polling reader) lives in the application layer; the core only
/// relies on the delivery guarantees documented on `TailEvent`.
pub trait LogTail {
    /// Begins delivery. Events produced before `start` are discarded.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stops delivery. Idempotent.
    fn stop(&mut self);

    /// Repositions the tail to an absolute byte offset, typically restored
    /// from a persisted `ImportCursor`.
    fn set_offset(&mut self, byte_offset: u64);
}

/// Scripted tail used in tests: replays a fixed event sequence on demand.
#[derive(Debug, Default)]
pub struct ScriptedTail {
    events: Vec<TailEvent>,
    offset: u64,
    running: bool,
    next: usize,
}

impl ScriptedTail {
    pub fn new(events: Vec<TailEvent>) -> ScriptedTail {
        ScriptedTail {
            events,
            offset: 0,
            running: false,
            next: 0,
        }
    }

    /// Emits the next scripted event, or None when drained or stopped.
    pub fn poll(&mut self) -> Option<TailEvent> {
        if !self.running {
            return None;
        }
        let event = self.events.get(self.next).cloned()?;
        self.next += 1;
        Some(event)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl LogTail for ScriptedTail {
    fn start(&mut self) -> anyhow::Result<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn set_offset(&mut self, byte_offset: u64) {
        self.offset = byte_offset;
    }
}
