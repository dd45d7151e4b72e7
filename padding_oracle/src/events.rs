//! Progress events emitted while an attack runs.
//!
//! Events are purely observational: nothing a sink does can change the
//! course of an attack. Sinks are shared between worker threads, so every
//! implementation must tolerate concurrent `emit` calls.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    BlockStart,
    ByteStart,
    /// A candidate value is about to be sent to the oracle.
    Testing(u8),
    /// A plaintext byte was recovered.
    Found(u8),
    /// All 256 candidates were rejected at `byte_index`.
    Exhausted,
    BlockComplete,
    BlockFailed,
    AttackComplete,
    /// Recovery succeeded but the trailing padding was malformed.
    PaddingError,
    Cancelled,
}

impl EventKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::BlockStart => "block_start",
            EventKind::ByteStart => "byte_start",
            EventKind::Testing(_) => "testing",
            EventKind::Found(_) => "found",
            EventKind::Exhausted => "exhausted",
            EventKind::BlockComplete => "block_complete",
            EventKind::BlockFailed => "block_failed",
            EventKind::AttackComplete => "complete",
            EventKind::PaddingError => "padding_error",
            EventKind::Cancelled => "cancelled",
        }
    }
}

/// One progress report. `block_index` counts ciphertext blocks from zero
/// (the IV is not a block); `byte_index` is the position inside the block.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub block_index: Option<usize>,
    pub byte_index: Option<usize>,
    pub recovered_byte: Option<u8>,
    pub intermediate_byte: Option<u8>,
    pub kind: EventKind,
    pub message: String,
    /// Percentage in `[0, 100]` where one makes sense.
    pub progress: Option<f32>,
}

impl ProgressEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        ProgressEvent {
            block_index: None,
            byte_index: None,
            recovered_byte: None,
            intermediate_byte: None,
            kind,
            message: message.into(),
            progress: None,
        }
    }

    pub fn block(mut self, index: usize) -> Self {
        self.block_index = Some(index);
        self
    }

    pub fn byte(mut self, index: usize) -> Self {
        self.byte_index = Some(index);
        self
    }

    pub fn recovered(mut self, value: u8) -> Self {
        self.recovered_byte = Some(value);
        self
    }

    pub fn intermediate(mut self, value: u8) -> Self {
        self.intermediate_byte = Some(value);
        self
    }

    pub fn progress(mut self, percent: f32) -> Self {
        self.progress = Some(percent);
        self
    }
}

/// Printable form of a recovered byte for messages.
pub(crate) fn display_byte(b: u8) -> char {
    if (32..=126).contains(&b) {
        b as char
    } else {
        '?'
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events to `tracing`. Per-candidate `Testing` events are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        match event.kind {
            EventKind::Testing(_) => {}
            EventKind::Exhausted | EventKind::BlockFailed | EventKind::PaddingError => {
                tracing::warn!(
                    block = ?event.block_index,
                    position = ?event.byte_index,
                    status = event.kind.tag(),
                    "{}",
                    event.message
                );
            }
            EventKind::BlockStart
            | EventKind::BlockComplete
            | EventKind::AttackComplete
            | EventKind::Cancelled => {
                tracing::info!(
                    block = ?event.block_index,
                    status = event.kind.tag(),
                    "{}",
                    event.message
                );
            }
            EventKind::ByteStart | EventKind::Found(_) => {
                tracing::debug!(
                    block = ?event.block_index,
                    position = ?event.byte_index,
                    status = event.kind.tag(),
                    "{}",
                    event.message
                );
            }
        }
    }
}

/// Sends events down a channel. Once the receiver is gone events are dropped.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        ChannelSink { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Keeps every event in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn take(&self) -> Vec<ProgressEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
