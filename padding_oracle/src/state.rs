//! Per-block attack state.
//!
//! Each block owns one `BlockSlot`. The slot is created when the coordinator
//! starts the block, handed to exactly one worker, and read back only after
//! that worker returns it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

/// Decryption output of one block before the CBC XOR.
///
/// Bytes are solved right to left, so the solved region is always a suffix.
/// `get(i)` is `Some` exactly when position `i` has been solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateState {
    bytes: Vec<u8>,
    solved_from: usize,
}

impl IntermediateState {
    pub fn new(block_size: usize) -> Self {
        IntermediateState {
            bytes: vec![0; block_size],
            solved_from: block_size,
        }
    }

    pub fn get(&self, position: usize) -> Option<u8> {
        if position >= self.solved_from {
            self.bytes.get(position).copied()
        } else {
            None
        }
    }

    /// The solved suffix, starting at `first_solved()`.
    pub fn solved(&self) -> &[u8] {
        &self.bytes[self.solved_from..]
    }

    pub fn first_solved(&self) -> usize {
        self.solved_from
    }

    pub fn is_complete(&self) -> bool {
        self.solved_from == 0
    }

    /// Solved bytes are never revisited, so only the position directly left
    /// of the solved suffix may be recorded.
    pub(crate) fn record(&mut self, position: usize, value: u8) {
        assert_eq!(
            position + 1,
            self.solved_from,
            "intermediate bytes must be solved right to left"
        );
        self.bytes[position] = value;
        self.solved_from = position;
    }
}

#[derive(Debug, Clone)]
pub struct BlockSlot {
    pub status: BlockStatus,
    pub intermediate: IntermediateState,
    pub plaintext: Vec<u8>,
}

impl BlockSlot {
    pub fn new(block_size: usize) -> Self {
        BlockSlot {
            status: BlockStatus::Pending,
            intermediate: IntermediateState::new(block_size),
            plaintext: vec![0; block_size],
        }
    }
}
