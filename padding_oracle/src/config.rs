//! Attack configuration.

use std::env;
use std::thread;

pub const DEFAULT_BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackConfig {
    /// Cipher block size in bytes. Must lie in `1..=255`.
    pub block_size: usize,

    /// Worker pool size. `None` picks one from the machine and the
    /// ciphertext; `Some(1)` recovers blocks sequentially in order.
    pub workers: Option<usize>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            workers: None,
        }
    }
}

impl AttackConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PADDING_ORACLE_BLOCK_SIZE`: block size in bytes (default: 16)
    /// - `PADDING_ORACLE_WORKERS`: worker pool size (default: automatic)
    ///
    /// Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self {
            block_size: env::var("PADDING_ORACLE_BLOCK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BLOCK_SIZE),

            workers: env::var("PADDING_ORACLE_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0),
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Number of workers to use for `blocks` ciphertext blocks. Never more
    /// than there are blocks, never zero.
    pub fn worker_count(&self, blocks: usize) -> usize {
        let wanted = self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        wanted.min(blocks).max(1)
    }
}
