//! Recovery of a single plaintext byte.
//!
//! For position `p` with assumed padding value `v = block_size - p` the
//! candidate ciphertext is `T || C` where `T` starts as the real previous
//! block. Every solved position `j > p` is forced to `I[j] ^ v` so its
//! decryption reads as `v`. Position `p` is then swept through
//! `prev[p] ^ c` for `c` in `0..=255` until the oracle accepts. An accepted
//! `c` means `I[p] ^ T[p] == v`, which gives `I[p] = T[p] ^ v` and
//! `P[p] = c ^ v`.
//!
//! For `v >= 2` the first accepted candidate is taken as is. This relies on
//! the oracle checking the whole padding run: with the trailing bytes pinned
//! to `v`, only one value of `T[p]` yields valid padding. An oracle that
//! inspects less than the full run can mislead this step and is not guarded
//! against.
//!
//! For `v == 1` an acceptance is ambiguous. The decryption may end in a
//! single `01`, or the real bytes left of `p` may happen to complete a longer
//! padding such as `02 02`. The two are told apart by flipping a bit in the
//! undetermined byte at `p - 1` and asking again. A genuine `01` does not
//! care about that byte; a longer padding does, and the oracle stops
//! accepting. Those false positives are skipped.

use crate::block::BlockTarget;
use crate::error::BlockError;
use crate::events::{EventKind, ProgressEvent, ProgressSink};
use crate::oracle::{OracleClient, PaddingOracle};
use crate::state::IntermediateState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecoveredByte {
    pub intermediate: u8,
    pub plaintext: u8,
}

pub(crate) fn recover_byte<O: PaddingOracle + ?Sized>(
    client: &mut OracleClient<'_, O>,
    target: &BlockTarget<'_>,
    known: &IntermediateState,
    position: usize,
    padding_value: u8,
    sink: &dyn ProgressSink,
) -> Result<RecoveredByte, BlockError> {
    let block_size = target.prev.len();
    debug_assert_eq!(known.first_solved(), position + 1);
    debug_assert_eq!(padding_value as usize, block_size - position);

    let mut candidate_block = Vec::with_capacity(2 * block_size);
    candidate_block.extend_from_slice(target.prev);
    for (offset, intermediate) in known.solved().iter().enumerate() {
        candidate_block[position + 1 + offset] = intermediate ^ padding_value;
    }
    candidate_block.extend_from_slice(target.curr);

    for candidate in 0..=255u8 {
        sink.emit(
            ProgressEvent::new(
                EventKind::Testing(candidate),
                format!("Testing value {:02x}", candidate),
            )
            .block(target.index)
            .byte(position)
            .progress(candidate as f32 / 256.0 * 100.0),
        );

        candidate_block[position] = target.prev[position] ^ candidate;
        if !client.query(&candidate_block)? {
            continue;
        }

        if padding_value == 1 && position > 0 {
            candidate_block[position - 1] ^= 0x01;
            let still_valid = client.query(&candidate_block)?;
            candidate_block[position - 1] ^= 0x01;

            if !still_valid {
                tracing::debug!(
                    block = target.index,
                    position,
                    candidate,
                    "discarding acceptance that depends on an earlier byte"
                );
                continue;
            }
        }

        let intermediate = candidate_block[position] ^ padding_value;
        return Ok(RecoveredByte {
            intermediate,
            plaintext: intermediate ^ target.prev[position],
        });
    }

    Err(BlockError::Exhausted { position })
}
