//! Recovery of one ciphertext block, strictly right to left.

use crate::byte::recover_byte;
use crate::error::{AttackError, BlockError, Interrupt};
use crate::events::{display_byte, EventKind, ProgressEvent, ProgressSink};
use crate::oracle::{CancellationToken, OracleClient, PaddingOracle};
use crate::state::{BlockSlot, BlockStatus};

/// The two ciphertext blocks that determine one plaintext block.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockTarget<'a> {
    pub index: usize,
    /// Previous ciphertext block, or the IV for the first block.
    pub prev: &'a [u8],
    pub curr: &'a [u8],
}

/// Fills `slot` for `target`. Stops at the first byte that cannot be
/// recovered: every later position depends on it.
pub(crate) fn recover_into<O: PaddingOracle + ?Sized>(
    client: &mut OracleClient<'_, O>,
    target: &BlockTarget<'_>,
    slot: &mut BlockSlot,
    sink: &dyn ProgressSink,
) -> Result<(), BlockError> {
    let block_size = target.prev.len();
    slot.status = BlockStatus::InProgress;

    for position in (0..block_size).rev() {
        let padding_value = (block_size - position) as u8;
        sink.emit(
            ProgressEvent::new(
                EventKind::ByteStart,
                format!(
                    "Attempting to recover byte {} using padding {}",
                    block_size - position,
                    padding_value
                ),
            )
            .block(target.index)
            .byte(position),
        );

        match recover_byte(client, target, &slot.intermediate, position, padding_value, sink) {
            Ok(found) => {
                slot.intermediate.record(position, found.intermediate);
                slot.plaintext[position] = found.plaintext;

                tracing::debug!(
                    block = target.index,
                    position,
                    intermediate = found.intermediate,
                    plaintext = found.plaintext,
                    "recovered byte"
                );
                sink.emit(
                    ProgressEvent::new(
                        EventKind::Found(found.plaintext),
                        format!(
                            "Found byte {}: '{}'",
                            block_size - position,
                            display_byte(found.plaintext)
                        ),
                    )
                    .block(target.index)
                    .byte(position)
                    .recovered(found.plaintext)
                    .intermediate(found.intermediate),
                );
            }
            Err(err) => {
                slot.status = BlockStatus::Failed;
                if let BlockError::Exhausted { position } = &err {
                    let position = *position;
                    // Another block already failed first and reports for the attack.
                    if !client.claim_failure() {
                        return Err(BlockError::Interrupted(Interrupt::Halted));
                    }
                    tracing::warn!(
                        block = target.index,
                        position,
                        queries = client.queries(),
                        "no candidate accepted by the oracle"
                    );
                    sink.emit(
                        ProgressEvent::new(
                            EventKind::Exhausted,
                            format!("Failed to find byte {}", block_size - position),
                        )
                        .block(target.index)
                        .byte(position),
                    );
                }
                return Err(err);
            }
        }
    }

    slot.status = BlockStatus::Done;
    Ok(())
}

/// Recovers the plaintext of `curr` given the block before it, outside of a
/// full attack. `Ok(None)` means some byte could not be recovered.
pub fn recover_block<O: PaddingOracle + ?Sized>(
    prev: &[u8],
    curr: &[u8],
    oracle: &O,
    sink: &dyn ProgressSink,
) -> Result<Option<Vec<u8>>, AttackError> {
    if prev.len() != curr.len() {
        return Err(AttackError::invalid(format!(
            "blocks differ in length: {} and {}",
            prev.len(),
            curr.len()
        )));
    }
    if !(1..=255).contains(&curr.len()) {
        return Err(AttackError::invalid(format!(
            "block size {} is outside 1..=255",
            curr.len()
        )));
    }

    let target = BlockTarget { index: 0, prev, curr };
    let mut slot = BlockSlot::new(curr.len());
    let mut client = OracleClient::new(
        oracle,
        curr.len(),
        CancellationToken::new(),
        CancellationToken::new(),
    );

    match recover_into(&mut client, &target, &mut slot, sink) {
        Ok(()) => Ok(Some(slot.plaintext)),
        Err(BlockError::Interrupted(Interrupt::Transport(source))) => {
            Err(AttackError::OracleTransport { block: 0, source })
        }
        // The tokens above are never signalled, so only exhaustion remains.
        Err(_) => Ok(None),
    }
}
