//! CBC padding oracle attack.
//!
//! Given a ciphertext, its IV and an oracle that reports whether a
//! candidate ciphertext decrypts to correctly padded plaintext, recovers the
//! plaintext without the key.
//!
//! ```rust,ignore
//! use padding_oracle::{attack, predicate, TracingSink};
//!
//! let oracle = predicate(|candidate: &[u8]| server_accepts(candidate));
//! let outcome = attack(&ciphertext, &iv, &oracle, 16, &TracingSink)?;
//! println!("{:?}", outcome.plaintext());
//! ```
//!
//! Bytes inside a block are recovered strictly right to left. Blocks are
//! independent of each other and are spread over a worker pool; see
//! [`AttackConfig`].

pub mod attack;
pub mod block;
pub mod config;
pub mod error;
pub mod events;
pub mod oracle;
pub mod pkcs7;
pub mod state;

mod byte;

#[cfg(test)]
mod toy;

pub use attack::{attack, AttackCoordinator, AttackOutcome, Recovery};
pub use block::recover_block;
pub use config::{AttackConfig, DEFAULT_BLOCK_SIZE};
pub use error::{AttackError, OracleError};
pub use events::{
    ChannelSink, EventKind, MemorySink, NullSink, ProgressEvent, ProgressSink, TracingSink,
};
pub use oracle::{predicate, CancellationToken, PaddingOracle, Predicate};
pub use state::{BlockSlot, BlockStatus, IntermediateState};
