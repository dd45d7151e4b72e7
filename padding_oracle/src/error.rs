//! Error types for the padding oracle engine

use thiserror::Error;

/// Failure raised by an oracle implementation.
///
/// Anything that stops the oracle from giving a yes/no answer belongs here.
/// The engine never retries these; a caller that wants backoff builds it into
/// its own oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle transport failed: {0}")]
    Transport(String),

    #[error("candidate has wrong length: expected {expected}, got {actual}")]
    Rejected { expected: usize, actual: usize },
}

impl OracleError {
    pub fn transport(message: impl Into<String>) -> Self {
        OracleError::Transport(message.into())
    }
}

/// Conditions that end an attack outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttackError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("oracle failed while recovering block {block}: {source}")]
    OracleTransport {
        block: usize,
        #[source]
        source: OracleError,
    },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl AttackError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AttackError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Why a single oracle query did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Interrupt {
    /// The caller asked the attack to stop.
    Cancelled,
    /// Another block failed; the attack result is already decided.
    Halted,
    Transport(OracleError),
}

/// Why a block could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockError {
    Exhausted { position: usize },
    Interrupted(Interrupt),
}

impl From<Interrupt> for BlockError {
    fn from(interrupt: Interrupt) -> Self {
        BlockError::Interrupted(interrupt)
    }
}
