//! The oracle seam.
//!
//! An oracle answers one question: does `prev || curr` decrypt to a
//! correctly padded plaintext? It must answer identically for identical
//! candidates during one attack. An oracle that re-randomises anything per
//! call (a fresh IV, say) breaks the attack and the engine cannot notice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Interrupt, OracleError};

pub trait PaddingOracle: Sync {
    /// `candidate` is always exactly two blocks long.
    fn query(&self, candidate: &[u8]) -> Result<bool, OracleError>;
}

impl<F> PaddingOracle for F
where
    F: Fn(&[u8]) -> Result<bool, OracleError> + Sync,
{
    fn query(&self, candidate: &[u8]) -> Result<bool, OracleError> {
        self(candidate)
    }
}

/// Adapts a plain boolean predicate that cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct Predicate<F>(pub F);

impl<F> PaddingOracle for Predicate<F>
where
    F: Fn(&[u8]) -> bool + Sync,
{
    fn query(&self, candidate: &[u8]) -> Result<bool, OracleError> {
        Ok((self.0)(candidate))
    }
}

pub fn predicate<F>(f: F) -> Predicate<F>
where
    F: Fn(&[u8]) -> bool + Sync,
{
    Predicate(f)
}

/// Shared stop flag. Cloning hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sets the flag and reports whether this call was the one that set it.
    pub(crate) fn try_claim(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }
}

/// Per-block view of the oracle. Polls the stop signals before every query
/// and counts how many queries the block has spent.
pub(crate) struct OracleClient<'a, O: PaddingOracle + ?Sized> {
    oracle: &'a O,
    block_size: usize,
    cancel: CancellationToken,
    halt: CancellationToken,
    queries: u64,
}

impl<'a, O: PaddingOracle + ?Sized> OracleClient<'a, O> {
    pub(crate) fn new(
        oracle: &'a O,
        block_size: usize,
        cancel: CancellationToken,
        halt: CancellationToken,
    ) -> Self {
        OracleClient {
            oracle,
            block_size,
            cancel,
            halt,
            queries: 0,
        }
    }

    /// A pending stop request, if any. Caller cancellation wins over halting.
    pub(crate) fn interrupted(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            Some(Interrupt::Cancelled)
        } else if self.halt.is_cancelled() {
            Some(Interrupt::Halted)
        } else {
            None
        }
    }

    pub(crate) fn query(&mut self, candidate: &[u8]) -> Result<bool, Interrupt> {
        if let Some(interrupt) = self.interrupted() {
            return Err(interrupt);
        }
        debug_assert_eq!(candidate.len(), 2 * self.block_size);

        self.queries += 1;
        self.oracle.query(candidate).map_err(Interrupt::Transport)
    }

    pub(crate) fn queries(&self) -> u64 {
        self.queries
    }

    /// Raises the halt flag for every block sharing it. Only the first block
    /// to fail gets `true` and reports the failure.
    pub(crate) fn claim_failure(&self) -> bool {
        self.halt.try_claim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_closure_oracle() {
        let oracle = |candidate: &[u8]| -> Result<bool, OracleError> { Ok(candidate[0] == 1) };
        assert_eq!(oracle.query(&[1, 0]), Ok(true));
        assert_eq!(oracle.query(&[0, 0]), Ok(false));
    }

    #[test]
    fn test_client_counts_queries() {
        let oracle = predicate(|_: &[u8]| true);
        let mut client = OracleClient::new(&oracle, 2, CancellationToken::new(), CancellationToken::new());
        for _ in 0..5 {
            assert_eq!(client.query(&[0; 4]), Ok(true));
        }
        assert_eq!(client.queries(), 5);
    }

    #[test]
    fn test_client_stops_before_calling_oracle() {
        let calls = AtomicUsize::new(0);
        let oracle = predicate(|_: &[u8]| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        });
        let cancel = CancellationToken::new();
        let halt = CancellationToken::new();
        let mut client = OracleClient::new(&oracle, 1, cancel.clone(), halt.clone());

        halt.cancel();
        assert_eq!(client.query(&[0, 0]), Err(Interrupt::Halted));
        cancel.cancel();
        assert_eq!(client.query(&[0, 0]), Err(Interrupt::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.queries(), 0);
    }

    #[test]
    fn test_client_surfaces_transport_errors() {
        let oracle = |_: &[u8]| -> Result<bool, OracleError> { Err(OracleError::transport("connection reset")) };
        let mut client = OracleClient::new(&oracle, 1, CancellationToken::new(), CancellationToken::new());
        assert_eq!(
            client.query(&[0, 0]),
            Err(Interrupt::Transport(OracleError::transport("connection reset")))
        );
    }

    #[test]
    fn test_only_first_failure_is_claimed() {
        let halt = CancellationToken::new();
        let oracle = predicate(|_: &[u8]| false);
        let first = OracleClient::new(&oracle, 1, CancellationToken::new(), halt.clone());
        let second = OracleClient::new(&oracle, 1, CancellationToken::new(), halt.clone());

        assert!(first.claim_failure());
        assert!(!second.claim_failure());
        assert!(!first.claim_failure());
        assert!(halt.is_cancelled());
    }
}
