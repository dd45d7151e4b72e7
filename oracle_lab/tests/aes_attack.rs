use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::channel;

use oracle_lab::CbcTarget;
use padding_oracle::{
    attack, AttackConfig, AttackCoordinator, AttackError, AttackOutcome, ChannelSink, EventKind,
    MemorySink, NullSink, OracleError, PaddingOracle,
};

const BLOCK_SIZE: usize = 16;

fn target() -> CbcTarget {
    CbcTarget::new(*b"YELLOW SUBMARINE", *b"an IV of 16 byte")
}

fn with_workers(workers: usize) -> AttackCoordinator {
    AttackCoordinator::new(AttackConfig::default().with_workers(workers))
}

#[test]
fn recovers_yellow_submarine() {
    let target = CbcTarget::random();
    let ciphertext = target.encrypt(b"YELLOW SUBMARINE").unwrap();
    assert_eq!(ciphertext.len(), 2 * BLOCK_SIZE);

    let outcome = attack(&ciphertext, target.iv(), &target, BLOCK_SIZE, &NullSink).unwrap();
    assert_eq!(outcome.into_plaintext().as_deref(), Some(&b"YELLOW SUBMARINE"[..]));
}

#[test]
fn round_trips_boundary_lengths() {
    let target = target();
    let text: Vec<u8> = b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(5 * BLOCK_SIZE)
        .copied()
        .collect();

    for &len in &[0, 1, BLOCK_SIZE - 1, BLOCK_SIZE, BLOCK_SIZE + 1, 5 * BLOCK_SIZE] {
        let ciphertext = target.encrypt(&text[..len]).unwrap();
        let outcome = with_workers(4)
            .attack(&ciphertext, target.iv(), &target, &NullSink)
            .unwrap();
        assert_eq!(outcome.plaintext(), Some(&text[..len]), "plaintext length {}", len);
    }
}

#[test]
fn worker_count_does_not_change_result() {
    let target = target();
    let ciphertext = target
        .encrypt(b"MDAwMDAxV2l0aCB0aGUgYmFzcyBraWNrZWQgaW4gYW5kIHRoZSBWZWdhJ3MgYXJlIHB1bXBpbic=")
        .unwrap();

    let one = with_workers(1).attack(&ciphertext, target.iv(), &target, &NullSink).unwrap();
    let eight = with_workers(8).attack(&ciphertext, target.iv(), &target, &NullSink).unwrap();
    assert!(one.plaintext().is_some());
    assert_eq!(one, eight);
}

#[test]
fn identical_runs_emit_identical_events() {
    let target = target();
    let ciphertext = target.encrypt(b"same input, same story").unwrap();

    let first = MemorySink::new();
    let second = MemorySink::new();
    let a = with_workers(1).attack(&ciphertext, target.iv(), &target, &first).unwrap();
    let b = with_workers(1).attack(&ciphertext, target.iv(), &target, &second).unwrap();

    assert_eq!(a, b);
    assert!(!first.events().is_empty());
    assert_eq!(first.events(), second.events());
}

#[test]
fn oracle_calls_stay_within_bound() {
    let target = target();
    let ciphertext = target.encrypt(b"counting every single oracle query").unwrap();
    let blocks = (ciphertext.len() / BLOCK_SIZE) as u64;

    let calls = AtomicU64::new(0);
    let oracle = |candidate: &[u8]| {
        calls.fetch_add(1, Ordering::SeqCst);
        target.query(candidate)
    };
    let outcome = with_workers(2).attack(&ciphertext, target.iv(), &oracle, &NullSink).unwrap();

    let calls = calls.load(Ordering::SeqCst);
    assert!(calls <= blocks * BLOCK_SIZE as u64 * 257);
    match outcome {
        AttackOutcome::Recovered(recovery) => assert_eq!(recovery.oracle_queries, calls),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn rejecting_oracle_fails_without_panicking() {
    let target = target();
    let ciphertext = target.encrypt(b"nobody will ever read this text").unwrap();
    let sink = MemorySink::new();
    let never = |_: &[u8]| -> Result<bool, OracleError> { Ok(false) };

    let outcome = with_workers(1).attack(&ciphertext, target.iv(), &never, &sink).unwrap();
    assert_eq!(outcome, AttackOutcome::Failed);

    let exhausted: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|e| e.kind == EventKind::Exhausted)
        .collect();
    assert_eq!(exhausted.len(), 1);
    assert_eq!(exhausted[0].byte_index, Some(BLOCK_SIZE - 1));
    assert_eq!(exhausted[0].block_index, Some(0));
}

#[test]
fn transport_failure_aborts_attack() {
    let target = target();
    let ciphertext = target.encrypt(b"four blocks of text: one, two, three and four").unwrap();
    let calls = AtomicU64::new(0);
    let flaky = |candidate: &[u8]| {
        if calls.fetch_add(1, Ordering::SeqCst) >= 2000 {
            return Err(OracleError::transport("timed out"));
        }
        target.query(candidate)
    };

    let result = with_workers(4).attack(&ciphertext, target.iv(), &flaky, &NullSink);
    match result {
        Err(AttackError::OracleTransport { source, .. }) => {
            assert_eq!(source, OracleError::transport("timed out"))
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn cancellation_returns_promptly() {
    let target = target();
    let ciphertext = target.encrypt(&[b'x'; 8 * BLOCK_SIZE]).unwrap();
    let coordinator = with_workers(4);
    let token = coordinator.cancellation_token();

    let calls = AtomicU64::new(0);
    let calls_at_cancel = AtomicU64::new(0);
    let oracle = |candidate: &[u8]| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == 500 {
            calls_at_cancel.store(n, Ordering::SeqCst);
            token.cancel();
        }
        target.query(candidate)
    };

    let outcome = coordinator.attack(&ciphertext, target.iv(), &oracle, &NullSink).unwrap();
    assert_eq!(outcome, AttackOutcome::Cancelled);

    // Workers already inside a query may finish it; nothing new starts.
    let extra = calls.load(Ordering::SeqCst) - calls_at_cancel.load(Ordering::SeqCst);
    assert!(extra < 4, "{} queries after cancellation", extra);
}

#[test]
fn events_arrive_over_a_channel_from_all_workers() {
    let target = target();
    let text = [b'z'; 4 * BLOCK_SIZE];
    let ciphertext = target.encrypt(&text).unwrap();
    let (tx, rx) = channel();

    let outcome = with_workers(4)
        .attack(&ciphertext, target.iv(), &target, &ChannelSink::new(tx))
        .unwrap();
    assert_eq!(outcome.plaintext(), Some(&text[..]));

    let events: Vec<_> = rx.try_iter().collect();
    let blocks = ciphertext.len() / BLOCK_SIZE;
    for block in 0..blocks {
        let found: Vec<_> = events
            .iter()
            .filter(|e| e.block_index == Some(block) && matches!(e.kind, EventKind::Found(_)))
            .map(|e| e.byte_index.unwrap())
            .collect();
        assert_eq!(found, (0..BLOCK_SIZE).rev().collect::<Vec<_>>());
    }
    assert_eq!(
        events.iter().filter(|e| e.kind == EventKind::BlockComplete).count(),
        blocks
    );
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::AttackComplete));
}
