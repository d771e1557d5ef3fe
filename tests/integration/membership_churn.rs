//! Integration test: invariants under long random membership churn.

use circlet_integration_tests::{Churn, Op, assert_ring_invariants};
use circlet_ring::{Blake3Hasher, Ring, RingError, TokenHasher};

fn drive<H: TokenHasher>(ring: &mut Ring<H>, churn: &mut Churn, steps: usize) {
    for step in 0..steps {
        let op = churn.next_op();
        match &op {
            Op::AddServer(name) => {
                let existed = ring.server(name).is_some();
                match ring.add_server(name) {
                    Ok(_) => assert!(!existed),
                    Err(RingError::DuplicateServer(_)) => assert!(existed),
                    Err(e) => panic!("step {step}: unexpected error {e}"),
                }
            }
            Op::RemoveServer(name) => {
                let existed = ring.server(name).is_some();
                match ring.remove_server(name) {
                    Ok(migrations) => {
                        assert!(existed);
                        assert!(
                            migrations
                                .iter()
                                .all(|m| m.from.as_deref() == Some(name.as_str()))
                        );
                    }
                    Err(RingError::ServerNotFound(_)) => assert!(!existed),
                    Err(e) => panic!("step {step}: unexpected error {e}"),
                }
            }
            Op::AddData(value) => {
                ring.add_data(value).unwrap();
            }
            Op::RemoveData(value) => {
                ring.remove_data(value).unwrap();
            }
        }

        assert_ring_invariants(ring);
    }
}

#[test]
fn test_churn_sha1() {
    let mut ring = Ring::new();
    let mut churn = Churn::new(7, 12, 60);
    drive(&mut ring, &mut churn, 3_000);
}

#[test]
fn test_churn_blake3() {
    let mut ring = Ring::with_hasher(Blake3Hasher);
    let mut churn = Churn::new(0xC0FFEE, 5, 30);
    drive(&mut ring, &mut churn, 3_000);
}

/// A leave moves exactly the departing server's records, and the name can rejoin.
#[test]
fn test_leave_and_rejoin_moves_only_affected_data() {
    let mut ring = Ring::new();
    for i in 0..8 {
        ring.add_server(&format!("node-{i}")).unwrap();
    }
    for i in 0..500 {
        ring.add_data(&format!("key-{i}")).unwrap();
    }

    let before = ring.data();
    let migrations = ring.remove_server("node-3").unwrap();
    let moved = before
        .iter()
        .filter(|r| r.assigned.as_deref() == Some("node-3"))
        .count();
    assert_eq!(migrations.len(), moved);
    assert!(
        ring.data()
            .iter()
            .all(|r| r.assigned.as_deref() != Some("node-3"))
    );

    ring.add_server("node-3").unwrap();
    assert_ring_invariants(&ring);
}
