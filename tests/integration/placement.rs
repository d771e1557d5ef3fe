//! Integration test: placement and rebalancing scenarios on pinned layouts.

use circlet_integration_tests::{assert_ring_invariants, owner_name, pinned_ring};
use circlet_ring::{Ring, RingError};
use circlet_types::Token;

/// A(0x10), B(0x50): a fingerprint at 0x30 is 0x20 from both, so it goes to
/// A, the first server in ascending order.
#[test]
fn test_tie_breaks_to_lower_server() {
    let mut ring = pinned_ring(&[("A", 0x10), ("B", 0x50), ("x", 0x30)]);
    ring.add_server("A").unwrap();
    ring.add_server("B").unwrap();

    let placement = ring.add_data("x").unwrap();
    assert_eq!(placement.fingerprint, Token::from(0x30));
    assert_eq!(placement.server.unwrap().name, "A");
    assert_ring_invariants(&ring);
}

/// Adding servers in either order yields the same ring and placement.
#[test]
fn test_join_order_does_not_change_layout() {
    let pins = [("A", 0x10), ("B", 0x50), ("C", 0x90), ("x", 0x60)];
    let mut forward = pinned_ring(&pins);
    let mut backward = pinned_ring(&pins);
    for s in ["A", "B", "C"] {
        forward.add_server(s).unwrap();
    }
    for s in ["C", "B", "A"] {
        backward.add_server(s).unwrap();
    }

    assert_eq!(forward.servers(), backward.servers());
    assert_eq!(
        forward.add_data("x").unwrap(),
        backward.add_data("x").unwrap()
    );
}

/// Full lifecycle: data on an empty ring waits, the first join adopts it,
/// later joins pull from their successor, leaves hand off to the successor,
/// and removing the last server orphans the data again.
#[test]
fn test_full_lifecycle() {
    let mut ring = pinned_ring(&[
        ("A", 0x100),
        ("B", 0x300),
        ("C", 0x500),
        ("early", 0x280),
        ("late", 0x480),
    ]);

    ring.add_data("early").unwrap();
    assert_eq!(ring.unassigned().len(), 1);

    let adopted = ring.add_server("C").unwrap();
    assert_eq!(adopted.len(), 1);
    assert_eq!(owner_name(&ring, 0x280u64).as_deref(), Some("C"));

    ring.add_data("late").unwrap();
    assert_eq!(owner_name(&ring, 0x480u64).as_deref(), Some("C"));

    // B's successor is C; "early" (0x280) is 0x80 from B and 0x280 from C.
    let pulled = ring.add_server("B").unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].value, "early");
    assert_eq!(owner_name(&ring, 0x280u64).as_deref(), Some("B"));
    assert_eq!(owner_name(&ring, 0x480u64).as_deref(), Some("C"));

    // A's successor is B; "early" is closer to B, so nothing moves.
    assert!(ring.add_server("A").unwrap().is_empty());
    assert_ring_invariants(&ring);

    // B leaves: its data goes to C (its successor), not A.
    let handed = ring.remove_server("B").unwrap();
    assert_eq!(handed.len(), 1);
    assert_eq!(owner_name(&ring, 0x280u64).as_deref(), Some("C"));

    ring.remove_server("A").unwrap();
    let orphaned = ring.remove_server("C").unwrap();
    assert_eq!(orphaned.len(), 2);
    assert!(orphaned.iter().all(|m| m.to.is_none()));
    assert_eq!(ring.unassigned().len(), 2);
    assert_ring_invariants(&ring);
}

/// Rejected calls never modify the ring.
#[test]
fn test_rejections_are_atomic() {
    let mut ring = Ring::new();
    ring.add_server("alpha").unwrap();
    ring.add_data("payload").unwrap();
    let servers = ring.servers().to_vec();
    let data = ring.data();

    assert_eq!(
        ring.add_server("alpha"),
        Err(RingError::DuplicateServer("alpha".to_string()))
    );
    assert!(matches!(ring.add_server(""), Err(RingError::InvalidInput(_))));
    assert_eq!(
        ring.remove_server("beta"),
        Err(RingError::ServerNotFound("beta".to_string()))
    );
    assert!(matches!(ring.add_data("\t"), Err(RingError::InvalidInput(_))));

    assert_eq!(ring.servers(), servers.as_slice());
    assert_eq!(ring.data(), data);
}

/// Placement with real SHA-1 tokens is stable across ring instances.
#[test]
fn test_sha1_placement_is_deterministic() {
    let build = || {
        let mut ring = Ring::new();
        for s in ["cache-a", "cache-b", "cache-c"] {
            ring.add_server(s).unwrap();
        }
        (0..100)
            .map(|i| ring.add_data(&format!("user:{i}")).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(build(), build());
}
