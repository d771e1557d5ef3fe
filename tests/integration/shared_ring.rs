//! Integration test: the lock-guarded ring under concurrent callers.

use std::sync::Arc;
use std::thread;

use circlet_integration_tests::assert_ring_invariants;
use circlet_ring::{Ring, SharedRing};

#[test]
fn test_concurrent_membership_and_data() {
    let shared = SharedRing::new(Ring::new());
    shared.add_server("seed").unwrap();

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..100 {
                    shared.add_data(&format!("w{t}-{i}")).unwrap();
                    if i % 25 == 0 {
                        let name = format!("server-{t}-{i}");
                        shared.add_server(&name).unwrap();
                    }
                }
            })
        })
        .collect();

    let reader = {
        let shared = Arc::clone(&shared);
        thread::spawn(move || {
            for _ in 0..100 {
                shared.read(assert_ring_invariants);
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(shared.data().len(), 400);
    assert_eq!(shared.servers().len(), 17);
    shared.read(assert_ring_invariants);
}

#[test]
fn test_snapshot_is_independent() {
    let shared = SharedRing::new(Ring::new());
    shared.add_server("a").unwrap();
    let snapshot = shared.snapshot();

    shared.add_server("b").unwrap();
    assert_eq!(snapshot.server_count(), 1);
    assert_eq!(shared.servers().len(), 2);
}
