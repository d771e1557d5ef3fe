//! Shared test harness for circlet integration tests.
//!
//! Provides pinned rings with hand-picked token layouts, an invariant checker
//! run after every mutation, and a reproducible operation generator for churn
//! scenarios.

use std::collections::HashSet;

use circlet_ring::{FixedHasher, Ring, TokenHasher};
use circlet_types::Token;

/// Build a ring where each `(input, token)` pair hashes to exactly `token`.
///
/// Inputs that are not pinned (including collision probes) fall back to SHA-1.
pub fn pinned_ring(pins: &[(&str, u64)]) -> Ring<FixedHasher> {
    let hasher = pins
        .iter()
        .fold(FixedHasher::new(), |h, (input, token)| h.pin(input, *token));
    Ring::with_hasher(hasher)
}

/// Name of the server owning the record at `fingerprint`.
pub fn owner_name<H: TokenHasher>(ring: &Ring<H>, fingerprint: impl Into<Token>) -> Option<String> {
    ring.owner_of(&fingerprint.into()).map(|s| s.name.clone())
}

/// Assert the structural invariants every ring must satisfy between calls.
///
/// - servers ascending by token, names unique
/// - every owner refers to a server on the ring
/// - no record is unassigned while servers exist
/// - fingerprints unique
pub fn assert_ring_invariants<H: TokenHasher>(ring: &Ring<H>) {
    let servers = ring.servers();
    for pair in servers.windows(2) {
        assert!(
            pair[0].token <= pair[1].token,
            "servers out of order: {} before {}",
            pair[0].name,
            pair[1].name
        );
    }

    let names: HashSet<&str> = servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names.len(), servers.len(), "duplicate server names");

    let mut fingerprints = HashSet::new();
    for record in ring.data() {
        assert!(
            fingerprints.insert(record.fingerprint),
            "duplicate fingerprint {}",
            record.fingerprint
        );
        match record.assigned.as_deref() {
            Some(owner) => assert!(
                names.contains(owner),
                "{} owned by departed server {owner}",
                record.value
            ),
            None => assert!(
                servers.is_empty(),
                "{} unassigned while {} servers exist",
                record.value,
                servers.len()
            ),
        }
    }
    assert_eq!(fingerprints.len(), ring.data_count());
}

/// One step of a churn scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    AddServer(String),
    RemoveServer(String),
    AddData(String),
    RemoveData(String),
}

/// Reproducible stream of ring operations drawn from small name pools.
pub struct Churn {
    state: u32,
    servers: u32,
    values: u32,
}

impl Churn {
    /// Generator over `servers` possible server names and `values` possible values.
    pub fn new(seed: u32, servers: u32, values: u32) -> Self {
        Self {
            state: seed,
            servers,
            values,
        }
    }

    fn next_u32(&mut self, bound: u32) -> u32 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        (self.state >> 16) % bound
    }

    /// Draw the next operation.
    pub fn next_op(&mut self) -> Op {
        match self.next_u32(6) {
            0 => Op::AddServer(format!("node-{}", self.next_u32(self.servers))),
            1 => Op::RemoveServer(format!("node-{}", self.next_u32(self.servers))),
            2 => Op::RemoveData(format!("key-{}", self.next_u32(self.values))),
            _ => Op::AddData(format!("key-{}", self.next_u32(self.values))),
        }
    }
}
