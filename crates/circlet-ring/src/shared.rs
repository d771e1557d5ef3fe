//! Lock-guarded ring for use from several threads.
//!
//! [`SharedRing`] holds one [`Ring`] behind a single reader-writer lock.
//! Mutations take the write lock for the whole operation, so no caller can
//! observe a half-finished rebalance. Listing calls take the read lock and
//! return owned snapshots.

use std::sync::Arc;

use circlet_types::{DataRecord, Migration, Placement, Server, ServerAssignments, Token};
use parking_lot::RwLock;
use tracing::info;

use crate::error::RingError;
use crate::hasher::{Sha1Hasher, TokenHasher};
use crate::ring::Ring;

/// A [`Ring`] shared behind a reader-writer lock.
#[derive(Debug)]
pub struct SharedRing<H = Sha1Hasher> {
    ring: RwLock<Ring<H>>,
}

impl<H: TokenHasher> SharedRing<H> {
    /// Wrap `ring` for shared use.
    pub fn new(ring: Ring<H>) -> Arc<Self> {
        Arc::new(Self {
            ring: RwLock::new(ring),
        })
    }

    /// See [`Ring::add_server`].
    pub fn add_server(&self, name: &str) -> Result<Vec<Migration>, RingError> {
        let migrations = self.ring.write().add_server(name)?;
        info!(server = name, moved = migrations.len(), "server joined ring");
        Ok(migrations)
    }

    /// See [`Ring::remove_server`].
    pub fn remove_server(&self, name: &str) -> Result<Vec<Migration>, RingError> {
        let migrations = self.ring.write().remove_server(name)?;
        info!(server = name, moved = migrations.len(), "server left ring");
        Ok(migrations)
    }

    /// See [`Ring::add_data`].
    pub fn add_data(&self, value: &str) -> Result<Placement, RingError> {
        self.ring.write().add_data(value)
    }

    /// See [`Ring::remove_data`].
    pub fn remove_data(&self, value: &str) -> Result<Option<DataRecord>, RingError> {
        self.ring.write().remove_data(value)
    }

    /// See [`Ring::remove_fingerprint`].
    pub fn remove_fingerprint(&self, fingerprint: &Token) -> Option<DataRecord> {
        self.ring.write().remove_fingerprint(fingerprint)
    }

    /// Snapshot of all servers, ascending by token.
    pub fn servers(&self) -> Vec<Server> {
        self.ring.read().servers().to_vec()
    }

    /// Snapshot of all records in insertion order.
    pub fn data(&self) -> Vec<DataRecord> {
        self.ring.read().data()
    }

    /// See [`Ring::assignments`].
    pub fn assignments(&self) -> Vec<ServerAssignments> {
        self.ring.read().assignments()
    }

    /// Run `f` against the ring under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Ring<H>) -> R) -> R {
        f(&self.ring.read())
    }
}

impl<H: TokenHasher + Clone> SharedRing<H> {
    /// Return a clone of the current ring.
    pub fn snapshot(&self) -> Ring<H> {
        self.ring.read().clone()
    }
}
