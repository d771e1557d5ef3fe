//! Consistent hashing ring implementation.

use std::collections::HashMap;

use circlet_types::{DataRecord, Migration, Placement, Server, ServerAssignments, Token};
use tracing::{debug, warn};

use crate::error::RingError;
use crate::hasher::{Sha1Hasher, TokenHasher};

/// Default cap on collision probes per inserted value.
pub const DEFAULT_MAX_PROBES: u32 = 1024;

/// A stored value and the name of its owner.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    assigned: Option<String>,
}

/// Consistent hashing ring with one token per server.
///
/// Servers are kept sorted by token; the last one wraps around to the
/// first. Data is placed on the server whose token is numerically closest
/// to the data's fingerprint. Owners are stored by name and resolved
/// through the server index, so removing a server never leaves a record
/// pointing at something that no longer exists.
#[derive(Debug, Clone)]
pub struct Ring<H = Sha1Hasher> {
    hasher: H,
    /// Servers ascending by `(token, name)`.
    servers: Vec<Server>,
    /// Server name -> token, for locating a server in `servers`.
    names: HashMap<String, Token>,
    /// Fingerprint -> stored entry.
    records: HashMap<Token, Entry>,
    /// Fingerprints in insertion order.
    order: Vec<Token>,
    max_probes: u32,
}

impl Default for Ring<Sha1Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl Ring<Sha1Hasher> {
    /// Create an empty ring hashing with SHA-1.
    pub fn new() -> Self {
        Self::with_hasher(Sha1Hasher)
    }
}

impl<H: TokenHasher> Ring<H> {
    /// Create an empty ring with the given hasher.
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            servers: Vec::new(),
            names: HashMap::new(),
            records: HashMap::new(),
            order: Vec::new(),
            max_probes: DEFAULT_MAX_PROBES,
        }
    }

    /// Cap the number of collision probes tried per inserted value.
    pub fn with_max_probes(mut self, max_probes: u32) -> Self {
        self.max_probes = max_probes;
        self
    }

    // -----------------------------------------------------------------------
    // Servers
    // -----------------------------------------------------------------------

    /// Add a server and pull qualifying data from its successor.
    ///
    /// Every record owned by the new server's clockwise successor moves to
    /// the new server if the new server's token is strictly closer to the
    /// record's fingerprint. Records that had no owner (because the ring was
    /// empty) are placed as if freshly added. Returns every ownership change.
    pub fn add_server(&mut self, name: &str) -> Result<Vec<Migration>, RingError> {
        validate(name, "server name")?;
        if self.names.contains_key(name) {
            return Err(RingError::DuplicateServer(name.to_string()));
        }

        let token = self.hasher.token(name.as_bytes());
        let idx = self
            .servers
            .partition_point(|s| (s.token, s.name.as_str()) < (token, name));
        self.servers.insert(
            idx,
            Server {
                name: name.to_string(),
                token,
            },
        );
        self.names.insert(name.to_string(), token);
        debug!(server = name, %token, position = idx, "added server to ring");

        Ok(self.rebalance_after_join(idx))
    }

    /// Remove a server and hand its data to its ring successor.
    ///
    /// The successor is whichever server occupies the removed server's
    /// former position afterwards (wrapping to the first). If no servers
    /// remain, the affected records become unassigned.
    pub fn remove_server(&mut self, name: &str) -> Result<Vec<Migration>, RingError> {
        let idx = self
            .position(name)
            .ok_or_else(|| RingError::ServerNotFound(name.to_string()))?;

        let removed = self.servers.remove(idx);
        self.names.remove(name);
        debug!(server = name, token = %removed.token, "removed server from ring");

        let heir = if self.servers.is_empty() {
            None
        } else {
            Some(self.servers[idx % self.servers.len()].name.clone())
        };

        let mut migrations = Vec::new();
        for fingerprint in &self.order {
            let Some(entry) = self.records.get_mut(fingerprint) else {
                continue;
            };
            if entry.assigned.as_deref() != Some(name) {
                continue;
            }
            entry.assigned = heir.clone();
            migrations.push(Migration {
                fingerprint: *fingerprint,
                value: entry.value.clone(),
                from: Some(removed.name.clone()),
                to: heir.clone(),
            });
        }

        if heir.is_none() && !migrations.is_empty() {
            warn!(
                server = name,
                orphaned = migrations.len(),
                "last server removed, data left unassigned"
            );
        }

        Ok(migrations)
    }

    /// Move data from the successor of the server at `idx` to that server.
    fn rebalance_after_join(&mut self, idx: usize) -> Vec<Migration> {
        let joined = &self.servers[idx];
        let successor = &self.servers[(idx + 1) % self.servers.len()];
        debug!(
            server = %joined.name,
            successor = %successor.name,
            "rebalancing from successor"
        );

        let mut migrations = Vec::new();
        for fingerprint in &self.order {
            let Some(entry) = self.records.get_mut(fingerprint) else {
                continue;
            };

            let moves = match entry.assigned.as_deref() {
                None => closest(&self.servers, fingerprint).is_some_and(|s| s.name == joined.name),
                Some(owner) if owner == successor.name && successor.name != joined.name => {
                    fingerprint.abs_diff(&joined.token) < fingerprint.abs_diff(&successor.token)
                }
                Some(_) => false,
            };

            if moves {
                let from = entry.assigned.replace(joined.name.clone());
                migrations.push(Migration {
                    fingerprint: *fingerprint,
                    value: entry.value.clone(),
                    from,
                    to: Some(joined.name.clone()),
                });
            }
        }

        debug!(server = %joined.name, moved = migrations.len(), "rebalance complete");
        migrations
    }

    /// Index of `name` in `servers`.
    fn position(&self, name: &str) -> Option<usize> {
        let token = *self.names.get(name)?;
        self.servers
            .binary_search_by(|s| (s.token, s.name.as_str()).cmp(&(token, name)))
            .ok()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// The server whose token is numerically closest to `fingerprint`.
    ///
    /// Ties go to the server that comes first in ascending token order.
    /// Returns `None` on an empty ring.
    pub fn find_closest_server(&self, fingerprint: &Token) -> Option<&Server> {
        closest(&self.servers, fingerprint)
    }

    /// The server after `name` in ascending token order, wrapping around.
    ///
    /// A lone server is its own successor. Returns `None` if `name` is not
    /// on the ring.
    pub fn find_next_server(&self, name: &str) -> Option<&Server> {
        let idx = self.position(name)?;
        self.servers.get((idx + 1) % self.servers.len())
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Store `value` and assign it to the closest server.
    ///
    /// If `hash(value)` is already taken, probes `hash(hex(h0) + "1")`,
    /// `hash(hex(h0) + "2")`, ... up to the configured probe cap. The
    /// placement's server is `None` when the ring has no servers; the record
    /// is still stored and gets an owner when the first server joins.
    pub fn add_data(&mut self, value: &str) -> Result<Placement, RingError> {
        validate(value, "data value")?;
        let fingerprint = self.free_fingerprint(value)?;

        let server = closest(&self.servers, &fingerprint).cloned();
        self.records.insert(
            fingerprint,
            Entry {
                value: value.to_string(),
                assigned: server.as_ref().map(|s| s.name.clone()),
            },
        );
        self.order.push(fingerprint);
        debug!(
            %fingerprint,
            server = server.as_ref().map(|s| s.name.as_str()),
            "added data"
        );

        Ok(Placement {
            fingerprint,
            server,
        })
    }

    /// Remove the record stored at `hash(value)`, if any.
    ///
    /// Only the unprobed fingerprint is checked: a record that was stored
    /// under a probed fingerprint is not reachable here and needs
    /// [`remove_fingerprint`](Self::remove_fingerprint). Removing an absent
    /// value is not an error.
    pub fn remove_data(&mut self, value: &str) -> Result<Option<DataRecord>, RingError> {
        validate(value, "data value")?;
        let fingerprint = self.hasher.token(value.as_bytes());
        Ok(self.remove_fingerprint(&fingerprint))
    }

    /// Remove the record stored under `fingerprint`, if any.
    pub fn remove_fingerprint(&mut self, fingerprint: &Token) -> Option<DataRecord> {
        let entry = self.records.remove(fingerprint)?;
        self.order.retain(|fp| fp != fingerprint);
        debug!(%fingerprint, "removed data");
        Some(DataRecord {
            fingerprint: *fingerprint,
            value: entry.value,
            assigned: entry.assigned,
        })
    }

    fn free_fingerprint(&self, value: &str) -> Result<Token, RingError> {
        let original = self.hasher.token(value.as_bytes());
        if !self.records.contains_key(&original) {
            return Ok(original);
        }

        let prefix = original.to_hex();
        for counter in 1..=self.max_probes {
            let candidate = self.hasher.token(format!("{prefix}{counter}").as_bytes());
            if !self.records.contains_key(&candidate) {
                debug!(%original, %candidate, counter, "fingerprint collision resolved");
                return Ok(candidate);
            }
        }

        warn!(%original, attempts = self.max_probes, "collision probing exhausted");
        Err(RingError::ProbeExhausted {
            value: value.to_string(),
            attempts: self.max_probes,
        })
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// All servers, ascending by token.
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<&Server> {
        self.position(name).map(|idx| &self.servers[idx])
    }

    /// All records in insertion order.
    pub fn data(&self) -> Vec<DataRecord> {
        self.order
            .iter()
            .filter_map(|fp| self.record(fp))
            .collect()
    }

    /// The record stored under `fingerprint`.
    pub fn record(&self, fingerprint: &Token) -> Option<DataRecord> {
        self.records.get(fingerprint).map(|entry| DataRecord {
            fingerprint: *fingerprint,
            value: entry.value.clone(),
            assigned: entry.assigned.clone(),
        })
    }

    /// The server owning the record at `fingerprint`.
    pub fn owner_of(&self, fingerprint: &Token) -> Option<&Server> {
        let name = self.records.get(fingerprint)?.assigned.as_deref()?;
        self.server(name)
    }

    /// Every fingerprint currently holding `value`, in insertion order.
    pub fn fingerprints_of(&self, value: &str) -> Vec<Token> {
        self.order
            .iter()
            .filter(|fp| self.records.get(fp).is_some_and(|e| e.value == value))
            .copied()
            .collect()
    }

    /// A server and the records it owns, or `None` if `name` is unknown.
    pub fn server_assignments(&self, name: &str) -> Option<ServerAssignments> {
        let server = self.server(name)?.clone();
        let data = self
            .data()
            .into_iter()
            .filter(|r| r.assigned.as_deref() == Some(name))
            .collect();
        Some(ServerAssignments { server, data })
    }

    /// Every server with the records it owns, ascending by token.
    pub fn assignments(&self) -> Vec<ServerAssignments> {
        let mut by_owner: HashMap<&str, Vec<DataRecord>> = HashMap::new();
        for record in self.data() {
            if let Some(owner) = record.assigned.as_deref() {
                if let Some(server) = self.server(owner) {
                    by_owner.entry(server.name.as_str()).or_default().push(record);
                }
            }
        }

        self.servers
            .iter()
            .map(|server| ServerAssignments {
                server: server.clone(),
                data: by_owner.remove(server.name.as_str()).unwrap_or_default(),
            })
            .collect()
    }

    /// Records with no owner (only possible while the ring has no servers).
    pub fn unassigned(&self) -> Vec<DataRecord> {
        self.data()
            .into_iter()
            .filter(|r| r.assigned.is_none())
            .collect()
    }

    /// Number of servers on the ring.
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Number of stored records.
    pub fn data_count(&self) -> usize {
        self.records.len()
    }

    /// True when the ring has neither servers nor data.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.records.is_empty()
    }
}

/// Nearest server by absolute token distance, first wins on ties.
fn closest<'a>(servers: &'a [Server], fingerprint: &Token) -> Option<&'a Server> {
    let mut best: Option<(&Server, Token)> = None;
    for server in servers {
        let distance = server.token.abs_diff(fingerprint);
        match best {
            Some((_, min)) if distance >= min => {}
            _ => best = Some((server, distance)),
        }
    }
    best.map(|(server, _)| server)
}

fn validate(input: &str, what: &str) -> Result<(), RingError> {
    if input.trim().is_empty() {
        return Err(RingError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}
