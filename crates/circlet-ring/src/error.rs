//! Error types for ring operations.

/// Errors returned by [`Ring`](crate::Ring) mutations.
///
/// Every error is raised before the ring is modified, so a failed call
/// leaves the ring exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// An empty or whitespace-only server name or data value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A server with this name is already on the ring.
    #[error("server already exists: {0}")]
    DuplicateServer(String),

    /// No server with this name is on the ring.
    #[error("server not found: {0}")]
    ServerNotFound(String),

    /// Collision probing gave up before finding a free fingerprint.
    #[error("no free fingerprint for {value:?} after {attempts} probes")]
    ProbeExhausted {
        /// The value being inserted.
        value: String,
        /// Number of probes attempted.
        attempts: u32,
    },
}
