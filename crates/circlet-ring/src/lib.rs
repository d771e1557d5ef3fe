//! Consistent hashing ring mapping data items to named servers.
//!
//! Each server gets a single token, `hash(name)`, and the ring keeps servers
//! sorted by token with the last wrapping around to the first. A data item is
//! fingerprinted with the same hash and owned by the server whose token is
//! numerically closest to the fingerprint.
//!
//! Membership changes move as little data as the placement rule allows:
//!
//! - **Join**: only records owned by the new server's clockwise successor are
//!   considered, and each moves if the new server is strictly closer.
//! - **Leave**: every record of the departing server moves to the server that
//!   takes over its position on the ring.
//!
//! Nearest-by-distance placement is not the textbook clockwise-successor rule,
//! so a join can leave some records on a server that is no longer the closest.
//! [`Ring::find_closest_server`] always reports the distance-optimal server;
//! the stored owner reflects the history of joins and leaves.

mod error;
pub mod hasher;
mod ring;
mod shared;


pub use error::RingError;
pub use hasher::{Blake3Hasher, FixedHasher, HasherKind, Sha1Hasher, TokenHasher};
pub use ring::{DEFAULT_MAX_PROBES, Ring};
pub use shared::SharedRing;
