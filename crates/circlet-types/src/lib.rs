//! Shared types for circlet.
//!
//! This crate defines the value types passed across the circlet workspace:
//! the fixed-width [`Token`] that places servers and data on the ring, the
//! [`Server`] and [`DataRecord`] entries the ring owns, and the projections it
//! hands back to callers ([`Placement`], [`Migration`], [`ServerAssignments`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of a [`Token`] in bytes (160 bits).
pub const TOKEN_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A 160-bit position on the ring.
///
/// Stored big-endian, so the derived byte-wise ordering is the numeric
/// ordering of the unsigned integer the token represents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
pub struct Token([u8; TOKEN_LEN]);

impl Token {
    /// The smallest token (all zero bits).
    pub const ZERO: Token = Token([0; TOKEN_LEN]);

    /// The largest token (all one bits).
    pub const MAX: Token = Token([0xff; TOKEN_LEN]);

    /// Return the raw big-endian bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }

    /// Absolute numeric difference `|self - other|`, exact over all 160 bits.
    pub fn abs_diff(&self, other: &Token) -> Token {
        let (hi, lo) = if self >= other {
            (self, other)
        } else {
            (other, self)
        };

        let mut out = [0u8; TOKEN_LEN];
        let mut borrow = false;
        for i in (0..TOKEN_LEN).rev() {
            let (d, b1) = hi.0[i].overflowing_sub(lo.0[i]);
            let (d, b2) = d.overflowing_sub(borrow as u8);
            out[i] = d;
            borrow = b1 || b2;
        }
        Token(out)
    }

    /// Lowercase hex representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; TOKEN_LEN]> for Token {
    fn from(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }
}

/// Places the value in the low 64 bits; the high bits are zero.
impl From<u64> for Token {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; TOKEN_LEN];
        bytes[TOKEN_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl AsRef<[u8]> for Token {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({self})")
    }
}

/// Error returned when parsing a [`Token`] from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenParseError {
    /// The input was not exactly 40 hex characters long.
    #[error("token must be {expected} hex characters, got {actual}")]
    Length {
        /// Required number of characters.
        expected: usize,
        /// Characters actually supplied.
        actual: usize,
    },

    /// The input contained a non-hex character.
    #[error("invalid hex in token: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Token {
    type Err = TokenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TOKEN_LEN * 2 {
            return Err(TokenParseError::Length {
                expected: TOKEN_LEN * 2,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; TOKEN_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Ring entries
// ---------------------------------------------------------------------------

/// A server on the ring: a unique name and the token derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server {
    /// Caller-supplied unique name.
    pub name: String,
    /// Ring position, `hash(name)`.
    pub token: Token,
}

/// A stored data item and the server that currently owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    /// Collision-adjusted fingerprint; unique among stored records.
    pub fingerprint: Token,
    /// The original payload.
    pub value: String,
    /// Name of the owning server, or `None` while the ring has no servers.
    pub assigned: Option<String>,
}

/// Result of adding a data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Fingerprint the item was stored under.
    pub fingerprint: Token,
    /// Server the item was assigned to, if any server exists.
    pub server: Option<Server>,
}

/// A single ownership change caused by a membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Fingerprint of the record that moved.
    pub fingerprint: Token,
    /// Value of the record that moved.
    pub value: String,
    /// Previous owner (`None` if the record was unassigned).
    pub from: Option<String>,
    /// New owner (`None` if the ring became empty).
    pub to: Option<String>,
}

/// A server together with every record assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAssignments {
    /// The server.
    pub server: Server,
    /// Records owned by `server`, in insertion order.
    pub data: Vec<DataRecord>,
}
