//! Token hashing: turning server names and data values into ring positions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use circlet_types::{TOKEN_LEN, Token};
use serde::Deserialize;
use sha1::{Digest, Sha1};

/// Deterministic mapping from bytes to a [`Token`].
///
/// Implementations must return the same token for the same input across
/// calls and process restarts.
pub trait TokenHasher: fmt::Debug + Send + Sync {
    /// Hash `input` to a ring position.
    fn token(&self, input: &[u8]) -> Token;
}

/// SHA-1 digest, 160 bits, used as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha1Hasher;

impl TokenHasher for Sha1Hasher {
    fn token(&self, input: &[u8]) -> Token {
        let digest: [u8; TOKEN_LEN] = Sha1::digest(input).into();
        Token::from(digest)
    }
}

/// BLAKE3 digest truncated to its first 160 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl TokenHasher for Blake3Hasher {
    fn token(&self, input: &[u8]) -> Token {
        let hash = blake3::hash(input);
        let mut bytes = [0u8; TOKEN_LEN];
        bytes.copy_from_slice(&hash.as_bytes()[..TOKEN_LEN]);
        Token::from(bytes)
    }
}

/// Hash function selected at runtime (from configuration or the command line).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// [`Sha1Hasher`].
    #[default]
    Sha1,
    /// [`Blake3Hasher`].
    Blake3,
}

impl TokenHasher for HasherKind {
    fn token(&self, input: &[u8]) -> Token {
        match self {
            HasherKind::Sha1 => Sha1Hasher.token(input),
            HasherKind::Blake3 => Blake3Hasher.token(input),
        }
    }
}

impl fmt::Display for HasherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HasherKind::Sha1 => f.write_str("sha1"),
            HasherKind::Blake3 => f.write_str("blake3"),
        }
    }
}

impl FromStr for HasherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(HasherKind::Sha1),
            "blake3" => Ok(HasherKind::Blake3),
            other => Err(format!("unknown hasher {other:?} (expected sha1 or blake3)")),
        }
    }
}

/// Pins selected inputs to chosen tokens and hashes everything else with
/// `fallback`.
///
/// Lets callers lay out a ring with exact, human-readable positions, which
/// is how the placement scenarios in the test suites are written.
#[derive(Debug, Clone, Default)]
pub struct FixedHasher<H = Sha1Hasher> {
    pins: HashMap<Vec<u8>, Token>,
    fallback: H,
}

impl FixedHasher<Sha1Hasher> {
    /// Create a hasher with no pins and SHA-1 as the fallback.
    pub fn new() -> Self {
        Self::with_fallback(Sha1Hasher)
    }
}

impl<H: TokenHasher> FixedHasher<H> {
    /// Create a hasher with no pins and the given fallback.
    pub fn with_fallback(fallback: H) -> Self {
        Self {
            pins: HashMap::new(),
            fallback,
        }
    }

    /// Pin `input` to `token`.
    pub fn pin(mut self, input: impl AsRef<[u8]>, token: impl Into<Token>) -> Self {
        self.pins.insert(input.as_ref().to_vec(), token.into());
        self
    }
}

impl<H: TokenHasher> TokenHasher for FixedHasher<H> {
    fn token(&self, input: &[u8]) -> Token {
        match self.pins.get(input) {
            Some(token) => *token,
            None => self.fallback.token(input),
        }
    }
}
