//! Structures common to the key bank, the Merkle commitment and the signatures
use crate::errors::Error;
use blake2::digest::{Update, VariableOutput};
use blake2::VarBlake2b;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Size of a Merkle digest (the output of Blake2b-256).
pub const DIGEST_SIZE: usize = 32;

/// Largest number of rounds a single signer commits to.
pub const MAX_RANGE_LENGTH: u64 = 1 << 32;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Output of the Blake2b-256 hash, used for leaves, internal nodes and the root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct Digest(pub(crate) [u8; DIGEST_SIZE]);

/// The commitment to every verifying key of a signer. This is the only value a
/// `Verifier` needs besides the validity range.
pub type Root = Digest;

impl Digest {
    /// Digest used to pad the leaf level up to a power of two.
    pub const EMPTY: Digest = Digest([0u8; DIGEST_SIZE]);

    /// Return `Self` as its byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Tries to convert a slice of `bytes` as `Self`.
    ///
    /// # Errors
    /// This function returns an error if the length of `bytes` is not equal to
    /// `DIGEST_SIZE`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() == DIGEST_SIZE {
            let mut v = [0u8; DIGEST_SIZE];
            v.copy_from_slice(bytes);
            Ok(Digest(v))
        } else {
            Err(Error::Decoding(format!(
                "digest must be {} bytes, got {}",
                DIGEST_SIZE,
                bytes.len()
            )))
        }
    }

    /// Hash a leaf encoding, prefixed with the leaf domain separator.
    pub fn hash_leaf(leaf_encoding: &[u8]) -> Digest {
        hash_with_prefix(LEAF_PREFIX, &[leaf_encoding])
    }

    /// Hash two children into their parent node.
    pub fn hash_pair(&self, other: &Digest) -> Digest {
        hash_with_prefix(NODE_PREFIX, &[&self.0, &other.0])
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

fn hash_with_prefix(prefix: u8, parts: &[&[u8]]) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    let mut h = VarBlake2b::new(DIGEST_SIZE).expect("valid size");
    h.update(&[prefix]);
    for part in parts {
        h.update(part);
    }

    h.finalize_variable(|res| out.copy_from_slice(res));
    Digest(out)
}

/// Canonical leaf encoding: the position (big endian) followed by the verifying key bytes.
/// Binding the position into the hash prevents replaying a proof at another position.
pub fn leaf_encoding(position: u64, verifying_key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + verifying_key.len());
    out.extend_from_slice(&position.to_be_bytes());
    out.extend_from_slice(verifying_key);
    out
}

/// Master seed from which every ephemeral key of a signer is derived.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed(pub(crate) [u8; 32]);

impl Seed {
    /// Byte representation size of a `Seed`.
    pub const SIZE: usize = 32;

    /// Creates a `Seed` from a mutable slice, overwriting the slice with zeros.
    ///
    /// # Errors
    /// Fails when `bytes.len() != Self::SIZE`.
    pub fn take_from_slice(bytes: &mut [u8]) -> Result<Seed, Error> {
        if bytes.len() != Self::SIZE {
            return Err(Error::Decoding(format!(
                "seed must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(bytes);
        bytes.zeroize();
        Ok(Seed(out))
    }

    /// Draw a fresh seed from the operating system RNG.
    pub fn random() -> Seed {
        use rand_core::{OsRng, RngCore};

        let mut out = [0u8; Self::SIZE];
        OsRng.fill_bytes(&mut out);
        Seed(out)
    }

    /// Derive the seed of the one-time key at `position`, as
    /// `Blake2b-256(master || position)`.
    pub fn derive(&self, position: u64) -> [u8; 32] {
        let mut out = [0u8; Self::SIZE];
        let mut h = VarBlake2b::new(Self::SIZE).expect("valid size");
        h.update(&self.0);
        h.update(&position.to_be_bytes());
        h.finalize_variable(|res| out.copy_from_slice(res));
        out
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Interval of rounds `[first, last]` covered by a signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidityRange {
    first: u64,
    last: u64,
}

impl ValidityRange {
    /// Build a range, failing when `first > last` or when the range exceeds
    /// `MAX_RANGE_LENGTH` rounds.
    pub fn new(first: u64, last: u64) -> Result<Self, Error> {
        if first > last || last - first >= MAX_RANGE_LENGTH {
            return Err(Error::InvalidRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// First round of the range.
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Last round of the range (inclusive).
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Number of rounds, `last - first + 1`.
    pub fn len(&self) -> u64 {
        self.last - self.first + 1
    }

    /// A range always holds at least one round.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `round` lies in `[first, last]`.
    pub fn contains(&self, round: u64) -> bool {
        self.first <= round && round <= self.last
    }

    /// Map a round to its zero-based position. This is the only place where rounds
    /// are turned into positions, both when signing and when verifying.
    pub fn position(&self, round: u64) -> Result<u64, Error> {
        if !self.contains(round) {
            return Err(Error::OutOfRange {
                round,
                first: self.first,
                last: self.last,
            });
        }
        Ok(round - self.first)
    }

    /// Height of the Merkle tree committing to this range, i.e. the length of
    /// every audit path.
    pub fn depth(&self) -> usize {
        tree_depth(self.len())
    }
}

/// Height of a tree with `leaf_count` leaves once padded to a power of two.
pub(crate) fn tree_depth(leaf_count: u64) -> usize {
    if leaf_count <= 1 {
        0
    } else {
        leaf_count.next_power_of_two().trailing_zeros() as usize
    }
}
