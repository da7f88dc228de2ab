//! Errors specific to Merkle keystore signatures
use ed25519_dalek as ed25519;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enum of error associated with Merkle keystore signatures
pub enum Error {
    /// The validity range is empty (`first > last`) or longer than `MAX_RANGE_LENGTH`.
    InvalidRange {
        /// First round of the range
        first: u64,
        /// Last round of the range
        last: u64,
    },
    /// The round does not belong to the validity range.
    OutOfRange {
        /// Requested round
        round: u64,
        /// First round of the range
        first: u64,
        /// Last round of the range
        last: u64,
    },
    /// A proof was requested for a leaf beyond the committed length.
    PositionOutOfRange {
        /// Requested position
        position: u64,
        /// Number of committed leaves
        len: u64,
    },
    /// The position carried by a signature disagrees with the one derived from its round.
    PositionMismatch {
        /// Position derived from the round
        expected: u64,
        /// Position carried by the signature
        found: u64,
    },
    /// The Merkle root recomputed from the proof does not match the commitment.
    ProofInvalid,
    /// The one-time signature does not verify under the committed key.
    SignatureInvalid,
    /// The byte representation is structurally malformed.
    Decoding(String),
    /// The scheme selector found in an encoding is not the expected one.
    UnknownScheme(u8),
    /// This error occurs when a base signature (ed25519) is invalid.
    Ed25519Signature(String),
    /// This error occurs when a slice of bytes is converted into a compressed
    /// point format, and it fails.
    Ed25519InvalidCompressedFormat,
    /// Error occurs when the size of the public key is not the expected.
    InvalidPublicKeySize(usize),
    /// Error occurs when the size of the signature is not the expected.
    InvalidSignatureSize(usize),
    /// A monotonic signer was asked for a round it already moved past.
    RoundAlreadySigned {
        /// Requested round
        round: u64,
        /// Highest round signed so far
        last_signed: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRange { first, last } => {
                write!(f, "invalid validity range [{}, {}]", first, last)
            }
            Error::OutOfRange { round, first, last } => {
                write!(f, "round {} outside of [{}, {}]", round, first, last)
            }
            Error::PositionOutOfRange { position, len } => {
                write!(f, "position {} beyond {} committed leaves", position, len)
            }
            Error::PositionMismatch { expected, found } => write!(
                f,
                "signature position {} does not match round position {}",
                found, expected
            ),
            Error::ProofInvalid => write!(f, "merkle proof does not match the root"),
            Error::SignatureInvalid => write!(f, "one-time signature is invalid"),
            Error::Decoding(msg) => write!(f, "decoding error: {}", msg),
            Error::UnknownScheme(id) => write!(f, "unknown signature scheme {}", id),
            Error::Ed25519Signature(msg) => write!(f, "ed25519 error: {}", msg),
            Error::Ed25519InvalidCompressedFormat => {
                write!(f, "bytes are not a compressed ed25519 point")
            }
            Error::InvalidPublicKeySize(size) => write!(f, "invalid public key size {}", size),
            Error::InvalidSignatureSize(size) => write!(f, "invalid signature size {}", size),
            Error::RoundAlreadySigned { round, last_signed } => write!(
                f,
                "round {} is not after the last signed round {}",
                round, last_signed
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<ed25519::SignatureError> for Error {
    fn from(sig: ed25519::SignatureError) -> Error {
        Error::Ed25519Signature(format!("{:?}", sig))
    }
}
