//! Signer and verifier of the Merkle key store.
//!
//! A `Signer` generates one ephemeral keypair per round of `[first, last]` and commits to
//! all the verifying keys in a Merkle tree. Each `Signature` carries the verifying key
//! used, its position and round, and the audit path of that key, so that a `Verifier`
//! only needs the root and the range.
use crate::common::{leaf_encoding, Root, Seed, ValidityRange};
use crate::errors::Error;
use crate::keybank::EphemeralKeys;
use crate::merkle::{self, MerkleTree, Proof};
use crate::single_ots::Ed25519Ots;
use crate::traits::{Hashable, OneTimeScheme};
use std::fmt;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Verifying key embedded in a signature, together with the position and round it
/// was used for. The round is authoritative; the position must match it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde_enabled",
    serde(bound(
        serialize = "S::VerifyingKey: Serialize",
        deserialize = "S::VerifyingKey: Deserialize<'de>"
    ))
)]
pub struct VerifyingKeyRef<S: OneTimeScheme> {
    /// One-time verifying key.
    pub verifying_key: S::VerifyingKey,
    /// Position of the key in the tree.
    pub pos: u64,
    /// Round the key was used for.
    pub round: u64,
}

/// Signature produced by a `Signer`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde_enabled",
    serde(bound(
        serialize = "S::VerifyingKey: Serialize, S::Signature: Serialize",
        deserialize = "S::VerifyingKey: Deserialize<'de>, S::Signature: Deserialize<'de>"
    ))
)]
pub struct Signature<S: OneTimeScheme = Ed25519Ots> {
    /// Key, position and round.
    pub vkey: VerifyingKeyRef<S>,
    /// Audit path of the key.
    pub proof: Proof,
    /// One-time signature over the message.
    pub byte_signature: S::Signature,
}

/// Holder of the ephemeral keys of a validity range and of their commitment.
pub struct Signer<S: OneTimeScheme = Ed25519Ots> {
    scheme: S,
    keys: EphemeralKeys<S>,
    tree: MerkleTree,
}

impl<S: OneTimeScheme> Signer<S> {
    /// Generate the keys of every round in `[first, last]` from a random seed and
    /// commit to them.
    ///
    /// # Errors
    /// Fails with `InvalidRange` if `first > last`.
    pub fn new(first: u64, last: u64, scheme: S) -> Result<Self, Error> {
        let range = ValidityRange::new(first, last)?;
        Ok(Self::generate(range, scheme, &Seed::random()))
    }

    /// Same as `new`, deriving the keys from `seed` which is overwritten with zeros.
    ///
    /// # Errors
    /// Fails with `InvalidRange` if `first > last`, or if `seed` is not `Seed::SIZE`
    /// bytes long.
    pub fn from_seed(first: u64, last: u64, scheme: S, seed: &mut [u8]) -> Result<Self, Error> {
        let range = ValidityRange::new(first, last);
        let seed = Seed::take_from_slice(seed)?;
        Ok(Self::generate(range?, scheme, &seed))
    }

    fn generate(range: ValidityRange, scheme: S, seed: &Seed) -> Self {
        let keys = EphemeralKeys::generate(range, &scheme, seed);
        let tree = MerkleTree::build(&keys.leaf_encodings());
        log::info!(
            "generated {} ephemeral keys for rounds [{}, {}], root {}",
            keys.len(),
            range.first(),
            range.last(),
            tree.root()
        );
        Self { scheme, keys, tree }
    }

    /// Sign `message` with the key of `round`.
    ///
    /// # Errors
    /// Fails with `OutOfRange` if `round` is not in `[first, last]`; no cryptographic
    /// work is done in that case.
    pub fn sign<H: Hashable + ?Sized>(
        &self,
        message: &H,
        round: u64,
    ) -> Result<Signature<S>, Error> {
        let pos = self.keys.key_position(round)?;
        let key = self.keys.get(pos)?;
        let byte_signature = self.scheme.sign(&key.signing_key, &message.to_be_hashed());
        let proof = self.tree.prove(&[pos])?;

        Ok(Signature {
            vkey: VerifyingKeyRef {
                verifying_key: key.verifying_key.clone(),
                pos,
                round,
            },
            proof,
            byte_signature,
        })
    }

    /// Proof of membership of the keys at `positions`, verifiable with
    /// `merkle::verify_batch`.
    pub fn prove(&self, positions: &[u64]) -> Result<Proof, Error> {
        self.tree.prove(positions)
    }

    /// Commitment to every verifying key.
    pub fn root(&self) -> Root {
        self.tree.root()
    }

    /// Position of the key used for `round`.
    pub fn key_position(&self, round: u64) -> Result<u64, Error> {
        self.keys.key_position(round)
    }

    /// Validity range of the signer.
    pub fn range(&self) -> ValidityRange {
        self.keys.range()
    }

    /// First round the signer can sign.
    pub fn first(&self) -> u64 {
        self.range().first()
    }

    /// Last round the signer can sign.
    pub fn last(&self) -> u64 {
        self.range().last()
    }

    /// Number of rounds, and of keys, of the signer.
    pub fn len(&self) -> u64 {
        self.range().len()
    }

    /// Always `false`: a signer holds at least one key.
    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// The ephemeral key bank.
    pub fn ephemeral_keys(&self) -> &EphemeralKeys<S> {
        &self.keys
    }

    /// Verifier for the signatures of `self`, holding no secret material.
    pub fn verifier(&self) -> Verifier<S> {
        Verifier {
            scheme: self.scheme.clone(),
            root: self.root(),
            range: self.range(),
        }
    }
}

impl<S: OneTimeScheme> fmt::Debug for Signer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("scheme", &self.scheme)
            .field("keys", &self.keys)
            .field("root", &self.root())
            .finish()
    }
}

/// Checks signatures against a root and a validity range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier<S: OneTimeScheme = Ed25519Ots> {
    scheme: S,
    root: Root,
    range: ValidityRange,
}

impl<S: OneTimeScheme> Verifier<S> {
    /// Build a verifier from an exported root and the range it commits to.
    ///
    /// # Errors
    /// Fails with `InvalidRange` if `first > last`.
    pub fn new(root: Root, first: u64, last: u64, scheme: S) -> Result<Self, Error> {
        Ok(Self {
            scheme,
            root,
            range: ValidityRange::new(first, last)?,
        })
    }

    /// Root the verifier checks proofs against.
    pub fn root(&self) -> Root {
        self.root
    }

    /// Validity range of the verifier.
    pub fn range(&self) -> ValidityRange {
        self.range
    }

    /// Verify `sig` over `message`. The checks run in order and the first failure is
    /// returned:
    /// * the round must be in range (`OutOfRange`),
    /// * the carried position must equal the one derived from the round
    ///   (`PositionMismatch`),
    /// * the key must be a leaf of the tree at that position (`ProofInvalid`),
    /// * the one-time signature must verify under the key (`SignatureInvalid`).
    pub fn verify<H: Hashable + ?Sized>(
        &self,
        message: &H,
        sig: &Signature<S>,
    ) -> Result<(), Error> {
        let vkey = &sig.vkey;

        let expected = self.range.position(vkey.round).map_err(|e| {
            log::debug!("rejecting signature: {}", e);
            e
        })?;

        if expected != vkey.pos {
            log::debug!(
                "rejecting signature: position {} given for round {}",
                vkey.pos,
                vkey.round
            );
            return Err(Error::PositionMismatch {
                expected,
                found: vkey.pos,
            });
        }

        let leaf = leaf_encoding(vkey.pos, vkey.verifying_key.as_ref());
        if sig.proof.len() != self.range.depth()
            || !merkle::verify(&self.root, vkey.pos, &leaf, &sig.proof)
        {
            log::debug!("rejecting signature: merkle proof failed for round {}", vkey.round);
            return Err(Error::ProofInvalid);
        }

        let m = message.to_be_hashed();
        if let Err(e) = self
            .scheme
            .verify(&vkey.verifying_key, &m, &sig.byte_signature)
        {
            log::debug!("rejecting signature: one-time signature failed: {}", e);
            return Err(Error::SignatureInvalid);
        }

        log::trace!("signature for round {} verified", vkey.round);
        Ok(())
    }

    /// Whether `sig` is a valid signature of `message`.
    pub fn is_valid<H: Hashable + ?Sized>(&self, message: &H, sig: &Signature<S>) -> bool {
        self.verify(message, sig).is_ok()
    }
}
