//! Bank of ephemeral keys: one one-time keypair per round of the validity range, generated
//! eagerly and stored in a flat array indexed by position.
use crate::common::{leaf_encoding, Seed, ValidityRange};
use crate::errors::Error;
use crate::traits::OneTimeScheme;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// One-time keypair bound to a single position.
pub struct EphemeralKey<S: OneTimeScheme> {
    pub(crate) signing_key: S::SigningKey,
    pub(crate) verifying_key: S::VerifyingKey,
}

impl<S: OneTimeScheme> EphemeralKey<S> {
    /// Verifying half of the keypair.
    pub fn verifying_key(&self) -> &S::VerifyingKey {
        &self.verifying_key
    }
}

/// The keypairs of every round in `[first, last]`. Immutable once generated; a new
/// range needs a new bank.
pub struct EphemeralKeys<S: OneTimeScheme> {
    range: ValidityRange,
    keys: Vec<EphemeralKey<S>>,
}

impl<S: OneTimeScheme> EphemeralKeys<S> {
    /// Generate the keypair of every position of `range`. The key at position `p` is
    /// derived from `seed.derive(p)`, so no two positions share a keypair.
    pub fn generate(range: ValidityRange, scheme: &S, seed: &Seed) -> Self {
        let keygen = |position: u64| {
            let mut position_seed = seed.derive(position);
            let (signing_key, verifying_key) = scheme.keygen(&mut position_seed);
            EphemeralKey {
                signing_key,
                verifying_key,
            }
        };

        #[cfg(not(feature = "parallel"))]
        let keys: Vec<EphemeralKey<S>> = (0..range.len()).map(keygen).collect();

        #[cfg(feature = "parallel")]
        let keys: Vec<EphemeralKey<S>> = (0..range.len()).into_par_iter().map(keygen).collect();

        Self { range, keys }
    }

    /// Validity range of the bank.
    pub fn range(&self) -> ValidityRange {
        self.range
    }

    /// Number of keypairs, equal to the range length.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// A bank always holds at least one keypair.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of the key that signs `round`.
    pub fn key_position(&self, round: u64) -> Result<u64, Error> {
        self.range.position(round)
    }

    /// Keypair stored at `position`.
    pub fn get(&self, position: u64) -> Result<&EphemeralKey<S>, Error> {
        self.keys
            .get(position as usize)
            .ok_or(Error::PositionOutOfRange {
                position,
                len: self.keys.len() as u64,
            })
    }

    /// Verifying key stored at `position`.
    pub fn verifying_key(&self, position: u64) -> Result<&S::VerifyingKey, Error> {
        self.get(position).map(EphemeralKey::verifying_key)
    }

    /// Verifying keys in position order.
    pub fn iter_verifying_keys(&self) -> impl Iterator<Item = &S::VerifyingKey> + '_ {
        self.keys.iter().map(EphemeralKey::verifying_key)
    }

    /// Leaf encodings of every verifying key, in position order.
    pub(crate) fn leaf_encodings(&self) -> Vec<Vec<u8>> {
        self.iter_verifying_keys()
            .enumerate()
            .map(|(position, vk)| leaf_encoding(position as u64, vk.as_ref()))
            .collect()
    }
}

impl<S: OneTimeScheme> fmt::Debug for EphemeralKeys<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeys")
            .field("range", &self.range)
            .field("keys", &self.keys.len())
            .finish()
    }
}
