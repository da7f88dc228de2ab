//! Traits that define the one-time signature capability and signable messages
use crate::common::Seed;
use crate::errors::Error;
use std::borrow::Cow;
use std::fmt::Debug;

/// A message that can be reduced to a canonical byte representation before being
/// signed.
pub trait Hashable {
    /// Canonical bytes of `self`.
    fn to_be_hashed(&self) -> Cow<'_, [u8]>;
}

impl Hashable for [u8] {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> Hashable for [u8; N] {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self[..])
    }
}

impl Hashable for Vec<u8> {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl Hashable for str {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Hashable for String {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Hashable for crate::common::Digest {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl<T: Hashable + ?Sized> Hashable for &T {
    fn to_be_hashed(&self) -> Cow<'_, [u8]> {
        (**self).to_be_hashed()
    }
}

/// Trait that defines a one-time signature scheme. A value implementing it is the
/// scheme selector handed to `Signer::new` and `Verifier::new`.
///
/// # Example
/// ```
/// use merkle_keystore_ed25519::single_ots::Ed25519Ots;
/// use merkle_keystore_ed25519::traits::OneTimeScheme;
///
/// let (sk, vk) = Ed25519Ots.keygen(&mut [1u8; 32]);
/// let dummy_message = b"tilin";
/// let sigma = Ed25519Ots.sign(&sk, dummy_message);
///
/// assert!(Ed25519Ots.verify(&vk, dummy_message, &sigma).is_ok());
/// assert!(Ed25519Ots.verify(&vk, b"tolon", &sigma).is_err());
/// ```
pub trait OneTimeScheme: Debug + Clone + Send + Sync {
    /// Selector byte written at the start of every encoded signature.
    const SCHEME_ID: u8;
    /// Byte size of a verifying key.
    const VERIFYING_KEY_SIZE: usize;
    /// Byte size of a signature.
    const SIGNATURE_SIZE: usize;

    /// Secret half of a one-time keypair.
    type SigningKey: Send + Sync;
    /// Public half of a one-time keypair.
    type VerifyingKey: Clone + Debug + PartialEq + Eq + AsRef<[u8]> + Send + Sync;
    /// Signature produced by `sign`.
    type Signature: Clone + Debug + PartialEq + Eq + AsRef<[u8]> + Send + Sync;

    /// Key generation. Takes a mutable seed and overwrites it with zeroes.
    fn keygen(&self, seed: &mut [u8; Seed::SIZE]) -> (Self::SigningKey, Self::VerifyingKey);

    /// Sign `m` with `sk`.
    fn sign(&self, sk: &Self::SigningKey, m: &[u8]) -> Self::Signature;

    /// Verify `sigma` over `m` under `vk`.
    fn verify(&self, vk: &Self::VerifyingKey, m: &[u8], sigma: &Self::Signature)
        -> Result<(), Error>;

    /// Parse a verifying key of exactly `VERIFYING_KEY_SIZE` bytes.
    fn verifying_key_from_bytes(bytes: &[u8]) -> Result<Self::VerifyingKey, Error>;

    /// Parse a signature of exactly `SIGNATURE_SIZE` bytes.
    fn signature_from_bytes(bytes: &[u8]) -> Result<Self::Signature, Error>;
}
