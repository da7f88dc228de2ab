//! Implementation of the one-time signature committed at every leaf of the key store.
//! This is a standard signature mechanism used once per round; in this case, the single
//! instance is ed25519.
use crate::common::Seed;
use crate::errors::Error;
use crate::traits::OneTimeScheme;
use ed25519_dalek::{
    Signature as EdSignature, Signer, SigningKey as EdSigningKey,
    VerifyingKey as EdVerifyingKey, SIGNATURE_LENGTH,
};
pub use ed25519_dalek::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "serde_enabled")]
use {
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    serde_with::{Bytes, DeserializeAs, SerializeAs},
};

/// Scheme selector for ed25519 one-time keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519Ots;

/// Secret ed25519 key of a single round, wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519SigningKey(pub(crate) [u8; SECRET_KEY_LENGTH]);

/// Verifying ed25519 key of a single round, as its compressed point representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
pub struct Ed25519VerifyingKey(pub(crate) [u8; PUBLIC_KEY_LENGTH]);

/// Ed25519 signature over a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub(crate) [u8; SIGNATURE_LENGTH]);

impl OneTimeScheme for Ed25519Ots {
    const SCHEME_ID: u8 = 1;
    const VERIFYING_KEY_SIZE: usize = PUBLIC_KEY_LENGTH;
    const SIGNATURE_SIZE: usize = SIGNATURE_LENGTH;

    type SigningKey = Ed25519SigningKey;
    type VerifyingKey = Ed25519VerifyingKey;
    type Signature = Ed25519Signature;

    fn keygen(&self, seed: &mut [u8; Seed::SIZE]) -> (Ed25519SigningKey, Ed25519VerifyingKey) {
        let secret: [u8; SECRET_KEY_LENGTH] = *seed;
        seed.zeroize();

        let public = EdSigningKey::from_bytes(&secret).verifying_key();
        (Ed25519SigningKey(secret), Ed25519VerifyingKey(public.to_bytes()))
    }

    fn sign(&self, sk: &Ed25519SigningKey, m: &[u8]) -> Ed25519Signature {
        let ed_sk = EdSigningKey::from_bytes(&sk.0);
        Ed25519Signature(ed_sk.sign(m).to_bytes())
    }

    fn verify(
        &self,
        vk: &Ed25519VerifyingKey,
        m: &[u8],
        sigma: &Ed25519Signature,
    ) -> Result<(), Error> {
        let ed_vk = vk.to_ed25519()?;
        ed_vk
            .verify_strict(m, &EdSignature::from_bytes(&sigma.0))
            .map_err(Error::from)
    }

    fn verifying_key_from_bytes(bytes: &[u8]) -> Result<Ed25519VerifyingKey, Error> {
        Ed25519VerifyingKey::from_bytes(bytes)
    }

    fn signature_from_bytes(bytes: &[u8]) -> Result<Ed25519Signature, Error> {
        Ed25519Signature::from_bytes(bytes)
    }
}

impl fmt::Debug for Ed25519SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ed25519SigningKey(..)")
    }
}

impl Ed25519SigningKey {
    /// Size of the secret key
    pub const SIZE: usize = SECRET_KEY_LENGTH;

    /// Return the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Ed25519VerifyingKey {
    /// Size of the verifying key
    pub const SIZE: usize = PUBLIC_KEY_LENGTH;

    /// Tries to convert a slice of `bytes` as `Self`.
    ///
    /// # Errors
    /// This function returns an error if the length of `bytes` is not equal to
    /// `PUBLIC_KEY_LENGTH`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::SIZE {
            return Err(Error::InvalidPublicKeySize(bytes.len()));
        }

        let mut key = [0u8; Self::SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Return `Self` as its byte representation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn to_ed25519(&self) -> Result<EdVerifyingKey, Error> {
        EdVerifyingKey::from_bytes(&self.0).or(Err(Error::Ed25519InvalidCompressedFormat))
    }
}

impl AsRef<[u8]> for Ed25519VerifyingKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Ed25519Signature {
    /// Size of an ed25519 signature
    pub const SIZE: usize = SIGNATURE_LENGTH;

    /// Convert a byte array into a signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::SIZE {
            return Err(Error::InvalidSignatureSize(bytes.len()));
        }

        let mut signature = [0u8; Self::SIZE];
        signature.copy_from_slice(bytes);
        Ok(Self(signature))
    }

    /// Return `Self` as a byte array.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        self.0
    }
}

impl AsRef<[u8]> for Ed25519Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde_enabled")]
impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        <Bytes as SerializeAs<[u8; SIGNATURE_LENGTH]>>::serialize_as(&self.0, serializer)
    }
}

#[cfg(feature = "serde_enabled")]
impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Bytes as DeserializeAs<'de, [u8; SIGNATURE_LENGTH]>>::deserialize_as(deserializer)
            .map(Ed25519Signature)
    }
}
