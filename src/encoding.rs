//! Byte representations of signatures and verifiers. All integers are big endian.
//!
//! A signature is encoded as
//! ( scheme_id || round || pos || verifying_key || n || digest_1 || .. || digest_n || sigma )
//! with `scheme_id` one byte, `round` and `pos` eight bytes, `n` four bytes, and the
//! key and `sigma` of the sizes fixed by the scheme. A verifier is encoded as
//! ( scheme_id || root || first || last ). A root is its 32 raw bytes
//! (`Digest::as_bytes` and `Digest::from_bytes`).
use crate::common::{Digest, DIGEST_SIZE};
use crate::errors::Error;
use crate::keystore::{Signature, Verifier, VerifyingKeyRef};
use crate::merkle::Proof;
use crate::traits::OneTimeScheme;

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], Error> {
        if self.bytes.len() < n {
            return Err(Error::Decoding(format!(
                "{} needs {} bytes, {} left",
                what,
                n,
                self.bytes.len()
            )));
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn u8(&mut self, what: &str) -> Result<u8, Error> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> Result<u32, Error> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_be_bytes(b))
    }

    fn u64(&mut self, what: &str) -> Result<u64, Error> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(b))
    }

    fn finish(self) -> Result<(), Error> {
        if !self.bytes.is_empty() {
            return Err(Error::Decoding(format!(
                "{} trailing bytes",
                self.bytes.len()
            )));
        }
        Ok(())
    }
}

fn scheme_id<S: OneTimeScheme>(reader: &mut Reader<'_>) -> Result<(), Error> {
    let id = reader.u8("scheme id")?;
    if id != S::SCHEME_ID {
        return Err(Error::UnknownScheme(id));
    }
    Ok(())
}

impl<S: OneTimeScheme> Signature<S> {
    /// Byte size of the encoding of a signature carrying `proof_len` digests.
    pub fn encoded_size(proof_len: usize) -> usize {
        1 + 8 + 8 + S::VERIFYING_KEY_SIZE + 4 + proof_len * DIGEST_SIZE + S::SIGNATURE_SIZE
    }

    /// Convert `Self` into its byte representation:
    /// ( scheme_id || round || pos || verifying_key || n || digest_1 || .. || digest_n || sigma )
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_size(self.proof.len()));
        out.push(S::SCHEME_ID);
        out.extend_from_slice(&self.vkey.round.to_be_bytes());
        out.extend_from_slice(&self.vkey.pos.to_be_bytes());
        out.extend_from_slice(self.vkey.verifying_key.as_ref());
        out.extend_from_slice(&(self.proof.len() as u32).to_be_bytes());
        for digest in self.proof.digests() {
            out.extend_from_slice(digest.as_bytes());
        }
        out.extend_from_slice(self.byte_signature.as_ref());
        out
    }

    /// Convert a byte slice into a signature.
    ///
    /// # Errors
    /// The function fails if
    /// * the scheme id is not `S::SCHEME_ID`
    /// * `bytes` is shorter or longer than the size announced by its header
    /// * the key or the signature bytes are rejected by the scheme
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader { bytes };
        scheme_id::<S>(&mut reader)?;
        let round = reader.u64("round")?;
        let pos = reader.u64("position")?;
        let verifying_key =
            S::verifying_key_from_bytes(reader.take(S::VERIFYING_KEY_SIZE, "verifying key")?)?;

        let proof_len = reader.u32("proof length")? as usize;
        let proof_bytes = proof_len
            .checked_mul(DIGEST_SIZE)
            .ok_or_else(|| Error::Decoding(format!("proof length {} overflows", proof_len)))?;
        let proof = reader
            .take(proof_bytes, "proof")?
            .chunks(DIGEST_SIZE)
            .map(Digest::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;

        let byte_signature = S::signature_from_bytes(reader.take(S::SIGNATURE_SIZE, "signature")?)?;
        reader.finish()?;

        Ok(Self {
            vkey: VerifyingKeyRef {
                verifying_key,
                pos,
                round,
            },
            proof: Proof(proof),
            byte_signature,
        })
    }
}

const VERIFIER_SIZE: usize = 1 + DIGEST_SIZE + 8 + 8;

impl<S: OneTimeScheme> Verifier<S> {
    /// Byte size of an encoded verifier.
    pub const SIZE: usize = VERIFIER_SIZE;

    /// Convert `Self` into ( scheme_id || root || first || last ).
    pub fn to_bytes(&self) -> [u8; VERIFIER_SIZE] {
        let root_end = 1 + DIGEST_SIZE;
        let first_end = root_end + 8;

        let mut out = [0u8; VERIFIER_SIZE];
        out[0] = S::SCHEME_ID;
        out[1..root_end].copy_from_slice(self.root().as_bytes());
        out[root_end..first_end].copy_from_slice(&self.range().first().to_be_bytes());
        out[first_end..].copy_from_slice(&self.range().last().to_be_bytes());
        out
    }

    /// Rebuild a verifier for `scheme` from its byte representation.
    ///
    /// # Errors
    /// Fails if the size or the scheme id are wrong, or if the range is invalid.
    pub fn from_bytes(bytes: &[u8], scheme: S) -> Result<Self, Error> {
        if bytes.len() != Self::SIZE {
            return Err(Error::Decoding(format!(
                "verifier must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        let mut reader = Reader { bytes };
        scheme_id::<S>(&mut reader)?;
        let root = Digest::from_bytes(reader.take(DIGEST_SIZE, "root")?)?;
        let first = reader.u64("first round")?;
        let last = reader.u64("last round")?;
        reader.finish()?;

        Verifier::new(root, first, last, scheme)
    }
}
