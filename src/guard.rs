//! Single-use enforcement on top of a `Signer`.
//!
//! A `Signer` never consumes its keys, so the same round can be signed twice. When every
//! round must be signed at most once, wrap the signer in a `MonotonicSigner`, which
//! only signs rounds strictly greater than the last one it signed.
use crate::errors::Error;
use crate::keystore::{Signature, Signer};
use crate::single_ots::Ed25519Ots;
use crate::traits::{Hashable, OneTimeScheme};
use std::sync::Mutex;

/// Signer that refuses to go back in rounds.
#[derive(Debug)]
pub struct MonotonicSigner<S: OneTimeScheme = Ed25519Ots> {
    signer: Signer<S>,
    last_signed: Mutex<Option<u64>>,
}

impl<S: OneTimeScheme> MonotonicSigner<S> {
    /// Wrap `signer`; no round has been signed yet.
    pub fn new(signer: Signer<S>) -> Self {
        Self {
            signer,
            last_signed: Mutex::new(None),
        }
    }

    /// Sign `message` for `round`, provided `round` is after every round signed so far.
    ///
    /// # Errors
    /// Fails with `RoundAlreadySigned` if `round` is not after the last signed round,
    /// and with the errors of `Signer::sign` otherwise.
    pub fn sign<H: Hashable + ?Sized>(
        &self,
        message: &H,
        round: u64,
    ) -> Result<Signature<S>, Error> {
        let mut last_signed = self
            .last_signed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = *last_signed {
            if round <= last {
                log::warn!("refusing to sign round {} after round {}", round, last);
                return Err(Error::RoundAlreadySigned {
                    round,
                    last_signed: last,
                });
            }
        }

        let sig = self.signer.sign(message, round)?;
        *last_signed = Some(round);
        Ok(sig)
    }

    /// Last round signed through `self`, if any.
    pub fn last_signed(&self) -> Option<u64> {
        *self
            .last_signed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The wrapped signer, e.g. to export its root or verifier.
    pub fn signer(&self) -> &Signer<S> {
        &self.signer
    }

    /// Unwrap the signer.
    pub fn into_inner(self) -> Signer<S> {
        self.signer
    }
}
