//! A Merkle key store: range-bounded ephemeral signing keys.
//!
//! A signer generates one ed25519 keypair per round of a validity range `[first, last]`
//! and commits to all the verifying keys with a Merkle tree. Each signature carries the
//! verifying key of its round together with an audit path, so a verifier holding only
//! the root and the range can check signatures for any round.
//!
//! # Example
//! ```
//! use merkle_keystore_ed25519::keystore::{Signer, Verifier};
//! use merkle_keystore_ed25519::single_ots::Ed25519Ots;
//!
//! let signer = Signer::new(50, 100, Ed25519Ots).unwrap();
//! let sig = signer.sign(b"tilin", 51).unwrap();
//!
//! let verifier = Verifier::new(signer.root(), 50, 100, Ed25519Ots).unwrap();
//! assert!(verifier.verify(b"tilin", &sig).is_ok());
//! assert!(signer.sign(b"tilin", 101).is_err());
//! ```
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
mod encoding;
pub mod errors;
pub mod guard;
pub mod keybank;
pub mod keystore;
pub mod merkle;
pub mod single_ots;
pub mod traits;

pub use common::{Digest, Root, ValidityRange};
pub use errors::Error;
pub use keystore::{Signature, Signer, Verifier};
