//! End to end checks of the signer and verifier: range handling, key positions, the
//! structure of signatures, and rejection of every tampered field.
use merkle_keystore_ed25519::common::Digest;
use merkle_keystore_ed25519::errors::Error;
use merkle_keystore_ed25519::keystore::{Signature, Signer, Verifier};
use merkle_keystore_ed25519::single_ots::Ed25519Ots;
use quickcheck_macros::quickcheck;
use std::sync::Arc;
use std::thread;

const MESSAGE: &[u8] = b"test message";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn valid_signer() -> (u64, u64, Signer) {
    init_logger();
    let (start, end) = (50, 100);
    let signer = Signer::new(start, end, Ed25519Ots).expect("valid range");
    (start, end, signer)
}

fn make_sig(signer: &Signer, start: u64) -> Signature {
    let sig = signer.sign(MESSAGE, start + 1).unwrap();
    assert!(signer.verifier().verify(MESSAGE, &sig).is_ok());
    sig
}

#[test]
fn signer_creation() {
    init_logger();
    for i in 0..20u64 {
        let signer = Signer::new(i, i + 1, Ed25519Ots).unwrap();
        assert!(signer.sign(MESSAGE, i).is_ok());
    }

    assert_eq!(
        Signer::new(1, 0, Ed25519Ots).unwrap_err(),
        Error::InvalidRange { first: 1, last: 0 }
    );
    assert!(Verifier::new(Digest::EMPTY, 1, 0, Ed25519Ots).is_err());

    let signer = Signer::new(0, 0, Ed25519Ots).unwrap();
    let sig = signer.sign(MESSAGE, 0).unwrap();
    assert!(signer.verifier().verify(MESSAGE, &sig).is_ok());
    assert_eq!(signer.ephemeral_keys().len(), 1);
    assert_eq!(signer.len(), 1);
    assert!(!signer.is_empty());

    let signer = Signer::new(1000, 1100, Ed25519Ots).unwrap();
    assert_eq!(signer.len(), 101);
    assert_eq!((signer.first(), signer.last()), (1000, 1100));
}

#[test]
fn disposable_key_positions() {
    let signer = Signer::new(0, 100, Ed25519Ots).unwrap();
    for i in 0..100 {
        assert_eq!(signer.key_position(i), Ok(i));
    }
    assert!(signer.key_position(101).is_err());

    let signer = Signer::new(1000, 1100, Ed25519Ots).unwrap();
    for i in 1000..1100 {
        assert_eq!(signer.key_position(i), Ok(i - 1000));
    }
    assert_eq!(signer.key_position(1000), Ok(0));
    assert_eq!(signer.key_position(1099), Ok(99));
    assert_eq!(
        signer.key_position(999),
        Err(Error::OutOfRange {
            round: 999,
            first: 1000,
            last: 1100
        })
    );
    assert!(signer.key_position(1101).is_err());
}

fn check_round(signer: &Signer, round: u64) -> bool {
    let (first, last) = (signer.first(), signer.last());
    if first <= round && round <= last {
        signer.key_position(round) == Ok(round - first)
            && signer
                .sign(MESSAGE, round)
                .map_or(false, |sig| sig.vkey.pos == round - first)
    } else {
        let out_of_range = Error::OutOfRange { round, first, last };
        signer.key_position(round) == Err(out_of_range.clone())
            && signer.sign(MESSAGE, round).err() == Some(out_of_range)
    }
}

#[quickcheck]
fn key_positions_follow_rounds(
    first: u64,
    extra: u8,
    near_top: bool,
    step: u8,
    round: u64,
) -> bool {
    let extra = u64::from(extra % 8);
    let first = if near_top {
        u64::MAX - extra
    } else {
        first.min(u64::MAX - extra)
    };
    let signer = Signer::from_seed(first, first + extra, Ed25519Ots, &mut [7u8; 32]).unwrap();

    let around_edges = first
        .wrapping_add(u64::from(step) % (extra + 3))
        .wrapping_sub(1);
    check_round(&signer, around_edges) && check_round(&signer, round)
}

#[test]
fn range_ending_at_the_last_round() {
    init_logger();
    let first = u64::MAX - 4;
    let signer = Signer::new(first, u64::MAX, Ed25519Ots).unwrap();
    assert_eq!(signer.len(), 5);
    assert_eq!(signer.key_position(u64::MAX), Ok(4));
    assert_eq!(
        signer.key_position(first - 1),
        Err(Error::OutOfRange {
            round: first - 1,
            first,
            last: u64::MAX
        })
    );

    let verifier = Verifier::from_bytes(&signer.verifier().to_bytes(), Ed25519Ots).unwrap();
    for round in first..=u64::MAX {
        let sig = signer.sign(MESSAGE, round).unwrap();
        assert_eq!(sig.vkey.pos, round - first);
        assert!(verifier.verify(MESSAGE, &sig).is_ok());
    }
    assert!(signer.sign(MESSAGE, first - 1).is_err());
}

#[test]
fn non_empty_disposable_keys() {
    let signer = Signer::new(0, 100, Ed25519Ots).unwrap();
    assert_eq!(signer.ephemeral_keys().len(), 101);
    for vk in signer.ephemeral_keys().iter_verifying_keys() {
        assert_ne!(vk.as_bytes(), &[0u8; 32][..]);
    }
}

#[test]
fn signature_structure() {
    let signer = Signer::new(50, 100, Ed25519Ots).unwrap();
    let sig = signer.sign(MESSAGE, 51).unwrap();

    let pos = signer.key_position(51).unwrap();
    assert_eq!(pos, 1);
    assert_eq!(sig.vkey.pos, pos);
    assert_eq!(sig.vkey.round, 51);
    assert_eq!(
        &sig.vkey.verifying_key,
        signer.ephemeral_keys().verifying_key(pos).unwrap()
    );

    let proof = signer.prove(&[1]).unwrap();
    assert_eq!(proof, sig.proof);
}

#[test]
fn signing() {
    let (start, end, signer) = valid_signer();

    let sig = signer.sign(MESSAGE, start + 1).unwrap();
    assert!(signer.verifier().verify(MESSAGE, &sig).is_ok());

    assert!(matches!(
        signer.sign(MESSAGE, start - 1),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        signer.sign(MESSAGE, end + 1),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn every_round_verifies() {
    let (start, end, signer) = valid_signer();
    let verifier = Verifier::new(signer.root(), start, end, Ed25519Ots).unwrap();
    for round in start..=end {
        let sig = signer.sign(MESSAGE, round).unwrap();
        assert!(verifier.verify(MESSAGE, &sig).is_ok(), "round {}", round);
    }
}

#[test]
fn bad_leaf_position_in_signature() {
    let (start, end, signer) = valid_signer();
    let verifier = signer.verifier();
    let sig = make_sig(&signer, start);

    let mut sig2 = sig.clone();
    sig2.vkey.pos += 1;
    assert!(matches!(
        verifier.verify(MESSAGE, &sig2),
        Err(Error::PositionMismatch { .. })
    ));

    let mut sig3 = sig2.clone();
    sig3.vkey.pos = end + 1;
    assert!(verifier.verify(MESSAGE, &sig3).is_err());

    let mut sig4 = sig2;
    sig4.vkey.pos = start - 1;
    assert!(verifier.verify(MESSAGE, &sig4).is_err());
}

#[test]
fn bad_merkle_proof_in_signature() {
    let (start, _, signer) = valid_signer();
    let verifier = signer.verifier();
    let sig = make_sig(&signer, start);

    let mut sig2 = sig.clone();
    sig2.proof.0.pop();
    assert_eq!(verifier.verify(MESSAGE, &sig2), Err(Error::ProofInvalid));

    for i in 0..sig.proof.len() {
        let mut sig3 = sig.clone();
        sig3.proof.0[i] = Digest::from_bytes(&[0xab; 32]).unwrap();
        assert_eq!(verifier.verify(MESSAGE, &sig3), Err(Error::ProofInvalid));
    }

    let mut sig4 = sig.clone();
    sig4.proof.0.swap(0, 1);
    assert_eq!(verifier.verify(MESSAGE, &sig4), Err(Error::ProofInvalid));

    // a genuine key of another position does not pass as this one
    let mut sig5 = sig;
    sig5.vkey.verifying_key = *signer.ephemeral_keys().verifying_key(2).unwrap();
    assert_eq!(verifier.verify(MESSAGE, &sig5), Err(Error::ProofInvalid));
}

#[test]
fn incorrect_byte_signature() {
    let (start, _, signer) = valid_signer();
    let verifier = signer.verifier();
    let sig = make_sig(&signer, start);

    let bytes = sig.to_bytes();
    let sigma_start = bytes.len() - 64;
    for i in [sigma_start, sigma_start + 17, bytes.len() - 1] {
        let mut tampered = bytes.clone();
        tampered[i] = tampered[i].wrapping_add(1);
        let sig2 = Signature::<Ed25519Ots>::from_bytes(&tampered).unwrap();
        assert_eq!(verifier.verify(MESSAGE, &sig2), Err(Error::SignatureInvalid));
    }

    assert_eq!(
        verifier.verify(b"another message", &sig),
        Err(Error::SignatureInvalid)
    );
}

#[test]
fn bad_round_in_signature() {
    let (start, end, signer) = valid_signer();
    let verifier = signer.verifier();
    let sig = make_sig(&signer, start);

    let mut sig2 = sig.clone();
    sig2.vkey.round += 1;
    assert!(matches!(
        verifier.verify(MESSAGE, &sig2),
        Err(Error::PositionMismatch { .. })
    ));

    let mut sig3 = sig.clone();
    sig3.vkey.pos -= 1;
    assert!(verifier.verify(MESSAGE, &sig3).is_err());

    let mut sig4 = sig;
    sig4.vkey.round = end + 1;
    assert!(matches!(
        verifier.verify(MESSAGE, &sig4),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn signature_from_another_signer() {
    let (start, end, signer) = valid_signer();
    let other = Signer::new(start, end, Ed25519Ots).unwrap();
    let sig = other.sign(MESSAGE, start + 3).unwrap();
    assert_eq!(
        signer.verifier().verify(MESSAGE, &sig),
        Err(Error::ProofInvalid)
    );
}

#[test]
fn verification_is_idempotent() {
    let (start, _, signer) = valid_signer();
    let verifier = signer.verifier();
    let sig = make_sig(&signer, start);
    let copy = sig.clone();

    assert!(verifier.verify(MESSAGE, &sig).is_ok());
    assert!(verifier.verify(MESSAGE, &sig).is_ok());
    assert_eq!(sig, copy);

    let mut bad = sig;
    bad.vkey.pos += 1;
    assert_eq!(verifier.verify(MESSAGE, &bad), verifier.verify(MESSAGE, &bad));
}

#[test]
fn encoded_signatures_verify() {
    let (start, _, signer) = valid_signer();
    let verifier = Verifier::from_bytes(&signer.verifier().to_bytes(), Ed25519Ots).unwrap();
    let sig = make_sig(&signer, start);

    let decoded = Signature::<Ed25519Ots>::from_bytes(&sig.to_bytes()).unwrap();
    assert_eq!(decoded, sig);
    assert!(verifier.verify(MESSAGE, &decoded).is_ok());

    let garbage = hex::decode("01000000000000003300").unwrap();
    assert!(matches!(
        Signature::<Ed25519Ots>::from_bytes(&garbage),
        Err(Error::Decoding(_))
    ));
}

#[test]
fn concurrent_signing_and_verification() {
    let (start, end, signer) = valid_signer();
    let signer = Arc::new(signer);
    let verifier = Arc::new(signer.verifier());

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let signer = Arc::clone(&signer);
            let verifier = Arc::clone(&verifier);
            thread::spawn(move || {
                for round in (start + t..=end).step_by(4) {
                    let message = format!("round {}", round);
                    let sig = signer.sign(&message, round).unwrap();
                    assert!(verifier.is_valid(&message, &sig));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
