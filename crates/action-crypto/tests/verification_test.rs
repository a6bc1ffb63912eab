use action_crypto::*;
use base64::{engine::general_purpose, Engine};
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use proptest::prelude::*;
use std::sync::Arc;

const SIGNER: &str = "lumera1testsigner";

fn setup(seed: u8) -> (SigningKey, SignatureVerifier) {
    let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let accounts = Arc::new(MemoryAccountKeeper::new());
    accounts.set_public_key(
        SIGNER,
        signing_key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
    );
    (signing_key, SignatureVerifier::new(accounts))
}

fn sign_b64(key: &SigningKey, msg: &[u8]) -> String {
    let sig: Signature = key.sign(msg);
    general_purpose::STANDARD.encode(sig.to_bytes())
}

#[test]
fn test_raw_payload_signature_verifies() {
    let (key, verifier) = setup(0x11);
    let payload = "eyJkYXRhX2hhc2giOiJhYmMifQ==";

    let signature = sign_b64(&key, payload.as_bytes());
    verifier.verify(payload, &signature, SIGNER).unwrap();
}

#[test]
fn test_sign_doc_signature_verifies() {
    let (key, verifier) = setup(0x22);
    let payload = "cGF5bG9hZA==";

    let sign_doc = adr36_sign_bytes(payload, SIGNER).unwrap();
    let signature = sign_b64(&key, &sign_doc);
    verifier.verify(payload, &signature, SIGNER).unwrap();
}

#[test]
fn test_der_signature_verifies() {
    let (key, verifier) = setup(0x33);
    let payload = "der-payload";

    let sig: Signature = key.sign(payload.as_bytes());
    let der = general_purpose::STANDARD.encode(sig.to_der().as_bytes());
    verifier.verify(payload, &der, SIGNER).unwrap();
}

#[test]
fn test_unrelated_payload_rejected() {
    let (key, verifier) = setup(0x44);

    let signature = sign_b64(&key, b"something else");
    let err = verifier.verify("payload", &signature, SIGNER).unwrap_err();
    assert!(matches!(err, CryptoError::SignatureVerificationFailed));

    let action_err: action_types::ActionError = err.into();
    assert_eq!(action_err.kind(), action_types::ErrorKind::InvalidSignature);
}

#[test]
fn test_signature_from_other_key_rejected() {
    let (_, verifier) = setup(0x55);
    let (other_key, _) = setup(0x66);

    let signature = sign_b64(&other_key, b"payload");
    assert!(verifier.verify("payload", &signature, SIGNER).is_err());
}

#[test]
fn test_bad_base64_rejected() {
    let (_, verifier) = setup(0x77);
    let err = verifier.verify("payload", "not//base64!!", SIGNER).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidSignatureEncoding(_)));
}

#[test]
fn test_id_mismatch_maps_to_invalid_id() {
    let mut ids = create_kademlia_ids("sig", 0, 2).unwrap();
    ids[0] = "wrong".to_string();
    let err = verify_kademlia_ids_at(&ids, "sig", 0, 2, 0).unwrap_err();

    let action_err: action_types::ActionError = err.into();
    assert_eq!(action_err.kind(), action_types::ErrorKind::InvalidId);
}

proptest! {
    #[test]
    fn prop_generated_lists_always_verify(
        signature in "[A-Za-z0-9+/=.]{1,64}",
        counter_start in 0u64..1_000_000,
        count in 1u64..20,
    ) {
        let ids = create_kademlia_ids(&signature, counter_start, count).unwrap();
        prop_assert!(verify_kademlia_ids(&ids, &signature, counter_start, count).is_ok());
    }

    #[test]
    fn prop_wrong_length_always_rejected(
        counter_start in 0u64..1_000,
        count in 2u64..20,
    ) {
        let ids = create_kademlia_ids("sig", counter_start, count).unwrap();
        prop_assert!(verify_kademlia_ids(&ids[1..], "sig", counter_start, count).is_err());
        prop_assert!(verify_kademlia_ids(&ids, "sig", counter_start, count + 1).is_err());
    }

    #[test]
    fn prop_tampered_index_caught_when_checked(
        count in 1u64..20,
        tamper in 0u64..20,
    ) {
        let tamper = tamper % count;
        let mut ids = create_kademlia_ids("sig", 0, count).unwrap();
        ids[tamper as usize] = create_kademlia_id("forged", tamper).unwrap();
        prop_assert!(verify_kademlia_ids_at(&ids, "sig", 0, count, tamper).is_err());
    }
}

#[test]
fn test_single_tamper_rejected_over_repeated_trials() {
    let count = 4;
    let mut ids = create_kademlia_ids("sig", 3, count).unwrap();
    ids[1] = create_kademlia_id("sig", 1000).unwrap();

    let rejected = (0..200)
        .filter(|_| verify_kademlia_ids(&ids, "sig", 3, count).is_err())
        .count();
    // Expected 50 rejections; zero over 200 draws has probability (3/4)^200
    assert!(rejected > 0);
}
