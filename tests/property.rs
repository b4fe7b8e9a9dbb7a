use proptest::prelude::*;
use secp_engine::{
    BackendKind, EngineSettings, PrivateKey, Secp256k1Engine,
};
use std::sync::OnceLock;

fn native() -> &'static Secp256k1Engine {
    static ENGINE: OnceLock<Secp256k1Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Secp256k1Engine::with_settings(&EngineSettings::native()))
}

fn portable() -> &'static Secp256k1Engine {
    static ENGINE: OnceLock<Secp256k1Engine> = OnceLock::new();
    ENGINE.get_or_init(|| Secp256k1Engine::with_settings(&EngineSettings::portable()))
}

fn any_private_key() -> impl Strategy<Value = PrivateKey> {
    prop::array::uniform32(any::<u8>()).prop_filter_map("valid secp256k1 scalar", |bytes| {
        PrivateKey::from_slice(&bytes).ok()
    })
}

fn any_hash() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

proptest! {
    #[test]
    fn public_key_serialization_roundtrips(key in any_private_key(), compressed in any::<bool>()) {
        let engine = native();
        let public = engine.create_public_key(&key, compressed).unwrap();
        let bytes = public.serialize();
        prop_assert_eq!(bytes.len(), if compressed { 33 } else { 65 });

        let parsed = engine.parse_public_key(&bytes).unwrap();
        prop_assert_eq!(parsed, public);
        prop_assert_eq!(parsed.is_compressed(), compressed);

        let other = engine.serialize_public_key(&public, !compressed);
        prop_assert_eq!(engine.parse_public_key(&other).unwrap(), public);
    }

    #[test]
    fn signatures_verify(key in any_private_key(), hash in any_hash(), other in any_hash()) {
        let engine = native();
        let public = engine.create_public_key(&key, true).unwrap();
        let sig = engine.sign(&key, &hash).unwrap();

        prop_assert!(sig.is_low_s());
        prop_assert!(engine.verify(&sig.to_compact(), &hash, &public).unwrap());
        if other != hash {
            prop_assert!(!engine.verify(&sig.to_compact(), &other, &public).unwrap());
        }
    }

    #[test]
    fn der_roundtrip_preserves_value(key in any_private_key(), hash in any_hash()) {
        let engine = native();
        let sig = engine.sign(&key, &hash).unwrap();
        let parsed = engine.parse_signature(&sig.to_der()).unwrap();
        prop_assert_eq!(parsed.to_compact(), sig.to_compact());
    }

    #[test]
    fn normalize_is_idempotent(key in any_private_key(), hash in any_hash()) {
        let engine = native();
        let sig = engine.sign(&key, &hash).unwrap();
        let (once, was_high) = engine.normalize(&sig.to_compact()).unwrap();
        prop_assert!(!was_high);
        let (twice, _) = engine.normalize(&once.to_compact()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn recovery_matches_signer(key in any_private_key(), hash in any_hash()) {
        let engine = native();
        let rsig = engine.sign_recoverable(&key, &hash).unwrap();
        let recovered = engine
            .recover(&rsig.signature.to_compact(), &hash, rsig.recovery_id.to_u8())
            .unwrap();
        prop_assert_eq!(recovered, engine.create_public_key(&key, true).unwrap());
    }

    #[test]
    fn ecdh_is_symmetric(a in any_private_key(), b in any_private_key()) {
        let engine = native();
        let pa = engine.create_public_key(&a, true).unwrap();
        let pb = engine.create_public_key(&b, false).unwrap();
        prop_assert_eq!(engine.ecdh(&a, &pb).unwrap(), engine.ecdh(&b, &pa).unwrap());
    }

    #[test]
    fn backends_agree(key in any_private_key(), hash in any_hash(), tweak in any_private_key()) {
        let (n, p) = (native(), portable());
        prop_assert_eq!(n.backend_kind(), BackendKind::LibSecp256k1);
        prop_assert_eq!(p.backend_kind(), BackendKind::RustCrypto);

        prop_assert_eq!(n.sign_recoverable(&key, &hash).unwrap(), p.sign_recoverable(&key, &hash).unwrap());
        prop_assert_eq!(
            n.sign_schnorr(&hash, &key, Some(tweak.as_bytes())).unwrap(),
            p.sign_schnorr(&hash, &key, Some(tweak.as_bytes())).unwrap()
        );

        let public = n.create_public_key(&key, true).unwrap();
        prop_assert_eq!(n.ecdh(&tweak, &public).unwrap(), p.ecdh(&tweak, &public).unwrap());
        prop_assert_eq!(
            n.tweak_add_public(&public, tweak.as_bytes()).unwrap(),
            p.tweak_add_public(&public, tweak.as_bytes()).unwrap()
        );
        prop_assert_eq!(
            n.tweak_mul_private(&key, tweak.as_bytes()).unwrap(),
            p.tweak_mul_private(&key, tweak.as_bytes()).unwrap()
        );
    }

    #[test]
    fn schnorr_verifies_across_backends(key in any_private_key(), msg in any_hash()) {
        let (n, p) = (native(), portable());
        let xonly = n.schnorr_public_key(&key).unwrap();
        let sig = p.sign_schnorr(&msg, &key, None).unwrap();
        prop_assert!(n.verify_schnorr(sig.as_bytes(), &msg, xonly.as_bytes()).unwrap());
        prop_assert!(p.verify_schnorr(sig.as_bytes(), &msg, xonly.as_bytes()).unwrap());
    }
}
