//! Curve Backends
//!
//! The operation set runs against one of two interchangeable backends:
//!
//! - `libsecp256k1`: the native C library through the `secp256k1` crate
//! - `rustcrypto`: the pure-Rust `k256` crate
//!
//! # Contract
//!
//! Backends receive fixed-size, already validated byte arrays. Public keys
//! arrive and leave as the 65-byte uncompressed encoding. Secret results are
//! returned inside `Zeroizing` so they are wiped once copied into a value type.
//! Native values (secret keys, keypairs, scalars) are promoted through
//! `marshal::Native` and never outlive the call.
//!
//! A refusal by the underlying library is reported as
//! `BackendOperationFailed(op)`, or `PointAtInfinity(op)` when a tweak or sum
//! degenerates to the identity.

pub mod libsecp;
pub mod rustcrypto;

pub use libsecp::LibSecpBackend;
pub use rustcrypto::RustCryptoBackend;

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

// MARK: - Backend Kind

/// Available backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// libsecp256k1 (C library, audited, constant-time)
    LibSecp256k1,
    /// RustCrypto `k256` (pure Rust)
    RustCrypto,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LibSecp256k1 => "libsecp256k1",
            Self::RustCrypto => "rustcrypto-k256",
        }
    }

    /// Parse backend kind from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "libsecp256k1" | "secp256k1" | "native" => Some(Self::LibSecp256k1),
            "rustcrypto" | "rustcrypto-k256" | "k256" | "portable" => Some(Self::RustCrypto),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// MARK: - Backend Trait

/// Primitive secp256k1 operations
pub trait CurveBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Secret scalar times the generator
    fn pubkey_create(&self, secret: &[u8; 32]) -> EngineResult<[u8; 65]>;

    /// Decode a 33/65-byte SEC1 point and check it lies on the curve
    fn pubkey_parse(&self, encoded: &[u8]) -> EngineResult<[u8; 65]>;

    /// Deterministic (RFC6979) low-S ECDSA over a 32-byte digest.
    /// Returns the compact signature and its recovery id.
    fn ecdsa_sign(&self, secret: &[u8; 32], digest: &[u8; 32]) -> EngineResult<([u8; 64], u8)>;

    /// Verify a compact signature; the signature must already be low-S
    fn ecdsa_verify(&self, signature: &[u8; 64], digest: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<bool>;

    fn ecdsa_recover(&self, signature: &[u8; 64], digest: &[u8; 32], recovery_id: u8) -> EngineResult<[u8; 65]>;

    /// Strict DER decoding into compact form
    fn signature_parse_der(&self, der: &[u8]) -> EngineResult<[u8; 64]>;

    /// Low-S normalization; the flag reports whether S was high
    fn signature_normalize(&self, signature: &[u8; 64]) -> EngineResult<([u8; 64], bool)>;

    /// SHA256 of the compressed shared point
    fn ecdh(&self, secret: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<Zeroizing<[u8; 32]>>;

    fn seckey_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>>;
    fn seckey_tweak_mul(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>>;
    fn seckey_negate(&self, secret: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>>;

    fn pubkey_tweak_add(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]>;
    fn pubkey_tweak_mul(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]>;
    fn pubkey_negate(&self, pubkey: &[u8; 65]) -> EngineResult<[u8; 65]>;
    fn pubkey_combine(&self, pubkeys: &[[u8; 65]]) -> EngineResult<[u8; 65]>;

    /// BIP-340 signing with 32 bytes of auxiliary randomness
    fn schnorr_sign(&self, digest: &[u8; 32], secret: &[u8; 32], aux_rand: &[u8; 32]) -> EngineResult<[u8; 64]>;

    /// BIP-340 verification; an x-only key off the curve is an encoding error
    fn schnorr_verify(&self, signature: &[u8; 64], digest: &[u8; 32], xonly: &[u8; 32]) -> EngineResult<bool>;
}

/// Instantiate a backend variant
pub fn create_backend(kind: BackendKind, randomize: bool) -> Box<dyn CurveBackend> {
    match kind {
        BackendKind::LibSecp256k1 => Box::new(LibSecpBackend::new(randomize)),
        BackendKind::RustCrypto => Box::new(RustCryptoBackend::new()),
    }
}

// MARK: - Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Box<dyn CurveBackend>> {
        vec![
            create_backend(BackendKind::LibSecp256k1, true),
            create_backend(BackendKind::RustCrypto, false),
        ]
    }

    fn secret(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn test_backend_kind_names() {
        assert_eq!(BackendKind::LibSecp256k1.name(), "libsecp256k1");
        assert_eq!(BackendKind::from_name("K256"), Some(BackendKind::RustCrypto));
        assert_eq!(BackendKind::from_name("native"), Some(BackendKind::LibSecp256k1));
        assert_eq!(BackendKind::from_name("openssl"), None);
    }

    #[test]
    fn test_backends_agree_on_public_keys() {
        let all = backends();
        for byte in [1u8, 7, 42, 0x7f] {
            assert_eq!(
                all[0].pubkey_create(&secret(byte)).unwrap(),
                all[1].pubkey_create(&secret(byte)).unwrap()
            );
        }
    }

    #[test]
    fn test_backends_agree_on_ecdsa() {
        let all = backends();
        let digest = [0x5au8; 32];
        let (sig_a, rid_a) = all[0].ecdsa_sign(&secret(3), &digest).unwrap();
        let (sig_b, rid_b) = all[1].ecdsa_sign(&secret(3), &digest).unwrap();
        assert_eq!(sig_a, sig_b);
        assert_eq!(rid_a, rid_b);

        let pubkey = all[0].pubkey_create(&secret(3)).unwrap();
        for backend in &all {
            assert!(backend.ecdsa_verify(&sig_a, &digest, &pubkey).unwrap());
            assert_eq!(backend.ecdsa_recover(&sig_a, &digest, rid_a).unwrap(), pubkey);
        }
    }

    #[test]
    fn test_backends_agree_on_ecdh_and_tweaks() {
        let all = backends();
        let peer = all[0].pubkey_create(&secret(9)).unwrap();
        let tweak = [0x11u8; 32];

        assert_eq!(
            *all[0].ecdh(&secret(5), &peer).unwrap(),
            *all[1].ecdh(&secret(5), &peer).unwrap()
        );
        assert_eq!(
            *all[0].seckey_tweak_add(&secret(5), &tweak).unwrap(),
            *all[1].seckey_tweak_add(&secret(5), &tweak).unwrap()
        );
        assert_eq!(
            *all[0].seckey_tweak_mul(&secret(5), &tweak).unwrap(),
            *all[1].seckey_tweak_mul(&secret(5), &tweak).unwrap()
        );
        assert_eq!(
            *all[0].seckey_negate(&secret(5)).unwrap(),
            *all[1].seckey_negate(&secret(5)).unwrap()
        );
        assert_eq!(
            all[0].pubkey_tweak_add(&peer, &tweak).unwrap(),
            all[1].pubkey_tweak_add(&peer, &tweak).unwrap()
        );
        assert_eq!(
            all[0].pubkey_tweak_mul(&peer, &tweak).unwrap(),
            all[1].pubkey_tweak_mul(&peer, &tweak).unwrap()
        );
        assert_eq!(
            all[0].pubkey_negate(&peer).unwrap(),
            all[1].pubkey_negate(&peer).unwrap()
        );
    }

    #[test]
    fn test_combine_with_negation_is_infinity() {
        for backend in backends() {
            let p = backend.pubkey_create(&secret(4)).unwrap();
            let neg = backend.pubkey_negate(&p).unwrap();
            let err = backend.pubkey_combine(&[p, neg]).unwrap_err();
            assert!(matches!(err, crate::EngineError::PointAtInfinity(_)));
        }
    }

    // BIP-340 test vector 0
    #[test]
    fn test_bip340_vector_0() {
        let mut sk = [0u8; 32];
        sk[31] = 3;
        let expected_pubkey =
            hex::decode("F9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9").unwrap();
        let expected_sig = hex::decode(
            "E907831F80848D1069A5371B402410364BDF1C5F8307B0084C55F1CE2DCA821525F66A4A85EA8B71E482A74F382D2CE5EBEEE8FDB2172F477DF4900D310536C0",
        )
        .unwrap();

        for backend in backends() {
            let sig = backend.schnorr_sign(&[0u8; 32], &sk, &[0u8; 32]).unwrap();
            assert_eq!(sig.to_vec(), expected_sig, "{}", backend.kind());

            let point = backend.pubkey_create(&sk).unwrap();
            assert_eq!(point[1..33].to_vec(), expected_pubkey);

            let mut xonly = [0u8; 32];
            xonly.copy_from_slice(&expected_pubkey);
            assert!(backend.schnorr_verify(&sig, &[0u8; 32], &xonly).unwrap());
        }
    }

    #[test]
    fn test_der_parse_agrees() {
        let all = backends();
        let (sig, _) = all[0].ecdsa_sign(&secret(8), &[1u8; 32]).unwrap();
        let der = crate::codec::encode_der(&sig);
        for backend in &all {
            assert_eq!(backend.signature_parse_der(&der).unwrap(), sig);
        }
    }
}
