//! Pure-Rust backend via RustCrypto `k256`
//!
//! Mirrors libsecp256k1 output byte for byte: ECDSA is normalized to low-S
//! with the recovery id adjusted, and ECDH hashes the compressed shared point.

use super::{BackendKind, CurveBackend};
use crate::error::{EngineError, EngineResult};
use crate::marshal::{Native, Wipe};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{schnorr, FieldBytes, ProjectivePoint, PublicKey, Scalar};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

impl Wipe for Scalar {
    fn wipe(&mut self) {
        *self = Scalar::ZERO;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoBackend;

impl RustCryptoBackend {
    pub fn new() -> Self {
        Self
    }
}

// MARK: - Conversion Helpers

fn scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
}

fn secret_scalar(bytes: &[u8; 32], op: &'static str) -> EngineResult<Native<Scalar>> {
    let k = scalar(bytes)
        .map(Native::promote)
        .ok_or(EngineError::BackendOperationFailed(op))?;
    if bool::from(k.is_zero()) {
        return Err(EngineError::BackendOperationFailed(op));
    }
    Ok(k)
}

fn tweak_scalar(bytes: &[u8; 32], op: &'static str) -> EngineResult<Scalar> {
    scalar(bytes).ok_or(EngineError::BackendOperationFailed(op))
}

fn point(encoded: &[u8], op: &'static str) -> EngineResult<ProjectivePoint> {
    PublicKey::from_sec1_bytes(encoded)
        .map(|pk| pk.to_projective())
        .map_err(|_| EngineError::BackendOperationFailed(op))
}

/// Uncompressed encoding; the identity has none
fn encode(p: ProjectivePoint, op: &'static str) -> EngineResult<[u8; 65]> {
    let pk = PublicKey::from_affine(p.to_affine()).map_err(|_| EngineError::PointAtInfinity(op))?;
    let encoded = pk.to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(encoded.as_bytes());
    Ok(out)
}

fn export_scalar(k: Scalar, op: &'static str) -> EngineResult<Zeroizing<[u8; 32]>> {
    let k = Native::promote(k);
    if bool::from(k.is_zero()) {
        return Err(EngineError::PointAtInfinity(op));
    }
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&k.to_bytes());
    Ok(out)
}

fn signature_bytes(sig: &Signature) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&sig.to_bytes());
    out
}

impl CurveBackend for RustCryptoBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RustCrypto
    }

    fn pubkey_create(&self, secret: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let k = secret_scalar(secret, "pubkey_create")?;
        encode(ProjectivePoint::GENERATOR * *k, "pubkey_create")
    }

    fn pubkey_parse(&self, encoded: &[u8]) -> EngineResult<[u8; 65]> {
        encode(point(encoded, "pubkey_parse")?, "pubkey_parse")
    }

    // MARK: - ECDSA

    fn ecdsa_sign(&self, secret: &[u8; 32], digest: &[u8; 32]) -> EngineResult<([u8; 64], u8)> {
        let key = SigningKey::from_bytes(&FieldBytes::from(*secret))
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_sign"))?;
        let (sig, recid) = key
            .sign_prehash_recoverable(digest)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_sign"))?;

        // Negating s mirrors R, so the y-parity bit flips with it
        let (sig, recid) = match sig.normalize_s() {
            Some(low) => (low, RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())),
            None => (sig, recid),
        };
        Ok((signature_bytes(&sig), recid.to_byte()))
    }

    fn ecdsa_verify(&self, signature: &[u8; 64], digest: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<bool> {
        let sig = Signature::from_slice(signature)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_verify"))?;
        let key = VerifyingKey::from_sec1_bytes(pubkey)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_verify"))?;
        Ok(key.verify_prehash(digest, &sig).is_ok())
    }

    fn ecdsa_recover(&self, signature: &[u8; 64], digest: &[u8; 32], recovery_id: u8) -> EngineResult<[u8; 65]> {
        let recid = RecoveryId::from_byte(recovery_id).ok_or(EngineError::InvalidRecoveryId(recovery_id))?;
        let sig = Signature::from_slice(signature)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_recover"))?;
        let key = VerifyingKey::recover_from_prehash(digest, &sig, recid)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_recover"))?;
        let mut out = [0u8; 65];
        out.copy_from_slice(key.to_encoded_point(false).as_bytes());
        Ok(out)
    }

    fn signature_parse_der(&self, der: &[u8]) -> EngineResult<[u8; 64]> {
        Signature::from_der(der)
            .map(|sig| signature_bytes(&sig))
            .map_err(|_| EngineError::invalid_encoding("signature is not strict DER"))
    }

    fn signature_normalize(&self, signature: &[u8; 64]) -> EngineResult<([u8; 64], bool)> {
        let sig = Signature::from_slice(signature)
            .map_err(|_| EngineError::BackendOperationFailed("signature_normalize"))?;
        Ok(match sig.normalize_s() {
            Some(low) => (signature_bytes(&low), true),
            None => (*signature, false),
        })
    }

    // MARK: - ECDH

    fn ecdh(&self, secret: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let k = secret_scalar(secret, "ecdh")?;
        let shared = (point(pubkey, "ecdh")? * *k).to_affine().to_encoded_point(true);
        if shared.len() != 33 {
            return Err(EngineError::BackendOperationFailed("ecdh"));
        }
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&Sha256::digest(shared.as_bytes()));
        Ok(out)
    }

    // MARK: - Tweaks

    fn seckey_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let k = secret_scalar(secret, "seckey_tweak_add")?;
        let t = tweak_scalar(tweak, "seckey_tweak_add")?;
        export_scalar(*k + t, "tweak_add_private")
    }

    fn seckey_tweak_mul(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let k = secret_scalar(secret, "seckey_tweak_mul")?;
        let t = tweak_scalar(tweak, "seckey_tweak_mul")?;
        export_scalar(*k * t, "tweak_mul_private")
    }

    fn seckey_negate(&self, secret: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let k = secret_scalar(secret, "seckey_negate")?;
        export_scalar(-*k, "negate_private")
    }

    fn pubkey_tweak_add(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let p = point(pubkey, "pubkey_tweak_add")?;
        let t = tweak_scalar(tweak, "pubkey_tweak_add")?;
        encode(p + ProjectivePoint::GENERATOR * t, "tweak_add_public")
    }

    fn pubkey_tweak_mul(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let p = point(pubkey, "pubkey_tweak_mul")?;
        let t = tweak_scalar(tweak, "pubkey_tweak_mul")?;
        encode(p * t, "tweak_mul_public")
    }

    fn pubkey_negate(&self, pubkey: &[u8; 65]) -> EngineResult<[u8; 65]> {
        encode(-point(pubkey, "pubkey_negate")?, "negate_public")
    }

    fn pubkey_combine(&self, pubkeys: &[[u8; 65]]) -> EngineResult<[u8; 65]> {
        let mut sum = ProjectivePoint::IDENTITY;
        for p in pubkeys {
            sum += point(p, "pubkey_combine")?;
        }
        encode(sum, "combine_public_keys")
    }

    // MARK: - Schnorr

    fn schnorr_sign(&self, digest: &[u8; 32], secret: &[u8; 32], aux_rand: &[u8; 32]) -> EngineResult<[u8; 64]> {
        let key = schnorr::SigningKey::from_bytes(secret)
            .map_err(|_| EngineError::BackendOperationFailed("schnorr_sign"))?;
        let sig = key
            .sign_raw(digest, aux_rand)
            .map_err(|_| EngineError::BackendOperationFailed("schnorr_sign"))?;
        Ok(sig.to_bytes())
    }

    fn schnorr_verify(&self, signature: &[u8; 64], digest: &[u8; 32], xonly: &[u8; 32]) -> EngineResult<bool> {
        let key = schnorr::VerifyingKey::from_bytes(xonly)
            .map_err(|_| EngineError::invalid_encoding("x-only public key is not on the curve"))?;
        let Ok(sig) = schnorr::Signature::try_from(&signature[..]) else {
            return Ok(false);
        };
        Ok(key.verify_raw(digest, &sig).is_ok())
    }
}
