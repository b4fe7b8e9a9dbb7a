//! libsecp256k1 backend via the `secp256k1` crate

use super::{BackendKind, CurveBackend};
use crate::error::{EngineError, EngineResult};
use crate::marshal::{Native, Wipe};
use secp256k1::ecdh::SharedSecret;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{schnorr, All, Keypair, Message, PublicKey, Scalar, Secp256k1, SecretKey, XOnlyPublicKey};
use zeroize::Zeroizing;

impl Wipe for SecretKey {
    fn wipe(&mut self) {
        self.non_secure_erase();
    }
}

impl Wipe for Keypair {
    fn wipe(&mut self) {
        self.non_secure_erase();
    }
}

impl Wipe for SharedSecret {
    fn wipe(&mut self) {
        self.non_secure_erase();
    }
}

/// Backend over a libsecp256k1 signing+verification context
pub struct LibSecpBackend {
    secp: Secp256k1<All>,
}

impl LibSecpBackend {
    pub fn new(randomize: bool) -> Self {
        let mut secp = Secp256k1::new();
        if randomize {
            secp.randomize(&mut rand::thread_rng());
        }
        Self { secp }
    }
}

// MARK: - Promotion Helpers

fn secret_key(bytes: &[u8; 32], op: &'static str) -> EngineResult<Native<SecretKey>> {
    SecretKey::from_slice(bytes)
        .map(Native::promote)
        .map_err(|_| EngineError::BackendOperationFailed(op))
}

fn public_key(bytes: &[u8], op: &'static str) -> EngineResult<PublicKey> {
    PublicKey::from_slice(bytes).map_err(|_| EngineError::BackendOperationFailed(op))
}

fn scalar(bytes: &[u8; 32], op: &'static str) -> EngineResult<Scalar> {
    Scalar::from_be_bytes(*bytes).map_err(|_| EngineError::BackendOperationFailed(op))
}

fn compact(signature: &[u8; 64], op: &'static str) -> EngineResult<Signature> {
    Signature::from_compact(signature).map_err(|_| EngineError::BackendOperationFailed(op))
}

fn export_secret(key: SecretKey) -> Zeroizing<[u8; 32]> {
    let key = Native::promote(key);
    Zeroizing::new(key.secret_bytes())
}

impl CurveBackend for LibSecpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LibSecp256k1
    }

    fn pubkey_create(&self, secret: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let sk = secret_key(secret, "pubkey_create")?;
        Ok(PublicKey::from_secret_key(&self.secp, &sk).serialize_uncompressed())
    }

    fn pubkey_parse(&self, encoded: &[u8]) -> EngineResult<[u8; 65]> {
        Ok(public_key(encoded, "pubkey_parse")?.serialize_uncompressed())
    }

    // MARK: - ECDSA

    fn ecdsa_sign(&self, secret: &[u8; 32], digest: &[u8; 32]) -> EngineResult<([u8; 64], u8)> {
        let sk = secret_key(secret, "ecdsa_sign")?;
        let msg = Message::from_digest(*digest);
        let (recid, bytes) = self.secp.sign_ecdsa_recoverable(&msg, &sk).serialize_compact();
        Ok((bytes, recid.to_i32() as u8))
    }

    fn ecdsa_verify(&self, signature: &[u8; 64], digest: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<bool> {
        let sig = compact(signature, "ecdsa_verify")?;
        let pk = public_key(pubkey, "ecdsa_verify")?;
        let msg = Message::from_digest(*digest);
        Ok(self.secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
    }

    fn ecdsa_recover(&self, signature: &[u8; 64], digest: &[u8; 32], recovery_id: u8) -> EngineResult<[u8; 65]> {
        let recid = RecoveryId::from_i32(i32::from(recovery_id))
            .map_err(|_| EngineError::InvalidRecoveryId(recovery_id))?;
        let sig = RecoverableSignature::from_compact(signature, recid)
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_recover"))?;
        let msg = Message::from_digest(*digest);
        self.secp
            .recover_ecdsa(&msg, &sig)
            .map(|pk| pk.serialize_uncompressed())
            .map_err(|_| EngineError::BackendOperationFailed("ecdsa_recover"))
    }

    fn signature_parse_der(&self, der: &[u8]) -> EngineResult<[u8; 64]> {
        Signature::from_der(der)
            .map(|sig| sig.serialize_compact())
            .map_err(|_| EngineError::invalid_encoding("signature is not strict DER"))
    }

    fn signature_normalize(&self, signature: &[u8; 64]) -> EngineResult<([u8; 64], bool)> {
        let mut sig = compact(signature, "signature_normalize")?;
        sig.normalize_s();
        let normalized = sig.serialize_compact();
        Ok((normalized, normalized != *signature))
    }

    // MARK: - ECDH

    fn ecdh(&self, secret: &[u8; 32], pubkey: &[u8; 65]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let sk = secret_key(secret, "ecdh")?;
        let pk = public_key(pubkey, "ecdh")?;
        let shared = Native::promote(SharedSecret::new(&pk, &sk));
        Ok(Zeroizing::new(shared.secret_bytes()))
    }

    // MARK: - Tweaks

    fn seckey_tweak_add(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let sk = secret_key(secret, "seckey_tweak_add")?;
        let t = scalar(tweak, "seckey_tweak_add")?;
        sk.add_tweak(&t)
            .map(export_secret)
            .map_err(|_| EngineError::PointAtInfinity("tweak_add_private"))
    }

    fn seckey_tweak_mul(&self, secret: &[u8; 32], tweak: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let sk = secret_key(secret, "seckey_tweak_mul")?;
        let t = scalar(tweak, "seckey_tweak_mul")?;
        sk.mul_tweak(&t)
            .map(export_secret)
            .map_err(|_| EngineError::PointAtInfinity("tweak_mul_private"))
    }

    fn seckey_negate(&self, secret: &[u8; 32]) -> EngineResult<Zeroizing<[u8; 32]>> {
        let sk = secret_key(secret, "seckey_negate")?;
        Ok(export_secret(sk.negate()))
    }

    fn pubkey_tweak_add(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let pk = public_key(pubkey, "pubkey_tweak_add")?;
        let t = scalar(tweak, "pubkey_tweak_add")?;
        pk.add_exp_tweak(&self.secp, &t)
            .map(|p| p.serialize_uncompressed())
            .map_err(|_| EngineError::PointAtInfinity("tweak_add_public"))
    }

    fn pubkey_tweak_mul(&self, pubkey: &[u8; 65], tweak: &[u8; 32]) -> EngineResult<[u8; 65]> {
        let pk = public_key(pubkey, "pubkey_tweak_mul")?;
        let t = scalar(tweak, "pubkey_tweak_mul")?;
        pk.mul_tweak(&self.secp, &t)
            .map(|p| p.serialize_uncompressed())
            .map_err(|_| EngineError::PointAtInfinity("tweak_mul_public"))
    }

    fn pubkey_negate(&self, pubkey: &[u8; 65]) -> EngineResult<[u8; 65]> {
        let pk = public_key(pubkey, "pubkey_negate")?;
        Ok(pk.negate(&self.secp).serialize_uncompressed())
    }

    fn pubkey_combine(&self, pubkeys: &[[u8; 65]]) -> EngineResult<[u8; 65]> {
        let keys = pubkeys
            .iter()
            .map(|p| public_key(p, "pubkey_combine"))
            .collect::<EngineResult<Vec<_>>>()?;
        let refs: Vec<&PublicKey> = keys.iter().collect();
        PublicKey::combine_keys(&refs)
            .map(|p| p.serialize_uncompressed())
            .map_err(|_| EngineError::PointAtInfinity("combine_public_keys"))
    }

    // MARK: - Schnorr

    fn schnorr_sign(&self, digest: &[u8; 32], secret: &[u8; 32], aux_rand: &[u8; 32]) -> EngineResult<[u8; 64]> {
        let sk = secret_key(secret, "schnorr_sign")?;
        let keypair = Native::promote(Keypair::from_secret_key(&self.secp, &sk));
        let msg = Message::from_digest(*digest);
        let sig = self.secp.sign_schnorr_with_aux_rand(&msg, &keypair, aux_rand);
        Ok(sig.serialize())
    }

    fn schnorr_verify(&self, signature: &[u8; 64], digest: &[u8; 32], xonly: &[u8; 32]) -> EngineResult<bool> {
        let pk = XOnlyPublicKey::from_slice(xonly)
            .map_err(|_| EngineError::invalid_encoding("x-only public key is not on the curve"))?;
        let Ok(sig) = schnorr::Signature::from_slice(signature) else {
            return Ok(false);
        };
        let msg = Message::from_digest(*digest);
        Ok(self.secp.verify_schnorr(&sig, &msg, &pk).is_ok())
    }
}
