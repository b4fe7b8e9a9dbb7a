//! secp256k1 Operation Set
//!
//! `Secp256k1Engine` is the single entry point for curve operations. It holds
//! a shared `CurveContext` and runs every call the same way:
//!
//! 1. validate and marshal caller bytes through the codec
//! 2. call the active backend
//! 3. wrap the result in a value type
//!
//! Malformed input never reaches the backend. Backend refusals are logged and
//! returned as errors, never turned into `false` or a default value.

use crate::backend::{BackendKind, CurveBackend};
use crate::codec;
use crate::context::{self, CurveContext};
use crate::error::{EngineError, EngineResult};
use crate::marshal::{with_native, NativeBuffer};
use crate::types::{
    EcdsaSignature, PrivateKey, PublicKey, RecoverableSignature, SchnorrSignature, SharedSecret,
    XOnlyPublicKey,
};
use crate::utils::engine_config::EngineSettings;
use crate::utils::hashing::sha256;
use crate::{log_debug, log_warn};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Curve operations bound to one context
#[derive(Debug, Clone)]
pub struct Secp256k1Engine {
    context: Arc<CurveContext>,
}

impl Secp256k1Engine {
    /// Engine over the process-wide context
    pub fn new() -> EngineResult<Self> {
        Ok(Self {
            context: context::acquire()?,
        })
    }

    pub fn with_context(context: Arc<CurveContext>) -> Self {
        Self { context }
    }

    /// Engine over a private context, independent of the global registry
    pub fn with_settings(settings: &EngineSettings) -> Self {
        Self {
            context: Arc::new(CurveContext::create(settings)),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.context.kind()
    }

    pub fn context(&self) -> &Arc<CurveContext> {
        &self.context
    }

    fn backend(&self) -> EngineResult<&dyn CurveBackend> {
        self.context.backend()
    }

    // MARK: - Keys

    /// Fresh private key from OS randomness
    pub fn generate_private_key(&self) -> EngineResult<PrivateKey> {
        self.backend()?;
        let mut bytes = Zeroizing::new([0u8; 32]);
        loop {
            OsRng.fill_bytes(&mut bytes[..]);
            if codec::is_valid_scalar(&bytes) {
                return Ok(PrivateKey::from_array_unchecked(*bytes));
            }
        }
    }

    /// Pure range check, no backend involved
    pub fn verify_private_key(&self, bytes: &[u8]) -> bool {
        codec::parse_private_key(bytes).is_ok()
    }

    pub fn create_public_key(&self, private_key: &PrivateKey, compressed: bool) -> EngineResult<PublicKey> {
        let point = self
            .backend()?
            .pubkey_create(private_key.as_bytes())
            .map_err(|e| failed("create_public_key", e))?;
        Ok(PublicKey::from_point(point, compressed))
    }

    pub fn parse_public_key(&self, bytes: &[u8]) -> EngineResult<PublicKey> {
        codec::parse_public_key(self.backend()?, bytes)
    }

    /// Re-encode a key, e.g. to compress or decompress it
    pub fn serialize_public_key(&self, public_key: &PublicKey, compressed: bool) -> Vec<u8> {
        codec::serialize_public_key(public_key, compressed)
    }

    // MARK: - ECDSA

    /// Deterministic low-S signature over a 32-byte hash
    pub fn sign(&self, private_key: &PrivateKey, message_hash: &[u8]) -> EngineResult<EcdsaSignature> {
        Ok(self.sign_recoverable(private_key, message_hash)?.signature)
    }

    pub fn sign_recoverable(
        &self,
        private_key: &PrivateKey,
        message_hash: &[u8],
    ) -> EngineResult<RecoverableSignature> {
        let backend = self.backend()?;
        let hash = message_digest(message_hash)?;
        let (compact, recid) = backend
            .ecdsa_sign(private_key.as_bytes(), &hash)
            .map_err(|e| failed("sign", e))?;

        log_debug!("engine", "ECDSA signature created", message_hash = hex::encode(*hash));
        Ok(RecoverableSignature {
            signature: EcdsaSignature::from_array_unchecked(compact),
            recovery_id: codec::parse_recovery_id(recid)?,
        })
    }

    /// Verify a compact or DER signature; high-S input is normalized first
    pub fn verify(&self, signature: &[u8], message_hash: &[u8], public_key: &PublicKey) -> EngineResult<bool> {
        let backend = self.backend()?;
        let hash = message_digest(message_hash)?;
        let sig = codec::parse_signature(backend, signature)?;
        let (low, _) = backend
            .signature_normalize(&sig.to_compact())
            .map_err(|e| failed("verify", e))?;
        backend
            .ecdsa_verify(&low, &hash, &public_key.serialize_uncompressed())
            .map_err(|e| failed("verify", e))
    }

    /// Low-S form of a signature and whether S was high
    pub fn normalize(&self, signature: &[u8]) -> EngineResult<(EcdsaSignature, bool)> {
        let backend = self.backend()?;
        let sig = codec::parse_signature(backend, signature)?;
        let (low, was_high) = backend
            .signature_normalize(&sig.to_compact())
            .map_err(|e| failed("normalize", e))?;
        Ok((EcdsaSignature::from_array_unchecked(low), was_high))
    }

    /// Public key from a compact signature and its recovery id
    pub fn recover(&self, signature: &[u8], message_hash: &[u8], recovery_id: u8) -> EngineResult<PublicKey> {
        let backend = self.backend()?;
        let sig = codec::parse_compact_signature(signature)?;
        let hash = message_digest(message_hash)?;
        let recid = codec::parse_recovery_id(recovery_id)?;
        let point = backend
            .ecdsa_recover(&sig.to_compact(), &hash, recid.to_u8())
            .map_err(|e| failed("recover", e))?;
        Ok(PublicKey::from_point(point, true))
    }

    pub fn parse_signature(&self, bytes: &[u8]) -> EngineResult<EcdsaSignature> {
        codec::parse_signature(self.backend()?, bytes)
    }

    /// DER signature over SHA-256(data)
    pub fn sign_data(&self, private_key: &PrivateKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        Ok(self.sign(private_key, &sha256(data))?.to_der())
    }

    pub fn verify_data(&self, public_key: &PublicKey, signature: &[u8], data: &[u8]) -> EngineResult<bool> {
        self.verify(signature, &sha256(data), public_key)
    }

    // MARK: - ECDH

    pub fn ecdh(&self, private_key: &PrivateKey, public_key: &PublicKey) -> EngineResult<SharedSecret> {
        let secret = self
            .backend()?
            .ecdh(private_key.as_bytes(), &public_key.serialize_uncompressed())
            .map_err(|e| failed("ecdh", e))?;
        Ok(SharedSecret::new(*secret))
    }

    // MARK: - Tweaks

    /// (priv + t) mod n
    pub fn tweak_add_private(&self, private_key: &PrivateKey, tweak: &[u8]) -> EngineResult<PrivateKey> {
        let backend = self.backend()?;
        let tweak = codec::parse_tweak(tweak, false)?;
        let out = backend
            .seckey_tweak_add(private_key.as_bytes(), &tweak)
            .map_err(|e| failed("tweak_add_private", e))?;
        Ok(PrivateKey::from_array_unchecked(*out))
    }

    /// (priv * t) mod n, t non-zero
    pub fn tweak_mul_private(&self, private_key: &PrivateKey, tweak: &[u8]) -> EngineResult<PrivateKey> {
        let backend = self.backend()?;
        let tweak = codec::parse_tweak(tweak, true)?;
        let out = backend
            .seckey_tweak_mul(private_key.as_bytes(), &tweak)
            .map_err(|e| failed("tweak_mul_private", e))?;
        Ok(PrivateKey::from_array_unchecked(*out))
    }

    /// P + t·G
    pub fn tweak_add_public(&self, public_key: &PublicKey, tweak: &[u8]) -> EngineResult<PublicKey> {
        let backend = self.backend()?;
        let tweak = codec::parse_tweak(tweak, false)?;
        let point = backend
            .pubkey_tweak_add(&public_key.serialize_uncompressed(), &tweak)
            .map_err(|e| failed("tweak_add_public", e))?;
        Ok(PublicKey::from_point(point, public_key.is_compressed()))
    }

    /// t·P, t non-zero
    pub fn tweak_mul_public(&self, public_key: &PublicKey, tweak: &[u8]) -> EngineResult<PublicKey> {
        let backend = self.backend()?;
        let tweak = codec::parse_tweak(tweak, true)?;
        let point = backend
            .pubkey_tweak_mul(&public_key.serialize_uncompressed(), &tweak)
            .map_err(|e| failed("tweak_mul_public", e))?;
        Ok(PublicKey::from_point(point, public_key.is_compressed()))
    }

    pub fn negate_private(&self, private_key: &PrivateKey) -> EngineResult<PrivateKey> {
        let out = self
            .backend()?
            .seckey_negate(private_key.as_bytes())
            .map_err(|e| failed("negate_private", e))?;
        Ok(PrivateKey::from_array_unchecked(*out))
    }

    pub fn negate_public(&self, public_key: &PublicKey) -> EngineResult<PublicKey> {
        let point = self
            .backend()?
            .pubkey_negate(&public_key.serialize_uncompressed())
            .map_err(|e| failed("negate_public", e))?;
        Ok(PublicKey::from_point(point, public_key.is_compressed()))
    }

    /// Sum of points; the result keeps the first key's encoding
    pub fn combine_public(&self, public_keys: &[PublicKey]) -> EngineResult<PublicKey> {
        let backend = self.backend()?;
        let Some(first) = public_keys.first() else {
            return Err(EngineError::invalid_length("public_keys", "at least 1 key", 0));
        };
        let points: Vec<[u8; 65]> = public_keys.iter().map(|k| k.serialize_uncompressed()).collect();
        let point = backend
            .pubkey_combine(&points)
            .map_err(|e| failed("combine_public", e))?;
        Ok(PublicKey::from_point(point, first.is_compressed()))
    }

    // MARK: - Schnorr

    /// BIP-340 signature; missing aux randomness means 32 zero bytes
    pub fn sign_schnorr(
        &self,
        message: &[u8],
        private_key: &PrivateKey,
        aux_rand: Option<&[u8]>,
    ) -> EngineResult<SchnorrSignature> {
        let backend = self.backend()?;
        let msg = with_native::<32>(message, "message")?;
        let aux = match aux_rand {
            Some(bytes) => with_native::<32>(bytes, "aux_rand")?,
            None => with_native::<32>(&[0u8; 32], "aux_rand")?,
        };
        let sig = backend
            .schnorr_sign(&msg, private_key.as_bytes(), &aux)
            .map_err(|e| failed("sign_schnorr", e))?;
        SchnorrSignature::from_slice(&sig)
    }

    pub fn verify_schnorr(&self, signature: &[u8], message: &[u8], xonly_public_key: &[u8]) -> EngineResult<bool> {
        let backend = self.backend()?;
        let sig = with_native::<64>(signature, "schnorr_signature")?;
        let msg = with_native::<32>(message, "message")?;
        let key = codec::parse_xonly_public_key(xonly_public_key)?;
        backend
            .schnorr_verify(&sig, &msg, key.as_bytes())
            .map_err(|e| failed("verify_schnorr", e))
    }

    pub fn schnorr_public_key(&self, private_key: &PrivateKey) -> EngineResult<XOnlyPublicKey> {
        Ok(self.create_public_key(private_key, true)?.x_only())
    }
}

fn message_digest(bytes: &[u8]) -> EngineResult<NativeBuffer<32>> {
    with_native::<32>(bytes, "message_hash")
}

/// Log backend and lifecycle failures; validation errors pass through quietly
fn failed(operation: &'static str, err: EngineError) -> EngineError {
    if !err.is_validation_error() {
        log_warn!("engine", "Curve operation failed", operation = operation, error = err.code());
    }
    err
}
