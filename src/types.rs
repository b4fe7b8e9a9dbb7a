//! Key, Signature and Secret Value Types
//!
//! Every type here is only constructed through validated paths (codec,
//! engine, HD derivation), so holding one means its bytes are well-formed:
//!
//! - `PrivateKey`: scalar in [1, n-1], zeroized on drop
//! - `PublicKey`: a curve point other than the identity, kept in both SEC1
//!   encodings with a preferred one
//! - `EcdsaSignature`: compact r‖s with r, s in [1, n-1]
//! - `SharedSecret`: 32-byte ECDH output, zeroized on drop

use crate::codec;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

// MARK: - Private Key

/// secp256k1 secret scalar
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; 32],
}

impl PrivateKey {
    /// Validate 32 big-endian bytes as a scalar in [1, n-1]
    pub fn from_slice(bytes: &[u8]) -> EngineResult<Self> {
        codec::parse_private_key(bytes)
    }

    pub(crate) fn from_array_unchecked(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

impl AsRef<[u8]> for PrivateKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// MARK: - Public Key

/// secp256k1 curve point
#[derive(Clone, Copy)]
pub struct PublicKey {
    uncompressed: [u8; 65],
    compressed: [u8; 33],
    prefer_compressed: bool,
}

impl PublicKey {
    /// Build from a validated uncompressed point
    pub(crate) fn from_point(uncompressed: [u8; 65], prefer_compressed: bool) -> Self {
        let mut compressed = [0u8; 33];
        compressed[0] = 0x02 | (uncompressed[64] & 1);
        compressed[1..].copy_from_slice(&uncompressed[1..33]);
        Self {
            uncompressed,
            compressed,
            prefer_compressed,
        }
    }

    /// Whether this key serializes to 33 bytes by default
    pub fn is_compressed(&self) -> bool {
        self.prefer_compressed
    }

    /// Same point with a different preferred encoding
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.prefer_compressed = compressed;
        self
    }

    /// Encoding in the preferred format
    pub fn serialize(&self) -> Vec<u8> {
        self.as_ref().to_vec()
    }

    pub fn serialize_compressed(&self) -> [u8; 33] {
        self.compressed
    }

    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        self.uncompressed
    }

    /// Affine X coordinate
    pub fn x_only(&self) -> XOnlyPublicKey {
        let mut x = [0u8; 32];
        x.copy_from_slice(&self.uncompressed[1..33]);
        XOnlyPublicKey(x)
    }

    pub fn has_odd_y(&self) -> bool {
        self.uncompressed[64] & 1 == 1
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_ref())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.uncompressed == other.uncompressed
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uncompressed.hash(state);
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        if self.prefer_compressed {
            &self.compressed
        } else {
            &self.uncompressed
        }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// MARK: - ECDSA Signature

/// Compact (r‖s) ECDSA signature
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcdsaSignature {
    compact: [u8; 64],
}

impl EcdsaSignature {
    /// 64-byte compact form, both halves below the curve order
    pub fn from_compact(bytes: &[u8]) -> EngineResult<Self> {
        codec::parse_compact_signature(bytes)
    }

    pub(crate) fn from_array_unchecked(compact: [u8; 64]) -> Self {
        Self { compact }
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.compact[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.compact[32..]);
        s
    }

    pub fn is_low_s(&self) -> bool {
        self.s() <= codec::HALF_CURVE_ORDER
    }

    pub fn to_compact(&self) -> [u8; 64] {
        self.compact
    }

    pub fn to_der(&self) -> Vec<u8> {
        codec::encode_der(&self.compact)
    }
}

impl Serialize for EcdsaSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::serde_bytes::hex64::serialize(&self.compact, serializer)
    }
}

/// Deserialized signatures go through the same range checks as parsed ones
impl<'de> Deserialize<'de> for EcdsaSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let compact = crate::serde_bytes::hex64::deserialize(deserializer)?;
        codec::parse_compact_signature(&compact).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcdsaSignature({})", hex::encode(self.compact))
    }
}

// MARK: - Recovery Id

/// Public key recovery id, 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct RecoveryId(u8);

impl TryFrom<u8> for RecoveryId {
    type Error = EngineError;

    fn try_from(id: u8) -> EngineResult<Self> {
        Self::new(id)
    }
}

impl RecoveryId {
    pub fn new(id: u8) -> EngineResult<Self> {
        if id > 3 {
            return Err(EngineError::InvalidRecoveryId(id));
        }
        Ok(Self(id))
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }
}

/// ECDSA signature with the id needed to recover its public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    pub signature: EcdsaSignature,
    pub recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// 65-byte r‖s‖v encoding
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.signature.to_compact());
        out[64] = self.recovery_id.to_u8();
        out
    }
}

// MARK: - Schnorr

/// BIP-340 signature (R.x‖s)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchnorrSignature(#[serde(with = "crate::serde_bytes::hex64")] [u8; 64]);

impl SchnorrSignature {
    pub fn from_slice(bytes: &[u8]) -> EngineResult<Self> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| EngineError::invalid_length("schnorr_signature", "64 bytes", bytes.len()))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl std::fmt::Debug for SchnorrSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SchnorrSignature({})", hex::encode(self.0))
    }
}

/// BIP-340 x-only public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XOnlyPublicKey(#[serde(with = "crate::serde_bytes::hex32")] [u8; 32]);

impl XOnlyPublicKey {
    /// Length check only; the backend checks the point lifts onto the curve
    pub fn from_slice(bytes: &[u8]) -> EngineResult<Self> {
        codec::parse_xonly_public_key(bytes)
    }

    pub(crate) fn from_array_unchecked(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// MARK: - Shared Secret

/// ECDH output: SHA256 of the compressed shared point
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    pub(crate) fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> PublicKey {
        let bytes = hex::decode(
            "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
        )
        .unwrap();
        PublicKey::from_point(bytes.try_into().unwrap(), true)
    }

    #[test]
    fn test_public_key_encodings() {
        let g = generator();
        assert_eq!(
            hex::encode(g.serialize_compressed()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(g.serialize().len(), 33);
        assert_eq!(g.with_compression(false).serialize().len(), 65);
        assert!(!g.has_odd_y());
    }

    #[test]
    fn test_public_key_equality_ignores_format() {
        let g = generator();
        assert_eq!(g, g.with_compression(false));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = PrivateKey::from_array_unchecked([0x42; 32]);
        let debug = format!("{:?}", key);
        assert!(!debug.contains("42"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_recovery_id_range() {
        assert!(RecoveryId::new(3).is_ok());
        assert_eq!(RecoveryId::new(4), Err(EngineError::InvalidRecoveryId(4)));
    }

    #[test]
    fn test_recoverable_to_bytes() {
        let sig = RecoverableSignature {
            signature: EcdsaSignature::from_array_unchecked([1u8; 64]),
            recovery_id: RecoveryId::new(1).unwrap(),
        };
        let bytes = sig.to_bytes();
        assert_eq!(bytes[64], 1);
        assert_eq!(&bytes[..64], &[1u8; 64]);
    }

    #[test]
    fn test_signature_serde_revalidates() {
        let sig = RecoverableSignature {
            signature: EcdsaSignature::from_array_unchecked([0x22u8; 64]),
            recovery_id: RecoveryId::new(2).unwrap(),
        };
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(
            json,
            format!("{{\"signature\":\"{}\",\"recovery_id\":2}}", "22".repeat(64))
        );
        assert_eq!(serde_json::from_str::<RecoverableSignature>(&json).unwrap(), sig);

        let zero_r = format!("\"{}{}\"", "00".repeat(32), "22".repeat(32));
        assert!(serde_json::from_str::<EcdsaSignature>(&zero_r).is_err());

        let bad_recid = format!("{{\"signature\":\"{}\",\"recovery_id\":4}}", "22".repeat(64));
        assert!(serde_json::from_str::<RecoverableSignature>(&bad_recid).is_err());
    }

    #[test]
    fn test_schnorr_types_serde() {
        let sig = SchnorrSignature::from_slice(&[0x5au8; 64]).unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(serde_json::from_str::<SchnorrSignature>(&json).unwrap(), sig);

        let xonly = XOnlyPublicKey::from_slice(&[0x07u8; 32]).unwrap();
        let json = serde_json::to_string(&xonly).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(32)));
        assert_eq!(serde_json::from_str::<XOnlyPublicKey>(&json).unwrap(), xonly);
        assert!(serde_json::from_str::<XOnlyPublicKey>("\"0707\"").is_err());
    }
}
