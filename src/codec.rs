//! Key and Signature Codec
//!
//! Validation and (de)serialization of the wire formats:
//!
//! - private keys: 32 bytes, scalar in [1, n-1]
//! - public keys: SEC1 compressed (33, prefix 02/03) or uncompressed (65, prefix 04)
//! - ECDSA signatures: 64-byte compact or strict DER
//! - tweaks: 32 bytes below n (multiplicative tweaks also non-zero)
//! - x-only keys: 32 bytes
//!
//! Range and length checks happen here, before any backend call. Whether a
//! point is on the curve and strict DER parsing are delegated to the backend.

use crate::backend::CurveBackend;
use crate::error::{EngineError, EngineResult};
use crate::marshal::{with_native, NativeBuffer};
use crate::types::{EcdsaSignature, PrivateKey, PublicKey, RecoveryId, XOnlyPublicKey};

/// Order of the secp256k1 group
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2); low-S signatures have s at or below this
pub const HALF_CURVE_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// MARK: - Scalars

/// Big-endian value strictly below n
pub fn is_below_order(bytes: &[u8; 32]) -> bool {
    *bytes < CURVE_ORDER
}

/// Valid secret scalar: non-zero and below n
pub fn is_valid_scalar(bytes: &[u8; 32]) -> bool {
    *bytes != [0u8; 32] && is_below_order(bytes)
}

pub fn parse_private_key(bytes: &[u8]) -> EngineResult<PrivateKey> {
    let buf = with_native::<32>(bytes, "private_key")?;
    if !is_valid_scalar(&buf) {
        return Err(EngineError::InvalidScalar("private_key"));
    }
    Ok(PrivateKey::from_array_unchecked(*buf))
}

/// Tweak in [0, n-1]; `non_zero` additionally rejects 0
pub fn parse_tweak(bytes: &[u8], non_zero: bool) -> EngineResult<NativeBuffer<32>> {
    let buf = with_native::<32>(bytes, "tweak")?;
    if !is_below_order(&buf) || (non_zero && *buf == [0u8; 32]) {
        return Err(EngineError::InvalidScalar("tweak"));
    }
    Ok(buf)
}

// MARK: - Public Keys

/// Length and prefix check for a SEC1 encoding
pub fn check_public_key_format(bytes: &[u8]) -> EngineResult<bool> {
    match (bytes.len(), bytes.first()) {
        (33, Some(0x02 | 0x03)) => Ok(true),
        (65, Some(0x04)) => Ok(false),
        (33 | 65, Some(prefix)) => Err(EngineError::invalid_encoding(format!(
            "public key prefix 0x{:02x} does not match length {}",
            prefix,
            bytes.len()
        ))),
        (len, _) => Err(EngineError::invalid_length("public_key", "33 or 65 bytes", len)),
    }
}

/// Decode a SEC1 public key, keeping its encoding as the preferred format
pub fn parse_public_key(backend: &dyn CurveBackend, bytes: &[u8]) -> EngineResult<PublicKey> {
    let compressed = check_public_key_format(bytes)?;
    let point = backend
        .pubkey_parse(bytes)
        .map_err(|_| EngineError::invalid_encoding("public key is not a point on secp256k1"))?;
    Ok(PublicKey::from_point(point, compressed))
}

pub fn serialize_public_key(key: &PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        key.serialize_compressed().to_vec()
    } else {
        key.serialize_uncompressed().to_vec()
    }
}

pub fn parse_xonly_public_key(bytes: &[u8]) -> EngineResult<XOnlyPublicKey> {
    let buf = with_native::<32>(bytes, "xonly_public_key")?;
    Ok(XOnlyPublicKey::from_array_unchecked(*buf))
}

// MARK: - Signatures

pub fn parse_compact_signature(bytes: &[u8]) -> EngineResult<EcdsaSignature> {
    let buf = with_native::<64>(bytes, "signature")?;
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&buf[..32]);
    s.copy_from_slice(&buf[32..]);
    if !is_valid_scalar(&r) || !is_valid_scalar(&s) {
        return Err(EngineError::invalid_encoding(
            "signature component is zero or not below the curve order",
        ));
    }
    Ok(EcdsaSignature::from_array_unchecked(*buf))
}

/// 64 bytes are compact, anything longer is DER
pub fn parse_signature(backend: &dyn CurveBackend, bytes: &[u8]) -> EngineResult<EcdsaSignature> {
    match bytes.len() {
        64 => parse_compact_signature(bytes),
        len if len < 64 => Err(EngineError::invalid_encoding(format!(
            "signature of {} bytes is neither compact nor DER",
            len
        ))),
        _ => {
            // libsecp256k1 maps an overflowing DER integer to zero
            let compact = backend.signature_parse_der(bytes)?;
            parse_compact_signature(&compact)
        }
    }
}

/// Minimal DER: SEQUENCE { INTEGER r, INTEGER s }
pub fn encode_der(compact: &[u8; 64]) -> Vec<u8> {
    let mut body = Vec::with_capacity(70);
    der_integer(&mut body, &compact[..32]);
    der_integer(&mut body, &compact[32..]);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x30);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

fn der_integer(out: &mut Vec<u8>, value: &[u8]) {
    let start = value
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(value.len() - 1);
    let trimmed = &value[start..];
    let pad = trimmed[0] & 0x80 != 0;

    out.push(0x02);
    out.push((trimmed.len() + usize::from(pad)) as u8);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
}

pub fn parse_recovery_id(id: u8) -> EngineResult<RecoveryId> {
    RecoveryId::new(id)
}
