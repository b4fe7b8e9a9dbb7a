//! Hex serde adapters for fixed-size byte arrays
//!
//! Signatures and x-only keys travel as lowercase hex strings. Decoding only
//! checks the length; value types re-validate on top of that.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

fn encode<S: Serializer, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn decode<'de, D: Deserializer<'de>, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error> {
    let text = String::deserialize(deserializer)?;
    let bytes = hex::decode(&text).map_err(D::Error::custom)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| D::Error::invalid_length(len, &format!("{} bytes", N).as_str()))
}

/// `[u8; 32]` as hex
pub mod hex32 {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        super::encode(bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        super::decode(deserializer)
    }
}

/// `[u8; 64]` as hex
pub mod hex64 {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error> {
        super::encode(bytes, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 64], D::Error> {
        super::decode(deserializer)
    }
}
