//! BIP32 Hierarchical Deterministic Derivation
//!
//! Extended keys derived from a seed, child derivation over hardened and
//! normal indices, and Base58Check import/export compatible with other
//! BIP32 implementations.

pub mod extended_key;
pub mod path;

pub use extended_key::ExtendedKey;
pub use path::{DerivationAxis, DerivationPath, HARDENED};

use serde::{Deserialize, Serialize};

/// HMAC key for master key generation
pub const MASTER_KEY_SALT: &[u8] = b"Bitcoin seed";

/// Accepted seed length range in bytes
pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

/// Serialized extended key length before Base58Check
pub const EXTENDED_KEY_LEN: usize = 78;

/// Network selecting the extended key version bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Version bytes for xprv / tprv
    pub fn private_version(&self) -> [u8; 4] {
        match self {
            Self::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            Self::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    /// Version bytes for xpub / tpub
    pub fn public_version(&self) -> [u8; 4] {
        match self {
            Self::Mainnet => [0x04, 0x88, 0xB2, 0x1E],
            Self::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }

    /// Network and key kind (true = private) for a version prefix
    pub fn from_version(version: [u8; 4]) -> Option<(Self, bool)> {
        [Self::Mainnet, Self::Testnet].into_iter().find_map(|network| {
            if version == network.private_version() {
                Some((network, true))
            } else if version == network.public_version() {
                Some((network, false))
            } else {
                None
            }
        })
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::Mainnet
    }
}
