//! BIP32 Extended Keys
//!
//! An `ExtendedKey` is a secp256k1 key plus chain code and path metadata.
//! Derivation never mutates: every `derive` returns a new, independent key.
//!
//! Child key derivation for parent chain code `c` and child number `i`:
//! - hardened: `I = HMAC-SHA512(c, 0x00 ‖ k ‖ ser32(i))`
//! - normal:   `I = HMAC-SHA512(c, serP(K) ‖ ser32(i))`
//!
//! The child private key is `k + I_L`, the child chain code is `I_R`.
//! Public-only keys derive `K + I_L·G` and cannot follow hardened indices.

use super::path::{DerivationAxis, DerivationPath};
use super::{Network, EXTENDED_KEY_LEN, MASTER_KEY_SALT, MAX_SEED_LEN, MIN_SEED_LEN};
use crate::codec;
use crate::engine::Secp256k1Engine;
use crate::error::{EngineError, EngineResult};
use crate::types::{PrivateKey, PublicKey};
use crate::utils::engine_config::get_engine_config;
use crate::utils::hashing::{hash160, hmac_sha512};
use crate::{log_debug, log_info};
use zeroize::Zeroizing;

/// Key, chain code and position in a derivation tree
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
    chain_code: Zeroizing<[u8; 32]>,
    depth: u8,
    child_number: u32,
    parent_fingerprint: [u8; 4],
    path: DerivationPath,
}

impl ExtendedKey {
    // MARK: - Construction

    /// Master key from a 16 to 64 byte seed
    pub fn from_seed(engine: &Secp256k1Engine, seed: &[u8]) -> EngineResult<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(EngineError::invalid_length("seed", "16 to 64 bytes", seed.len()));
        }

        let i = hmac_sha512(MASTER_KEY_SALT, &[seed])?;
        let private_key = PrivateKey::from_slice(&i[..32])?;
        let public_key = engine.create_public_key(&private_key, true)?;

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);

        let master = Self {
            private_key: Some(private_key),
            public_key,
            chain_code,
            depth: 0,
            child_number: 0,
            parent_fingerprint: [0u8; 4],
            path: DerivationPath::master(),
        };
        log_info!("hd", "Master key created", fingerprint = hex::encode(master.fingerprint()));
        Ok(master)
    }

    // MARK: - Derivation

    /// Child key at `axis`
    pub fn derive(&self, engine: &Secp256k1Engine, axis: DerivationAxis) -> EngineResult<Self> {
        let depth = self.depth.checked_add(1).ok_or(EngineError::MaxDepthExceeded)?;
        let child_number = axis.child_number().to_be_bytes();
        let compressed = self.public_key.serialize_compressed();

        let i = match (&self.private_key, axis.is_hardened()) {
            (Some(private_key), true) => hmac_sha512(
                &self.chain_code[..],
                &[&[0x00], private_key.as_bytes(), &child_number],
            )?,
            (None, true) => return Err(EngineError::PrivateKeyRequired),
            (_, false) => hmac_sha512(&self.chain_code[..], &[&compressed, &child_number])?,
        };

        let mut tweak = Zeroizing::new([0u8; 32]);
        tweak.copy_from_slice(&i[..32]);
        if !codec::is_below_order(&tweak) {
            return Err(EngineError::InvalidScalar("derived_tweak"));
        }

        let (private_key, public_key) = match &self.private_key {
            Some(parent) => {
                let child = engine.tweak_add_private(parent, &tweak[..])?;
                let public_key = engine.create_public_key(&child, true)?;
                (Some(child), public_key)
            }
            None => (None, engine.tweak_add_public(&self.public_key, &tweak[..])?),
        };

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);

        let child = Self {
            private_key,
            public_key: public_key.with_compression(true),
            chain_code,
            depth,
            child_number: axis.child_number(),
            parent_fingerprint: self.fingerprint(),
            path: self.path.child(axis),
        };

        log_debug!(
            "hd",
            "Derived child key",
            path = child.path,
            depth = child.depth,
            public_key = child.public_key.to_hex()
        );
        Ok(child)
    }

    /// Fold `derive` over every axis of `path`
    pub fn derive_path(&self, engine: &Secp256k1Engine, path: &DerivationPath) -> EngineResult<Self> {
        path.axes()
            .iter()
            .try_fold(self.clone(), |key, axis| key.derive(engine, *axis))
    }

    /// Parse `path` and derive along it
    pub fn derive_path_str(&self, engine: &Secp256k1Engine, path: &str) -> EngineResult<Self> {
        self.derive_path(engine, &path.parse::<DerivationPath>()?)
    }

    /// Public-only copy
    pub fn neuter(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    // MARK: - Accessors

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn key_pair(&self) -> Option<(&PrivateKey, &PublicKey)> {
        self.private_key.as_ref().map(|k| (k, &self.public_key))
    }

    pub fn is_private(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// Path from the key this one was created or imported from
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// HASH160 of the compressed public key
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key.serialize_compressed())
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    // MARK: - Base58Check

    /// xprv/tprv when the private key is present, xpub/tpub otherwise
    pub fn to_base58(&self, network: Network) -> String {
        let payload = match &self.private_key {
            Some(private_key) => {
                let mut key_data = Zeroizing::new([0u8; 33]);
                key_data[1..].copy_from_slice(private_key.as_bytes());
                self.encode(network.private_version(), &key_data)
            }
            None => self.encode(network.public_version(), &self.public_key.serialize_compressed()),
        };
        bs58::encode(payload.as_slice()).with_check().into_string()
    }

    /// xpub/tpub regardless of private key presence
    pub fn to_extended_public(&self, network: Network) -> String {
        let payload = self.encode(network.public_version(), &self.public_key.serialize_compressed());
        bs58::encode(payload.as_slice()).with_check().into_string()
    }

    /// `to_base58` on the configured default network
    pub fn to_base58_default(&self) -> String {
        self.to_base58(get_engine_config().network())
    }

    /// `to_extended_public` on the configured default network
    pub fn to_extended_public_default(&self) -> String {
        self.to_extended_public(get_engine_config().network())
    }

    fn encode(&self, version: [u8; 4], key_data: &[u8; 33]) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(EXTENDED_KEY_LEN));
        out.extend_from_slice(&version);
        out.push(self.depth);
        out.extend_from_slice(&self.parent_fingerprint);
        out.extend_from_slice(&self.child_number.to_be_bytes());
        out.extend_from_slice(&self.chain_code[..]);
        out.extend_from_slice(key_data);
        out
    }

    /// Import a Base58Check extended key
    pub fn from_base58(engine: &Secp256k1Engine, text: &str) -> EngineResult<Self> {
        Self::from_base58_with_network(engine, text).map(|(key, _)| key)
    }

    /// Import a Base58Check extended key and report its network
    pub fn from_base58_with_network(engine: &Secp256k1Engine, text: &str) -> EngineResult<(Self, Network)> {
        let data = Zeroizing::new(bs58::decode(text.trim()).with_check(None).into_vec()?);
        if data.len() != EXTENDED_KEY_LEN {
            return Err(EngineError::invalid_encoding(format!(
                "extended key payload is {} bytes, expected {}",
                data.len(),
                EXTENDED_KEY_LEN
            )));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[..4]);
        let (network, is_private) = Network::from_version(version)
            .ok_or_else(|| EngineError::invalid_encoding(format!("unknown version bytes {}", hex::encode(version))))?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut child_number = [0u8; 4];
        child_number.copy_from_slice(&data[9..13]);
        let child_number = u32::from_be_bytes(child_number);

        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_number != 0) {
            return Err(EngineError::invalid_encoding(
                "master key with non-zero parent fingerprint or child number",
            ));
        }

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&data[13..45]);
        let key_data = &data[45..];

        let (private_key, public_key) = if is_private {
            if key_data[0] != 0x00 {
                return Err(EngineError::invalid_encoding("private key data must start with 0x00"));
            }
            let private_key = PrivateKey::from_slice(&key_data[1..])
                .map_err(|e| EngineError::invalid_encoding(format!("private key: {}", e)))?;
            let public_key = engine.create_public_key(&private_key, true)?;
            (Some(private_key), public_key)
        } else {
            let public_key = engine
                .parse_public_key(key_data)
                .map_err(|e| EngineError::invalid_encoding(format!("public key: {}", e)))?;
            (None, public_key)
        };

        log_debug!(
            "hd",
            "Imported extended key",
            depth = depth,
            kind = if is_private { "xprv" } else { "xpub" }
        );

        Ok((
            Self {
                private_key,
                public_key,
                chain_code,
                depth,
                child_number,
                parent_fingerprint,
                path: DerivationPath::master(),
            },
            network,
        ))
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &self.public_key)
            .field("private", &self.is_private())
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("path", &self.path.to_string())
            .finish()
    }
}
