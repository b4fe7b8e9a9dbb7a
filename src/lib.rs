//! secp256k1 Engine
//!
//! Unified secp256k1 cryptography behind one platform-independent API, plus
//! BIP32 hierarchical deterministic derivation built on top of it.
//!
//! # Architecture
//!
//! This crate provides:
//! - **context**: process-wide curve context with explicit acquire/release
//! - **backend**: interchangeable curve backends (libsecp256k1, pure-Rust k256)
//! - **marshal**: exact-length native buffers and scoped backend values
//! - **codec**: key and signature validation and (de)serialization
//! - **engine**: ECDSA, Schnorr, ECDH and key tweaking
//! - **hd**: BIP32 extended keys, derivation paths, Base58Check
//!
//! # Security
//!
//! Private keys, chain codes, shared secrets and marshaled buffers are wiped
//! with `zeroize` when dropped. Every input is validated before it reaches a
//! backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use secp_engine::{hd::ExtendedKey, Secp256k1Engine};
//!
//! let engine = Secp256k1Engine::new()?;
//! let key = engine.generate_private_key()?;
//! let signature = engine.sign(&key, &message_hash)?;
//!
//! let master = ExtendedKey::from_seed(&engine, &seed)?;
//! let account = master.derive_path_str(&engine, "m/84'/0'/0'")?;
//! ```

pub mod backend;
pub mod codec;
pub mod context;
pub mod engine;
pub mod error;
pub mod hd;
pub mod marshal;
pub mod serde_bytes;
pub mod types;
pub mod utils;

pub use backend::{BackendKind, CurveBackend};
pub use context::{ContextRegistry, CurveContext};
pub use engine::Secp256k1Engine;
pub use error::{EngineError, EngineResult};
pub use hd::{DerivationAxis, DerivationPath, ExtendedKey, Network};
pub use types::{
    EcdsaSignature, PrivateKey, PublicKey, RecoverableSignature, RecoveryId, SchnorrSignature,
    SharedSecret, XOnlyPublicKey,
};
pub use utils::engine_config::{get_engine_config, EngineSettings};
