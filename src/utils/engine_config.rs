//! Engine Configuration
//!
//! Process-wide settings read when the curve context is created:
//! - which backend variant serves the operation set
//! - the network whose version bytes extended keys are exported with
//! - debug logging
//! - libsecp256k1 context randomization (side-channel blinding)

use crate::backend::BackendKind;
use crate::hd::Network;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Backend used for every curve operation
    pub backend: BackendKind,
    /// Default network for Base58Check extended keys
    pub network: Network,
    /// Emit debug-level log lines for every operation
    pub debug_logging: bool,
    /// Randomize the libsecp256k1 context after creation
    pub randomize_context: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::native()
    }
}

impl EngineSettings {
    /// libsecp256k1 backend with a blinded context
    pub fn native() -> Self {
        Self {
            backend: BackendKind::LibSecp256k1,
            network: Network::Mainnet,
            debug_logging: false,
            randomize_context: true,
        }
    }

    /// Pure-Rust backend, no native library involved
    pub fn portable() -> Self {
        Self {
            backend: BackendKind::RustCrypto,
            network: Network::Mainnet,
            debug_logging: false,
            randomize_context: false,
        }
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.backend == BackendKind::LibSecp256k1 && !self.randomize_context {
            warnings.push(
                "Warning: libsecp256k1 context is not randomized; signing is less resistant to side channels"
                    .to_string(),
            );
        }

        if self.backend == BackendKind::RustCrypto && self.randomize_context {
            warnings.push(
                "Warning: context randomization has no effect on the RustCrypto backend".to_string(),
            );
        }

        warnings
    }
}

/// Global engine configuration manager
pub struct EngineConfig {
    settings: RwLock<EngineSettings>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// Get current settings.
    ///
    /// A poisoned lock still yields the last written settings.
    pub fn settings(&self) -> EngineSettings {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn backend(&self) -> BackendKind {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).backend
    }

    pub fn network(&self) -> Network {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).network
    }

    /// Update settings; returns validation warnings.
    ///
    /// Backend changes only take effect for contexts created afterwards.
    pub fn update<F>(&self, updater: F) -> Vec<String>
    where
        F: FnOnce(&mut EngineSettings),
    {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        updater(&mut settings);
        apply_logging(&settings);
        settings.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_logging(settings: &EngineSettings) {
    if settings.debug_logging {
        crate::utils::logging::enable_debug();
    } else {
        crate::utils::logging::disable_debug();
    }
}

/// Global engine configuration instance
static ENGINE_CONFIG: std::sync::OnceLock<EngineConfig> = std::sync::OnceLock::new();

/// Get the global engine configuration
pub fn get_engine_config() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::new)
}
