//! Curve Context Lifecycle
//!
//! A `CurveContext` owns the active backend. The process-wide registry
//! creates it lazily on first `acquire` from the global engine settings and
//! hands out shared references; `release` marks it released and no context is
//! created again afterwards.
//!
//! Lifecycle: `Vacant` -> `Live` -> `Released`. Operations holding a context
//! after release fail with `ContextReleased`.
//!
//! Once live, a context is safe to share across threads. Creation and release
//! are serialized by the registry lock.

use crate::backend::{create_backend, BackendKind, CurveBackend};
use crate::error::{EngineError, EngineResult};
use crate::utils::engine_config::{get_engine_config, EngineSettings};
use crate::{log_debug, log_info, log_warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to one backend instance
pub struct CurveContext {
    backend: Box<dyn CurveBackend>,
    released: AtomicBool,
}

impl CurveContext {
    /// Build a context from settings, outside any registry
    pub fn create(settings: &EngineSettings) -> Self {
        for warning in settings.validate() {
            log_warn!("context", warning);
        }
        log_info!(
            "context",
            "Creating curve context",
            backend = settings.backend,
            randomized = settings.randomize_context
        );
        Self {
            backend: create_backend(settings.backend, settings.randomize_context),
            released: AtomicBool::new(false),
        }
    }

    /// The backend, unless the context has been released
    pub fn backend(&self) -> EngineResult<&dyn CurveBackend> {
        if self.is_released() {
            return Err(EngineError::ContextReleased);
        }
        Ok(self.backend.as_ref())
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn mark_released(&self) {
        self.released.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for CurveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveContext")
            .field("backend", &self.kind())
            .field("released", &self.is_released())
            .finish()
    }
}

// MARK: - Registry

enum Slot {
    Vacant,
    Live(Arc<CurveContext>),
    Released,
}

/// Single-context holder with init-once, release-once semantics
pub struct ContextRegistry {
    slot: RwLock<Slot>,
}

impl ContextRegistry {
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(Slot::Vacant),
        }
    }

    /// Live context, created from the global engine settings if needed
    pub fn acquire(&self) -> EngineResult<Arc<CurveContext>> {
        self.acquire_with(|| get_engine_config().settings())
    }

    /// Live context, created from `settings` if needed.
    ///
    /// Settings are ignored when a context is already live.
    pub fn acquire_with<F>(&self, settings: F) -> EngineResult<Arc<CurveContext>>
    where
        F: FnOnce() -> EngineSettings,
    {
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            match &*slot {
                Slot::Live(ctx) => return Ok(Arc::clone(ctx)),
                Slot::Released => return Err(EngineError::ContextReleased),
                Slot::Vacant => {}
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Slot::Live(ctx) => Ok(Arc::clone(ctx)),
            Slot::Released => Err(EngineError::ContextReleased),
            Slot::Vacant => {
                let ctx = Arc::new(CurveContext::create(&settings()));
                *slot = Slot::Live(Arc::clone(&ctx));
                Ok(ctx)
            }
        }
    }

    /// Release the context; later acquisitions fail.
    ///
    /// Releasing twice, or before any acquisition, is a no-op.
    pub fn release(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, Slot::Released) {
            Slot::Live(ctx) => {
                ctx.mark_released();
                log_info!("context", "Curve context released", backend = ctx.kind());
            }
            Slot::Vacant => log_debug!("context", "Release before first acquire"),
            Slot::Released => {}
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(
            *self.slot.read().unwrap_or_else(PoisonError::into_inner),
            Slot::Live(_)
        )
    }

    pub fn is_released(&self) -> bool {
        matches!(
            *self.slot.read().unwrap_or_else(PoisonError::into_inner),
            Slot::Released
        )
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CONTEXT: ContextRegistry = ContextRegistry::new();

/// Process-wide registry
pub fn global_registry() -> &'static ContextRegistry {
    &GLOBAL_CONTEXT
}

/// Acquire the process-wide context
pub fn acquire() -> EngineResult<Arc<CurveContext>> {
    GLOBAL_CONTEXT.acquire()
}

/// Release the process-wide context for the rest of the process lifetime
pub fn release() {
    GLOBAL_CONTEXT.release()
}
