//! One-time platform setup that makes the windowing system safe to use from
//! more than one thread. Must run before any window is created.

use std::sync::OnceLock;

use crate::error::{AppError, Result};

/// Platform hook that enables multi-threaded use of the windowing system
pub trait ThreadSupport: Sync {
    fn init_threads(&self) -> Result<()>;
}

/// Runs a [`ThreadSupport`] backend at most once, caching the outcome
pub struct ThreadInit<B> {
    backend: B,
    outcome: OnceLock<std::result::Result<(), String>>,
}

impl<B: ThreadSupport> ThreadInit<B> {
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            outcome: OnceLock::new(),
        }
    }

    /// Initialise on first call; later calls replay the first outcome
    pub fn ensure(&self) -> Result<()> {
        self.outcome
            .get_or_init(|| {
                self.backend.init_threads().map_err(|err| match err {
                    AppError::ThreadInit(reason) => reason,
                    other => other.to_string(),
                })
            })
            .clone()
            .map_err(AppError::ThreadInit)
    }

    pub fn is_initialized(&self) -> bool {
        self.outcome.get().is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Thread support for the platform this binary was built for
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeThreads;

impl ThreadSupport for NativeThreads {
    #[cfg(target_os = "linux")]
    fn init_threads(&self) -> Result<()> {
        let xlib = match x11_dl::xlib::Xlib::open() {
            Ok(xlib) => xlib,
            Err(err) => {
                log::debug!("libX11 unavailable, skipping XInitThreads: {}", err);
                return Ok(());
            }
        };

        // SAFETY: runs before any window or GPU object exists, so no other
        // Xlib call has been made in this process yet; `ThreadInit` caches the
        // outcome, so this is reached at most once per backend.
        let status = unsafe { (xlib.XInitThreads)() };
        // libX11 has to stay loaded for the thread state to persist
        std::mem::forget(xlib);

        if status == 0 {
            return Err(AppError::ThreadInit("XInitThreads returned 0".into()));
        }
        log::debug!("XInitThreads done");
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn init_threads(&self) -> Result<()> {
        Ok(())
    }
}

static NATIVE: ThreadInit<NativeThreads> = ThreadInit::new(NativeThreads);

/// Process-wide thread setup for the native windowing system
pub fn init_threads() -> Result<()> {
    NATIVE.ensure()
}
