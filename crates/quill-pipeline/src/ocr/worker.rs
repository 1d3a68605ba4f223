//! Lifecycle wrapper around a process-scoped OCR engine.
//!
//! The engine is stateful: parameters are applied and then recognition runs,
//! so two callers must never interleave. [`OcrWorker`] hands out one
//! [`OcrSession`] at a time and tracks the engine through an explicit state
//! machine:
//!
//! ```text
//! Uninitialized --initialize--> Initializing --ok--> Ready --terminate--> Terminated
//!                                    |
//!                                    +--err--> Uninitialized
//! ```
//!
//! Work outside `Ready` is refused with [`Error::EngineNotReady`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};

use quill_core::{Error, OcrEngine, OcrParameters, Result};

/// Lifecycle state of the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Terminated,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initializing => write!(f, "initializing"),
            Self::Ready => write!(f, "ready"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Owns the OCR engine and serializes access to it.
pub struct OcrWorker {
    engine: Arc<dyn OcrEngine>,
    state: RwLock<EngineState>,
    session: Mutex<()>,
}

impl OcrWorker {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            state: RwLock::new(EngineState::Uninitialized),
            session: Mutex::new(()),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == EngineState::Ready
    }

    /// Load the engine for `language`. Calling it on a ready worker is a no-op.
    #[instrument(skip(self), fields(engine = self.engine.name()))]
    pub async fn initialize(&self, language: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            match *state {
                EngineState::Ready => return Ok(()),
                EngineState::Uninitialized => *state = EngineState::Initializing,
                other => {
                    return Err(Error::EngineNotReady(format!(
                        "cannot initialize a worker that is {}",
                        other
                    )))
                }
            }
        }

        let result = self.engine.initialize(language).await;

        let mut state = self.state.write().await;
        match result {
            Ok(()) if *state == EngineState::Initializing => {
                *state = EngineState::Ready;
                info!(language, "OCR engine ready");
                Ok(())
            }
            Ok(()) => {
                // Terminated while loading; release what was just loaded.
                drop(state);
                self.engine.terminate().await?;
                Err(Error::EngineNotReady(
                    "worker terminated during initialization".to_string(),
                ))
            }
            Err(e) => {
                if *state == EngineState::Initializing {
                    *state = EngineState::Uninitialized;
                }
                warn!(error = %e, "OCR engine initialization failed");
                Err(e)
            }
        }
    }

    /// Acquire exclusive use of the engine.
    ///
    /// Waits for any in-flight session, then refuses unless the worker is
    /// `Ready`.
    pub async fn session(&self) -> Result<OcrSession<'_>> {
        let guard = self.session.lock().await;
        let state = self.state().await;
        if state != EngineState::Ready {
            return Err(Error::EngineNotReady(format!("OCR engine is {}", state)));
        }
        Ok(OcrSession {
            engine: self.engine.as_ref(),
            _guard: guard,
        })
    }

    /// Stop accepting work, wait for the in-flight session, then tear down.
    #[instrument(skip(self), fields(engine = self.engine.name()))]
    pub async fn terminate(&self) -> Result<()> {
        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut *state, EngineState::Terminated)
        };

        match previous {
            EngineState::Terminated => Ok(()),
            EngineState::Uninitialized => {
                debug!("Terminated OCR worker that was never initialized");
                Ok(())
            }
            // initialize() tears the engine down itself once loading finishes.
            EngineState::Initializing => Ok(()),
            EngineState::Ready => {
                let _guard = self.session.lock().await;
                self.engine.terminate().await?;
                info!("OCR engine terminated");
                Ok(())
            }
        }
    }
}

/// Exclusive access to the OCR engine for a sequence of recognition calls.
pub struct OcrSession<'a> {
    engine: &'a dyn OcrEngine,
    _guard: MutexGuard<'a, ()>,
}

impl OcrSession<'_> {
    /// Apply `params` and recognize `image`.
    pub async fn recognize(&self, params: &OcrParameters, image: &[u8]) -> Result<String> {
        self.engine.set_parameters(params).await?;
        self.engine.recognize(image).await
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}
