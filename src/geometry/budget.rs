// src/geometry/budget.rs

//! Deadline and cancellation checks for long symbolic computations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{GeometryError, Result};

/// Shared flag a caller can flip from another thread to abort a computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Optional deadline plus a cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl Budget {
    pub fn unlimited() -> Self {
        Budget::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Budget {
            deadline: Some(Instant::now() + timeout),
            cancel: CancelToken::new(),
        }
    }

    /// Starts the configured deadline, if any, from now.
    pub fn from_config(config: &Config) -> Self {
        match config.limits.deadline() {
            Some(timeout) => Budget::with_timeout(timeout),
            None => Budget::unlimited(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn check(&self, stage: &'static str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(GeometryError::Cancelled { stage });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(GeometryError::DeadlineExceeded { stage });
        }
        Ok(())
    }
}
