//! Core error types for zentimer-core.
//!
//! Every operation in this crate is local and in-memory, so errors are
//! surfaced synchronously to the immediate caller and never retried.

use thiserror::Error;

use crate::timer::TimerState;

/// Core error type for zentimer-core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `start` was called with a non-positive countdown duration.
    #[error("invalid duration: countdown length must be positive, got {secs}s")]
    InvalidDuration { secs: u64 },

    /// An operation was invoked from a state that does not permit it.
    /// The engine's state is left unchanged.
    #[error("illegal state: cannot {operation} while {state:?}")]
    IllegalState {
        operation: &'static str,
        state: TimerState,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
