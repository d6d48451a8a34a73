//! Listener layer errors.
//!
//! # Error Code Convention
//!
//! All listener errors use the `LISTENER_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`ListenerError::Init`] | `LISTENER_INIT` | No |
//! | [`ListenerError::Callback`] | `LISTENER_CALLBACK` | No |
//!
//! Neither is recoverable from the kernel's point of view: a failed
//! init means the registration is rejected, and a failed callback
//! means the listener is terminated and dropped. The simulation
//! itself continues either way.

use lockstep_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error signalled by (or about) a listener.
///
/// # Example
///
/// ```
/// use lockstep_event::ListenerError;
/// use lockstep_types::ErrorCode;
///
/// let err = ListenerError::Callback("sink closed".into());
/// assert_eq!(err.code(), "LISTENER_CALLBACK");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ListenerError {
    /// `init` failed; the listener was never registered.
    #[error("listener init failed: {0}")]
    Init(String),

    /// A notification callback failed; the listener is terminated and
    /// dropped from the active list.
    #[error("listener callback failed: {0}")]
    Callback(String),
}

impl ErrorCode for ListenerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Init(_) => "LISTENER_INIT",
            Self::Callback(_) => "LISTENER_CALLBACK",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
