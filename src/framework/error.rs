//! # Engine Errors
//!
//! Every failure that can come back from a round-trip to the calculation engine.
//! All of them are fatal to the request that triggered them; nothing here is
//! retried locally.

use crate::model::{Key, RefType};

/// Errors raised by the engine, the transport or the actor in front of them.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EngineError {
    /// A named or identified object does not exist in the engine.
    #[error("{kind} not found ({key})")]
    LookupMiss { kind: RefType, key: Key },

    /// The engine could not be reached or did not answer in time.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine accepted a calculation but reported it failed or never finished.
    #[error("calculation {result} failed: {reason}")]
    CalculationFailed { result: String, reason: String },

    /// The engine answered a call with an error.
    #[error("engine rejected {method}: {message} (code {code})")]
    Rejected {
        method: String,
        code: i64,
        message: String,
    },

    /// The engine answered with a payload of an unexpected shape.
    #[error("unexpected payload for {context}: {reason}")]
    Decode { context: String, reason: String },

    #[error("Engine actor closed")]
    ActorClosed,

    #[error("Engine actor dropped response channel")]
    ActorDropped,
}

impl EngineError {
    /// True for the failures that mean "the engine is not there", as opposed to
    /// "the engine said no".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EngineError::Unavailable(_) | EngineError::ActorClosed | EngineError::ActorDropped
        )
    }
}
