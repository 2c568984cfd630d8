//! Error taxonomy for the engine's service layer.
//!
//! Validation and not-found are caller mistakes and surface as typed
//! variants. Store failures carry through unchanged so callers decide
//! retry or abort. Title-generation failures are deliberately absent:
//! generation is best-effort and swallowed at the call site.

use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Malformed input to a mutation. No partial write occurred.
    Validation(String),
    /// Lookup by id or term found nothing.
    NotFound(String),
    /// The external store call failed.
    Store(StoreError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Validation(msg) => write!(f, "validation error: {}", msg),
            EngineError::NotFound(msg) => write!(f, "not found: {}", msg),
            EngineError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
