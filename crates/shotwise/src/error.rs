// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Error types for Shotwise

use thiserror::Error;

/// Result type alias for Shotwise operations
pub type Result<T> = core::result::Result<T, Error>;

/// Main error type for Shotwise
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed score or weight inputs (length mismatch, NaN, out of range)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A weighted draw needs a teacher score that was never recorded.
    #[error("Missing teacher score for demo {id:?}")]
    MissingScore {
        /// Identifier of the augmented demo without a score
        id: String,
    },

    /// Workflow misuse: wrong propose/step/revert order or missing configuration
    #[error("State error: {0}")]
    State(String),

    /// A single demo could not be rendered to text.
    ///
    /// Only produced by the per-item render path; the batch renderer
    /// recovers from it with a fallback representation.
    #[error("Render error for demo {id:?}: {reason}")]
    Render {
        /// Identifier of the demo that failed to render
        id: String,
        /// Underlying serializer message
        reason: String,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a missing score error
    pub fn missing_score(id: impl Into<String>) -> Self {
        Self::MissingScore { id: id.into() }
    }

    /// Create a render error
    pub fn render(id: impl Into<String>, reason: impl core::fmt::Display) -> Self {
        Self::Render {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error is recovered locally rather than returned to the caller.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Render { .. })
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::MissingScore { .. } => "missing_score",
            Self::State(_) => "state",
            Self::Render { .. } => "render",
        }
    }
}
