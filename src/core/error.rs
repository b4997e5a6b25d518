//! Error taxonomy for the render pipeline core.
//!
//! A single enum covers every failure mode the pipeline can report: a
//! missing resource, a malformed document or shader, a backend-side GPU
//! failure, a uniform type mismatch, an internal invariant violation, and
//! cancellation of an in-flight operation.

use std::fmt;

/// Crate-wide result alias.
pub type RenderResult<T> = Result<T, RenderError>;

/// The error taxonomy for the render pipeline core.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A named or UUID'd resource is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A scene document, shader source, or mesh file was malformed.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The graphics backend rejected an operation.
    #[error("gpu error: {0}")]
    GpuError(String),

    /// A uniform was set with a value whose kind differs from its declared kind.
    #[error("uniform kind mismatch for `{name}`: declared {declared}, got {actual}")]
    UniformKindMismatch {
        /// Name of the uniform that was written.
        name: String,
        /// The kind recorded when the uniform was first stored.
        declared: &'static str,
        /// The kind of the value that was supplied.
        actual: &'static str,
    },

    /// An internal invariant failed.
    ///
    /// Debug builds should treat this as fatal (the caller is expected to
    /// additionally `debug_assert!` at the call site); release builds log
    /// and continue with this error reported to the caller.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An operation was aborted before completion.
    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl RenderError {
    /// Logs an invariant violation and returns the corresponding error,
    /// per the "log and attempt to proceed" release-build policy above.
    ///
    /// Debug builds additionally panic via `debug_assert!`, so this function
    /// never returns in a `debug_assertions` build unless the condition
    /// itself is benign enough that callers chose not to assert on it.
    pub fn invariant(context: impl fmt::Display) -> Self {
        let message = context.to_string();
        log::error!(target: "render_core::invariant", "{message}");
        RenderError::InvariantViolation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_kind_mismatch_message_contains_both_kinds() {
        let err = RenderError::UniformKindMismatch {
            name: "uColor".into(),
            declared: "Vec4",
            actual: "Vec3",
        };
        let msg = err.to_string();
        assert!(msg.contains("Vec4"));
        assert!(msg.contains("Vec3"));
        assert!(msg.contains("uColor"));
    }

    #[test]
    fn invariant_helper_wraps_message() {
        let err = RenderError::invariant("world matrix diverged");
        match err {
            RenderError::InvariantViolation(msg) => assert_eq!(msg, "world matrix diverged"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
