//! Error types for flowline-core operations.
//!
//! The visualization is best-effort: no mutation path on the session can
//! fail, so this type only surfaces from preference persistence internals
//! and the replay tooling.

#[derive(Debug, thiserror::Error)]
pub enum VizError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for Results using VizError.
pub type Result<T> = std::result::Result<T, VizError>;
