//! Error kinds for the collection pipeline (spec.md §7).

use thiserror::Error;

/// Errors the resolver can surface. Only `FileOpenFailed` aborts the
/// sample outright — the rest are non-fatal and gathered evidence is kept.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to open {path}: {source}")]
    FileOpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized format for {path}")]
    FormatUnrecognized { path: String },

    #[error("failed to decode {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("missing metadata for {path}: {reason}")]
    MetadataMissing { path: String, reason: String },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(String),
}
