/// Crate-level error types for wikiref diagnostics.
use std::path::PathBuf;

use crate::types::ResourceType;

/// Every failure carries enough context to render a useful diagnostic.
/// Resolution itself degrades gracefully; only kind mismatches (programmer
/// errors) and the ambient I/O/config layers produce errors.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as wikiref::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured content root does not exist on disk.
    #[error("content root not found: {}", path.display())]
    ContentRootNotFound {
        /// Path that was expected to hold wiki content.
        path: PathBuf,
    },

    /// An entity type name given on the command line is not recognized.
    #[error("invalid entity type: `{name}`")]
    InvalidEntityType {
        /// The unrecognized name.
        name: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A resource reference was handed to a resolver that only accepts another kind.
    #[error("resource type mismatch: resolver accepts `{expected}`, got `{actual}`")]
    KindMismatch {
        /// Resource type carried by the reference.
        actual: ResourceType,
        /// Resource type the resolver is bound to.
        expected: ResourceType,
    },

    /// An existence oracle could not answer.
    #[error("existence check failed for `{reference}`: {reason}")]
    OracleFailed {
        /// Description of the failure.
        reason: String,
        /// Serialized document reference that was being checked.
        reference: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
