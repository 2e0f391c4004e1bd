//! Bridge error taxonomy.
//!
//! These errors never escape the bridge's public surface; they exist for
//! logging and for labeling fallback elements. Every variant corresponds to a
//! locally recovered failure mode.

use thiserror::Error;

/// Locally recovered bridge failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The external widget module could not be loaded in time.
    #[error("external widget module load failed: {0}")]
    Load(String),

    /// A raw factory arrived in a shape no normalization rule recognizes.
    #[error("factory `{name}` has an unrecognized shape")]
    Normalization {
        /// Factory name as discovered on the module.
        name: String,
    },

    /// A widget name or requested method variant did not resolve.
    #[error("widget `{name}` did not resolve: {reason}")]
    Resolution {
        /// Requested widget name.
        name: String,
        /// Human-readable resolution failure.
        reason: String,
    },

    /// A resolved creation function failed or returned an unusable value.
    #[error("widget `{name}` creation failed: {reason}")]
    Creation {
        /// Requested widget name.
        name: String,
        /// Human-readable creation failure.
        reason: String,
    },

    /// Appending the created element into the container failed.
    #[error("widget `{name}` mount failed: {reason}")]
    Mount {
        /// Requested widget name.
        name: String,
        /// Human-readable mount failure.
        reason: String,
    },

    /// An element-supplied destroy hook failed during cleanup.
    #[error("cleanup step failed for widget `{name}`: {reason}")]
    Cleanup {
        /// Widget name the mount record belonged to.
        name: String,
        /// Human-readable hook failure.
        reason: String,
    },
}
