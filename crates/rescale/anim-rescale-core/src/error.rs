//! Error types for animation rescaling

use serde::{Deserialize, Serialize};

/// Error type for rescaling operations.
///
/// Numeric edge cases (zero-length displacements, sub-epsilon scales, empty
/// skeletons) never show up here; they are absorbed where they occur.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RescaleError {
    /// The animation has no track for a skeleton bone
    #[error("Bone not found in animation: {bone}")]
    UnknownBone { bone: String },

    /// A bone track does not have one key per animation frame
    #[error("Track length mismatch for bone {bone}: expected {expected} keys, got {actual}")]
    TrackLengthMismatch {
        bone: String,
        expected: usize,
        actual: usize,
    },

    /// Positions, rotations and scales handed to a sink disagree in length
    #[error(
        "Key count mismatch for bone {bone}: positions={positions}, rotations={rotations}, scales={scales}"
    )]
    KeyCountMismatch {
        bone: String,
        positions: usize,
        rotations: usize,
        scales: usize,
    },

    /// A bone named in the chain override is not part of the skeleton
    #[error("Chain bone not found in skeleton: {bone}")]
    UnknownChainBone { bone: String },

    /// The selected asset is not an animation
    #[error("Asset is not an animation: {asset} (kind: {kind})")]
    NotAnimatable { asset: String, kind: String },

    /// The asset could not be duplicated before rescaling
    #[error("Asset duplication failed: {asset} -> {target}: {reason}")]
    Duplication {
        asset: String,
        target: String,
        reason: String,
    },

    /// The asset does not exist in the store
    #[error("Asset not found: {asset}")]
    AssetNotFound { asset: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// IO error
    #[error("IO error: {reason}")]
    Io { reason: String },
}

impl RescaleError {
    /// Whether a batch may carry on with the next asset after this error.
    ///
    /// Every per-asset failure is recoverable at batch level; only a bad
    /// configuration stops the whole run.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. })
    }

    /// Error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownBone { .. }
            | Self::TrackLengthMismatch { .. }
            | Self::KeyCountMismatch { .. }
            | Self::UnknownChainBone { .. } => "structure",
            Self::NotAnimatable { .. } => "selection",
            Self::Duplication { .. } | Self::AssetNotFound { .. } => "asset",
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

impl From<serde_json::Error> for RescaleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for RescaleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}
