//! Rescale configuration.

use serde::{Deserialize, Serialize};

use crate::algebra::FacingConvention;
use crate::io::Bone;
use crate::{RescaleError, Result};

/// Default scale: meters per inch.
pub const DEFAULT_SCALE: f64 = 0.0254;

/// Scales below this are replaced by [`DEFAULT_SCALE`].
pub const SCALE_EPSILON: f64 = 1e-4;

/// Name suffix for duplicated assets.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_Scaled";

/// Bones whose scaled transforms are folded into the root-motion accumulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainSpec {
    /// The first `n` bones in skeleton order (root, delta, start for n = 3).
    Leading(usize),
    /// Bones picked by name. They are still folded in skeleton order.
    Named(Vec<String>),
}

impl Default for ChainSpec {
    fn default() -> Self {
        ChainSpec::Leading(3)
    }
}

impl ChainSpec {
    /// Membership mask over `bones`.
    ///
    /// `Leading(n)` clamps to the skeleton size; `Named` fails on a name the
    /// skeleton does not have.
    pub fn resolve(&self, bones: &[Bone]) -> Result<Vec<bool>> {
        let mut mask = vec![false; bones.len()];
        match self {
            ChainSpec::Leading(n) => {
                for slot in mask.iter_mut().take(*n) {
                    *slot = true;
                }
            }
            ChainSpec::Named(names) => {
                for name in names {
                    let idx = bones.iter().position(|b| &b.name == name).ok_or_else(|| {
                        RescaleError::UnknownChainBone { bone: name.clone() }
                    })?;
                    mask[idx] = true;
                }
            }
        }
        Ok(mask)
    }
}

/// Parameters of one rescale run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescaleConfig {
    /// Multiplier on each bone's displacement from its reference location.
    pub scale: f64,
    /// Turn the root bone -90 degrees about +Z on every key.
    pub unrotate_root: bool,
    /// Rewrite the root track as motion relative to the chain.
    pub root_relative: bool,
    pub chain: ChainSpec,
    pub facing: FacingConvention,
    /// Appended to the asset name when duplicating.
    pub output_suffix: String,
}

impl Default for RescaleConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            unrotate_root: false,
            root_relative: false,
            chain: ChainSpec::default(),
            facing: FacingConvention::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl RescaleConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: RescaleConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Scale actually applied: anything below [`SCALE_EPSILON`] (zero,
    /// negatives and NaN included) becomes [`DEFAULT_SCALE`].
    pub fn effective_scale(&self) -> f64 {
        effective_scale(self.scale)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() {
            return Err(RescaleError::InvalidConfig {
                reason: format!("scale must be finite, got {}", self.scale),
            });
        }
        if self.output_suffix.is_empty() {
            return Err(RescaleError::InvalidConfig {
                reason: "output suffix must not be empty".into(),
            });
        }
        if self
            .output_suffix
            .chars()
            .any(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(RescaleError::InvalidConfig {
                reason: format!("output suffix contains a path separator: {:?}", self.output_suffix),
            });
        }
        Ok(())
    }

    /// Name of the duplicate produced for `asset`.
    pub fn derived_name(&self, asset: &str) -> String {
        format!("{asset}{}", self.output_suffix)
    }
}

/// See [`RescaleConfig::effective_scale`].
pub fn effective_scale(scale: f64) -> f64 {
    if scale.is_nan() || scale < SCALE_EPSILON {
        DEFAULT_SCALE
    } else {
        scale
    }
}
