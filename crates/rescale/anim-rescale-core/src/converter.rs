//! Per-key bone rescaling.

use crate::algebra::{root_unrotation, safe_normalize};
use crate::config::{effective_scale, RescaleConfig};
use crate::value::{Quaternion, Transform, Vector3};

/// Move `anim` so that its offset from `reference` keeps its direction but
/// has its length multiplied by `scale`.
///
/// A zero offset stays at `reference` whatever the scale.
pub fn scale_bone_key(reference: Vector3, anim: Vector3, scale: f64) -> Vector3 {
    let delta = anim - reference;
    let direction = safe_normalize(delta);
    reference + direction * (delta.length() * scale)
}

/// Rescales keys bone by bone and optionally turns the root.
#[derive(Clone, Debug, PartialEq)]
pub struct BoneScaleConverter {
    scale: f64,
    unrotate_root: bool,
    root_correction: Quaternion,
}

impl BoneScaleConverter {
    /// `scale` goes through the same epsilon substitution as the config.
    pub fn new(scale: f64, unrotate_root: bool) -> Self {
        Self {
            scale: effective_scale(scale),
            unrotate_root,
            root_correction: root_unrotation(),
        }
    }

    pub fn from_config(cfg: &RescaleConfig) -> Self {
        Self::new(cfg.scale, cfg.unrotate_root)
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn unrotate_root(&self) -> bool {
        self.unrotate_root
    }

    /// Rotation to store for `bone_index`.
    pub fn convert_rotation(&self, bone_index: usize, rotation: Quaternion) -> Quaternion {
        if self.unrotate_root && bone_index == 0 {
            self.root_correction * rotation
        } else {
            rotation
        }
    }

    /// Scaled key for `bone_index`. Scale components pass through.
    pub fn convert_key(&self, bone_index: usize, reference: &Transform, key: &Transform) -> Transform {
        Transform::new(
            scale_bone_key(reference.position, key.position, self.scale),
            self.convert_rotation(bone_index, key.rotation),
            key.scale,
        )
    }
}

impl Default for BoneScaleConverter {
    fn default() -> Self {
        Self::from_config(&RescaleConfig::default())
    }
}
