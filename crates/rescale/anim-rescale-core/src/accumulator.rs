//! Root-motion accumulation over a bone chain.

use crate::algebra::{axis_orientation, compose, FacingConvention};
use crate::value::Transform;

/// Per-key running composition of the chain bones' scaled local transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct RootMotionAccumulator {
    keys: Vec<Transform>,
}

impl RootMotionAccumulator {
    /// One identity transform per key.
    pub fn new(key_count: usize) -> Self {
        Self {
            keys: vec![Transform::identity(); key_count],
        }
    }

    /// Fold one chain bone's scaled transform into key `key`.
    ///
    /// Call in ascending skeleton order so each bone nests inside the ones
    /// already folded.
    pub fn fold(&mut self, key: usize, bone: &Transform) {
        let slot = &mut self.keys[key];
        *slot = compose(bone, slot);
    }

    /// Root key `key` re-expressed against the chain's accumulated facing.
    ///
    /// The accumulated position is removed from the root position, then both
    /// the offset and the root rotation are turned by the inverse of the
    /// facing frame built from the accumulated rotation's +X axis.
    pub fn relative_root_key(
        &self,
        key: usize,
        root: &Transform,
        convention: FacingConvention,
    ) -> Transform {
        let acc = &self.keys[key];
        let facing = axis_orientation(&acc.rotation, convention).inverse();
        let translation = root.position - acc.position;
        Transform::new(
            facing.rotate_vector(translation),
            facing * root.rotation,
            root.scale,
        )
    }
}
