//! Contracts between the rescale pipeline and the host that owns the data.
//!
//! The pipeline never sees a concrete asset type. It reads bones through a
//! [`SkeletonProvider`], reads tracks through an [`AnimationSource`] and
//! writes tracks through an [`AnimationSink`].

use serde::{Deserialize, Serialize};

use crate::value::{Quaternion, Transform, Vector3};
use crate::Result;

/// A named joint with its reference-pose transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub reference: Transform,
}

impl Bone {
    pub fn new(name: impl Into<String>, reference: Transform) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }
}

/// Ordered bones of a skeleton. Index 0 is the root.
pub trait SkeletonProvider {
    fn bones(&self) -> &[Bone];
}

impl SkeletonProvider for [Bone] {
    fn bones(&self) -> &[Bone] {
        self
    }
}

impl SkeletonProvider for Vec<Bone> {
    fn bones(&self) -> &[Bone] {
        self
    }
}

/// Read side of an animation.
pub trait AnimationSource {
    /// Number of keys shared by every track.
    fn key_count(&self) -> usize;

    /// All keys of `bone`. Fails with `UnknownBone` for a name without a track.
    fn bone_track(&self, bone: &str) -> Result<Vec<Transform>>;
}

/// Write side of an animation.
pub trait AnimationSink {
    /// Replace the whole track of `bone`. The three slices must have equal length.
    fn set_bone_track(
        &mut self,
        bone: &str,
        positions: &[Vector3],
        rotations: &[Quaternion],
        scales: &[Vector3],
    ) -> Result<()>;
}

/// Split key channels of one bone track, as handed to a sink.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackKeys {
    pub positions: Vec<Vector3>,
    pub rotations: Vec<Quaternion>,
    pub scales: Vec<Vector3>,
}

impl TrackKeys {
    pub fn with_capacity(keys: usize) -> Self {
        Self {
            positions: Vec::with_capacity(keys),
            rotations: Vec::with_capacity(keys),
            scales: Vec::with_capacity(keys),
        }
    }

    pub fn push(&mut self, key: Transform) {
        self.positions.push(key.position);
        self.rotations.push(key.rotation);
        self.scales.push(key.scale);
    }

    pub fn write_to<S: AnimationSink + ?Sized>(&self, sink: &mut S, bone: &str) -> Result<()> {
        sink.set_bone_track(bone, &self.positions, &self.rotations, &self.scales)
    }
}

/// Progress hook called between bones. Returning `false` stops the run.
pub trait ProgressReporter {
    fn report(&mut self, current: usize, total: usize) -> bool;
}

impl<F> ProgressReporter for F
where
    F: FnMut(usize, usize) -> bool,
{
    fn report(&mut self, current: usize, total: usize) -> bool {
        self(current, total)
    }
}

/// Reporter that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _current: usize, _total: usize) -> bool {
        true
    }
}
