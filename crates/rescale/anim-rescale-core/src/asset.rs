//! JSON animation asset: a skeleton plus one keyed track per bone.
//!
//! ```json
//! {
//!   "kind": "animation",
//!   "name": "walk",
//!   "skeleton": { "bones": [ { "name": "root", "reference": { "position": { "x": 0, "y": 0, "z": 0 } } } ] },
//!   "key_count": 2,
//!   "tracks": { "root": [ { "position": { "x": 1, "y": 0, "z": 0 } }, { "position": { "x": 2, "y": 0, "z": 0 } } ] }
//! }
//! ```
//!
//! Omitted rotations default to identity and omitted scales to one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::{AnimationSink, AnimationSource, Bone, SkeletonProvider};
use crate::value::{Quaternion, Transform, Vector3};
use crate::{RescaleError, Result};

/// `kind` tag carried by animation records.
pub const ANIMATION_KIND: &str = "animation";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }
}

impl SkeletonProvider for Skeleton {
    fn bones(&self) -> &[Bone] {
        &self.bones
    }
}

fn animation_kind() -> String {
    ANIMATION_KIND.to_string()
}

/// An animation with its skeleton, keyed by bone name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationAsset {
    #[serde(default = "animation_kind")]
    pub kind: String,
    pub name: String,
    pub skeleton: Skeleton,
    pub key_count: usize,
    #[serde(default)]
    pub tracks: IndexMap<String, Vec<Transform>>,
}

impl AnimationAsset {
    pub fn new(name: impl Into<String>, skeleton: Skeleton, key_count: usize) -> Self {
        Self {
            kind: animation_kind(),
            name: name.into(),
            skeleton,
            key_count,
            tracks: IndexMap::new(),
        }
    }

    /// Insert or replace a track without checking its length.
    pub fn with_track(mut self, bone: impl Into<String>, keys: Vec<Transform>) -> Self {
        self.tracks.insert(bone.into(), keys);
        self
    }

    pub fn track(&self, bone: &str) -> Option<&[Transform]> {
        self.tracks.get(bone).map(Vec::as_slice)
    }

    /// Every present track must hold exactly `key_count` keys.
    pub fn validate(&self) -> Result<()> {
        for (bone, keys) in &self.tracks {
            if keys.len() != self.key_count {
                return Err(RescaleError::TrackLengthMismatch {
                    bone: bone.clone(),
                    expected: self.key_count,
                    actual: keys.len(),
                });
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let asset: AnimationAsset = serde_json::from_str(json)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy under a new name, as a host would when duplicating the asset.
    pub fn duplicate_as(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl SkeletonProvider for AnimationAsset {
    fn bones(&self) -> &[Bone] {
        &self.skeleton.bones
    }
}

impl AnimationSource for AnimationAsset {
    fn key_count(&self) -> usize {
        self.key_count
    }

    fn bone_track(&self, bone: &str) -> Result<Vec<Transform>> {
        self.tracks
            .get(bone)
            .cloned()
            .ok_or_else(|| RescaleError::UnknownBone {
                bone: bone.to_string(),
            })
    }
}

impl AnimationSink for AnimationAsset {
    fn set_bone_track(
        &mut self,
        bone: &str,
        positions: &[Vector3],
        rotations: &[Quaternion],
        scales: &[Vector3],
    ) -> Result<()> {
        if positions.len() != rotations.len() || positions.len() != scales.len() {
            return Err(RescaleError::KeyCountMismatch {
                bone: bone.to_string(),
                positions: positions.len(),
                rotations: rotations.len(),
                scales: scales.len(),
            });
        }
        if positions.len() != self.key_count {
            return Err(RescaleError::TrackLengthMismatch {
                bone: bone.to_string(),
                expected: self.key_count,
                actual: positions.len(),
            });
        }
        let keys = positions
            .iter()
            .zip(rotations)
            .zip(scales)
            .map(|((p, r), s)| Transform::new(*p, *r, *s))
            .collect();
        self.tracks.insert(bone.to_string(), keys);
        Ok(())
    }
}

/// A stored record: either an animation or some other asset kind.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredAsset {
    Animation(AnimationAsset),
    Other { name: String, kind: String },
}

impl StoredAsset {
    /// Parse a record, dispatching on its `kind` field. Records without a
    /// `kind` are read as animations.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        let kind = raw
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(ANIMATION_KIND)
            .to_string();
        if kind == ANIMATION_KIND {
            let asset: AnimationAsset = serde_json::from_value(raw)?;
            asset.validate()?;
            Ok(StoredAsset::Animation(asset))
        } else {
            let name = raw
                .get("name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(StoredAsset::Other { name, kind })
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            StoredAsset::Animation(a) => &a.kind,
            StoredAsset::Other { kind, .. } => kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StoredAsset::Animation(a) => &a.name,
            StoredAsset::Other { name, .. } => name,
        }
    }
}
