//! Track pipeline: the scale pass over every bone, then the optional
//! root-relative pass over the root bone.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::accumulator::RootMotionAccumulator;
use crate::algebra::FacingConvention;
use crate::config::{ChainSpec, RescaleConfig};
use crate::converter::BoneScaleConverter;
use crate::io::{AnimationSink, AnimationSource, ProgressReporter, SkeletonProvider, TrackKeys};
use crate::value::Transform;
use crate::{RescaleError, Result};

/// What a pipeline run did.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub bones_total: usize,
    pub bones_written: usize,
    pub key_count: usize,
    /// The progress hook asked to stop; bones already written stay written.
    pub cancelled: bool,
    pub root_relative_applied: bool,
    pub effective_scale: f64,
}

/// Rescales every bone track of one animation.
#[derive(Clone, Debug, PartialEq)]
pub struct RescalePipeline {
    converter: BoneScaleConverter,
    chain: ChainSpec,
    root_relative: bool,
    facing: FacingConvention,
}

impl RescalePipeline {
    pub fn new(
        converter: BoneScaleConverter,
        chain: ChainSpec,
        root_relative: bool,
        facing: FacingConvention,
    ) -> Self {
        Self {
            converter,
            chain,
            root_relative,
            facing,
        }
    }

    pub fn from_config(cfg: &RescaleConfig) -> Self {
        let converter = BoneScaleConverter::from_config(cfg);
        if converter.scale() != cfg.scale {
            debug!(
                "scale {} is below the threshold; using {}",
                cfg.scale,
                converter.scale()
            );
        }
        Self::new(converter, cfg.chain.clone(), cfg.root_relative, cfg.facing)
    }

    pub fn converter(&self) -> &BoneScaleConverter {
        &self.converter
    }

    /// Run both passes. Tracks are read from `source` and written to `sink`;
    /// the root-relative pass rereads the root's original track from `source`.
    ///
    /// An empty skeleton returns immediately without touching either side.
    /// Errors leave earlier writes in place.
    pub fn run<K, S, D, P>(
        &self,
        skeleton: &K,
        source: &S,
        sink: &mut D,
        progress: &mut P,
    ) -> Result<PipelineReport>
    where
        K: SkeletonProvider + ?Sized,
        S: AnimationSource + ?Sized,
        D: AnimationSink + ?Sized,
        P: ProgressReporter + ?Sized,
    {
        let bones = skeleton.bones();
        let mut report = PipelineReport {
            bones_total: bones.len(),
            effective_scale: self.converter.scale(),
            ..Default::default()
        };
        if bones.is_empty() {
            debug!("empty skeleton, nothing to rescale");
            return Ok(report);
        }

        let key_count = source.key_count();
        report.key_count = key_count;

        let in_chain = if self.root_relative {
            self.chain.resolve(bones)?
        } else {
            vec![false; bones.len()]
        };
        let mut accumulator =
            RootMotionAccumulator::new(if self.root_relative { key_count } else { 0 });

        // Scale pass
        for (bone_index, bone) in bones.iter().enumerate() {
            let track = read_track(source, &bone.name, key_count)?;

            let mut keys = TrackKeys::with_capacity(key_count);
            for (key_index, key) in track.iter().enumerate() {
                let scaled = self.converter.convert_key(bone_index, &bone.reference, key);
                if in_chain[bone_index] {
                    accumulator.fold(key_index, &scaled);
                }
                keys.push(scaled);
            }
            keys.write_to(sink, &bone.name)?;
            report.bones_written += 1;
            debug!("rescaled bone {} ({}/{})", bone.name, bone_index + 1, bones.len());

            // A stop after the last bone does not cancel.
            let more = bone_index + 1 < bones.len();
            if !progress.report(bone_index + 1, bones.len()) && more {
                warn!(
                    "rescale cancelled after {}/{} bones",
                    bone_index + 1,
                    bones.len()
                );
                report.cancelled = true;
                return Ok(report);
            }
        }

        // Root-relative pass
        if self.root_relative {
            let root = &bones[0];
            let original = read_track(source, &root.name, key_count)?;
            let mut keys = TrackKeys::with_capacity(key_count);
            for (key_index, key) in original.iter().enumerate() {
                keys.push(accumulator.relative_root_key(key_index, key, self.facing));
            }
            keys.write_to(sink, &root.name)?;
            report.root_relative_applied = true;
            debug!("rewrote root bone {} relative to chain", root.name);
        }

        Ok(report)
    }
}

impl Default for RescalePipeline {
    fn default() -> Self {
        Self::from_config(&RescaleConfig::default())
    }
}

fn read_track<S: AnimationSource + ?Sized>(
    source: &S,
    bone: &str,
    key_count: usize,
) -> Result<Vec<Transform>> {
    let track = source.bone_track(bone)?;
    if track.len() != key_count {
        return Err(RescaleError::TrackLengthMismatch {
            bone: bone.to_string(),
            expected: key_count,
            actual: track.len(),
        });
    }
    Ok(track)
}
