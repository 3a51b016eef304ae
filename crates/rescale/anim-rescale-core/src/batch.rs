//! Sequential rescaling of several assets.
//!
//! Each asset is duplicated to `<id><suffix>`, the duplicate is rescaled from
//! the untouched original and then saved. A failure on one asset is logged
//! and recorded; the batch moves on to the next id. When the pipeline itself
//! fails the duplicate is removed again.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::asset::{AnimationAsset, StoredAsset};
use crate::config::RescaleConfig;
use crate::io::{NoProgress, ProgressReporter};
use crate::pipeline::{PipelineReport, RescalePipeline};
use crate::store::AssetStore;
use crate::{RescaleError, Result};

/// Result for one asset of a batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssetOutcome {
    Rescaled {
        source: String,
        target: String,
        report: PipelineReport,
    },
    /// Not an animation; the pipeline never ran.
    Skipped { source: String, reason: RescaleError },
    Failed { source: String, error: RescaleError },
    /// The progress hook stopped the run. The duplicate keeps the bones
    /// written so far and no further assets are processed.
    Cancelled {
        source: String,
        target: String,
        report: PipelineReport,
    },
}

impl AssetOutcome {
    pub fn source(&self) -> &str {
        match self {
            AssetOutcome::Rescaled { source, .. }
            | AssetOutcome::Skipped { source, .. }
            | AssetOutcome::Failed { source, .. }
            | AssetOutcome::Cancelled { source, .. } => source,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<AssetOutcome>,
}

impl BatchReport {
    pub fn rescaled(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Rescaled { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, AssetOutcome::Failed { .. }))
    }

    pub fn cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, AssetOutcome::Cancelled { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, f: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| f(o)).count()
    }
}

/// Drives a [`RescalePipeline`] over assets held by an [`AssetStore`].
#[derive(Clone, Debug)]
pub struct BatchRescaler {
    config: RescaleConfig,
    pipeline: RescalePipeline,
}

impl BatchRescaler {
    pub fn new(config: RescaleConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = RescalePipeline::from_config(&config);
        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &RescaleConfig {
        &self.config
    }

    pub fn run<S: AssetStore + ?Sized>(&self, store: &mut S, ids: &[String]) -> BatchReport {
        self.run_with_progress(store, ids, &mut NoProgress)
    }

    /// `progress` is handed to every pipeline run in turn.
    pub fn run_with_progress<S, P>(&self, store: &mut S, ids: &[String], progress: &mut P) -> BatchReport
    where
        S: AssetStore + ?Sized,
        P: ProgressReporter + ?Sized,
    {
        let mut batch = BatchReport::default();
        for id in ids {
            let outcome = self.rescale_one(store, id, progress);
            match &outcome {
                AssetOutcome::Rescaled { target, report, .. } => info!(
                    "rescaled {id} -> {target} ({} bones, {} keys)",
                    report.bones_written, report.key_count
                ),
                AssetOutcome::Skipped { reason, .. } => warn!("skipped {id}: {reason}"),
                AssetOutcome::Failed { error, .. } => {
                    error!("failed to rescale {id} [{}]: {error}", error.category())
                }
                AssetOutcome::Cancelled { target, report, .. } => warn!(
                    "cancelled while rescaling {id} -> {target} after {} bones",
                    report.bones_written
                ),
            }
            let stop = matches!(outcome, AssetOutcome::Cancelled { .. });
            batch.outcomes.push(outcome);
            if stop {
                break;
            }
        }
        batch
    }

    fn rescale_one<S, P>(&self, store: &mut S, id: &str, progress: &mut P) -> AssetOutcome
    where
        S: AssetStore + ?Sized,
        P: ProgressReporter + ?Sized,
    {
        let failed = |error: RescaleError| AssetOutcome::Failed {
            source: id.to_string(),
            error,
        };

        let original = match store.load(id) {
            Ok(StoredAsset::Animation(a)) => a,
            Ok(StoredAsset::Other { kind, .. }) => {
                return AssetOutcome::Skipped {
                    source: id.to_string(),
                    reason: RescaleError::NotAnimatable {
                        asset: id.to_string(),
                        kind,
                    },
                }
            }
            Err(e) => return failed(e),
        };

        let target = self.config.derived_name(id);
        let mut duplicate = match store.duplicate(id, &target) {
            Ok(d) => d,
            Err(e) => return failed(e),
        };

        let report = match self
            .pipeline
            .run(&original, &original, &mut duplicate, progress)
        {
            Ok(r) => r,
            Err(e) => {
                // The registered duplicate still holds unscaled keys.
                if let Err(cleanup) = store.remove(&target) {
                    warn!("could not remove {target} after failed rescale: {cleanup}");
                }
                return failed(e);
            }
        };

        if let Err(e) = store.save(&target, &duplicate) {
            return failed(e);
        }

        if report.cancelled {
            AssetOutcome::Cancelled {
                source: id.to_string(),
                target,
                report,
            }
        } else {
            AssetOutcome::Rescaled {
                source: id.to_string(),
                target,
                report,
            }
        }
    }
}

/// Rescale a single in-memory animation into a fresh copy named `target`.
pub fn rescale_animation(
    config: &RescaleConfig,
    asset: &AnimationAsset,
    target: &str,
) -> Result<(AnimationAsset, PipelineReport)> {
    config.validate()?;
    let pipeline = RescalePipeline::from_config(config);
    let mut out = asset.duplicate_as(target);
    let report = pipeline.run(asset, asset, &mut out, &mut NoProgress)?;
    Ok((out, report))
}
