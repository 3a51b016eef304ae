//! Skeletal animation rescaling.
//!
//! Bone translations are scaled relative to the skeleton's reference pose,
//! keeping each bone's offset direction and scaling only its length. The root
//! bone can be turned -90 degrees about the vertical axis, and its track can be
//! rewritten as motion relative to a short chain of bones (root, delta, start)
//! for root-motion extraction.
//!
//! The [`pipeline`] only talks to the host through the traits in [`io`];
//! [`asset`], [`store`] and [`batch`] provide a JSON-backed host for tools.

pub mod accumulator;
pub mod algebra;
pub mod asset;
pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod store;
pub mod value;

pub use accumulator::RootMotionAccumulator;
pub use algebra::{axis_orientation, compose, safe_normalize, FacingConvention};
pub use asset::{AnimationAsset, Skeleton, StoredAsset};
pub use batch::{rescale_animation, AssetOutcome, BatchReport, BatchRescaler};
pub use config::{ChainSpec, RescaleConfig, DEFAULT_SCALE};
pub use converter::{scale_bone_key, BoneScaleConverter};
pub use error::RescaleError;
pub use io::{
    AnimationSink, AnimationSource, Bone, NoProgress, ProgressReporter, SkeletonProvider,
    TrackKeys,
};
pub use pipeline::{PipelineReport, RescalePipeline};
pub use store::{AssetStore, FsAssetStore, MemoryAssetStore};
pub use value::{Quaternion, Transform, Vector3};

/// Rescale result type
pub type Result<T> = core::result::Result<T, RescaleError>;
