use std::fs;
use std::path::{Path, PathBuf};

use anim_rescale::{
    AnimationAsset, AssetOutcome, BatchRescaler, ChainSpec, FacingConvention, FsAssetStore,
    RescaleConfig, SkeletonProvider, StoredAsset,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "anim-rescale", version, about = "Rescale skeletal animations and extract root motion")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Duplicate each animation to <id><suffix> and rescale the duplicate
    Rescale(RescaleArgs),
    /// Print the skeleton and track summary of an asset file
    Inspect { path: PathBuf },
}

#[derive(clap::Args, Debug)]
struct RescaleArgs {
    /// Asset ids (file stems inside --dir)
    ids: Vec<String>,
    /// Directory holding <id>.json asset records
    #[arg(long, default_value = ".")]
    dir: PathBuf,
    /// Process every record in --dir
    #[arg(long, conflicts_with = "ids")]
    all: bool,
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Displacement scale (values below 1e-4 fall back to 0.0254)
    #[arg(long)]
    scale: Option<f64>,
    /// Turn the root bone -90 degrees about +Z
    #[arg(long)]
    unrotate_root: bool,
    /// Rewrite the root track relative to the bone chain
    #[arg(long)]
    root_relative: bool,
    /// Chain bones by name, comma separated
    #[arg(long, value_delimiter = ',', conflicts_with = "chain_length")]
    chain: Option<Vec<String>>,
    /// Use the first N bones as the chain
    #[arg(long)]
    chain_length: Option<usize>,
    #[arg(long, value_enum)]
    facing: Option<FacingArg>,
    /// Suffix for duplicated assets
    #[arg(long)]
    suffix: Option<String>,
    /// Replace existing duplicates
    #[arg(long)]
    overwrite: bool,
    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FacingArg {
    YawPitch,
    ShortestArc,
}

impl From<FacingArg> for FacingConvention {
    fn from(f: FacingArg) -> Self {
        match f {
            FacingArg::YawPitch => FacingConvention::YawPitch,
            FacingArg::ShortestArc => FacingConvention::ShortestArc,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Rescale(args) => rescale(args),
        Command::Inspect { path } => inspect(&path),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn build_config(args: &RescaleArgs) -> Result<RescaleConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            RescaleConfig::from_json_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => RescaleConfig::default(),
    };
    if let Some(scale) = args.scale {
        cfg.scale = scale;
    }
    cfg.unrotate_root |= args.unrotate_root;
    cfg.root_relative |= args.root_relative;
    if let Some(names) = &args.chain {
        cfg.chain = ChainSpec::Named(names.clone());
    }
    if let Some(n) = args.chain_length {
        cfg.chain = ChainSpec::Leading(n);
    }
    if let Some(facing) = args.facing {
        cfg.facing = facing.into();
    }
    if let Some(suffix) = &args.suffix {
        cfg.output_suffix = suffix.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn rescale(args: RescaleArgs) -> Result<()> {
    let cfg = build_config(&args)?;
    let mut store = FsAssetStore::new(&args.dir).overwrite(args.overwrite);

    let ids: Vec<String> = if args.all {
        // Skip earlier outputs so repeated runs do not rescale them again.
        store
            .list()?
            .into_iter()
            .filter(|id| !id.ends_with(&cfg.output_suffix))
            .collect()
    } else {
        args.ids.clone()
    };
    if ids.is_empty() {
        bail!("no assets given; pass ids or --all");
    }

    let batch = BatchRescaler::new(cfg)?;
    let report = batch.run_with_progress(&mut store, &ids, &mut |current: usize, total: usize| {
        debug!("bone {current}/{total}");
        true
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            match outcome {
                AssetOutcome::Rescaled { source, target, report } => println!(
                    "ok       {source} -> {target} ({} bones, {} keys, scale {})",
                    report.bones_written, report.key_count, report.effective_scale
                ),
                AssetOutcome::Skipped { source, reason } => println!("skipped  {source}: {reason}"),
                AssetOutcome::Failed { source, error } => println!("failed   {source}: {error}"),
                AssetOutcome::Cancelled { source, target, .. } => {
                    println!("stopped  {source} -> {target}")
                }
            }
        }
    }

    if report.has_failures() {
        bail!("{} of {} assets failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    match StoredAsset::from_json_str(&text)? {
        StoredAsset::Animation(asset) => print_animation(&asset),
        StoredAsset::Other { name, kind } => println!("{name}: {kind} (not an animation)"),
    }
    Ok(())
}

fn print_animation(asset: &AnimationAsset) {
    println!("{}: animation, {} keys", asset.name, asset.key_count);
    for (i, bone) in asset.bones().iter().enumerate() {
        let keys = asset.track(&bone.name).map(<[_]>::len);
        let p = bone.reference.position;
        match keys {
            Some(n) => println!("  [{i}] {} ref=({}, {}, {}) keys={n}", bone.name, p.x, p.y, p.z),
            None => println!("  [{i}] {} ref=({}, {}, {}) no track", bone.name, p.x, p.y, p.z),
        }
    }
}
