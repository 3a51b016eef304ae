//! Asset stores: where animations are loaded from, duplicated and saved.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;

use crate::asset::{AnimationAsset, StoredAsset};
use crate::{RescaleError, Result};

/// Host-side persistence used by the batch rescaler.
pub trait AssetStore {
    /// Load the record stored under `id`.
    fn load(&self, id: &str) -> Result<StoredAsset>;

    /// Copy the animation `id` to `target` and register the copy.
    ///
    /// Fails with `Duplication` when the copy cannot be made (including an
    /// existing `target` the store may not replace).
    fn duplicate(&mut self, id: &str, target: &str) -> Result<AnimationAsset>;

    /// Persist `asset` under `id`.
    fn save(&mut self, id: &str, asset: &AnimationAsset) -> Result<()>;

    /// Drop the record stored under `id`. Removing a missing id is not an error.
    fn remove(&mut self, id: &str) -> Result<()>;
}

/// Directory of `<id>.json` records.
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
    overwrite: bool,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: false,
        }
    }

    /// Allow duplicates to replace an existing record.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Ids of every `.json` record in the directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn write(&self, id: &str, asset: &AnimationAsset) -> Result<()> {
        let path = self.path_of(id);
        fs::write(&path, asset.to_json_string_pretty()?)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

impl AssetStore for FsAssetStore {
    fn load(&self, id: &str) -> Result<StoredAsset> {
        let path = self.path_of(id);
        let text = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RescaleError::AssetNotFound {
                asset: id.to_string(),
            },
            _ => RescaleError::from(err),
        })?;
        StoredAsset::from_json_str(&text)
    }

    fn duplicate(&mut self, id: &str, target: &str) -> Result<AnimationAsset> {
        let duplication = |reason: String| RescaleError::Duplication {
            asset: id.to_string(),
            target: target.to_string(),
            reason,
        };
        if !self.overwrite && self.path_of(target).exists() {
            return Err(duplication("target already exists".into()));
        }
        let original = match self.load(id).map_err(|e| duplication(e.to_string()))? {
            StoredAsset::Animation(a) => a,
            StoredAsset::Other { kind, .. } => {
                return Err(duplication(format!("cannot duplicate a {kind} as an animation")))
            }
        };
        let copy = original.duplicate_as(format!("{}{}", original.name, suffix_of(id, target)));
        self.write(target, &copy)
            .map_err(|e| duplication(e.to_string()))?;
        Ok(copy)
    }

    fn save(&mut self, id: &str, asset: &AnimationAsset) -> Result<()> {
        self.write(id, asset)
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        let path = self.path_of(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetStore {
    assets: IndexMap<String, StoredAsset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, asset: StoredAsset) {
        self.assets.insert(id.into(), asset);
    }

    pub fn insert_animation(&mut self, id: impl Into<String>, asset: AnimationAsset) {
        self.insert(id, StoredAsset::Animation(asset));
    }

    pub fn get(&self, id: &str) -> Option<&StoredAsset> {
        self.assets.get(id)
    }

    pub fn animation(&self, id: &str) -> Option<&AnimationAsset> {
        match self.assets.get(id) {
            Some(StoredAsset::Animation(a)) => Some(a),
            _ => None,
        }
    }
}

impl AssetStore for MemoryAssetStore {
    fn load(&self, id: &str) -> Result<StoredAsset> {
        self.assets
            .get(id)
            .cloned()
            .ok_or_else(|| RescaleError::AssetNotFound {
                asset: id.to_string(),
            })
    }

    fn duplicate(&mut self, id: &str, target: &str) -> Result<AnimationAsset> {
        let duplication = |reason: &str| RescaleError::Duplication {
            asset: id.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        };
        if self.assets.contains_key(target) {
            return Err(duplication("target already exists"));
        }
        let copy = match self.assets.get(id) {
            Some(StoredAsset::Animation(a)) => {
                a.duplicate_as(format!("{}{}", a.name, suffix_of(id, target)))
            }
            Some(StoredAsset::Other { .. }) => return Err(duplication("not an animation")),
            None => return Err(duplication("source not found")),
        };
        self.insert_animation(target, copy.clone());
        Ok(copy)
    }

    fn save(&mut self, id: &str, asset: &AnimationAsset) -> Result<()> {
        self.insert_animation(id, asset.clone());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        self.assets.shift_remove(id);
        Ok(())
    }
}

/// The part `target` adds after `id`, so the duplicate's display name gets
/// the same suffix as its id.
fn suffix_of<'a>(id: &str, target: &'a str) -> &'a str {
    target.strip_prefix(id).unwrap_or("")
}
