use std::fs;
use std::path::PathBuf;

use anim_rescale::{
    AnimationAsset, AssetOutcome, AssetStore, BatchRescaler, Bone, FsAssetStore,
    MemoryAssetStore, RescaleConfig, RescaleError, Skeleton, StoredAsset, Transform, Vector3,
};
use anim_rescale_test_fixtures::{animations, other_assets};

fn walk() -> AnimationAsset {
    animations::load("four-bone-walk").expect("fixture")
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn temp_store_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("anim-rescale-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn scale_two() -> RescaleConfig {
    RescaleConfig {
        scale: 2.0,
        ..Default::default()
    }
}

#[test]
fn batch_rescales_into_suffixed_duplicate() {
    let mut store = MemoryAssetStore::new();
    store.insert_animation("walk", walk());

    let batch = BatchRescaler::new(scale_two()).unwrap();
    let report = batch.run(&mut store, &ids(&["walk"]));

    assert_eq!(report.rescaled(), 1);
    assert!(!report.has_failures());
    match &report.outcomes[0] {
        AssetOutcome::Rescaled { source, target, report } => {
            assert_eq!(source, "walk");
            assert_eq!(target, "walk_Scaled");
            assert_eq!(report.bones_written, 4);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let scaled = store.animation("walk_Scaled").expect("duplicate saved");
    assert_eq!(scaled.name, "four_bone_walk_Scaled");
    assert!(scaled.track("child").unwrap()[1]
        .position
        .abs_diff_le(&Vector3::new(4.0, 0.0, 0.0), 1e-9));

    // The original is untouched.
    assert_eq!(store.animation("walk"), Some(&walk()));
}

#[test]
fn non_animation_assets_are_skipped() {
    let mut store = MemoryAssetStore::new();
    let mesh = StoredAsset::from_json_str(&other_assets::json("hero-mesh").unwrap()).unwrap();
    store.insert("hero", mesh);
    store.insert_animation("walk", walk());

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["hero", "walk"]));

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.rescaled(), 1);
    match &report.outcomes[0] {
        AssetOutcome::Skipped { reason, .. } => assert_eq!(
            reason,
            &RescaleError::NotAnimatable {
                asset: "hero".into(),
                kind: "skeletal_mesh".into(),
            }
        ),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(store.get("hero_Scaled").is_none());
}

#[test]
fn duplication_failure_skips_asset_and_continues() {
    let mut store = MemoryAssetStore::new();
    store.insert_animation("walk", walk());
    store.insert_animation("walk_Scaled", walk());
    store.insert_animation("run", walk().duplicate_as("run"));

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["walk", "run"]));

    assert_eq!(report.failed(), 1);
    assert_eq!(report.rescaled(), 1);
    assert!(matches!(
        &report.outcomes[0],
        AssetOutcome::Failed { error: RescaleError::Duplication { .. }, .. }
    ));
    // The pre-existing target was not rescaled.
    assert_eq!(store.animation("walk_Scaled"), Some(&walk()));
    assert!(store.animation("run_Scaled").is_some());
}

/// Skeleton of two bones where only the root has a track.
fn walk_missing_spine() -> AnimationAsset {
    let skeleton = Skeleton::new(vec![
        Bone::new("root", Transform::identity()),
        Bone::new("spine", Transform::identity()),
    ]);
    AnimationAsset::new("walk", skeleton, 1)
        .with_track("root", vec![Transform::from_position(Vector3::new(1.0, 0.0, 0.0))])
}

#[test]
fn pipeline_failure_removes_the_duplicate() {
    let mut store = MemoryAssetStore::new();
    store.insert_animation("walk", walk_missing_spine());

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["walk"]));

    assert!(matches!(
        &report.outcomes[0],
        AssetOutcome::Failed { error: RescaleError::UnknownBone { bone }, .. } if bone == "spine"
    ));
    assert!(store.get("walk_Scaled").is_none());
    assert_eq!(store.animation("walk"), Some(&walk_missing_spine()));
}

#[test]
fn fs_pipeline_failure_leaves_no_output_and_rerun_fails_the_same_way() {
    let dir = temp_store_dir();
    fs::write(
        dir.join("walk.json"),
        walk_missing_spine().to_json_string_pretty().unwrap(),
    )
    .unwrap();
    let mut store = FsAssetStore::new(&dir);
    let batch = BatchRescaler::new(scale_two()).unwrap();

    for _ in 0..2 {
        let report = batch.run(&mut store, &ids(&["walk"]));
        assert!(matches!(
            &report.outcomes[0],
            AssetOutcome::Failed { error: RescaleError::UnknownBone { .. }, .. }
        ));
        assert!(!dir.join("walk_Scaled.json").exists());
    }
    assert_eq!(store.list().unwrap(), ids(&["walk"]));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn removing_a_missing_record_is_not_an_error() {
    let dir = temp_store_dir();
    let mut store = FsAssetStore::new(&dir);
    store.remove("nothing").unwrap();
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_assets_fail_without_stopping_the_batch() {
    let mut store = MemoryAssetStore::new();
    store.insert_animation("walk", walk());

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["ghost", "walk"]));

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(
        &report.outcomes[0],
        AssetOutcome::Failed { error: RescaleError::AssetNotFound { .. }, .. }
    ));
    assert_eq!(report.outcomes[1].source(), "walk");
    assert_eq!(report.rescaled(), 1);
}

#[test]
fn cancellation_stops_the_batch() {
    let mut store = MemoryAssetStore::new();
    store.insert_animation("walk", walk());
    store.insert_animation("run", walk().duplicate_as("run"));

    let report = BatchRescaler::new(scale_two()).unwrap().run_with_progress(
        &mut store,
        &ids(&["walk", "run"]),
        &mut |current: usize, _total: usize| current < 1,
    );

    assert!(report.cancelled());
    assert_eq!(report.outcomes.len(), 1);
    assert!(store.animation("run_Scaled").is_none());
    // Bones written before the cancel stay in the saved duplicate.
    let partial = store.animation("walk_Scaled").expect("partial duplicate saved");
    assert!(partial.track("root").unwrap()[0]
        .position
        .abs_diff_le(&Vector3::new(2.0, 0.0, 0.0), 1e-9));
    assert!(partial.track("delta").unwrap()[0]
        .position
        .abs_diff_le(&Vector3::new(1.0, 0.0, 0.0), 1e-9));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = RescaleConfig {
        output_suffix: String::new(),
        ..Default::default()
    };
    let err = BatchRescaler::new(cfg).unwrap_err();
    assert!(!err.is_recoverable());
    assert_eq!(err.category(), "config");
}

#[test]
fn fs_store_round_trip() {
    let dir = temp_store_dir();
    fs::copy(
        animations::path("four-bone-walk").unwrap(),
        dir.join("walk.json"),
    )
    .unwrap();
    fs::write(dir.join("hero.json"), other_assets::json("hero-mesh").unwrap()).unwrap();
    fs::write(dir.join("notes.txt"), "not an asset").unwrap();

    let mut store = FsAssetStore::new(&dir);
    let listed = store.list().unwrap();
    assert_eq!(listed, ids(&["hero", "walk"]));

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &listed);
    assert_eq!(report.rescaled(), 1);
    assert_eq!(report.skipped(), 1);

    let text = fs::read_to_string(dir.join("walk_Scaled.json")).unwrap();
    let scaled = AnimationAsset::from_json_str(&text).unwrap();
    assert_eq!(scaled.name, "four_bone_walk_Scaled");
    assert!(scaled.track("root").unwrap()[0]
        .position
        .abs_diff_le(&Vector3::new(2.0, 0.0, 0.0), 1e-9));

    // A second run refuses to clobber the existing duplicate.
    let again = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["walk"]));
    assert!(matches!(
        &again.outcomes[0],
        AssetOutcome::Failed { error: RescaleError::Duplication { .. }, .. }
    ));

    let mut overwriting = FsAssetStore::new(&dir).overwrite(true);
    let third = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut overwriting, &ids(&["walk"]));
    assert_eq!(third.rescaled(), 1);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn fs_store_reports_missing_asset() {
    let dir = temp_store_dir();
    let store = FsAssetStore::new(&dir);
    let err = store.load("nothing").unwrap_err();
    assert_eq!(err, RescaleError::AssetNotFound { asset: "nothing".into() });
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn fs_store_reports_broken_track_on_load() {
    let dir = temp_store_dir();
    fs::copy(animations::path("short-track").unwrap(), dir.join("short.json")).unwrap();
    let mut store = FsAssetStore::new(&dir);

    let report = BatchRescaler::new(scale_two())
        .unwrap()
        .run(&mut store, &ids(&["short"]));
    assert!(matches!(
        &report.outcomes[0],
        AssetOutcome::Failed { error: RescaleError::TrackLengthMismatch { .. }, .. }
    ));
    assert!(!dir.join("short_Scaled.json").exists());
    fs::remove_dir_all(&dir).ok();
}
