//! Level store integration tests: save/load through the filesystem.

use mood_level_engine::core::pipeline::LevelGenerator;
use mood_level_engine::core::store::{LevelStore, StoreError};
use mood_level_engine::schema::emotion::Emotion;
use mood_level_engine::schema::layer::LayerKind;
use mood_level_engine::schema::level::LevelData;
use mood_level_engine::schema::tile::Tile;
use std::fs;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mood_level_engine_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn level(emotion: Emotion, seed: u64) -> LevelData {
    LevelGenerator::builder()
        .seed(seed)
        .build()
        .unwrap()
        .generate(emotion)
        .unwrap()
}

#[test]
fn save_then_load_reproduces_the_level() {
    let root = scratch("round_trip");
    let store = LevelStore::new(&root);
    for (id, emotion) in Emotion::ALL.into_iter().enumerate() {
        let saved = level(emotion, 10 + id as u64);
        store.save(&saved, id as u32).unwrap();
        assert_eq!(store.load(id as u32).unwrap(), saved);
    }
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn files_are_laid_out_per_layer() {
    let root = scratch("layout");
    let store = LevelStore::new(&root);
    let dir = store.save(&level(Emotion::Joy, 1), 7).unwrap();
    assert_eq!(dir, root.join("7"));

    for kind in LayerKind::ALL {
        let path = dir.join(format!("level_7_{}.csv", kind.file_name()));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 11, "{kind}");
        assert!(rows.iter().all(|r| r.split(',').count() == 60), "{kind}");
    }
    assert!(dir.join("level_7_meta.ron").exists());
    // no staging leftovers
    let entries: Vec<_> = fs::read_dir(&root).unwrap().collect();
    assert_eq!(entries.len(), 1);
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn saving_again_replaces_the_level() {
    let root = scratch("replace");
    let store = LevelStore::new(&root);
    store.save(&level(Emotion::Joy, 1), 2).unwrap();
    let second = level(Emotion::Fear, 2);
    store.save(&second, 2).unwrap();
    assert_eq!(store.load(2).unwrap(), second);
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_layer_loads_as_air() {
    let root = scratch("missing");
    let store = LevelStore::new(&root);
    let saved = level(Emotion::Joy, 4);
    store.save(&saved, 1).unwrap();
    fs::remove_file(store.layer_path(1, LayerKind::Coins)).unwrap();

    let loaded = store.load(1).unwrap();
    assert!(loaded.layer(LayerKind::Coins).is_empty());
    assert_eq!(loaded.terrain(), saved.terrain());
    assert!(matches!(
        store.load_layer(1, LayerKind::Coins, 60, 11),
        Err(StoreError::Io(_))
    ));
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn corrupt_layer_loads_as_air() {
    let root = scratch("corrupt");
    let store = LevelStore::new(&root);
    store.save(&level(Emotion::Anger, 5), 3).unwrap();
    fs::write(store.layer_path(3, LayerKind::Terrain), "1,2,banana\n").unwrap();

    let loaded = store.load(3).unwrap();
    assert!(loaded.terrain().is_empty());
    assert_eq!((loaded.width(), loaded.height()), (60, 11));
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn short_files_are_padded() {
    let root = scratch("short");
    let store = LevelStore::new(&root);
    store.save(&level(Emotion::Neutral, 6), 4).unwrap();
    fs::write(store.layer_path(4, LayerKind::Player), "0,0,27\n0,28").unwrap();

    let player = store.load(4).unwrap().layer(LayerKind::Player).clone();
    assert_eq!((player.width(), player.height()), (60, 11));
    assert_eq!(player.tile(2, 0), Tile::PlayerSpawn);
    assert_eq!(player.tile(1, 1), Tile::Goal);
    assert_eq!(player.count(|t| !t.is_air()), 2);
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_level_is_all_air() {
    let root = scratch("absent");
    let loaded = LevelStore::new(&root).load(99).unwrap();
    assert_eq!(loaded.emotion, Emotion::Neutral);
    assert!(loaded.layers().iter().all(|l| l.is_empty()));
}

#[test]
fn unusable_metadata_falls_back_to_default_shape() {
    let root = scratch("bad_meta");
    let store = LevelStore::new(&root);
    store.save(&level(Emotion::Joy, 1), 1).unwrap();

    for meta in [
        "(emotion: Joy, seed: Some(1), ground_row: 8, width: 0, height: 11)",
        "(emotion: Joy, seed: Some(1), ground_row: 8, width: 4000000000, height: 11)",
        "(emotion: Joy, seed: Some(1), ground_row: 20, width: 60, height: 11)",
    ] {
        fs::write(store.meta_path(1), meta).unwrap();
        let loaded = store.load(1).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (60, 11), "{meta}");
        assert_eq!(loaded.emotion, Emotion::Joy);
        assert_eq!(loaded.ground_row, 8);
    }
    assert!(matches!(
        store.load_layer(1, LayerKind::Terrain, 0, 11),
        Err(StoreError::BadShape { .. })
    ));
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn save_into_a_file_root_fails_cleanly() {
    let root = scratch("file_root");
    fs::write(&root, "not a directory").unwrap();
    let store = LevelStore::new(&root);
    assert!(matches!(
        store.save(&level(Emotion::Fear, 2), 1),
        Err(StoreError::Io(_))
    ));
    assert_eq!(fs::read_to_string(&root).unwrap(), "not a directory");
    fs::remove_file(&root).unwrap();
}

#[test]
fn stale_staging_and_backup_are_cleared() {
    let root = scratch("stale");
    let store = LevelStore::new(&root);
    let first = level(Emotion::Joy, 3);
    store.save(&first, 4).unwrap();
    fs::write(root.join(".4.staging"), "leftover").unwrap();
    fs::create_dir(root.join(".4.previous")).unwrap();

    let second = level(Emotion::Anger, 4);
    store.save(&second, 4).unwrap();
    assert_eq!(store.load(4).unwrap(), second);
    assert!(!root.join(".4.staging").exists());
    assert!(!root.join(".4.previous").exists());
    fs::remove_dir_all(&root).unwrap();
}
