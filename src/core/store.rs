//! Level persistence: one comma-separated text grid per layer under a
//! per-level directory, plus a small RON metadata file.
//!
//! Layout: `<root>/<id>/level_<id>_<layer>.csv` and
//! `<root>/<id>/level_<id>_meta.ron`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::pipeline::DEFAULT_GROUND_ROW;
use crate::schema::emotion::Emotion;
use crate::schema::layer::{Layer, LayerKind, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::schema::level::{LevelData, LevelError};
use crate::schema::tile::Tile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("RON deserialization error: {0}")]
    RonRead(#[from] ron::error::SpannedError),
    #[error("layer {kind}, row {row}, column {column}: `{token}` is not a tile code")]
    BadToken {
        kind: LayerKind,
        row: usize,
        column: usize,
        token: String,
    },
    #[error("layer {kind}: code {code} does not belong in this layer")]
    ForeignCode { kind: LayerKind, code: u8 },
    #[error("unusable level shape {width}x{height}")]
    BadShape { width: usize, height: usize },
    #[error("level error: {0}")]
    Level(#[from] LevelError),
}

/// Largest width or height accepted from disk.
pub const MAX_DIMENSION: usize = 1024;

fn check_shape(width: usize, height: usize) -> Result<(), StoreError> {
    if (1..=MAX_DIMENSION).contains(&width) && (1..=MAX_DIMENSION).contains(&height) {
        Ok(())
    } else {
        Err(StoreError::BadShape { width, height })
    }
}

/// Provenance written next to the layer files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    pub emotion: Emotion,
    pub seed: Option<u64>,
    pub ground_row: usize,
    pub width: usize,
    pub height: usize,
}

impl Default for LevelMeta {
    fn default() -> Self {
        LevelMeta {
            emotion: Emotion::Neutral,
            seed: None,
            ground_row: DEFAULT_GROUND_ROW,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl LevelMeta {
    /// The recorded shape is within `MAX_DIMENSION` and the ground row
    /// lies inside it.
    pub fn is_plausible(&self) -> bool {
        check_shape(self.width, self.height).is_ok() && self.ground_row < self.height
    }
}

/// Render a layer as rows of comma-separated codes, one row per line.
pub fn serialize_layer(layer: &Layer) -> String {
    let mut out = String::with_capacity(layer.width() * layer.height() * 3);
    for row in layer.rows() {
        let cells: Vec<String> = row.iter().map(|t| t.code().to_string()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Parse a layer, padding short rows and missing rows with air and
/// dropping anything beyond `width` x `height`.
pub fn parse_layer(
    kind: LayerKind,
    input: &str,
    width: usize,
    height: usize,
) -> Result<Layer, StoreError> {
    check_shape(width, height)?;
    let mut layer = Layer::new(kind, width, height);
    for (row, line) in input.lines().take(height).enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for (column, token) in line.split(',').take(width).enumerate() {
            let token = token.trim();
            let code: u8 = token.parse().map_err(|_| StoreError::BadToken {
                kind,
                row,
                column,
                token: token.to_string(),
            })?;
            let tile = Tile::decode(kind, code).ok_or(StoreError::ForeignCode { kind, code })?;
            layer.set(column, row, tile);
        }
    }
    Ok(layer)
}

/// Reads and writes levels under a root directory.
#[derive(Debug, Clone)]
pub struct LevelStore {
    root: PathBuf,
}

impl LevelStore {
    pub fn new(root: impl Into<PathBuf>) -> LevelStore {
        LevelStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn level_dir(&self, id: u32) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub fn layer_path(&self, id: u32, kind: LayerKind) -> PathBuf {
        self.level_dir(id).join(layer_file_name(id, kind))
    }

    pub fn meta_path(&self, id: u32) -> PathBuf {
        self.level_dir(id).join(meta_file_name(id))
    }

    /// Write every layer plus metadata, replacing any previous level `id`.
    ///
    /// Files are written into a staging directory. The previous level is
    /// moved aside, the staging directory renamed into place, and only then
    /// is the old copy deleted; on any failure the previous level is left
    /// (or put back) where it was.
    pub fn save(&self, level: &LevelData, id: u32) -> Result<PathBuf, StoreError> {
        self.commit(id, |dir| write_level_files(dir, level, id))
    }

    fn commit<F>(&self, id: u32, write: F) -> Result<PathBuf, StoreError>
    where
        F: FnOnce(&Path) -> Result<(), StoreError>,
    {
        fs::create_dir_all(&self.root)?;
        let target = self.level_dir(id);
        let staging = self.root.join(format!(".{id}.staging"));
        let previous = self.root.join(format!(".{id}.previous"));

        // an interrupted save may have left the old level aside
        if previous.exists() && !target.exists() {
            warn!("level {id}: restoring copy left by an interrupted save");
            fs::rename(&previous, &target)?;
        }
        remove_stale(&previous)?;
        remove_stale(&staging)?;
        fs::create_dir(&staging)?;

        if let Err(e) = write(&staging) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let replacing = target.exists();
        if replacing {
            if let Err(e) = fs::rename(&target, &previous) {
                let _ = fs::remove_dir_all(&staging);
                return Err(e.into());
            }
        }
        if let Err(e) = fs::rename(&staging, &target) {
            if replacing {
                let _ = fs::rename(&previous, &target);
            }
            let _ = fs::remove_dir_all(&staging);
            return Err(e.into());
        }
        if replacing {
            if let Err(e) = remove_stale(&previous) {
                warn!("level {id}: could not remove replaced copy ({e})");
            }
        }
        debug!("saved level {id} to {}", target.display());
        Ok(target)
    }

    /// Load level `id`.
    ///
    /// A missing or unreadable layer is logged and replaced by an all-air
    /// layer. Missing metadata falls back to the default shape, and so does
    /// a recorded shape that fails [`LevelMeta::is_plausible`].
    pub fn load(&self, id: u32) -> Result<LevelData, StoreError> {
        let meta = match self.load_meta(id) {
            Ok(meta) if meta.is_plausible() => meta,
            Ok(meta) => {
                warn!(
                    "level {id}: metadata shape {}x{} with ground row {} is unusable, using defaults",
                    meta.width, meta.height, meta.ground_row
                );
                LevelMeta {
                    emotion: meta.emotion,
                    seed: meta.seed,
                    ..LevelMeta::default()
                }
            }
            Err(e) => {
                warn!("level {id}: metadata unavailable ({e}), using defaults");
                LevelMeta::default()
            }
        };
        let layers = LayerKind::ALL
            .iter()
            .map(|kind| {
                self.load_layer(id, *kind, meta.width, meta.height)
                    .unwrap_or_else(|e| {
                        warn!("level {id}: layer {kind} unavailable ({e}), using empty layer");
                        Layer::new(*kind, meta.width, meta.height)
                    })
            })
            .collect();
        Ok(LevelData::from_layers(
            meta.emotion,
            meta.seed,
            meta.ground_row,
            layers,
        )?)
    }

    /// Load a single layer strictly; errors are returned, not patched over.
    pub fn load_layer(
        &self,
        id: u32,
        kind: LayerKind,
        width: usize,
        height: usize,
    ) -> Result<Layer, StoreError> {
        let contents = fs::read_to_string(self.layer_path(id, kind))?;
        parse_layer(kind, &contents, width, height)
    }

    pub fn load_meta(&self, id: u32) -> Result<LevelMeta, StoreError> {
        let contents = fs::read_to_string(self.meta_path(id))?;
        Ok(ron::from_str(&contents)?)
    }
}

fn layer_file_name(id: u32, kind: LayerKind) -> String {
    format!("level_{id}_{}.csv", kind.file_name())
}

fn meta_file_name(id: u32) -> String {
    format!("level_{id}_meta.ron")
}

fn remove_stale(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn write_level_files(dir: &Path, level: &LevelData, id: u32) -> Result<(), StoreError> {
    for layer in level.layers() {
        fs::write(dir.join(layer_file_name(id, layer.kind)), serialize_layer(layer))?;
    }
    let meta = LevelMeta {
        emotion: level.emotion,
        seed: level.seed,
        ground_row: level.ground_row,
        width: level.width(),
        height: level.height(),
    };
    let text = ron::ser::to_string_pretty(&meta, ron::ser::PrettyConfig::default())?;
    fs::write(dir.join(meta_file_name(id)), text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_rows_are_comma_separated() {
        let mut layer = Layer::new(LayerKind::Terrain, 3, 2);
        layer.set(0, 1, Tile::PlatformTopLeft);
        layer.set(2, 1, Tile::GroundFill);
        assert_eq!(serialize_layer(&layer), "0,0,0\n9,0,5\n");
    }

    #[test]
    fn short_input_is_padded_with_air() {
        let layer = parse_layer(LayerKind::Coins, "0,16\n\n16", 4, 3).unwrap();
        assert_eq!((layer.width(), layer.height()), (4, 3));
        assert_eq!(layer.tile(1, 0), Tile::Coin);
        assert_eq!(layer.tile(0, 2), Tile::Coin);
        assert!(layer.is_air(3, 0));
        assert!(layer.is_air(0, 1));
        assert_eq!(layer.count(|t| !t.is_air()), 2);
    }

    #[test]
    fn extra_cells_are_dropped() {
        let layer = parse_layer(LayerKind::Coins, "16,16,16\n16,16,16\n16,16,16\n", 2, 2).unwrap();
        assert_eq!(layer.count(|t| *t == Tile::Coin), 4);
    }

    #[test]
    fn shared_code_follows_the_layer() {
        assert_eq!(parse_layer(LayerKind::Grass, "23", 1, 1).unwrap().tile(0, 0), Tile::Grass(4));
        assert_eq!(parse_layer(LayerKind::FgPalms, "23", 1, 1).unwrap().tile(0, 0), Tile::SmallPalm);
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(matches!(
            parse_layer(LayerKind::Terrain, "0,x,0", 3, 1),
            Err(StoreError::BadToken { column: 1, .. })
        ));
        assert!(matches!(
            parse_layer(LayerKind::Player, "16", 1, 1),
            Err(StoreError::ForeignCode { code: 16, .. })
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(matches!(
            parse_layer(LayerKind::Terrain, "1,1", 0, 11),
            Err(StoreError::BadShape { width: 0, height: 11 })
        ));
        assert!(parse_layer(LayerKind::Terrain, "", MAX_DIMENSION + 1, 1).is_err());
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mood_store_unit_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn small_level(fill: Tile) -> LevelData {
        let mut layers: Vec<Layer> = LayerKind::ALL.iter().map(|k| Layer::new(*k, 4, 3)).collect();
        layers[0].set(0, 2, fill);
        LevelData::from_layers(Emotion::Joy, Some(1), 1, layers).unwrap()
    }

    #[test]
    fn failed_write_keeps_the_previous_level() {
        let root = scratch("failed_write");
        let store = LevelStore::new(&root);
        let first = small_level(Tile::GroundFill);
        store.save(&first, 5).unwrap();

        let result = store.commit(5, |dir| {
            fs::write(dir.join("level_5_terrain.csv"), "0,0,0,0\n")?;
            Err(std::io::Error::new(ErrorKind::Other, "disk full").into())
        });
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!root.join(".5.staging").exists());
        assert!(!root.join(".5.previous").exists());
        assert_eq!(store.load(5).unwrap(), first);
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn interrupted_replace_is_restored() {
        let root = scratch("interrupted");
        let store = LevelStore::new(&root);
        let first = small_level(Tile::SingleBlock);
        store.save(&first, 6).unwrap();
        // crash after the old copy was moved aside
        fs::rename(store.level_dir(6), root.join(".6.previous")).unwrap();

        let second = small_level(Tile::GroundFill);
        let result = store.commit(6, |_| Err(std::io::Error::new(ErrorKind::Other, "boom").into()));
        assert!(result.is_err());
        assert_eq!(store.load(6).unwrap(), first);

        store.save(&second, 6).unwrap();
        assert_eq!(store.load(6).unwrap(), second);
        let names: Vec<_> = fs::read_dir(&root).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("6")]);
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn file_names() {
        let store = LevelStore::new("levels");
        assert_eq!(
            store.layer_path(3, LayerKind::FgPalms),
            Path::new("levels").join("3").join("level_3_fg_palms.csv")
        );
        assert_eq!(
            store.meta_path(3),
            Path::new("levels").join("3").join("level_3_meta.ron")
        );
    }
}
