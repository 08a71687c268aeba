use crate::error::{Error, Result};
use crate::index::{IndexSnapshot, IndexStats};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub documents: usize,
    pub keys: usize,
    pub entry_count: u64,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn new(stats: IndexStats, created_at: String) -> Self {
        Self {
            documents: stats.documents,
            keys: stats.keys,
            entry_count: stats.entry_count,
            created_at,
            version: SNAPSHOT_VERSION,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn snapshot(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    pub fn snapshot_exists(&self) -> bool { self.snapshot().is_file() }
}

pub fn save_snapshot(paths: &IndexPaths, snapshot: &IndexSnapshot) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.snapshot())?;
    let bytes = bincode::serialize(snapshot)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<IndexSnapshot> {
    let mut f = File::open(paths.snapshot())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let snapshot = bincode::deserialize(&buf)?;
    Ok(snapshot)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    fs::write(paths.meta(), serde_json::to_vec_pretty(meta)?)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    Ok(serde_json::from_slice(&fs::read(paths.meta())?)?)
}

/// Load the snapshot after checking that `meta.json`, when present, was
/// written by a compatible version.
pub fn load_index(paths: &IndexPaths) -> Result<IndexSnapshot> {
    if paths.meta().is_file() {
        let meta = load_meta(paths)?;
        if meta.version != SNAPSHOT_VERSION {
            return Err(Error::IncompatibleSnapshot { expected: SNAPSHOT_VERSION, actual: meta.version });
        }
    }
    load_snapshot(paths)
}
