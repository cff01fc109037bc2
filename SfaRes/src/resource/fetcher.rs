//! Byte sources for resource tables

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Fetches whole files by game-relative path (`StarFoxAdventures/AMAP.TAB`).
pub trait DataFetcher {
    fn fetch_data(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads files from a directory holding the extracted game data.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DataFetcher for DirFetcher {
    fn fetch_data(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        tracing::debug!("Fetching {}", full.display());
        Ok(std::fs::read(full)?)
    }
}

impl<F: DataFetcher + ?Sized> DataFetcher for &F {
    fn fetch_data(&self, path: &str) -> Result<Vec<u8>> {
        (**self).fetch_data(path)
    }
}
