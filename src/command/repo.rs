use crate::error::{Error, Result};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_MARKER: &str = "_mapper";

/// Create an empty dataset repository with the given mapper.
///
/// An existing repository at `root` is removed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRepository {
    pub root: String,
    pub mapper: String,
    pub marker: String,
}

impl InitRepository {
    pub fn new(root: impl Into<String>, mapper: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            mapper: mapper.into(),
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker_path(&self) -> PathBuf {
        Path::new(&self.root).join(&self.marker)
    }

    pub fn execute(&self) -> Result<()> {
        let root = Path::new(&self.root);
        if root.exists() {
            warn!(root = %root.display(), "removing existing repository");
            if root.is_dir() {
                fs::remove_dir_all(root).map_err(|e| Error::io(root, e))?;
            } else {
                fs::remove_file(root).map_err(|e| Error::io(root, e))?;
            }
        }
        fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;

        let marker = self.marker_path();
        fs::write(&marker, format!("{}\n", self.mapper)).map_err(|e| Error::io(&marker, e))?;
        Ok(())
    }
}

impl fmt::Display for InitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.mapper, self.marker_path().display())
    }
}
