//! Persisted region archive.
//!
//! The confirmed-nucleus set is written once after selection and re-read
//! once per cell iteration. The on-disk layout is an implementation
//! detail of this module; callers treat it as an opaque ordered list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Region;

/// Errors from archive persistence.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to access region archive {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse region archive {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An ordered region list persisted at a fixed path.
#[derive(Debug, Clone)]
pub struct RegionArchive {
    path: PathBuf,
}

impl RegionArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the ordered region list, replacing any previous archive.
    pub fn save(&self, regions: &[Region]) -> Result<(), ArchiveError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string(regions).map_err(|e| self.parse_error(e))?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    /// Read back the ordered region list.
    pub fn load(&self) -> Result<Vec<Region>, ArchiveError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|e| self.parse_error(e))
    }

    fn io_error(&self, source: io::Error) -> ArchiveError {
        ArchiveError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn parse_error(&self, source: serde_json::Error) -> ArchiveError {
        ArchiveError::Parse {
            path: self.path.display().to_string(),
            source,
        }
    }
}
