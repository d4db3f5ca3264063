//! Progress saved as a small JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hole_match_core::{ProgressError, ProgressStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SaveFile {
    current_level: usize,
}

/// Stores the current level index at `path`.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    path: PathBuf,
}

impl FileProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&mut self) -> Result<Option<usize>, ProgressError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let save: SaveFile =
            serde_json::from_str(&text).map_err(|e| ProgressError::Format(e.to_string()))?;
        Ok(Some(save.current_level))
    }

    fn save(&mut self, level_index: usize) -> Result<(), ProgressError> {
        let text = serde_json::to_string(&SaveFile {
            current_level: level_index,
        })
        .map_err(|e| ProgressError::Format(e.to_string()))?;
        fs::write(&self.path, text)?;
        log::debug!("saved progress: level {level_index}");
        Ok(())
    }
}
