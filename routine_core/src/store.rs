//! Persistence of generated routines.
//!
//! A routine is saved as one JSON document. Writes go through a locked temp
//! file in the target directory and are renamed into place.

use crate::{Error, GenerationResult, Result, UserProfile};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A generated routine together with the profile it was built for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedRoutine {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub result: GenerationResult,
}

impl SavedRoutine {
    pub fn new(profile: UserProfile, result: GenerationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            profile,
            result,
        }
    }

    /// `<data_dir>/routines/<id>.json`
    pub fn default_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("routines").join(format!("{}.json", self.id))
    }
}

/// Save a routine with exclusive locking
///
/// Atomically writes the routine by:
/// 1. Writing to a temp file
/// 2. Syncing to disk
/// 3. Renaming over the target
pub fn save_routine(path: &Path, routine: &SavedRoutine) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(routine)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!(id = %routine.id, "Saved routine to {:?}", path);
    Ok(())
}

/// Load a routine saved with [`save_routine`]
pub fn load_routine(path: &Path) -> Result<SavedRoutine> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    let routine: SavedRoutine = serde_json::from_str(&contents)?;
    tracing::debug!(id = %routine.id, "Loaded routine from {:?}", path);
    Ok(routine)
}
