//! Session archive: write-only history of completed assessments, feedback,
//! and the optional read-only user profile.
//!
//! Two stores:
//! - `MemoryArchive` keeps everything in process (tests, embedding)
//! - `JsonFileArchive` keeps one JSON document per concern in a directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config;
use crate::diagnosis::summary::SessionSummary;
use crate::intake::types::{FeedbackRecord, UserProfile};

const STAGING_EXT: &str = "tmp";
const CORRUPT_EXT: &str = "corrupt";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot determine a data directory; pass --data-dir or set INTAKE_DATA_DIR")]
    NoDataDir,
}

/// Persistence seam used by the intake engine.
pub trait SessionArchive {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<(), ArchiveError>;

    fn load_user_profile(&self) -> Result<Option<UserProfile>, ArchiveError>;

    fn save_feedback(&mut self, feedback: &FeedbackRecord) -> Result<(), ArchiveError>;
}

// ═══════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════

#[derive(Debug, Default)]
pub struct MemoryArchive {
    /// Newest first.
    pub summaries: Vec<SessionSummary>,
    pub profile: Option<UserProfile>,
    pub feedback: Vec<FeedbackRecord>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }
}

impl SessionArchive for MemoryArchive {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<(), ArchiveError> {
        self.summaries.insert(0, summary.clone());
        Ok(())
    }

    fn load_user_profile(&self) -> Result<Option<UserProfile>, ArchiveError> {
        Ok(self.profile)
    }

    fn save_feedback(&mut self, feedback: &FeedbackRecord) -> Result<(), ArchiveError> {
        self.feedback.push(feedback.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════
// JSON files
// ═══════════════════════════════════════════

/// Directory-backed archive:
/// `history.json` (newest first), `profile.json`, `feedback.json`.
#[derive(Debug, Clone)]
pub struct JsonFileArchive {
    dir: PathBuf,
}

impl JsonFileArchive {
    /// Opens the archive and removes staging files left by an interrupted write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let archive = Self { dir: dir.into() };
        archive.cleanup_orphaned_staging();
        archive
    }

    fn cleanup_orphaned_staging(&self) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_staging = path.extension().is_some_and(|ext| ext == STAGING_EXT);
            if is_staging && path.is_file() {
                match fs::remove_file(&path) {
                    Ok(()) => tracing::info!(path = %path.display(), "Removed orphaned staging file"),
                    Err(e) => tracing::warn!("Failed to clean staging file: {e}"),
                }
            }
        }
    }

    /// Moves an unreadable history aside so new sessions can still be archived.
    fn quarantine_history(&self) -> Result<(), ArchiveError> {
        let path = self.dir.join(config::HISTORY_FILE);
        let aside = path.with_extension(CORRUPT_EXT);
        fs::rename(&path, &aside).map_err(|source| ArchiveError::Io { path, source })?;
        tracing::warn!(moved_to = %aside.display(), "Corrupt session history moved aside");
        Ok(())
    }

    /// All archived summaries, newest first.
    pub fn load_history(&self) -> Result<Vec<SessionSummary>, ArchiveError> {
        let history = read_json::<Vec<SessionSummary>>(&self.dir.join(config::HISTORY_FILE))?;
        Ok(history.unwrap_or_default())
    }

    pub fn load_feedback(&self) -> Result<Vec<FeedbackRecord>, ArchiveError> {
        let feedback = read_json::<Vec<FeedbackRecord>>(&self.dir.join(config::FEEDBACK_FILE))?;
        Ok(feedback.unwrap_or_default())
    }

    pub fn save_user_profile(&self, profile: &UserProfile) -> Result<(), ArchiveError> {
        write_json(&self.dir, config::PROFILE_FILE, profile)
    }
}

impl SessionArchive for JsonFileArchive {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<(), ArchiveError> {
        let mut history = match self.load_history() {
            Ok(history) => history,
            Err(ArchiveError::Serialization(e)) => {
                tracing::warn!(error = %e, "Session history unreadable, starting a new one");
                self.quarantine_history()?;
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        history.insert(0, summary.clone());
        write_json(&self.dir, config::HISTORY_FILE, &history)?;

        tracing::debug!(
            session_id = %summary.session_id,
            entries = history.len(),
            "Session summary archived"
        );
        Ok(())
    }

    fn load_user_profile(&self) -> Result<Option<UserProfile>, ArchiveError> {
        read_json(&self.dir.join(config::PROFILE_FILE))
    }

    fn save_feedback(&mut self, feedback: &FeedbackRecord) -> Result<(), ArchiveError> {
        let mut all = self.load_feedback()?;
        all.push(feedback.clone());
        write_json(&self.dir, config::FEEDBACK_FILE, &all)
    }
}

/// `Ok(None)` when the file does not exist yet.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ArchiveError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, file: &str, value: &T) -> Result<(), ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    // Stage then rename, so a crash mid-write never truncates the live file.
    let path = dir.join(file);
    let staging = path.with_extension(STAGING_EXT);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&staging, json).map_err(|source| ArchiveError::Io {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, &path).map_err(|source| ArchiveError::Io { path, source })
}
