use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::ArchiveError;

/// Application-level constants
pub const APP_NAME: &str = "Symptom Intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Archive file names inside the data directory
pub const HISTORY_FILE: &str = "history.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const FEEDBACK_FILE: &str = "feedback.json";

/// Pause before each bot message in the terminal front-end
pub const DEFAULT_TYPING_DELAY_MS: u64 = 600;

/// Get the application data directory
/// `<platform data dir>/symptom-intake/`, `None` when the platform has none
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("symptom-intake"))
}

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "symptom_intake_lib=info,warn"
}

/// Resolved runtime settings for one process.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub typing_delay: Duration,
    pub log_filter: String,
}

impl Settings {
    /// Explicit values win; the data directory falls back to [`app_data_dir`].
    pub fn resolve(
        data_dir: Option<&Path>,
        typing_delay_ms: Option<u64>,
        log_filter: Option<&str>,
    ) -> Result<Self, ArchiveError> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => app_data_dir().ok_or(ArchiveError::NoDataDir)?,
        };

        Ok(Self {
            data_dir,
            typing_delay: Duration::from_millis(typing_delay_ms.unwrap_or(DEFAULT_TYPING_DELAY_MS)),
            log_filter: log_filter.unwrap_or(default_log_filter()).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_platform_data() {
        if let (Some(dir), Some(base)) = (app_data_dir(), dirs::data_dir()) {
            assert!(dir.starts_with(base));
            assert!(dir.ends_with("symptom-intake"));
        }
    }

    #[test]
    fn archive_files_are_distinct() {
        assert_ne!(HISTORY_FILE, PROFILE_FILE);
        assert_ne!(HISTORY_FILE, FEEDBACK_FILE);
        assert_ne!(PROFILE_FILE, FEEDBACK_FILE);
    }

    #[test]
    fn explicit_settings_win() {
        let settings =
            Settings::resolve(Some(Path::new("/tmp/intake")), Some(0), Some("debug")).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/intake"));
        assert_eq!(settings.typing_delay, Duration::ZERO);
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn defaults_fill_gaps() {
        let settings = Settings::resolve(Some(Path::new("data")), None, None).unwrap();
        assert_eq!(settings.typing_delay, Duration::from_millis(DEFAULT_TYPING_DELAY_MS));
        assert_eq!(settings.log_filter, default_log_filter());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
