use crate::constants::{DEFAULT_USER_ID, TIMER_DEBOUNCE_MILLIS, TOTAL_SCHEDULE_DAYS};
use crate::error::{AppError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_FILE: &str = "studytrack.db";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Scoping tag stamped on every stored document.
    pub user_id: String,
    /// Quiet period before timer changes are written.
    pub timer_debounce: Duration,
    pub total_schedule_days: u32,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            timer_debounce: Duration::from_millis(TIMER_DEBOUNCE_MILLIS),
            total_schedule_days: TOTAL_SCHEDULE_DAYS,
            data_dir: None,
        }
    }
}

impl SyncConfig {
    /// Directory holding the local database, created if missing.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("com", "studytrack", "StudyTrack")
                .ok_or(AppError::NoProjectDirs)?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&dir).map_err(AppError::DataDirCreation)?;
        Ok(dir)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.user_id, "default-user");
        assert_eq!(config.timer_debounce, Duration::from_secs(1));
        assert_eq!(config.total_schedule_days, 84);
    }

    #[test]
    fn test_data_dir_override_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = SyncConfig {
            data_dir: Some(nested.clone()),
            ..SyncConfig::default()
        };
        assert_eq!(config.database_path().unwrap(), nested.join(DATABASE_FILE));
        assert!(nested.is_dir());
    }
}
