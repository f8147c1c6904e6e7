//! Locations of the chore tracker's data files.
//!
//! Everything lives under `~/.chore-tracker/` unless `CHORES_HOME` points
//! somewhere else.

use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const HOME_ENV_VAR: &str = "CHORES_HOME";

/// The base directory name for chore tracker data.
const DATA_DIR_NAME: &str = ".chore-tracker";

/// The database filename.
pub const DATABASE_FILENAME: &str = "chores.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Get the data directory.
///
/// Returns `$CHORES_HOME` when set and non-empty, otherwise
/// `~/.chore-tracker/`. Returns `None` if neither can be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| home.join(DATA_DIR_NAME)),
    }
}

/// Get the default database path: `<data dir>/chores.sqlite3`.
#[must_use]
pub fn default_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DATABASE_FILENAME))
}

/// Get the directory holding user template overrides: `<data dir>/templates`.
#[must_use]
pub fn templates_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("templates"))
}
