use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".loan-desk";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "loans.sqlite";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "loan-desk.log";
/// How long a store call waits on a lock held by another process.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "LOAN_DESK_CONFIG";
/// Overrides the database path from the config file.
pub const DB_ENV: &str = "LOAN_DESK_DB";

/// What happens to loans when the customer or staff member they reference is
/// deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Delete anyway and leave the loans pointing at a missing record.
    #[default]
    Orphan,
    /// Refuse the delete while any loan still references the record.
    Restrict,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub busy_timeout: Duration,
    pub delete_policy: DeletePolicy,
    pub log_file: PathBuf,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    busy_timeout_ms: Option<u64>,
    delete_policy: Option<DeletePolicy>,
    log_file: Option<PathBuf>,
}

impl Config {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Self {
            database_path: data_dir.join(DB_FILE_NAME),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            delete_policy: DeletePolicy::default(),
            log_file: data_dir.join(LOG_FILE_NAME),
        }
    }

    /// Load from `$LOAN_DESK_CONFIG` or `~/.loan-desk/config.toml`, then apply
    /// `$LOAN_DESK_DB`. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let data_dir = data_dir()?;
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));

        let mut config = Self::load_from(&path, &data_dir)?;
        if let Some(db) = env::var_os(DB_ENV) {
            config.database_path = PathBuf::from(db);
        }
        Ok(config)
    }

    /// Read `path` if it exists and layer it over the defaults for `data_dir`.
    pub fn load_from(path: &Path, data_dir: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::with_data_dir(data_dir));
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content, data_dir)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str, data_dir: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = file.database_path {
            config.database_path = path;
        }
        if let Some(ms) = file.busy_timeout_ms {
            if ms == 0 {
                return Err(anyhow!("busy_timeout_ms must be greater than zero"));
            }
            config.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = file.delete_policy {
            config.delete_policy = policy;
        }
        if let Some(path) = file.log_file {
            config.log_file = path;
        }
        Ok(config)
    }
}

/// Resolve `~/.loan-desk`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
