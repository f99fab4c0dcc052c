use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) const DB_ENV: &str = "FINTRACK_DB";
pub(crate) const USER_ENV: &str = "FINTRACK_USER";
pub(crate) const LOG_ENV: &str = "FINTRACK_LOG";

const DB_FILE: &str = "fintrack.db";
const LOG_FILE: &str = "fintrack.log";

/// Where fintrack keeps its files and which user it acts for.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) user_email: Option<String>,
}

impl Config {
    /// Resolve from the environment. `--user` on the command line overrides
    /// `FINTRACK_USER` later, in the CLI.
    pub(crate) fn from_env() -> Result<Self> {
        let data_dir = data_dir()?;
        let db_path = match std::env::var_os(DB_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => data_dir.join(DB_FILE),
        };
        let user_email = std::env::var(USER_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            db_path,
            log_path: data_dir.join(LOG_FILE),
            user_email,
        })
    }
}

fn data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "fintrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}
