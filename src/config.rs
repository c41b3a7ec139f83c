// ⚙️ Runtime configuration from the environment (and an optional .env file)

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder shipped in sample .env files; refusing it forces a real password
pub const PLACEHOLDER_PASSWORD: &str = "change_me_immediately";

pub const DEFAULT_DATABASE_PATH: &str = "instance/estate.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shared admin password
    pub admin_password: String,
    /// SQLite file
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// Served under /static
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Read `.env` (if present) then the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_default();
        if admin_password.trim().is_empty() {
            bail!("ADMIN_PASSWORD is not set");
        }
        if admin_password == PLACEHOLDER_PASSWORD {
            bail!("ADMIN_PASSWORD still has the placeholder value; choose a real password");
        }

        let database_path = database_path_or_default(lookup("DATABASE_URL"));

        let config = AppConfig {
            admin_password,
            database_path,
            bind_addr: lookup("BIND_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            static_dir: lookup("STATIC_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        };

        debug!(
            database = %config.database_path.display(),
            bind = %config.bind_addr,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Create the database's parent directory if needed
    pub fn ensure_database_dir(&self) -> Result<()> {
        ensure_parent_dir(&self.database_path)
    }
}

/// Database location alone (the CLI needs no password)
pub fn database_path_from_env() -> PathBuf {
    dotenvy::dotenv().ok();
    database_path_or_default(std::env::var("DATABASE_URL").ok())
}

fn database_path_or_default(url: Option<String>) -> PathBuf {
    url.filter(|v| !v.trim().is_empty())
        .map(|v| database_path_from_url(&v))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Accepts a bare path or a `sqlite:///relative` / `sqlite:////absolute` URL
pub fn database_path_from_url(url: &str) -> PathBuf {
    let trimmed = url.trim();
    let path = trimmed
        .strip_prefix("sqlite:///")
        .or_else(|| trimmed.strip_prefix("sqlite://"))
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    PathBuf::from(path)
}

/// Create `path`'s parent directory (no-op for bare file names)
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "s3cret")])).unwrap();
        assert_eq!(config.admin_password, "s3cret");
        assert_eq!(config.database_path, PathBuf::from("instance/estate.db"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.static_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_password_required() {
        assert!(AppConfig::from_lookup(lookup(&[])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "  ")])).is_err());

        let err = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "change_me_immediately")]))
            .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_database_url_forms() {
        assert_eq!(database_path_from_url("sqlite:///instance/estate.db"), PathBuf::from("instance/estate.db"));
        assert_eq!(database_path_from_url("sqlite:////var/lib/estate.db"), PathBuf::from("/var/lib/estate.db"));
        assert_eq!(database_path_from_url("data/estate.db"), PathBuf::from("data/estate.db"));

        let config = AppConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "pw"),
            ("DATABASE_URL", "sqlite:///custom.db"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("custom.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_database_dir_created() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("instance").join("estate.db");
        let url = format!("sqlite:///{}", db.display());

        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "pw"), ("DATABASE_URL", &url)])).unwrap();
        config.ensure_database_dir().unwrap();
        assert!(dir.path().join("nested").join("instance").is_dir());

        // bare file name has no parent to create
        ensure_parent_dir(Path::new("estate.db")).unwrap();
    }
}
