//! Database URL handling for the binary glue.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3";
pub const DEFAULT_SHARE_URL: &str = "http://localhost:3000/quiz";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("cannot prepare database file: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: raw.to_string(),
        });
    }
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return Ok(trimmed.to_string());
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    Ok(format!("sqlite://{}", absolute.display()))
}

/// Make sure the database file and its parent directory exist.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: db_url.to_string(),
        });
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_absolute_and_memory_urls() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db").unwrap(),
            "sqlite:///tmp/q.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:").unwrap(),
            "sqlite::memory:"
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:quiz.sqlite3").unwrap();
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("quiz.sqlite3"));
    }

    #[test]
    fn blank_url_is_rejected() {
        assert!(matches!(
            normalize_sqlite_url("  "),
            Err(ConfigError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("quiz.db");
        let url = format!("sqlite://{}", file.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(file.exists());
    }
}
