//! Configuration for tumblelog paths and oEmbed behavior.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TUMBLELOG_HOME, TUMBLELOG_DB)
//! 2. Config file (.tumblelog/config.yaml)
//! 3. Defaults (~/.tumblelog)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tumblelog/config.yaml
//! - Paths in the config file are relative to the config file's parent

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::DEFAULT_CACHE_AGE;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub oembed: Option<OembedConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to the config file)
    pub home: Option<String>,
    /// Database file (relative to the config file)
    pub database: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OembedConfig {
    pub cache_age: Option<i64>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub strict: Option<bool>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the tumblelog home (state directory)
    pub home: PathBuf,
    /// Absolute path to the SQLite database
    pub database: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// oEmbed settings
    pub oembed: OembedSettings,
}

#[derive(Debug, Clone)]
pub struct OembedSettings {
    /// Default cache lifetime for embed metadata, in seconds
    pub cache_age: i64,
    /// Maximum embed width requested from providers
    pub max_width: Option<u32>,
    /// Maximum embed height requested from providers
    pub max_height: Option<u32>,
    /// Propagate provider transport failures instead of serving stale data
    pub strict: bool,
}

impl Default for OembedSettings {
    fn default() -> Self {
        Self {
            cache_age: DEFAULT_CACHE_AGE,
            max_width: None,
            max_height: None,
            strict: false,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tumblelog").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tumblelog");

    let config_file = find_config_file();

    let (home, database, oembed) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        let tumblelog_dir = config_path.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("TUMBLELOG_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(tumblelog_dir, home_path)
        } else {
            default_home.clone()
        };

        let database = if let Ok(env_db) = std::env::var("TUMBLELOG_DB") {
            PathBuf::from(env_db)
        } else if let Some(ref db_path) = config.paths.database {
            resolve_path(tumblelog_dir, db_path)
        } else {
            home.join("tumblelog.db")
        };

        let defaults = OembedSettings::default();
        let oembed = match config.oembed {
            Some(section) => OembedSettings {
                cache_age: section.cache_age.unwrap_or(defaults.cache_age),
                max_width: section.max_width,
                max_height: section.max_height,
                strict: section.strict.unwrap_or(defaults.strict),
            },
            None => defaults,
        };

        (home, database, oembed)
    } else {
        let home = std::env::var("TUMBLELOG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let database = std::env::var("TUMBLELOG_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("tumblelog.db"));

        (home, database, OembedSettings::default())
    };

    Ok(ResolvedConfig {
        home,
        database,
        config_file,
        oembed,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the tumblelog home directory
pub fn tumblelog_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the database path
pub fn database_path() -> Result<PathBuf> {
    Ok(config()?.database.clone())
}

/// Get the oEmbed settings
pub fn oembed_settings() -> Result<OembedSettings> {
    Ok(config()?.oembed.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_without_file() {
        let config = load_config().unwrap();

        // Without env overrides, the database lives under home
        if std::env::var("TUMBLELOG_HOME").is_err() && std::env::var("TUMBLELOG_DB").is_err() {
            assert_eq!(config.database, config.home.join("tumblelog.db"));
        }
        assert_eq!(config.oembed.cache_age, DEFAULT_CACHE_AGE);
        assert!(!config.oembed.strict);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let tumblelog_dir = temp.path().join(".tumblelog");
        std::fs::create_dir_all(&tumblelog_dir).unwrap();

        let config_path = tumblelog_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
  database: ./tumblelog.db
oembed:
  cache_age: 3600
  max_width: 640
  strict: true
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.paths.database, Some("./tumblelog.db".to_string()));

        let oembed = config.oembed.unwrap();
        assert_eq!(oembed.cache_age, Some(3600));
        assert_eq!(oembed.max_width, Some(640));
        assert_eq!(oembed.strict, Some(true));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        // Non-existent relative paths fall back to plain join
        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
    }
}
