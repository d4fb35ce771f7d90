//! Remote sync configuration (`~/.config/sitequote/config.toml`)
//!
//! Resolution order: environment variables override the config file.
//! Without a base URL from either source, sync is simply disabled --
//! a missing config is not an error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "sitequote";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_REMOTE_URL: &str = "SITEQUOTE_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "SITEQUOTE_REMOTE_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    remote: RemoteSection,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct RemoteSection {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl SyncConfig {
    /// Load from the config file plus environment overrides.
    /// Returns `Ok(None)` when no remote is configured.
    pub fn load() -> Result<Option<Self>> {
        let section = load_file_section()?;
        Ok(resolve(
            section,
            std::env::var(ENV_REMOTE_URL).ok(),
            std::env::var(ENV_REMOTE_KEY).ok(),
        ))
    }

    /// Path to the config file: `~/.config/sitequote/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn load_file_section() -> Result<RemoteSection> {
    let path = match SyncConfig::config_path() {
        Ok(path) => path,
        Err(_) => return Ok(RemoteSection::default()),
    };
    if !path.exists() {
        return Ok(RemoteSection::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read sync config: {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse sync config: {}", path.display()))?;
    Ok(config.remote)
}

fn resolve(
    section: RemoteSection,
    env_url: Option<String>,
    env_key: Option<String>,
) -> Option<SyncConfig> {
    let base_url = non_empty(env_url).or_else(|| non_empty(section.base_url))?;
    let api_key = non_empty(env_key)
        .or_else(|| non_empty(section.api_key))
        .unwrap_or_default();

    Some(SyncConfig {
        base_url,
        api_key,
        timeout_secs: section.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_section(contents: &str) -> RemoteSection {
        let config: ConfigFile = toml::from_str(contents).unwrap();
        config.remote
    }

    #[test]
    fn test_file_section_parses() {
        let section = parse_section(
            r#"
[remote]
base_url = "https://remote.example/rest/v1"
api_key = "secret"
timeout_secs = 5
"#,
        );
        let config = resolve(section, None, None).unwrap();
        assert_eq!(config.base_url, "https://remote.example/rest/v1");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_missing_remote_section_disables_sync() {
        let section = parse_section("");
        assert!(resolve(section, None, None).is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let section = parse_section(
            r#"
[remote]
base_url = "https://file.example"
api_key = "file-key"
"#,
        );
        let config = resolve(
            section,
            Some("https://env.example".to_string()),
            Some("env-key".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://env.example");
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn test_env_url_alone_is_enough() {
        let config = resolve(
            RemoteSection::default(),
            Some("https://env.example".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://env.example");
        assert_eq!(config.api_key, "");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let section = parse_section(
            r#"
[remote]
base_url = "https://file.example"
"#,
        );
        let config = resolve(section, Some(String::new()), Some(String::new())).unwrap();
        assert_eq!(config.base_url, "https://file.example");
    }
}
