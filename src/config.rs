// src/config.rs - Configuration loading: defaults, TOML file, .env and environment overrides
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::history::{HistorySettings, DEFAULT_HISTORY_CAPACITY, DEFAULT_MIN_TERM_CHARS, SEARCH_HISTORY_KEY};
use crate::query_builders::StatusShortcutMode;
use crate::stats::StatsPolicy;

pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub search: SearchConfig,
    pub stats: StatsPolicy,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub shortcut_mode: StatusShortcutMode,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub database_url: String,
    pub key: String,
    pub capacity: usize,
    pub min_term_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            shortcut_mode: StatusShortcutMode::default(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:equipment_console.db".to_string(),
            key: SEARCH_HISTORY_KEY.to_string(),
            capacity: DEFAULT_HISTORY_CAPACITY,
            min_term_chars: DEFAULT_MIN_TERM_CHARS,
        }
    }
}

impl HistoryConfig {
    pub fn settings(&self) -> HistorySettings {
        HistorySettings {
            key: self.key.clone(),
            capacity: self.capacity,
            min_term_chars: self.min_term_chars,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file()?;

    let mut config = match env::var("CONFIG_FILE") {
        Ok(config_file) => load_config_file(Path::new(&config_file))?,
        Err(_) => Config::default(),
    };

    override_with_env(&mut config, |key| env::var(key).ok());

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Applies overrides from `lookup`; unparsable numbers keep the current value
pub fn override_with_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("EQUIPMENT_SERVICE_URL") {
        config.service.base_url = url;
    }
    if let Some(token) = lookup("EQUIPMENT_SERVICE_TOKEN") {
        config.service.token = Some(token);
    }
    if let Some(timeout_str) = lookup("EQUIPMENT_SERVICE_TIMEOUT_SECS") {
        match timeout_str.parse::<u64>() {
            Ok(timeout) => config.service.timeout_secs = timeout,
            Err(_) => log::warn!("Ignoring invalid EQUIPMENT_SERVICE_TIMEOUT_SECS: {}", timeout_str),
        }
    }
    if let Some(debounce_str) = lookup("SEARCH_DEBOUNCE_MS") {
        match debounce_str.parse::<u64>() {
            Ok(debounce) => config.search.debounce_ms = debounce,
            Err(_) => log::warn!("Ignoring invalid SEARCH_DEBOUNCE_MS: {}", debounce_str),
        }
    }
    if let Some(url) = lookup("SEARCH_HISTORY_DATABASE_URL") {
        config.history.database_url = url;
    }
    if let Some(level) = lookup("RUST_LOG") {
        config.logging.level = level;
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.service.base_url.starts_with("http://") && !self.service.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "service.base_url must be an http(s) URL (current: {})",
                self.service.base_url
            ));
        }

        if self.service.timeout_secs == 0 {
            return Err(anyhow::anyhow!("service.timeout_secs must be greater than 0"));
        }

        if self.history.capacity == 0 {
            return Err(anyhow::anyhow!("history.capacity must be greater than 0"));
        }

        if self.history.key.trim().is_empty() {
            return Err(anyhow::anyhow!("history.key cannot be empty"));
        }

        if self.stats.upcoming_window_days < 0 || self.stats.stale_after_days <= 0 {
            return Err(anyhow::anyhow!(
                "stats windows must be positive (upcoming: {}, stale: {})",
                self.stats.upcoming_window_days,
                self.stats.stale_after_days
            ));
        }

        Ok(())
    }

    pub fn print_startup_info(&self) {
        log::info!("Equipment console starting up...");
        log::info!("Service: {} ({}s timeout)", self.service.base_url, self.service.timeout_secs);
        log::info!("Auth: {}", if self.service.token.is_some() { "Bearer token" } else { "None" });
        log::info!("Search: {}ms debounce, status shortcut {}", self.search.debounce_ms, self.search.shortcut_mode);
        log::info!("History: {} (key '{}', {} entries)",
            if self.history.database_url.contains("sqlite") { "SQLite" } else { "Unknown" },
            self.history.key,
            self.history.capacity);
        log::info!("Logging: {} level", self.logging.level);
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.search.debounce(), Duration::from_millis(400));
        assert_eq!(config.search.shortcut_mode, StatusShortcutMode::Narrow);
        assert_eq!(config.history.settings(), HistorySettings::default());
        assert_eq!(config.stats, StatsPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.service.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        config.service.base_url = "https://gym.example".to_string();
        assert!(config.validate().is_ok());

        config.history.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_loading() -> Result<()> {
        let toml_content = r#"
        [service]
        base_url = "http://10.0.0.5:8000"
        token = "abc"

        [search]
        shortcut_mode = "hint_only"

        [stats]
        upcoming_window_days = 14
        "#;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(toml_content.as_bytes())?;

        let config = load_config_file(temp_file.path())?;
        assert_eq!(config.service.base_url, "http://10.0.0.5:8000");
        assert_eq!(config.service.token.as_deref(), Some("abc"));
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.search.shortcut_mode, StatusShortcutMode::HintOnly);
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.stats.upcoming_window_days, 14);
        assert_eq!(config.stats.stale_after_days, 365);
        Ok(())
    }

    #[test]
    fn test_env_override() {
        let vars: HashMap<&str, &str> = [
            ("EQUIPMENT_SERVICE_URL", "http://api:9000"),
            ("EQUIPMENT_SERVICE_TIMEOUT_SECS", "3"),
            ("SEARCH_DEBOUNCE_MS", "not-a-number"),
            ("SEARCH_HISTORY_DATABASE_URL", "sqlite::memory:"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        override_with_env(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.service.base_url, "http://api:9000");
        assert_eq!(config.service.timeout_secs, 3);
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.history.database_url, "sqlite::memory:");
        assert_eq!(config.service.token, None);
    }

    #[test]
    fn test_env_file_loading() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let env_path = temp_dir.path().join(".env");
        fs::write(&env_path, "EQUIPMENT_CONSOLE_TEST_MARKER=loaded\n")?;

        env::set_var("ENV_FILE", &env_path);
        load_env_file()?;
        env::remove_var("ENV_FILE");
        assert_eq!(env::var("EQUIPMENT_CONSOLE_TEST_MARKER").as_deref(), Ok("loaded"));
        Ok(())
    }
}
