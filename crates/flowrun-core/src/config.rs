use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// Top-level Flowrun configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// CORS origins. Empty means permissive.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_allowed_origins() -> Vec<String> { vec!["http://localhost:3003".to_string()] }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Insert the sample workflow on startup if it is missing.
    #[serde(default = "default_seed")]
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            seed: default_seed(),
        }
    }
}

fn default_store_path() -> String { "flowrun.db".to_string() }
fn default_seed() -> bool { true }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_weather_url() -> String { "https://api.open-meteo.com/v1/forecast".to_string() }
fn default_weather_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Step bound per run. Hitting it without reaching a terminal edge
    /// fails the run as a possible cycle.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

pub const DEFAULT_MAX_STEPS: usize = 100;

fn default_max_steps() -> usize { DEFAULT_MAX_STEPS }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| FlowError::ConfigNotFound(path.display().to_string()))?;

        Self::from_toml(&content)
    }

    /// Load config from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse TOML text after expanding `${ENV_VAR}` references.
    pub fn from_toml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Self =
            toml::from_str(&expanded).map_err(|e| FlowError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.engine.max_steps == 0 {
            return Err(FlowError::Config("engine.max_steps must be at least 1".into()));
        }
        if self.weather.timeout_secs == 0 {
            return Err(FlowError::Config("weather.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Resolve the store path (expand ~).
    pub fn store_path(&self) -> PathBuf {
        let p = &self.store.path;
        if let Some(rest) = p.strip_prefix("~/") {
            if let Some(home) = dirs_home() {
                return home.join(rest);
            }
        }
        PathBuf::from(p)
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                // Keep original if env var not set
                Err(_) => result.push_str(&format!("${{{}}}", var_name)),
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_FLOWRUN_VAR", "hello");
        let result = expand_env_vars("key = \"${TEST_FLOWRUN_VAR}\"");
        assert_eq!(result, "key = \"hello\"");
        std::env::remove_var("TEST_FLOWRUN_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("key = \"${NONEXISTENT_FLOWRUN_VAR}\"");
        assert_eq!(result, "key = \"${NONEXISTENT_FLOWRUN_VAR}\"");
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.gateway.bind, "127.0.0.1:8080");
        assert_eq!(config.gateway.allowed_origins, vec!["http://localhost:3003"]);
        assert_eq!(config.store.path, "flowrun.db");
        assert!(config.store.seed);
        assert_eq!(config.weather.timeout(), Duration::from_secs(10));
        assert_eq!(config.engine.max_steps, 100);
    }

    #[test]
    fn test_partial_sections() {
        let toml_str = r#"
[engine]
max_steps = 12

[gateway]
allowed_origins = []
"#;
        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.engine.max_steps, 12);
        assert!(config.gateway.allowed_origins.is_empty());
        assert_eq!(config.gateway.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let err = AppConfig::from_toml("[engine]\nmax_steps = 0\n").unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config =
            AppConfig::load_or_default(Path::new("/nonexistent/flowrun-test.toml")).unwrap();
        assert_eq!(config.engine.max_steps, DEFAULT_MAX_STEPS);
    }
}
