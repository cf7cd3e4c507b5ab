use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub http_proxy: String,
    pub https_proxy: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            http_proxy: String::new(),
            https_proxy: String::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

fn parse_secs_env(name: &str, value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => {
            log::warn!("Ignoring invalid {name} value {value:?}");
            None
        }
    }
}

impl Config {
    /// Defaults, then `config.toml` in the data directory, then environment overrides.
    pub fn new() -> Self {
        Self::load(None)
    }

    /// Like [`Config::new`], but an explicit `data_dir` wins over `SENTINEL_DATA_DIR`
    /// and is also where `config.toml` is read from.
    pub fn load(data_dir: Option<PathBuf>) -> Self {
        Self::load_with(data_dir, |name| std::env::var(name).ok())
    }

    fn load_with(explicit_dir: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = explicit_dir
            .clone()
            .or_else(|| lookup("SENTINEL_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(paths::sentinel_dir);
        let mut config = Self::from_file(&paths::config_toml_path(&data_dir)).unwrap_or_default();
        if config.data_dir.is_none() {
            config.data_dir = Some(data_dir);
        }
        config.apply_env(&lookup);
        if explicit_dir.is_some() {
            config.data_dir = explicit_dir;
        }
        config
    }

    pub fn from_file(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Failed to read {}: {}", path.display(), err);
                return None;
            }
        };
        match toml::from_str::<Config>(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!("Failed to parse {}: {}", path.display(), err);
                None
            }
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = lookup("SENTINEL_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(secs) = lookup("SENTINEL_POLL_INTERVAL_SECS")
            .and_then(|v| parse_secs_env("SENTINEL_POLL_INTERVAL_SECS", &v))
        {
            self.poll_interval_secs = secs;
        }
        if let Some(secs) = lookup("SENTINEL_REQUEST_TIMEOUT_SECS")
            .and_then(|v| parse_secs_env("SENTINEL_REQUEST_TIMEOUT_SECS", &v))
        {
            self.request_timeout_secs = secs;
        }
        if let Some(dir) = lookup("SENTINEL_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::sentinel_dir)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parse_secs_env_accepts_positive_integers() {
        assert_eq!(parse_secs_env("X", " 10 "), Some(10));
        assert_eq!(parse_secs_env("X", "0"), None);
        assert_eq!(parse_secs_env("X", "soon"), None);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("SENTINEL_API_BASE", "http://sentinel.local/api"),
            ("SENTINEL_POLL_INTERVAL_SECS", "2"),
            ("SENTINEL_REQUEST_TIMEOUT_SECS", "nope"),
        ]);
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_base, "http://sentinel.local/api");
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base = \"https://example.test/api\"\n").expect("write");

        let config = Config::from_file(&path).expect("config");
        assert_eq!(config.api_base, "https://example.test/api");
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert!(config.http_proxy.is_empty());
    }

    #[test]
    fn explicit_data_dir_supplies_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("config.toml"),
            "api_base = \"https://flag-dir.test/api\"\npoll_interval_secs = 9\n",
        )
        .expect("write");
        let env: HashMap<&str, &str> = HashMap::from([("SENTINEL_DATA_DIR", "/nonexistent/env-dir")]);

        let config = Config::load_with(Some(dir.path().to_path_buf()), |name| {
            env.get(name).map(|v| v.to_string())
        });

        assert_eq!(config.api_base, "https://flag-dir.test/api");
        assert_eq!(config.poll_interval_secs, 9);
        assert_eq!(config.data_dir(), dir.path());
    }

    #[test]
    fn env_data_dir_is_used_without_explicit_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.toml"), "request_timeout_secs = 4\n").expect("write");
        let env_dir = dir.path().to_string_lossy().to_string();

        let config = Config::load_with(None, |name| {
            (name == "SENTINEL_DATA_DIR").then(|| env_dir.clone())
        });

        assert_eq!(config.request_timeout_secs, 4);
        assert_eq!(config.data_dir(), dir.path());
    }

    #[test]
    fn malformed_toml_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base = [").expect("write");
        assert!(Config::from_file(&path).is_none());
    }
}
