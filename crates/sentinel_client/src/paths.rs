use std::path::{Path, PathBuf};

/// Fixed key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Sentinel data directory (~/.iot-sentinel)
pub fn sentinel_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".iot-sentinel")
}

pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_KEY)
}

pub fn config_toml_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn ensure_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}
