use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const CONFIG_PATH_VAR: &str = "BAREHTTP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Value of the `server` response header
    pub server_name: String,
    /// Largest accepted request head, terminator excluded
    pub max_header_bytes: usize,
    pub header_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            server_name: "barehttp".to_string(),
            max_header_bytes: 16 * 1024,
            header_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Loads from the YAML file named by `BAREHTTP_CONFIG` if set,
    /// otherwise from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_lookup(|key| std::env::var(key).ok()),
        }
    }

    /// Builds a config from `LISTEN`, `SERVER_NAME`, `MAX_HEADER_BYTES` and
    /// `HEADER_TIMEOUT_MS`, as returned by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(addr) = lookup("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(name) = lookup("SERVER_NAME") {
            cfg.server_name = name;
        }
        if let Some(max) = lookup("MAX_HEADER_BYTES") {
            cfg.max_header_bytes = max
                .parse()
                .with_context(|| format!("invalid MAX_HEADER_BYTES: {}", max))?;
        }
        if let Some(ms) = lookup("HEADER_TIMEOUT_MS") {
            cfg.header_timeout_ms = ms
                .parse()
                .with_context(|| format!("invalid HEADER_TIMEOUT_MS: {}", ms))?;
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid config yaml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    pub fn header_timeout(&self) -> Duration {
        Duration::from_millis(self.header_timeout_ms)
    }
}
