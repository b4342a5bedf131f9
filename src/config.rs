use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MnemoConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub content_root: String,
    /// Files larger than this are reported by size only, never read whole.
    pub max_read_bytes: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub default_list_limit: usize,
    pub summary_weight: f64,
    pub keyword_weight: f64,
    /// Score credit applied per matched boost keyword when re-ranking.
    pub keyword_boost: f64,
}

impl Default for MnemoConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8930,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = default_mnemo_dir();
        Self {
            db_path: base.join("memory.db").to_string_lossy().into_owned(),
            content_root: base.join("content").to_string_lossy().into_owned(),
            max_read_bytes: 1_048_576,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_list_limit: 20,
            summary_weight: 0.8,
            keyword_weight: 2.0,
            keyword_boost: 1.0,
        }
    }
}

/// Returns `~/.mnemo/`
pub fn default_mnemo_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".mnemo")
}

/// Returns the default config file path: `~/.mnemo/config.toml`
pub fn default_config_path() -> PathBuf {
    default_mnemo_dir().join("config.toml")
}

impl MnemoConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MnemoConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MNEMO_DB, MNEMO_CONTENT_ROOT, MNEMO_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MNEMO_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MNEMO_CONTENT_ROOT") {
            self.storage.content_root = val;
        }
        if let Ok(val) = std::env::var("MNEMO_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Resolve the content root, expanding `~` if needed.
    pub fn resolved_content_root(&self) -> PathBuf {
        expand_tilde(&self.storage.content_root)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MnemoConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.storage.max_read_bytes, 1_048_576);
        assert!(config.storage.db_path.ends_with("memory.db"));
        assert!(config.storage.content_root.ends_with("content"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"
content_root = "/tmp/content"

[search]
default_limit = 25
"#;
        let config: MnemoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.storage.content_root, "/tmp/content");
        assert_eq!(config.search.default_limit, 25);
        // defaults still apply for unset fields
        assert_eq!(config.search.keyword_weight, 2.0);
        assert_eq!(config.search.keyword_boost, 1.0);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = MnemoConfig::default();
        std::env::set_var("MNEMO_DB", "/tmp/override.db");
        std::env::set_var("MNEMO_CONTENT_ROOT", "/tmp/override-content");
        std::env::set_var("MNEMO_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.storage.content_root, "/tmp/override-content");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("MNEMO_DB");
        std::env::remove_var("MNEMO_CONTENT_ROOT");
        std::env::remove_var("MNEMO_LOG_LEVEL");
    }
}
