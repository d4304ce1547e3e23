//! # MuzRelay Configuration Module
//!
//! This module provides configuration management for MuzRelay, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use muzconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let port = config.get_http_port();
//! let cache_dir = config.get_cache_dir()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("muzrelay.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load MuzRelay configuration"));
}

const ENV_CONFIG_DIR: &str = "MUZRELAY_CONFIG";
const ENV_PREFIX: &str = "MUZRELAY_CONFIG__";

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_METADATA_TTL_SECONDS: u64 = 300;
const DEFAULT_STREAM_TTL_SECONDS: u64 = 600;
const DEFAULT_TOOL_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_SEARCH_TOOL: &str = "yt-dlp";
const DEFAULT_TRANSCODE_TOOL: &str = "ffmpeg";

/// Macro to generate a getter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
                Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap().max(0) as u64,
                _ => $default,
            }
        }
    };
}

/// Macro to generate a getter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }
    };
}

/// Configuration manager for MuzRelay
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".muzrelay").exists() {
            return ".muzrelay".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".muzrelay");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".muzrelay".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `MUZRELAY_CONFIG` environment variable
    /// 3. `.muzrelay` in the current directory
    /// 4. `.muzrelay` in the user's home directory
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);

        // Appliquer les overrides depuis les variables d'environnement
        let mut config_value = default_value;
        Self::apply_env_overrides(&mut config_value);

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key, value);
            } else {
                let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        let mut current = &*data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (3000) if not
    /// configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap() as u16,
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "Invalid HTTP port '{}', using default {}",
                        s,
                        DEFAULT_HTTP_PORT
                    );
                    DEFAULT_HTTP_PORT
                }
            },
            _ => DEFAULT_HTTP_PORT,
        }
    }

    /// Récupère le répertoire du cache, créé s'il n'existe pas
    ///
    /// Le chemin peut être absolu ou relatif au répertoire de configuration.
    pub fn get_cache_dir(&self) -> Result<String> {
        let dir_path = match self.get_value(&["cache", "directory"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => "cache".to_string(),
        };

        let path = Path::new(&dir_path);
        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created cache directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    /// Nombre maximum d'entrées du cache avant éviction
    pub fn get_cache_max_entries(&self) -> usize {
        match self.get_value(&["cache", "max_entries"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as usize,
            _ => DEFAULT_MAX_ENTRIES,
        }
    }

    impl_u64_config!(
        get_metadata_ttl_seconds,
        &["cache", "metadata_ttl_seconds"],
        DEFAULT_METADATA_TTL_SECONDS
    );

    impl_u64_config!(
        get_stream_ttl_seconds,
        &["cache", "stream_ttl_seconds"],
        DEFAULT_STREAM_TTL_SECONDS
    );

    impl_u64_config!(
        get_tool_timeout_seconds,
        &["tools", "timeout_seconds"],
        DEFAULT_TOOL_TIMEOUT_SECONDS
    );

    impl_string_config!(get_search_tool, &["tools", "search"], DEFAULT_SEARCH_TOOL);

    impl_string_config!(
        get_transcode_tool,
        &["tools", "transcode"],
        DEFAULT_TRANSCODE_TOOL
    );

    /// Deadline appliquée aux invocations des outils externes
    pub fn get_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.get_tool_timeout_seconds())
    }

    /// Endpoint du collecteur d'analytics, si activé
    ///
    /// Retourne `None` quand l'analytics est désactivée ou que l'endpoint
    /// est vide.
    pub fn get_analytics_endpoint(&self) -> Option<String> {
        let enabled = matches!(
            self.get_value(&["analytics", "enabled"]),
            Ok(Value::Bool(true))
        );
        if !enabled {
            return None;
        }
        match self.get_value(&["analytics", "endpoint"]) {
            Ok(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in_tempdir() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = load_in_tempdir();
        assert_eq!(config.get_http_port(), 3000);
        assert_eq!(config.get_metadata_ttl_seconds(), 300);
        assert_eq!(config.get_stream_ttl_seconds(), 600);
        assert_eq!(config.get_cache_max_entries(), 1000);
        assert_eq!(config.get_search_tool(), "yt-dlp");
        assert_eq!(config.get_transcode_tool(), "ffmpeg");
        assert_eq!(config.get_analytics_endpoint(), None);
    }

    #[test]
    fn test_external_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "host:\n  http_port: 9999\ncache:\n  metadata_ttl_seconds: 42\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_http_port(), 9999);
        assert_eq!(config.get_metadata_ttl_seconds(), 42);
        // Les clés absentes du fichier gardent la valeur par défaut
        assert_eq!(config.get_stream_ttl_seconds(), 600);
    }

    #[test]
    fn test_cache_dir_created_relative_to_config() {
        let (dir, config) = load_in_tempdir();
        let cache_dir = config.get_cache_dir().unwrap();
        assert!(Path::new(&cache_dir).is_dir());
        assert!(cache_dir.starts_with(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_analytics_requires_enabled_and_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "analytics:\n  enabled: true\n  endpoint: http://localhost:9000/events\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(
            config.get_analytics_endpoint().as_deref(),
            Some("http://localhost:9000/events")
        );
    }
}
