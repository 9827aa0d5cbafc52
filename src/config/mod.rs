//! Configuration management for `bugtracker`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`DB_PATH`, `BUGTRACKER_*`)
//! 3. YAML config file (`--config`, else `./bugtracker.yaml` if present)
//! 4. Defaults
//!
//! Every source is first flattened into a [`ConfigLayer`] of normalized
//! string keys (`db-path`, `bind`, `cors.origins`, ...). Layers are merged,
//! and only the merged result is parsed into a typed [`ServerConfig`].

use crate::error::{Result, TrackerError};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default database location (overridable with `DB_PATH`).
pub const DEFAULT_DB_PATH: &str = "bugs.db";
/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "bugtracker.yaml";
/// Grace period for in-flight requests at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
/// Origin allowed by default (the bundled frontend's dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

const ENV_PREFIX: &str = "BUGTRACKER_";

const KEY_DB_PATH: &str = "db-path";
const KEY_BIND: &str = "bind";
const KEY_SHUTDOWN_GRACE: &str = "shutdown-grace";
const KEY_CORS_ORIGINS: &str = "cors.origins";
const KEY_CORS_METHODS: &str = "cors.methods";
const KEY_CORS_HEADERS: &str = "cors.headers";
const KEY_CORS_MAX_AGE: &str = "cors.max-age";

/// A flat layer of normalized configuration keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a key, normalizing its spelling.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.insert(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from explicit `(name, value)` pairs.
    ///
    /// `DB_PATH` maps to `db-path`; `BUGTRACKER_CORS_MAX_AGE` maps to
    /// `cors.max-age`; any other `BUGTRACKER_FOO_BAR` maps to `foo-bar`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (name, value) in vars {
            if name == "DB_PATH" {
                layer.insert(KEY_DB_PATH, value);
            } else if let Some(stripped) = name.strip_prefix(ENV_PREFIX) {
                layer.insert(&env_key(stripped), value);
            }
        }
        layer
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub bind: Option<String>,
    pub cors_origins: Vec<String>,
    pub shutdown_grace: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.insert(KEY_DB_PATH, path.to_string_lossy());
        }
        if let Some(bind) = &self.bind {
            layer.insert(KEY_BIND, bind.clone());
        }
        if !self.cors_origins.is_empty() {
            layer.insert(KEY_CORS_ORIGINS, self.cors_origins.join(","));
        }
        if let Some(grace) = self.shutdown_grace {
            layer.insert(KEY_SHUTDOWN_GRACE, grace.to_string());
        }

        layer
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Origins compared byte for byte; `*` allows any.
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    /// Preflight cache lifetime in seconds.
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            allow_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Is `origin` on the allow-list?
    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allow_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub shutdown_grace: Duration,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Parse a merged layer. Keys absent from the layer take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` for unparseable values.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = CorsConfig::default();

        let db_path = PathBuf::from(layer.get(KEY_DB_PATH).unwrap_or(DEFAULT_DB_PATH));
        let bind_raw = layer.get(KEY_BIND).unwrap_or(DEFAULT_BIND);
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| TrackerError::Config(format!("invalid bind address '{bind_raw}': {e}")))?;
        let shutdown_grace = Duration::from_secs(
            parse_u64(layer, KEY_SHUTDOWN_GRACE)?.unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS),
        );

        let cors = CorsConfig {
            allow_origins: parse_list(layer, KEY_CORS_ORIGINS).unwrap_or(defaults.allow_origins),
            allow_methods: parse_list(layer, KEY_CORS_METHODS)
                .map(|methods| methods.iter().map(|m| m.to_uppercase()).collect())
                .unwrap_or(defaults.allow_methods),
            allow_headers: parse_list(layer, KEY_CORS_HEADERS).unwrap_or(defaults.allow_headers),
            max_age: parse_u64(layer, KEY_CORS_MAX_AGE)?,
        };

        Ok(Self {
            db_path,
            bind,
            shutdown_grace,
            cors,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            cors: CorsConfig::default(),
        }
    }
}

/// Load the config file layer.
///
/// An explicitly named file must exist; the implicit `bugtracker.yaml` is
/// optional.
///
/// # Errors
///
/// Returns an error if the file is missing (explicit only), unreadable, or
/// not valid YAML.
pub fn load_file_layer(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.exists() => Err(TrackerError::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILE)),
    }
}

/// Load and merge all layers into a typed config.
///
/// # Errors
///
/// Returns an error if the config file or any value is invalid.
pub fn load_config(config_file: Option<&Path>, overrides: &CliOverrides) -> Result<ServerConfig> {
    let layers = [
        load_file_layer(config_file)?,
        ConfigLayer::from_env(),
        overrides.as_layer(),
    ];
    ServerConfig::from_layer(&ConfigLayer::merge_layers(&layers))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn env_key(stripped: &str) -> String {
    let lower = stripped.to_lowercase();
    match lower.strip_prefix("cors_") {
        Some(rest) => format!("cors.{rest}"),
        None => lower,
    }
}

fn parse_u64(layer: &ConfigLayer, key: &str) -> Result<Option<u64>> {
    layer
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| {
                    TrackerError::Config(format!("{key} must be a whole number, got '{raw}'"))
                })
        })
        .transpose()
}

fn parse_list(layer: &ConfigLayer, key: &str) -> Option<Vec<String>> {
    layer.get(key).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_layer_empty() {
        let config = ServerConfig::from_layer(&ConfigLayer::default()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.db_path, PathBuf::from("bugs.db"));
        assert_eq!(config.cors.allow_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn env_vars_map_to_keys() {
        let layer = ConfigLayer::from_env_vars(vars(&[
            ("DB_PATH", "/tmp/x.db"),
            ("BUGTRACKER_BIND", "127.0.0.1:9000"),
            ("BUGTRACKER_CORS_MAX_AGE", "600"),
            ("BUGTRACKER_SHUTDOWN_GRACE", "3"),
            ("UNRELATED", "ignored"),
        ]));
        assert_eq!(layer.get("db-path"), Some("/tmp/x.db"));
        assert_eq!(layer.get("bind"), Some("127.0.0.1:9000"));
        assert_eq!(layer.get("cors.max-age"), Some("600"));
        assert_eq!(layer.get("shutdown-grace"), Some("3"));
        assert_eq!(layer.values.len(), 4);
    }

    #[test]
    fn yaml_nested_and_lists_flatten() {
        let yaml = "\
db_path: data/bugs.db
cors:
  origins:
    - https://a.example
    - https://b.example
  max_age: 120
";
        let layer = ConfigLayer::from_yaml_str(yaml).unwrap();
        assert_eq!(layer.get("db-path"), Some("data/bugs.db"));
        assert_eq!(
            layer.get("cors.origins"),
            Some("https://a.example,https://b.example")
        );
        assert_eq!(layer.get("cors.max-age"), Some("120"));
    }

    #[test]
    fn merge_precedence_order() {
        let yaml = "bind: 127.0.0.1:1000\ndb_path: file.db\nshutdown_grace: 7\n";
        let file = ConfigLayer::from_yaml_str(yaml).unwrap();
        let env = ConfigLayer::from_env_vars(vars(&[
            ("BUGTRACKER_BIND", "127.0.0.1:2000"),
            ("DB_PATH", "env.db"),
        ]));
        let cli = CliOverrides {
            db: Some(PathBuf::from("cli.db")),
            ..CliOverrides::default()
        }
        .as_layer();

        let merged = ConfigLayer::merge_layers(&[file, env, cli]);
        let config = ServerConfig::from_layer(&merged).unwrap();
        assert_eq!(config.db_path, PathBuf::from("cli.db"));
        assert_eq!(config.bind, "127.0.0.1:2000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.shutdown_grace, Duration::from_secs(7));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let mut layer = ConfigLayer::default();
        layer.insert("bind", "not-an-address");
        let err = ServerConfig::from_layer(&layer).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));

        let mut layer = ConfigLayer::default();
        layer.insert("shutdown_grace", "soon");
        assert!(ServerConfig::from_layer(&layer).is_err());
    }

    #[test]
    fn cors_lists_parse_and_normalize() {
        let cli = CliOverrides {
            cors_origins: vec!["https://x.example".to_string(), "*".to_string()],
            ..CliOverrides::default()
        };
        let mut layer = cli.as_layer();
        layer.insert("cors.methods", "get, post");
        let config = ServerConfig::from_layer(&layer).unwrap();
        assert_eq!(config.cors.allow_methods, vec!["GET", "POST"]);
        assert!(config.cors.allows_origin("https://anything.example"));
    }

    #[test]
    fn allows_origin_is_exact() {
        let cors = CorsConfig::default();
        assert!(cors.allows_origin("http://localhost:3000"));
        assert!(!cors.allows_origin("http://localhost:3001"));
        assert!(!cors.allows_origin("http://evil.example"));
        assert!(!cors.allows_origin("HTTP://LOCALHOST:3000"));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("nope.yaml");
        assert!(load_file_layer(Some(&missing)).is_err());

        let present = temp.path().join("bugtracker.yaml");
        fs::write(&present, "bind: 127.0.0.1:4000\n").expect("write config");
        let layer = load_file_layer(Some(&present)).unwrap();
        assert_eq!(layer.get("bind"), Some("127.0.0.1:4000"));
    }
}
