//! YAML configuration for the client.
//!
//! # Design
//! The file has three optional sections:
//!
//! ```yaml
//! server:
//!   base_url: https://api.example.com
//!   output_dir: data_files
//! headers:
//!   Accept: application/json
//! secrets:
//!   api_token: s3cr3t
//! ```
//!
//! Every field is optional. A `null` section is the same as a missing one.
//! Header and secret values may be any YAML scalar and are kept as strings.
//! A value of the wrong type is logged and skipped instead of failing the
//! document, so one bad entry does not cost the rest of the file.
//! `load` reports every failure, and `load_or_default` is what the client
//! uses: it logs the failure and carries on with an empty configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Parsed configuration file. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "server_section")]
    pub server: ServerConfig,
    #[serde(deserialize_with = "scalar_map")]
    pub headers: BTreeMap<String, String>,
    pub secrets: Secrets,
}

/// The `server` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// The `secrets` section. `Debug` prints key names only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets(BTreeMap<String, String>);

impl Secrets {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Secrets {
    fn from(map: BTreeMap<String, String>) -> Self {
        Secrets(map)
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl<'de> Deserialize<'de> for Secrets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        scalar_map(deserializer).map(Secrets)
    }
}

impl Config {
    /// Parse a YAML document. Blank input yields an empty configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse `path`, reporting every failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Like `load`, but any failure yields an empty configuration.
    ///
    /// A missing file is expected and only logged at debug level; unreadable
    /// or malformed files are logged as warnings.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "error loading configuration file, using defaults"
                );
                Config::default()
            }
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.server.base_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.server.output_dir.as_deref()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn secret(&self, key: &str) -> Option<&str> {
        self.secrets.get(key)
    }
}

/// The `server` section, keeping only scalar `base_url` and `output_dir`.
fn server_section<'de, D>(deserializer: D) -> Result<ServerConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(ServerConfig::default());
    };
    if !raw.is_mapping() {
        warn!(section = "server", "ignoring configuration section that is not a mapping");
        return Ok(ServerConfig::default());
    }
    Ok(ServerConfig {
        base_url: scalar_field(&raw, "server", "base_url"),
        output_dir: scalar_field(&raw, "server", "output_dir").map(PathBuf::from),
    })
}

fn scalar_field(section: &Value, name: &str, key: &str) -> Option<String> {
    let value = section.get(key).filter(|v| !v.is_null())?;
    let scalar = scalar_string(value);
    if scalar.is_none() {
        warn!(section = name, key, "ignoring non-scalar configuration value");
    }
    scalar
}

/// A string-to-string map that also accepts numbers and booleans as values.
/// Entries with any other value are skipped.
fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = match Option::<Value>::deserialize(deserializer)? {
        None => return Ok(BTreeMap::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            warn!("ignoring configuration section that is not a mapping");
            return Ok(BTreeMap::new());
        }
    };
    Ok(mapping
        .into_iter()
        .filter_map(|(key, value)| {
            let Some(key) = scalar_string(&key) else {
                warn!("ignoring non-scalar configuration key");
                return None;
            };
            match scalar_string(&value) {
                Some(value) => Some((key, value)),
                None => {
                    warn!(key = %key, "ignoring non-scalar configuration value");
                    None
                }
            }
        })
        .collect())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
