use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{LifecycleError, Result};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_PATH: &str = "certkeeper.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    /// Named credential profiles. Anything not set here falls back to the
    /// deterministic defaults derived from `keys` and `store`.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeysConfig {
    /// Directory holding `<safeName>.csr` and `<safeName>.pkenc` artifacts.
    #[serde(default = "default_keys_dir")]
    pub keys_dir: PathBuf,
    /// Alias of the master key shared by all certificate private keys.
    #[serde(default = "default_master_key_alias")]
    pub master_key_alias: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            keys_dir: default_keys_dir(),
            master_key_alias: default_master_key_alias(),
        }
    }
}

fn default_keys_dir() -> PathBuf {
    PathBuf::from("keys")
}

fn default_master_key_alias() -> String {
    "certkeeper-master".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Root of the directory-backed certificate store.
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,
    /// Optional cap on entries per region. Exceeding it is reported as a
    /// recoverable condition, not a command failure.
    #[serde(default)]
    pub max_entries: Option<u32>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            max_entries: None,
        }
    }
}

fn default_store_root() -> PathBuf {
    PathBuf::from("store")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    /// PEM bundle of issuer certificates used to derive trust chains when
    /// the operator does not supply one.
    #[serde(default = "default_ca_bundle_path")]
    pub ca_bundle_path: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            ca_bundle_path: default_ca_bundle_path(),
        }
    }
}

fn default_ca_bundle_path() -> PathBuf {
    PathBuf::from("ca-bundle.pem")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProfileConfig {
    pub master_key_path: Option<PathBuf>,
    pub store_root: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path).map_err(|e| LifecycleError::Config {
            path: path.to_path_buf(),
            message: format!("failed to read: {}", e),
        })?;

        toml::from_str(&config_str).map_err(|e| LifecycleError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `certkeeper.toml` if present, otherwise built-in defaults.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_PATH);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
