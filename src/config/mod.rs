//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `TWIST_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, DEFAULT_LLM_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_K,
};
use crate::index::IndexKind;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TWIST_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Static twist corpus (`.json` array or `.jsonl`). Default: `./data/twists.json`.
    pub corpus_path: PathBuf,

    /// Persisted index snapshot. When unset the index is rebuilt on every start.
    pub index_path: Option<PathBuf>,

    /// Sentence-transformer directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// When unset the embedder runs in stub mode.
    pub embedder_path: Option<PathBuf>,

    /// Model name handed to the generative provider.
    pub llm_model: String,

    /// Few-shot examples retrieved per prediction.
    pub top_k: usize,

    /// Nearest-neighbour strategy.
    pub index_kind: IndexKind,

    /// Per-call model timeout.
    pub request_timeout: Duration,

    /// Concurrent inference permits. `None` sizes the pool from available compute.
    pub inference_workers: Option<usize>,

    /// Max entries per response cache.
    pub cache_capacity: u64,

    /// Response cache time-to-live.
    pub cache_ttl: Duration,

    /// Whether sampled predictions are served from cache.
    pub cache_predictions: bool,

    /// Whether generated text passes through the content moderator.
    pub moderation: bool,

    /// Answer model calls with the deterministic offline provider.
    pub mock_provider: bool,
}

/// Default corpus path used when `TWIST_CORPUS_PATH` is not set.
pub const DEFAULT_CORPUS_PATH: &str = "./data/twists.json";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            index_path: None,
            embedder_path: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
            index_kind: IndexKind::Flat,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            inference_workers: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_predictions: true,
            moderation: true,
            mock_provider: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "TWIST_PORT";
    const ENV_BIND_ADDR: &'static str = "TWIST_BIND_ADDR";
    const ENV_CORPUS_PATH: &'static str = "TWIST_CORPUS_PATH";
    const ENV_INDEX_PATH: &'static str = "TWIST_INDEX_PATH";
    const ENV_EMBEDDER_PATH: &'static str = "TWIST_EMBEDDER_PATH";
    const ENV_LLM_MODEL: &'static str = "TWIST_LLM_MODEL";
    const ENV_TOP_K: &'static str = "TWIST_TOP_K";
    const ENV_INDEX_KIND: &'static str = "TWIST_INDEX_KIND";
    const ENV_REQUEST_TIMEOUT: &'static str = "TWIST_REQUEST_TIMEOUT_SECS";
    const ENV_INFERENCE_WORKERS: &'static str = "TWIST_INFERENCE_WORKERS";
    const ENV_CACHE_CAPACITY: &'static str = "TWIST_CACHE_CAPACITY";
    const ENV_CACHE_TTL: &'static str = "TWIST_CACHE_TTL_SECS";
    const ENV_CACHE_PREDICTIONS: &'static str = "TWIST_CACHE_PREDICTIONS";
    const ENV_MODERATION: &'static str = "TWIST_MODERATION";
    const ENV_MOCK_PROVIDER: &'static str = "TWIST_MOCK_PROVIDER";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let corpus_path = Self::parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path);
        let index_path = Self::parse_optional_path_from_env(Self::ENV_INDEX_PATH);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let llm_model = Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model);
        let top_k = Self::parse_number_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let index_kind = Self::parse_index_kind_from_env(defaults.index_kind)?;
        let request_timeout = Duration::from_secs(Self::parse_number_from_env(
            Self::ENV_REQUEST_TIMEOUT,
            defaults.request_timeout.as_secs(),
        )?);
        let inference_workers = match env::var(Self::ENV_INFERENCE_WORKERS) {
            Ok(_) => Some(Self::parse_number_from_env(Self::ENV_INFERENCE_WORKERS, 1)?),
            Err(_) => None,
        };
        let cache_capacity =
            Self::parse_number_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let cache_ttl = Duration::from_secs(Self::parse_number_from_env(
            Self::ENV_CACHE_TTL,
            defaults.cache_ttl.as_secs(),
        )?);
        let cache_predictions =
            Self::parse_bool_from_env(Self::ENV_CACHE_PREDICTIONS, defaults.cache_predictions);
        let moderation = Self::parse_bool_from_env(Self::ENV_MODERATION, defaults.moderation);
        let mock_provider =
            env::var_os(Self::ENV_MOCK_PROVIDER).is_some_and(|v| !v.is_empty() && v != "0");

        Ok(Self {
            port,
            bind_addr,
            corpus_path,
            index_path,
            embedder_path,
            llm_model,
            top_k,
            index_kind,
            request_timeout,
            inference_workers,
            cache_capacity,
            cache_ttl,
            cache_predictions,
            moderation,
            mock_provider,
        })
    }

    /// Validates paths and basic invariants (does not create files).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.corpus_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.corpus_path.clone(),
            });
        }
        if !self.corpus_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.corpus_path.clone(),
            });
        }

        if let Some(ref path) = self.embedder_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.index_path
            && path.is_dir()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }

        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT,
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        if self.inference_workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_INFERENCE_WORKERS,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    /// Inference permits, sized from available compute when not configured.
    ///
    /// GPU builds serialize per device; CPU builds get one permit per core.
    pub fn effective_inference_workers(&self) -> usize {
        if let Some(workers) = self.inference_workers {
            return workers;
        }
        if cfg!(any(feature = "metal", feature = "cuda")) {
            return 1;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_index_kind_from_env(default: IndexKind) -> Result<IndexKind, ConfigError> {
        match env::var(Self::ENV_INDEX_KIND) {
            Ok(value) => value
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_INDEX_KIND,
                    value,
                    reason,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => default,
            },
            Err(_) => default,
        }
    }
}
