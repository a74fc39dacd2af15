//! Process configuration.
//!
//! Everything is read from the environment. The query shape defaults to
//! [`QueryConfig::default`] and can be replaced by a JSON file.

use std::path::{Path, PathBuf};

use crate::projector::DeletedPolicy;
use crate::trafikinfo::{QueryConfig, QueryError, TrafikinfoConfig};

/// Authentication key for the Trafikinfo API (required).
pub const KEY_VAR: &str = "TT_TRV_KEY";
/// Any non-empty value enables debug logging.
pub const DEBUG_VAR: &str = "TT_DEBUG";
/// Path to a JSON query configuration.
pub const QUERY_FILE_VAR: &str = "TT_QUERY_FILE";
/// Endpoint override.
pub const ENDPOINT_VAR: &str = "TT_ENDPOINT";
/// Request timeout override, in seconds.
pub const TIMEOUT_VAR: &str = "TT_TIMEOUT_SECS";
/// Any non-empty value drops records flagged as deleted.
pub const SKIP_DELETED_VAR: &str = "TT_SKIP_DELETED";

/// Errors loading configuration. All are fatal before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Authentication key not provided
    #[error("no Trafikverket key set ({0} is empty or unset)")]
    MissingKey(&'static str),

    /// An environment variable has an unusable value
    #[error("invalid {var}: {message}")]
    InvalidValue { var: &'static str, message: String },

    /// Query file could not be read
    #[error("cannot read query file {}: {source}", .path.display())]
    QueryFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Query file is not valid JSON for a query configuration
    #[error("invalid query file {}: {source}", .path.display())]
    QueryFileParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Query configuration violates a constraint
    #[error("{0}")]
    InvalidQuery(#[from] QueryError),
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Authentication key sent in the query's login element
    pub authentication_key: String,
    /// Debug logging requested
    pub debug: bool,
    pub query: QueryConfig,
    pub client: TrafikinfoConfig,
    pub deleted_policy: DeletedPolicy,
}

impl AppConfig {
    /// Create a config with defaults for everything but the key.
    pub fn new(authentication_key: impl Into<String>) -> Self {
        Self {
            authentication_key: authentication_key.into(),
            debug: false,
            query: QueryConfig::default(),
            client: TrafikinfoConfig::default(),
            deleted_policy: DeletedPolicy::default(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let key = set(KEY_VAR).ok_or(ConfigError::MissingKey(KEY_VAR))?;
        let mut config = Self::new(key);

        config.debug = set(DEBUG_VAR).is_some();

        if set(SKIP_DELETED_VAR).is_some() {
            config.deleted_policy = DeletedPolicy::Exclude;
        }

        if let Some(path) = set(QUERY_FILE_VAR) {
            config.query = load_query_file(Path::new(&path))?;
        }
        config.query.validate()?;

        if let Some(endpoint) = set(ENDPOINT_VAR) {
            config.client = config.client.with_endpoint(endpoint);
        }

        if let Some(timeout) = set(TIMEOUT_VAR) {
            let secs = match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: TIMEOUT_VAR,
                        message: format!("expected a positive number of seconds, got {timeout:?}"),
                    });
                }
            };
            config.client = config.client.with_timeout(secs);
        }

        Ok(config)
    }
}

/// Load a query configuration from a JSON file.
///
/// Keys missing from the file keep their default values.
pub fn load_query_file(path: &Path) -> Result<QueryConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::QueryFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| ConfigError::QueryFileParse {
        path: path.to_path_buf(),
        source,
    })
}
