use crate::config::schema::{QueryConfig, ValidationError};
use crate::file::{find_file, DEFAULT_DEPTH};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked for during discovery.
pub const CONFIG_FILE_NAME: &str = "raws-query.toml";

/// Environment variable naming a config file explicitly.
pub const CONFIG_ENV: &str = "RAWS_QUERY_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
    UnknownQuery {
        name: String,
        suggestion: Option<String>,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read query config from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse query config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse query config TOML: {}", source),
            },
            ConfigError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid query config ({}): {}", path.display(), source),
                None => write!(f, "invalid query config: {}", source),
            },
            ConfigError::UnknownQuery { name, suggestion } => match suggestion {
                Some(suggestion) => {
                    write!(f, "no query named '{name}' (did you mean '{suggestion}'?)")
                }
                None => write!(f, "no query named '{name}'"),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
            ConfigError::UnknownQuery { .. } => None,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<QueryConfig, ConfigError> {
    let config: QueryConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<QueryConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Locate the config file to use.
///
/// In order: `explicit`, then `$RAWS_QUERY_CONFIG`, then `raws-query.toml`
/// in `cwd` or one of its ancestors, then in the home directory.
pub fn discover_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        debug!(env = CONFIG_ENV, "config path from environment");
        return Some(PathBuf::from(path));
    }
    find_file(CONFIG_FILE_NAME, [cwd], DEFAULT_DEPTH)
        .or_else(|| home::home_dir().and_then(|home| find_file(CONFIG_FILE_NAME, [home], 1)))
}

/// Load the discovered config, or the default config if none was found.
pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<QueryConfig, ConfigError> {
    match discover_path(explicit, cwd) {
        Some(path) => {
            debug!(path = %path.display(), "loading query config");
            load_from_path(path)
        }
        None => {
            debug!("no query config found, using defaults");
            Ok(QueryConfig::default())
        }
    }
}

/// Look up a named query, with a "did you mean" hint on a miss.
pub fn named_query<'a>(
    config: &'a QueryConfig,
    name: &str,
) -> Result<&'a crate::filter::FilterSpec, ConfigError> {
    config.query(name).ok_or_else(|| ConfigError::UnknownQuery {
        name: name.to_string(),
        suggestion: config.suggest_query(name).map(str::to_string),
    })
}
