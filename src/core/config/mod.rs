//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`MSEED_BACKEND_TOKEN`, `MSEED_SELLER_PASSWORD`)
//! 4. CLI flags (not handled here)
//!
//! # Config File Locations
//!
//! The first one found wins:
//! 1. `--config <path>` (must exist)
//! 2. `$MSEED_CONFIG` if set
//! 3. `./mseed.toml`
//! 4. `$XDG_CONFIG_HOME/mseed/config.toml`
//! 5. `~/.mseed/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use marketseed::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//! println!("backend: {}", config.backend_kind());
//! println!("state dir: {}", config.state_dir().display());
//! ```

pub mod schema;

pub use schema::{BackendConfig, RunConfig, SeedConfig, SellerConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::BackendKind;
use crate::core::paths::{SeedPaths, DEFAULT_STATE_DIR};
use crate::seed::SellerProfile;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "MSEED_CONFIG";
/// Environment variable overriding `backend.token`.
pub const TOKEN_ENV: &str = "MSEED_BACKEND_TOKEN";
/// Environment variable overriding `seller.password`.
pub const PASSWORD_ENV: &str = "MSEED_SELLER_PASSWORD";

/// Default bound on concurrently running steps.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: SeedConfig,
    /// Path of the loaded config file, if any
    path: Option<PathBuf>,
    token: Option<String>,
    password: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// An explicit `--config` path that does not exist, a file that cannot
    /// be parsed, or any invalid value. Missing default locations are not
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with_env(explicit, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading the environment through `env`.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(&env),
        };
        let file = match &path {
            Some(path) => Self::read_config(path)?,
            None => SeedConfig::default(),
        };
        file.validate()?;

        if let Some(path) = &path {
            if file.backend.as_ref().is_some_and(|b| b.token.is_some()) {
                warnings.push(ConfigWarning {
                    message: format!("backend.token is stored in plain text; prefer {}", TOKEN_ENV),
                    path: path.clone(),
                });
            }
            if file.seller.as_ref().is_some_and(|s| s.password.is_some()) {
                warnings.push(ConfigWarning {
                    message: format!(
                        "seller.password is stored in plain text; prefer {}",
                        PASSWORD_ENV
                    ),
                    path: path.clone(),
                });
            }
        }

        let token = env(TOKEN_ENV)
            .filter(|v| !v.is_empty())
            .or_else(|| file.backend.as_ref().and_then(|b| b.token.clone()));
        let password = env(PASSWORD_ENV)
            .filter(|v| !v.is_empty())
            .or_else(|| file.seller.as_ref().and_then(|s| s.password.clone()));

        let config = Config {
            file,
            path,
            token,
            password,
        };
        config.validate()?;

        Ok(ConfigLoadResult { config, warnings })
    }

    fn find_config_file(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = env(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from("mseed.toml"));
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("mseed/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".mseed/config.toml"));
        }
        candidates.into_iter().find(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<SeedConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Rules that span sections or depend on defaults.
    ///
    /// A file without a `[backend]` section is valid; commands that need
    /// a backend report the missing URL when they build it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file.backend.is_some() && self.backend_kind() == BackendKind::Http {
            match self.backend_url() {
                Some(url) => schema::validate_url(url)?,
                None => {
                    return Err(ConfigError::InvalidValue(
                        "backend.url is required when backend.kind is \"http\"".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// The config file that was loaded, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Defaults to [`BackendKind::Http`].
    pub fn backend_kind(&self) -> BackendKind {
        self.file
            .backend
            .as_ref()
            .and_then(|b| b.kind.as_deref())
            .and_then(BackendKind::parse)
            .unwrap_or(BackendKind::Http)
    }

    pub fn backend_url(&self) -> Option<&str> {
        self.file.backend.as_ref().and_then(|b| b.url.as_deref())
    }

    pub fn backend_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Seller profile, with unset fields taken from the fixture seller.
    pub fn seller_profile(&self) -> SellerProfile {
        let defaults = SellerProfile::default();
        let Some(seller) = self.file.seller.as_ref() else {
            return SellerProfile {
                password: self.password.clone().unwrap_or(defaults.password),
                ..defaults
            };
        };
        SellerProfile {
            name: seller.name.clone().unwrap_or(defaults.name),
            email: seller.email.clone().unwrap_or(defaults.email),
            password: self.password.clone().unwrap_or(defaults.password),
            member_name: seller.member_name.clone().unwrap_or(defaults.member_name),
        }
    }

    /// Defaults to `.mseed`.
    pub fn state_dir(&self) -> PathBuf {
        self.file
            .run
            .as_ref()
            .and_then(|r| r.state_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }

    pub fn seed_paths(&self) -> SeedPaths {
        SeedPaths::new(self.state_dir())
    }

    /// Defaults to [`DEFAULT_MAX_PARALLEL`].
    pub fn max_parallel(&self) -> usize {
        self.file
            .run
            .as_ref()
            .and_then(|r| r.max_parallel)
            .unwrap_or(DEFAULT_MAX_PARALLEL)
    }

    pub fn random_seed(&self) -> Option<u64> {
        self.file.run.as_ref().and_then(|r| r.random_seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("mseed.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_to_memory_backend() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[backend]\nkind = \"memory\"\n");

        let result = Config::load_with_env(Some(&path), env_of(&[])).unwrap();
        let config = result.config;
        assert_eq!(config.backend_kind(), BackendKind::Memory);
        assert_eq!(config.state_dir(), PathBuf::from(".mseed"));
        assert_eq!(config.max_parallel(), DEFAULT_MAX_PARALLEL);
        assert_eq!(config.random_seed(), None);
        assert_eq!(config.seller_profile(), SellerProfile::default());
        assert_eq!(config.path(), Some(path.as_path()));
    }

    #[test]
    fn http_backend_requires_url() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[backend]\nkind = \"http\"\n");

        let err = Config::load_with_env(Some(&path), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(msg) if msg.contains("backend.url")));
    }

    #[test]
    fn environment_overrides_file_secrets() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
            [backend]
            url = "https://shop.example/bootstrap"
            token = "from-file"

            [seller]
            email = "owner@shop.example"
            password = "file-pass"
            "#,
        );

        let result = Config::load_with_env(
            Some(&path),
            env_of(&[(TOKEN_ENV, "from-env"), (PASSWORD_ENV, "env-pass")]),
        )
        .unwrap();
        assert_eq!(result.warnings.len(), 2);

        let config = result.config;
        assert_eq!(config.backend_token(), Some("from-env"));
        let profile = config.seller_profile();
        assert_eq!(profile.password, "env-pass");
        assert_eq!(profile.email, "owner@shop.example");
        assert_eq!(profile.name, crate::core::fixtures::SELLER_NAME);
    }

    #[test]
    fn config_env_var_locates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[backend]\nkind = \"memory\"\n[run]\nmax_parallel = 1\n").unwrap();

        let result =
            Config::load_with_env(None, env_of(&[(CONFIG_ENV, path.to_str().unwrap())])).unwrap();
        assert_eq!(result.config.max_parallel(), 1);
        assert_eq!(result.config.path(), Some(path.as_path()));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load_with_env(Some(&missing), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[backend\n");
        let err = Config::load_with_env(Some(&path), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("mseed.toml"));
    }
}
