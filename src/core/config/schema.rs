//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! [backend]
//! kind = "http"
//! url = "http://localhost:9000/bootstrap"
//!
//! [seller]
//! name = "MercurJS Store"
//! email = "seller@mercurjs.com"
//! member_name = "John Doe"
//!
//! [run]
//! state_dir = ".mseed"
//! max_parallel = 4
//! random_seed = 42
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::backend::{valid_backend_names, BackendKind};

/// The whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    pub backend: Option<BackendConfig>,
    pub seller: Option<SellerConfig>,
    pub run: Option<RunConfig>,
}

impl SeedConfig {
    /// Validate the values present in the file.
    ///
    /// Cross-field rules that depend on environment overrides are checked
    /// on the merged [`Config`](super::Config).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(backend) = &self.backend {
            backend.validate()?;
        }
        if let Some(seller) = &self.seller {
            seller.validate()?;
        }
        if let Some(run) = &self.run {
            run.validate()?;
        }
        Ok(())
    }
}

/// `[backend]`
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// `"http"` or `"memory"` (default: `"http"`)
    pub kind: Option<String>,
    /// Base URL of the bootstrap bridge
    pub url: Option<String>,
    /// Bearer token; `MSEED_BACKEND_TOKEN` overrides
    pub token: Option<String>,
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(kind) = &self.kind {
            if BackendKind::parse(kind).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid backend kind '{}', must be one of: {}",
                    kind,
                    valid_backend_names()
                )));
            }
        }
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        Ok(())
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

/// `[seller]`
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SellerConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    /// `MSEED_SELLER_PASSWORD` overrides
    pub password: Option<String>,
    pub member_name: Option<String>,
}

impl SellerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        for (key, value) in [("seller.name", &self.name), ("seller.member_name", &self.member_name)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{} cannot be empty", key)));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for SellerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerConfig")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("has_password", &self.password.is_some())
            .field("member_name", &self.member_name)
            .finish()
    }
}

/// `[run]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory for the lock, journal and seeded marker
    pub state_dir: Option<PathBuf>,
    /// Upper bound on concurrently running steps
    pub max_parallel: Option<usize>,
    /// Seed for product assignment and stock quantities
    pub random_seed: Option<u64>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel == Some(0) {
            return Err(ConfigError::InvalidValue(
                "run.max_parallel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "backend.url '{}' must start with http:// or https://",
            url
        )))
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "seller.email '{}' is not an email address",
            email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let config: SeedConfig = toml::from_str("").unwrap();
        assert_eq!(config, SeedConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn full_file_parses() {
        let config: SeedConfig = toml::from_str(
            r#"
            [backend]
            kind = "memory"

            [seller]
            name = "Acme"
            email = "ops@acme.test"

            [run]
            state_dir = "/var/lib/mseed"
            max_parallel = 2
            random_seed = 9
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let run = config.run.unwrap();
        assert_eq!(run.max_parallel, Some(2));
        assert_eq!(run.state_dir, Some(PathBuf::from("/var/lib/mseed")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<SeedConfig, _> = toml::from_str("[run]\nparallel = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            "[backend]\nkind = \"grpc\"\n",
            "[backend]\nurl = \"localhost:9000\"\n",
            "[seller]\nemail = \"nobody\"\n",
            "[seller]\nname = \"  \"\n",
            "[run]\nmax_parallel = 0\n",
        ];
        for case in cases {
            let config: SeedConfig = toml::from_str(case).unwrap();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidValue(_))),
                "{case}"
            );
        }
    }

    #[test]
    fn debug_hides_secrets() {
        let backend = BackendConfig {
            token: Some("tok-123".into()),
            ..BackendConfig::default()
        };
        let seller = SellerConfig {
            password: Some("hunter2".into()),
            ..SellerConfig::default()
        };
        assert!(!format!("{:?}", backend).contains("tok-123"));
        assert!(!format!("{:?}", seller).contains("hunter2"));
    }
}
