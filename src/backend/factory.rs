//! backend::factory
//!
//! Backend selection and creation.
//!
//! Commands use [`create_backend`] instead of constructing a specific
//! implementation, so the seed steps only ever see `Arc<dyn Backend>`.
//!
//! # Example
//!
//! ```
//! use marketseed::backend::{create_backend, BackendKind};
//!
//! let backend = create_backend(BackendKind::Memory, None, None).unwrap();
//! assert_eq!(backend.name(), "memory");
//!
//! assert!(create_backend(BackendKind::Http, None, None).is_err());
//! ```

use std::sync::Arc;

use super::http::HttpBackend;
use super::memory::InMemoryBackend;
use super::traits::{Backend, BackendError};

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Bootstrap bridge over HTTP
    Http,
    /// In-process backend with a default store
    Memory,
}

impl BackendKind {
    /// All known kinds.
    pub fn all() -> &'static [BackendKind] {
        &[BackendKind::Http, BackendKind::Memory]
    }

    /// The name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Http => "http",
            BackendKind::Memory => "memory",
        }
    }

    /// Parse a kind from its configuration name.
    ///
    /// ```
    /// use marketseed::backend::BackendKind;
    ///
    /// assert_eq!(BackendKind::parse("HTTP"), Some(BackendKind::Http));
    /// assert_eq!(BackendKind::parse("grpc"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "http" => Some(BackendKind::Http),
            "memory" => Some(BackendKind::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Comma-separated list of valid backend names, for error messages.
pub fn valid_backend_names() -> String {
    BackendKind::all()
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create a backend of the given kind.
///
/// # Errors
///
/// - `BackendError::Network` if `Http` is requested without a URL or the
///   HTTP client cannot be built
pub fn create_backend(
    kind: BackendKind,
    url: Option<&str>,
    token: Option<String>,
) -> Result<Arc<dyn Backend>, BackendError> {
    match kind {
        BackendKind::Http => {
            let url = url.ok_or_else(|| {
                BackendError::Network("no backend URL configured (backend.url)".into())
            })?;
            Ok(Arc::new(HttpBackend::new(url, token)?))
        }
        BackendKind::Memory => Ok(Arc::new(InMemoryBackend::with_default_store())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in BackendKind::all() {
            assert_eq!(BackendKind::parse(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn valid_names_lists_all() {
        assert_eq!(valid_backend_names(), "http, memory");
    }

    #[test]
    fn http_needs_url() {
        let err = create_backend(BackendKind::Http, None, Some("t".into())).err().expect("expected error");
        assert!(err.to_string().contains("backend.url"));

        let backend = create_backend(BackendKind::Http, Some("http://localhost:9000"), None).unwrap();
        assert_eq!(backend.name(), "http");
    }
}
