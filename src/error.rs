//! Error types for loading and resolving hyper-schema documents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema document: {message}")]
    InvalidDocument { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during resolution of a loaded document.
///
/// All kinds are fatal for the resource being resolved. The driver wraps
/// whatever went wrong in [`ResolveError::Resource`] so the operator can find
/// the offending definition.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve reference {reference}: segment \"{segment}\" not found")]
    UnresolvableReference { reference: String, segment: String },

    #[error("link #{index} is missing required field \"{field}\"")]
    MalformedLink { index: usize, field: &'static str },

    #[error("recursion limit of {limit} exceeded at {at}")]
    RecursionLimit { limit: usize, at: String },

    #[error("error in resource \"{resource}\": {source}")]
    Resource {
        resource: String,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }

    /// Name of the resource being resolved when the error occurred, if known.
    pub fn resource(&self) -> Option<&str> {
        match self {
            ResolveError::Resource { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// The underlying error with any resource annotation removed.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::Resource { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn in_resource(self, resource: &str) -> Self {
        ResolveError::Resource {
            resource: resource.to_string(),
            source: Box::new(self),
        }
    }
}
