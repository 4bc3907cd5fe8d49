//! Domain-specific errors for environment resolution

use jem_schema::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JemError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("VM link {} {reason}", path.display())]
    MalformedSymlink { path: PathBuf, reason: String },

    #[error("Dependency {dependency} of {package} not found")]
    DependencyMissing { package: String, dependency: String },

    #[error("Active VM not set, please select one with set-user-vm or set-system-vm")]
    NoActiveVm,

    #[error("No virtual providers installed for {0}")]
    NoVirtualProvider(String),

    #[error("{0}")]
    PrivilegeDenied(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl JemError {
    /// Shorthand for [`JemError::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            context: context.to_string(),
            source,
        }
    }

    /// Whether this error means the named thing simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DescriptorError> for JemError {
    fn from(err: DescriptorError) -> Self {
        match err {
            DescriptorError::NotFound(path) => Self::not_found("file", path.display().to_string()),
            DescriptorError::PermissionDenied(path) => Self::PermissionDenied(path),
            DescriptorError::Io { path, source } => {
                Self::io(format!("Failed to read {}", path.display()), source)
            }
        }
    }
}
