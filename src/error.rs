//! Error types for pkgcheck operations.
//!
//! This module defines [`CheckError`], the error type returned by every
//! check step, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each fatal check step has its own variant so the top level can name
//!   exactly what went wrong
//! - Use `anyhow::Error` (via `CheckError::Other`) for unexpected errors
//! - Every variant maps to exit status 1 at the process boundary

use std::path::PathBuf;
use thiserror::Error;

use crate::version::{VersionRequirement, VersionTriple};

/// Core error type for dependency contract checks.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The package could not be resolved or the named export is absent.
    #[error("Failed to import '{export}' from {package}: {message}")]
    Import {
        package: String,
        export: String,
        message: String,
    },

    /// The export exists but is not callable.
    #[error("{package} did not export a function: '{export}' is {kind}")]
    Shape {
        package: String,
        export: String,
        kind: String,
    },

    /// The package manifest is missing or has no usable version field.
    #[error("Cannot read version metadata from {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// The declared version does not have three numeric segments.
    #[error("Cannot parse version '{version}': {message}")]
    VersionParse { version: String, message: String },

    /// The installed version is below the minimum requirement.
    #[error("Version {found} does not meet requirement {required}")]
    VersionTooLow {
        found: VersionTriple,
        required: VersionRequirement,
    },

    /// The configuration factory misbehaved while strict mode was on.
    #[error("Factory '{factory}' on '{export}' failed: {message}")]
    Factory {
        export: String,
        factory: String,
        message: String,
    },

    /// Invalid configuration file or option value.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckError {
    /// Short taxonomy label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Import { .. } => "ImportError",
            Self::Shape { .. } => "ShapeError",
            Self::Metadata { .. } => "MetadataError",
            Self::VersionParse { .. } => "VersionParseError",
            Self::VersionTooLow { .. } => "VersionTooLowError",
            Self::Factory { .. } => "FactoryError",
            Self::Config { .. } => "ConfigError",
            Self::Io(_) => "IoError",
            Self::Other(_) => "Error",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for pkgcheck operations.
pub type Result<T> = std::result::Result<T, CheckError>;
