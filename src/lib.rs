//! pkgcheck - Dependency contract checker for installed Node packages.
//!
//! pkgcheck verifies that a package in `node_modules` can be imported,
//! exports a callable entry point, meets a minimum version, and exposes a
//! working configuration factory. It exits 0 when every check passes and
//! 1 as soon as one fails.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration defaults, files and overrides
//! - [`contract`] - The check pipeline and module probes
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - Package references and manifest lookup
//! - [`shell`] - Child process execution
//! - [`ui`] - Terminal output
//! - [`version`] - Version triples and requirements
//!
//! # Example
//!
//! ```
//! use pkgcheck::version::{VersionRequirement, VersionTriple};
//!
//! let required: VersionRequirement = ">= 9.2.1".parse().unwrap();
//! assert!(required.is_satisfied_by(&VersionTriple::parse("9.3.0").unwrap()));
//! assert!(!required.is_satisfied_by(&VersionTriple::parse("9.1.9").unwrap()));
//! ```

pub mod cli;
pub mod config;
pub mod contract;
pub mod error;
pub mod manifest;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{CheckError, Result};
