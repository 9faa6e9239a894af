//! Configuration schema definitions.
//!
//! [`ConfigLayer`] maps to the `.pkgcheck.yml` file format and doubles as
//! the shape of command-line overrides. [`CheckConfig`] is the fully
//! resolved configuration the checker runs with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CheckError, Result};
use crate::manifest::{validate_identifier, PackageReference};
use crate::version::VersionRequirement;

/// Package checked when nothing else is configured.
pub const DEFAULT_PACKAGE: &str = "@octokit/request";
/// Named export checked when nothing else is configured.
pub const DEFAULT_EXPORT: &str = "request";
/// Factory method invoked on the export.
pub const DEFAULT_FACTORY: &str = "defaults";
/// Base URL passed in the sample factory options.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
/// Node binary used by the probe.
pub const DEFAULT_NODE: &str = "node";
/// Probe timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One layer of configuration. Every field is optional; later layers
/// override earlier ones field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    /// Package name, e.g. `@octokit/request`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Named export expected to be callable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,

    /// Minimum version, e.g. `9.2.1` or `>= 9.2.1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<VersionRequirement>,

    /// Factory method name on the export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,

    /// Options object passed to the factory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_options: Option<serde_json::Value>,

    /// Node binary for the module probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    /// Probe timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Treat factory failures as fatal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_factory: Option<bool>,
}

impl ConfigLayer {
    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            package: other.package.or(self.package),
            export: other.export.or(self.export),
            min_version: other.min_version.or(self.min_version),
            factory: other.factory.or(self.factory),
            factory_options: other.factory_options.or(self.factory_options),
            node: other.node.or(self.node),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            strict_factory: other.strict_factory.or(self.strict_factory),
        }
    }
}

/// Resolved configuration for one check run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub package: PackageReference,
    pub min_version: VersionRequirement,
    pub factory: String,
    pub factory_options: serde_json::Value,
    pub node: String,
    pub timeout: Duration,
    pub strict_factory: bool,
    /// Directory module resolution starts from.
    pub project_root: PathBuf,
}

/// Sample options passed to the factory by default.
pub fn default_factory_options() -> serde_json::Value {
    serde_json::json!({ "baseUrl": DEFAULT_BASE_URL })
}

impl CheckConfig {
    /// Defaults for checking `@octokit/request` from `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            package: PackageReference {
                name: DEFAULT_PACKAGE.to_string(),
                export: DEFAULT_EXPORT.to_string(),
            },
            min_version: VersionRequirement::default(),
            factory: DEFAULT_FACTORY.to_string(),
            factory_options: default_factory_options(),
            node: DEFAULT_NODE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_factory: false,
            project_root: project_root.into(),
        }
    }

    /// Resolve a merged layer into a validated configuration.
    pub fn from_layer(layer: ConfigLayer, project_root: impl Into<PathBuf>) -> Result<Self> {
        let defaults = Self::new(project_root);

        let package = PackageReference::new(
            layer.package.as_deref().unwrap_or(&defaults.package.name),
            layer.export.as_deref().unwrap_or(&defaults.package.export),
        )?;

        let factory = layer.factory.unwrap_or(defaults.factory);
        validate_identifier("factory", &factory)?;

        let factory_options = layer.factory_options.unwrap_or(defaults.factory_options);
        if !factory_options.is_object() {
            return Err(CheckError::Config {
                message: format!("factory options must be an object, got {}", factory_options),
            });
        }

        let node = layer.node.unwrap_or(defaults.node);
        if node.trim().is_empty() {
            return Err(CheckError::Config {
                message: "node binary must not be empty".to_string(),
            });
        }

        let timeout = match layer.timeout_secs {
            Some(0) => {
                return Err(CheckError::Config {
                    message: "timeout must be at least 1 second".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(Self {
            package,
            min_version: layer.min_version.unwrap_or(defaults.min_version),
            factory,
            factory_options,
            node,
            timeout,
            strict_factory: layer.strict_factory.unwrap_or(defaults.strict_factory),
            project_root: defaults.project_root,
        })
    }
}
