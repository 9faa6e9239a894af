//! Configuration file discovery and loading.
//!
//! Layers are applied in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`.pkgcheck.yml`), or the file given with `--config`
//! 3. Local overrides (`.pkgcheck.local.yml`)
//! 4. Command-line flags and environment variables

use crate::config::schema::{CheckConfig, ConfigLayer};
use crate::error::{CheckError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file name.
pub const CONFIG_FILE: &str = ".pkgcheck.yml";
/// Local override file name (not meant to be committed).
pub const LOCAL_CONFIG_FILE: &str = ".pkgcheck.local.yml";

/// Paths to configuration files in merge order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project config, or an explicit `--config` file.
    pub project: Option<PathBuf>,

    /// Local overrides.
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files in `project_root`.
    ///
    /// An explicit path replaces the project config and must exist; it is
    /// not checked here but reported by [`load_config_file`].
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Self {
        let project = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => existing(project_root.join(CONFIG_FILE)),
        };

        Self {
            project,
            project_local: existing(project_root.join(LOCAL_CONFIG_FILE)),
        }
    }

    /// Paths in merge order.
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.project.iter().chain(self.project_local.iter())
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `Config` if the file is missing or the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CheckError::Config {
                message: format!("config file not found: {}", path.display()),
            }
        } else {
            CheckError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a layer. An empty file is an empty layer.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ConfigLayer> {
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yaml::from_str(content).map_err(|e| CheckError::Config {
        message: format!("{}: {}", source_path.display(), e),
    })
}

/// Load every discovered file and the command-line layer into one config.
pub fn load_config(
    project_root: &Path,
    explicit: Option<&Path>,
    overrides: ConfigLayer,
) -> Result<CheckConfig> {
    let paths = ConfigPaths::discover(project_root, explicit);

    let mut merged = ConfigLayer::default();
    for path in paths.all() {
        tracing::debug!("Loading config {}", path.display());
        merged = merged.merge(load_config_file(path)?);
    }
    merged = merged.merge(overrides);

    CheckConfig::from_layer(merged, project_root)
}
