//! Package references and manifest (`package.json`) lookup.
//!
//! Manifests are located the way Node resolves bare module specifiers:
//! starting at the project root, each ancestor directory's
//! `node_modules/<name>/package.json` is tried in turn.

use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{CheckError, Result};

/// npm package name, optionally scoped (`@scope/name`).
static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[a-z0-9][a-z0-9._~-]*/)?[a-z0-9][a-z0-9._~-]*$")
        .expect("package name pattern is valid")
});

/// JavaScript identifier used as an export or factory name.
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// The dependency under test: which package, and which named export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReference {
    pub name: String,
    pub export: String,
}

impl PackageReference {
    /// Build a reference, validating both names.
    pub fn new(name: &str, export: &str) -> Result<Self> {
        validate_package_name(name)?;
        validate_identifier("export", export)?;
        Ok(Self {
            name: name.to_string(),
            export: export.to_string(),
        })
    }
}

/// Reject names that could not come from the npm registry.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.len() > 214 || !PACKAGE_NAME.is_match(name) {
        return Err(CheckError::Config {
            message: format!("'{}' is not a valid npm package name", name),
        });
    }
    Ok(())
}

/// Reject export and factory names that are not plain identifiers.
pub fn validate_identifier(what: &str, ident: &str) -> Result<()> {
    if !IDENTIFIER.is_match(ident) {
        return Err(CheckError::Config {
            message: format!("{} name '{}' is not a valid identifier", what, ident),
        });
    }
    Ok(())
}

/// The subset of a package manifest the checker reads.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// Where the manifest was found.
    pub path: PathBuf,
    /// Declared `name`, if any.
    pub name: Option<String>,
    /// Declared `version` string.
    pub version: String,
}

/// Candidate manifest paths for `package`, nearest first.
pub fn manifest_candidates(project_root: &Path, package: &str) -> Vec<PathBuf> {
    project_root
        .ancestors()
        .map(|dir| dir.join("node_modules").join(package).join("package.json"))
        .collect()
}

/// Find the manifest Node would load for `package` from `project_root`.
pub fn locate_manifest(project_root: &Path, package: &str) -> Option<PathBuf> {
    manifest_candidates(project_root, package)
        .into_iter()
        .find(|p| p.is_file())
}

/// Locate and read the manifest for `package`.
pub fn read_manifest(project_root: &Path, package: &str) -> Result<PackageManifest> {
    let Some(path) = locate_manifest(project_root, package) else {
        let expected = project_root
            .join("node_modules")
            .join(package)
            .join("package.json");
        return Err(CheckError::Metadata {
            path: expected,
            message: "manifest not found (is the package installed?)".to_string(),
        });
    };

    tracing::debug!("Reading manifest {}", path.display());
    let content = fs::read_to_string(&path).map_err(|e| CheckError::Metadata {
        path: path.clone(),
        message: e.to_string(),
    })?;

    parse_manifest(&path, &content)
}

/// Parse manifest JSON, requiring a string `version` field.
pub fn parse_manifest(path: &Path, content: &str) -> Result<PackageManifest> {
    let metadata_error = |message: String| CheckError::Metadata {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| metadata_error(format!("invalid JSON: {}", e)))?;

    let version = match value.get("version") {
        Some(serde_json::Value::String(v)) => v.clone(),
        Some(other) => {
            return Err(metadata_error(format!(
                "version field is not a string: {}",
                other
            )))
        }
        None => return Err(metadata_error("no version field".to_string())),
    };

    let name = value.get("name").and_then(|n| n.as_str()).map(String::from);

    Ok(PackageManifest {
        path: path.to_path_buf(),
        name,
        version,
    })
}
