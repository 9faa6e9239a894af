//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. Every check option is
//! optional; unset options fall through to the config file and then to
//! the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigLayer;
use crate::ui::OutputMode;
use crate::version::VersionRequirement;

/// pkgcheck - Verify an installed package honours its contract.
#[derive(Debug, Parser)]
#[command(name = "pkgcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package to check (default: @octokit/request)
    #[arg(long, env = "PKGCHECK_PACKAGE")]
    pub package: Option<String>,

    /// Named export that must be a function (default: request)
    #[arg(long)]
    pub export: Option<String>,

    /// Minimum acceptable version, e.g. 9.2.1 or ">= 9.2.1"
    #[arg(long, value_name = "VERSION")]
    pub min_version: Option<VersionRequirement>,

    /// Factory method invoked on the export (default: defaults)
    #[arg(long)]
    pub factory: Option<String>,

    /// JSON object passed to the factory
    #[arg(long, value_name = "JSON", value_parser = parse_json_object)]
    pub factory_options: Option<serde_json::Value>,

    /// Node binary used to inspect the export
    #[arg(long, env = "PKGCHECK_NODE")]
    pub node: Option<String>,

    /// Probe timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail when the factory throws or returns a non-function
    #[arg(long)]
    pub strict_factory: bool,

    /// Path to config file (overrides default .pkgcheck.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Print a JSON report instead of status lines
    #[arg(long)]
    pub json: bool,

    /// Show verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Options given on the command line, as the top config layer.
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            package: self.package.clone(),
            export: self.export.clone(),
            min_version: self.min_version,
            factory: self.factory.clone(),
            factory_options: self.factory_options.clone(),
            node: self.node.clone(),
            timeout_secs: self.timeout,
            strict_factory: self.strict_factory.then_some(true),
        }
    }

    /// Output mode implied by the flags. JSON output silences status lines.
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Silent
        } else if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    /// Project root: `--project`, else the current directory.
    pub fn project_root(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }
}

fn parse_json_object(raw: &str) -> Result<serde_json::Value, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    Ok(value)
}
