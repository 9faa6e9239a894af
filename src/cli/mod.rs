//! Command-line interface for pkgcheck.
//!
//! - [`args`] - Argument definitions using clap's derive macros
//! - [`run`] - Load configuration, run the check, print the report

pub mod args;

pub use args::Cli;

use crate::config::load_config;
use crate::contract::{CheckResult, ContractChecker, NodeProbe};
use crate::error::{CheckError, Result};
use crate::ui::UserInterface;
use chrono::Utc;

/// Run a check as configured by `cli`.
///
/// Configuration errors are returned; check failures are reported in the
/// returned [`CheckResult`]. With `--json`, a configuration error still
/// prints a report (see [`error_report`]) before it is returned.
pub fn run(cli: &Cli, ui: &mut dyn UserInterface) -> Result<CheckResult> {
    let project_root = cli.project_root();
    let config = match load_config(&project_root, cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(err) => {
            if cli.json {
                println!("{}", error_report(&err));
            }
            return Err(err);
        }
    };
    tracing::debug!("Resolved configuration: {:?}", config);

    let probe = NodeProbe::from_config(&config);
    let result = ContractChecker::new(&config, &probe).run_check(ui);

    if cli.json {
        let report = result
            .to_json()
            .map_err(|e| anyhow::anyhow!("Failed to render report: {}", e))?;
        println!("{}", report);
    }

    Ok(result)
}

/// Minimal JSON report for an error raised before any check ran.
pub fn error_report(err: &CheckError) -> serde_json::Value {
    serde_json::json!({
        "passed": false,
        "message": err.to_string(),
        "exit_code": err.exit_code(),
        "error_kind": err.kind(),
        "steps": [],
        "checked_at": Utc::now(),
    })
}
