//! Module probes: observing a package's export at runtime.
//!
//! The checker never loads JavaScript itself. A [`ModuleProbe`] answers two
//! questions about the installed package: what the named export is, and
//! what calling its configuration factory produces. [`NodeProbe`] answers
//! them by running a short inspection script under `node`; [`ScriptedProbe`]
//! returns canned answers for tests.
//!
//! # Example
//!
//! ```
//! use pkgcheck::contract::probe::{ExportInspection, FactoryOutcome, ModuleProbe, ScriptedProbe};
//! use pkgcheck::manifest::PackageReference;
//!
//! let probe = ScriptedProbe::new(ExportInspection::function(), Ok(FactoryOutcome::Callable));
//! let package = PackageReference::new("@octokit/request", "request").unwrap();
//! assert!(probe.inspect(&package).unwrap().is_callable());
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::CheckConfig;
use crate::error::{CheckError, Result};
use crate::manifest::PackageReference;
use crate::shell::{execute, CommandOptions};

/// What the probe found when looking up the named export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportInspection {
    /// The package itself could not be loaded.
    Unresolved { message: String },
    /// The package loaded but has no such export.
    Missing,
    /// The export exists; `kind` is its JavaScript `typeof`.
    Present { kind: String },
}

impl ExportInspection {
    /// A present, callable export.
    pub fn function() -> Self {
        Self::Present {
            kind: "function".to_string(),
        }
    }

    /// Whether the export is a function.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Present { kind } if kind == "function")
    }
}

/// What calling the configuration factory produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryOutcome {
    /// Returned a function.
    Callable,
    /// Returned something else; `kind` is its `typeof`.
    NonCallable { kind: String },
    /// Threw instead of returning.
    Threw { name: String, message: String },
}

/// Observes a package's export at runtime.
pub trait ModuleProbe {
    /// Load the package and describe the named export.
    fn inspect(&self, package: &PackageReference) -> Result<ExportInspection>;

    /// Call `export[factory](options)` and describe the result.
    fn invoke_factory(
        &self,
        package: &PackageReference,
        factory: &str,
        options: &serde_json::Value,
    ) -> Result<FactoryOutcome>;
}

/// Script mode that looks up the export.
///
/// The mode is node's first positional argument, so it must never be a
/// node subcommand such as `inspect`.
const DESCRIBE_MODE: &str = "describe";
/// Script mode that calls the factory.
const FACTORY_MODE: &str = "factory";

/// Inspection script run with `node -e`.
///
/// Arguments: mode (`describe` or `factory`), package, export, factory,
/// options JSON. Writes exactly one JSON object to stdout. Uses dynamic
/// `import()` so ESM-only packages load, falling back to `require`.
const PROBE_SCRIPT: &str = r#"
const [mode, pkg, exportName, factoryName, optionsJson] = process.argv.slice(1);
const emit = (report) => process.stdout.write(JSON.stringify(report));
const explain = (err) => ({
  name: (err && err.name) || "Error",
  message: String((err && err.message) || err).split("\n")[0],
});
(async () => {
  let mod;
  try {
    mod = await import(pkg);
  } catch (importErr) {
    try {
      mod = require(pkg);
    } catch (_) {
      emit({ status: "unresolved", ...explain(importErr) });
      return;
    }
  }
  let value = mod[exportName];
  if (value === undefined && mod.default != null) value = mod.default[exportName];
  if (mode === "describe") {
    emit(value === undefined
      ? { status: "missing" }
      : { status: "present", kind: typeof value });
    return;
  }
  try {
    const result = value[factoryName](JSON.parse(optionsJson));
    emit({ status: "returned", kind: typeof result });
  } catch (err) {
    emit({ status: "threw", ...explain(err) });
  }
})();
"#;

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum InspectReport {
    Unresolved { name: String, message: String },
    Missing,
    Present { kind: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum FactoryReport {
    Returned { kind: String },
    Threw { name: String, message: String },
}

/// Probe that runs the inspection script in a `node` child process.
///
/// The child runs in the project root so Node resolves the package from
/// the same `node_modules` tree the manifest was read from.
#[derive(Debug, Clone)]
pub struct NodeProbe {
    node: String,
    project_root: PathBuf,
    timeout: Duration,
}

impl NodeProbe {
    pub fn new(
        node: impl Into<String>,
        project_root: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            node: node.into(),
            project_root: project_root.into(),
            timeout,
        }
    }

    /// Build a probe from a resolved check configuration.
    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(&config.node, &config.project_root, config.timeout)
    }

    /// Run the script in `mode` and return its stdout.
    fn run(
        &self,
        mode: &str,
        package: &PackageReference,
        factory: &str,
        options: &str,
    ) -> Result<String> {
        let args = vec![
            "-e".to_string(),
            PROBE_SCRIPT.to_string(),
            mode.to_string(),
            package.name.clone(),
            package.export.clone(),
            factory.to_string(),
            options.to_string(),
        ];
        let command_options = CommandOptions {
            cwd: Some(self.project_root.clone()),
            timeout: Some(self.timeout),
            ..Default::default()
        };

        let probe_error = |message: String| CheckError::Import {
            package: package.name.clone(),
            export: package.export.clone(),
            message,
        };

        let result = execute(&self.node, &args, &command_options)
            .map_err(|e| probe_error(format!("could not run '{}': {}", self.node, e)))?;

        tracing::debug!(
            "Probe '{}' finished in {:?} with exit code {:?}",
            mode,
            result.duration,
            result.exit_code
        );

        if result.timed_out {
            return Err(probe_error(format!(
                "probe timed out after {}s",
                self.timeout.as_secs()
            )));
        }
        if !result.success {
            let detail = result
                .stderr
                .lines()
                .next()
                .unwrap_or("no output")
                .trim()
                .to_string();
            return Err(probe_error(format!(
                "'{}' exited with code {:?}: {}",
                self.node, result.exit_code, detail
            )));
        }

        Ok(result.stdout)
    }
}

/// Parse the JSON written by the script, tolerating leading noise.
fn parse_report<T: DeserializeOwned>(stdout: &str) -> std::result::Result<T, String> {
    let start = stdout
        .find('{')
        .ok_or_else(|| "probe produced no report".to_string())?;
    serde_json::from_str(stdout[start..].trim())
        .map_err(|e| format!("malformed probe report: {}", e))
}

impl ModuleProbe for NodeProbe {
    fn inspect(&self, package: &PackageReference) -> Result<ExportInspection> {
        let stdout = self.run(DESCRIBE_MODE, package, "", "{}")?;
        let report: InspectReport =
            parse_report(&stdout).map_err(|message| CheckError::Import {
                package: package.name.clone(),
                export: package.export.clone(),
                message,
            })?;

        Ok(match report {
            InspectReport::Unresolved { name, message } => ExportInspection::Unresolved {
                message: format!("{}: {}", name, message),
            },
            InspectReport::Missing => ExportInspection::Missing,
            InspectReport::Present { kind } => ExportInspection::Present { kind },
        })
    }

    fn invoke_factory(
        &self,
        package: &PackageReference,
        factory: &str,
        options: &serde_json::Value,
    ) -> Result<FactoryOutcome> {
        let stdout = self.run(FACTORY_MODE, package, factory, &options.to_string())?;
        let report: FactoryReport =
            parse_report(&stdout).map_err(|message| CheckError::Factory {
                export: package.export.clone(),
                factory: factory.to_string(),
                message,
            })?;

        Ok(match report {
            FactoryReport::Returned { kind } if kind == "function" => FactoryOutcome::Callable,
            FactoryReport::Returned { kind } => FactoryOutcome::NonCallable { kind },
            FactoryReport::Threw { name, message } => FactoryOutcome::Threw { name, message },
        })
    }
}

/// Probe with canned answers, for tests.
///
/// Counts factory calls so tests can assert the factory step never ran.
#[derive(Debug)]
pub struct ScriptedProbe {
    inspection: ExportInspection,
    factory: std::result::Result<FactoryOutcome, String>,
    factory_calls: Cell<usize>,
}

impl ScriptedProbe {
    /// `factory` is `Err(message)` to simulate a probe that cannot run.
    pub fn new(
        inspection: ExportInspection,
        factory: std::result::Result<FactoryOutcome, String>,
    ) -> Self {
        Self {
            inspection,
            factory,
            factory_calls: Cell::new(0),
        }
    }

    pub fn factory_calls(&self) -> usize {
        self.factory_calls.get()
    }
}

impl ModuleProbe for ScriptedProbe {
    fn inspect(&self, _package: &PackageReference) -> Result<ExportInspection> {
        Ok(self.inspection.clone())
    }

    fn invoke_factory(
        &self,
        package: &PackageReference,
        factory: &str,
        _options: &serde_json::Value,
    ) -> Result<FactoryOutcome> {
        self.factory_calls.set(self.factory_calls.get() + 1);
        self.factory.clone().map_err(|message| CheckError::Factory {
            export: package.export.clone(),
            factory: factory.to_string(),
            message,
        })
    }
}
