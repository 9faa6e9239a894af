//! The dependency contract check pipeline.
//!
//! [`ContractChecker::run_check`] runs the steps of [`CheckStep`] in order.
//! Any fatal failure stops the run; later steps never execute. The factory
//! step is the only one whose failures are tolerated, unless strict mode
//! is on.

use crate::config::CheckConfig;
use crate::contract::probe::{ExportInspection, FactoryOutcome, ModuleProbe};
use crate::contract::status::{CheckResult, CheckStep, StepOutcome, StepStatus};
use crate::error::{CheckError, Result};
use crate::manifest::read_manifest;
use crate::ui::UserInterface;
use crate::version::VersionTriple;

/// Runs the contract check for one configured package.
pub struct ContractChecker<'a> {
    config: &'a CheckConfig,
    probe: &'a dyn ModuleProbe,
}

/// Mutable state of a single run.
#[derive(Default)]
struct RunState {
    steps: Vec<StepOutcome>,
    found: Option<VersionTriple>,
}

impl RunState {
    fn pass(&mut self, step: CheckStep, message: impl Into<String>) {
        self.steps
            .push(StepOutcome::new(step, StepStatus::Passed, message));
    }

    /// Record `result` as a failure of `step` if it is an error.
    fn record<T>(&mut self, step: CheckStep, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::debug!("Step '{}' failed: {}", step.label(), err);
            self.steps
                .push(StepOutcome::new(step, StepStatus::Failed, err.to_string()));
        }
        result
    }
}

impl<'a> ContractChecker<'a> {
    /// Create a checker for `config` using `probe` to observe the export.
    pub fn new(config: &'a CheckConfig, probe: &'a dyn ModuleProbe) -> Self {
        Self { config, probe }
    }

    /// Run every check and produce the aggregate result.
    ///
    /// Progress is reported through `ui` as each step passes; a fatal
    /// failure is reported with `ui.error` and ends the run.
    pub fn run_check(&self, ui: &mut dyn UserInterface) -> CheckResult {
        let package = &self.config.package;
        ui.message(&format!(
            "Testing {} import and basic functionality...",
            package.name
        ));

        let mut state = RunState::default();
        let outcome = self.run_steps(ui, &mut state);

        match outcome {
            Ok(()) => {
                let result = CheckResult::success(
                    package.clone(),
                    self.config.min_version,
                    state.found,
                    state.steps,
                );
                ui.success(&result.message);
                result
            }
            Err(err) => {
                ui.error(&err.to_string());
                CheckResult::failure(
                    &err,
                    package.clone(),
                    self.config.min_version,
                    state.found,
                    state.steps,
                )
            }
        }
    }

    fn run_steps(&self, ui: &mut dyn UserInterface, state: &mut RunState) -> Result<()> {
        let package = &self.config.package;

        // 1. Import
        let inspection = state.record(CheckStep::Import, self.check_import())?;
        let importable = format!("{} is correctly installed and importable", package.name);
        ui.success(&importable);
        state.pass(CheckStep::Import, importable);

        // 2. Shape
        state.record(CheckStep::Shape, self.check_shape(&inspection))?;
        let shaped = format!("Package exports {} function correctly", package.export);
        ui.success(&shaped);
        state.pass(CheckStep::Shape, shaped);

        // 3. Version read
        let manifest = state.record(
            CheckStep::VersionRead,
            read_manifest(&self.config.project_root, &package.name),
        )?;
        ui.detail(&format!("Manifest: {}", manifest.path.display()));
        if let Some(declared) = manifest.name.as_deref().filter(|n| *n != package.name) {
            tracing::warn!("{} declares name '{}'", manifest.path.display(), declared);
            ui.warning(&format!(
                "Manifest at {} declares name '{}', expected '{}'",
                manifest.path.display(),
                declared,
                package.name
            ));
        }
        state.pass(
            CheckStep::VersionRead,
            format!("Declared version {}", manifest.version),
        );

        // 4. Version parse
        let found = state.record(
            CheckStep::VersionParse,
            VersionTriple::parse(&manifest.version),
        )?;
        state.found = Some(found);
        state.pass(CheckStep::VersionParse, format!("Parsed version {}", found));

        // 5. Version comparison
        let required = self.config.min_version;
        let compared = if required.is_satisfied_by(&found) {
            Ok(())
        } else {
            Err(CheckError::VersionTooLow { found, required })
        };
        state.record(CheckStep::VersionCompare, compared)?;
        let meets = format!(
            "Version: {}@{} (meets requirement {})",
            package.name, manifest.version, required
        );
        ui.success(&meets);
        state.pass(CheckStep::VersionCompare, meets);

        // 6. Factory
        let factory = self.check_factory(ui);
        let factory = state.record(CheckStep::Factory, factory)?;
        state.steps.push(factory);

        Ok(())
    }

    fn check_import(&self) -> Result<ExportInspection> {
        let package = &self.config.package;
        let import_error = |message: String| CheckError::Import {
            package: package.name.clone(),
            export: package.export.clone(),
            message,
        };

        match self.probe.inspect(package)? {
            ExportInspection::Unresolved { message } => Err(import_error(message)),
            ExportInspection::Missing => Err(import_error(format!(
                "package has no export named '{}'",
                package.export
            ))),
            present => Ok(present),
        }
    }

    fn check_shape(&self, inspection: &ExportInspection) -> Result<()> {
        if inspection.is_callable() {
            return Ok(());
        }
        let kind = match inspection {
            ExportInspection::Present { kind } => kind.clone(),
            _ => "undefined".to_string(),
        };
        Err(CheckError::Shape {
            package: self.config.package.name.clone(),
            export: self.config.package.export.clone(),
            kind,
        })
    }

    /// Invoke the factory. Only returns `Err` in strict mode.
    fn check_factory(&self, ui: &mut dyn UserInterface) -> Result<StepOutcome> {
        let package = &self.config.package;
        let factory = &self.config.factory;
        let call = format!("{}.{}()", package.export, factory);
        let strict = self.config.strict_factory;

        let factory_error = |message: String| CheckError::Factory {
            export: package.export.clone(),
            factory: factory.clone(),
            message,
        };

        match self
            .probe
            .invoke_factory(package, factory, &self.config.factory_options)
        {
            Ok(FactoryOutcome::Callable) => {
                let message = format!(
                    "{} {} function works correctly",
                    capitalize(&package.export),
                    factory
                );
                ui.success(&message);
                Ok(StepOutcome::new(CheckStep::Factory, StepStatus::Passed, message))
            }
            Ok(FactoryOutcome::Threw { name, message }) => {
                if strict {
                    return Err(factory_error(format!("threw {}: {}", name, message)));
                }
                tracing::info!("{} threw {}: {} (tolerated)", call, name, message);
                let summary = format!(
                    "{} function structure is valid",
                    capitalize(&package.export)
                );
                ui.success(&summary);
                ui.detail(&format!("{} threw {}: {}", call, name, message));
                Ok(StepOutcome::new(
                    CheckStep::Factory,
                    StepStatus::Informational,
                    format!("{} threw {}: {}", call, name, message),
                ))
            }
            Ok(FactoryOutcome::NonCallable { kind }) => {
                let message = format!("{} returned {}, expected a function", call, kind);
                if strict {
                    return Err(factory_error(format!("returned {}, expected a function", kind)));
                }
                ui.warning(&message);
                Ok(StepOutcome::new(CheckStep::Factory, StepStatus::Warning, message))
            }
            Err(err) => {
                if strict {
                    return Err(match err {
                        CheckError::Factory { .. } => err,
                        other => factory_error(other.to_string()),
                    });
                }
                let message = format!("Could not invoke {}: {}", call, err);
                ui.warning(&message);
                Ok(StepOutcome::new(CheckStep::Factory, StepStatus::Warning, message))
            }
        }
    }
}

/// Upper-case the first character (`request` -> `Request`).
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::probe::ScriptedProbe;
    use crate::ui::MockUI;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn install(root: &Path, version: &str) {
        let dir = root.join("node_modules").join("@octokit").join("request");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name": "@octokit/request", "version": "{}"}}"#, version),
        )
        .unwrap();
    }

    fn callable_probe() -> ScriptedProbe {
        ScriptedProbe::new(ExportInspection::function(), Ok(FactoryOutcome::Callable))
    }

    fn run(config: &CheckConfig, probe: &ScriptedProbe) -> (CheckResult, MockUI) {
        let mut ui = MockUI::new();
        let result = ContractChecker::new(config, probe).run_check(&mut ui);
        (result, ui)
    }

    #[test]
    fn all_checks_pass_with_six_messages() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = callable_probe();

        let (result, ui) = run(&config, &probe);

        assert!(result.passed);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.found, Some(VersionTriple::new(9, 2, 1)));
        assert_eq!(
            ui.messages(),
            vec!["Testing @octokit/request import and basic functionality..."]
        );
        assert_eq!(
            ui.successes(),
            vec![
                "@octokit/request is correctly installed and importable",
                "Package exports request function correctly",
                "Version: @octokit/request@9.2.1 (meets requirement >= 9.2.1)",
                "Request defaults function works correctly",
                "All checks passed! @octokit/request is ready for use.",
            ]
        );
        assert!(ui.errors().is_empty());
        assert!(ui.warnings().is_empty());
        assert_eq!(result.steps.len(), 6);
        assert!(result.steps.iter().all(|s| s.status == StepStatus::Passed));
    }

    #[test]
    fn manifest_with_other_name_warns_but_passes() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("node_modules/@octokit/request");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            r#"{"name": "request-fork", "version": "9.2.1"}"#,
        )
        .unwrap();
        let config = CheckConfig::new(temp.path());
        let probe = callable_probe();

        let (result, ui) = run(&config, &probe);

        assert!(result.passed);
        assert!(ui.has_warning("declares name 'request-fork', expected '@octokit/request'"));
    }

    #[test]
    fn version_too_low_cites_found_and_required() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.1.9");
        let config = CheckConfig::new(temp.path());
        let probe = callable_probe();

        let (result, ui) = run(&config, &probe);

        assert!(!result.passed);
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.error_kind.as_deref(), Some("VersionTooLowError"));
        assert!(ui.has_error("Version 9.1.9 does not meet requirement >= 9.2.1"));
        assert_eq!(result.failed_step, Some(CheckStep::VersionCompare));
        assert_eq!(probe.factory_calls(), 0);
    }

    #[test]
    fn newer_versions_pass() {
        for version in ["9.3.0", "10.0.0", "9.2.10"] {
            let temp = TempDir::new().unwrap();
            install(temp.path(), version);
            let config = CheckConfig::new(temp.path());
            let (result, _) = run(&config, &callable_probe());
            assert!(result.passed, "{} should pass", version);
        }
    }

    #[test]
    fn missing_export_is_import_error() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(ExportInspection::Missing, Ok(FactoryOutcome::Callable));

        let (result, ui) = run(&config, &probe);

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.error_kind.as_deref(), Some("ImportError"));
        assert!(ui.has_error("no export named 'request'"));
        assert!(ui.successes().is_empty());
        assert_eq!(result.steps.len(), 1);
        assert_eq!(probe.factory_calls(), 0);
    }

    #[test]
    fn unresolved_package_is_import_error() {
        let temp = TempDir::new().unwrap();
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(
            ExportInspection::Unresolved {
                message: "Error: Cannot find package '@octokit/request'".into(),
            },
            Ok(FactoryOutcome::Callable),
        );

        let (result, ui) = run(&config, &probe);

        assert_eq!(result.error_kind.as_deref(), Some("ImportError"));
        assert!(ui.has_error("Cannot find package"));
    }

    #[test]
    fn non_callable_export_is_shape_error() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(
            ExportInspection::Present {
                kind: "object".into(),
            },
            Ok(FactoryOutcome::Callable),
        );

        let (result, ui) = run(&config, &probe);

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.error_kind.as_deref(), Some("ShapeError"));
        assert!(ui.has_error("did not export a function"));
        assert_eq!(result.failed_step, Some(CheckStep::Shape));
        assert_eq!(probe.factory_calls(), 0);
    }

    #[test]
    fn missing_manifest_is_metadata_error() {
        let temp = TempDir::new().unwrap();
        let config = CheckConfig::new(temp.path());

        let (result, _) = run(&config, &callable_probe());

        assert_eq!(result.error_kind.as_deref(), Some("MetadataError"));
        assert_eq!(result.failed_step, Some(CheckStep::VersionRead));
    }

    #[test]
    fn unparsable_version_is_parse_error() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2");
        let config = CheckConfig::new(temp.path());

        let (result, ui) = run(&config, &callable_probe());

        assert_eq!(result.error_kind.as_deref(), Some("VersionParseError"));
        assert!(ui.has_error("9.2"));
        assert_eq!(result.found, None);
    }

    #[test]
    fn factory_throw_is_tolerated() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(
            ExportInspection::function(),
            Ok(FactoryOutcome::Threw {
                name: "TypeError".into(),
                message: "Cannot read properties of undefined".into(),
            }),
        );

        let (result, ui) = run(&config, &probe);

        assert!(result.passed);
        assert_eq!(result.exit_code, 0);
        assert!(ui.has_success("Request function structure is valid"));
        assert!(ui.has_detail("TypeError"));
        assert_eq!(
            result.steps.last().map(|s| s.status),
            Some(StepStatus::Informational)
        );
    }

    #[test]
    fn factory_non_callable_warns() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(
            ExportInspection::function(),
            Ok(FactoryOutcome::NonCallable {
                kind: "object".into(),
            }),
        );

        let (result, ui) = run(&config, &probe);

        assert!(result.passed);
        assert!(ui.has_warning("request.defaults() returned object"));
    }

    #[test]
    fn factory_probe_failure_warns() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let config = CheckConfig::new(temp.path());
        let probe = ScriptedProbe::new(ExportInspection::function(), Err("timed out".into()));

        let (result, ui) = run(&config, &probe);

        assert!(result.passed);
        assert!(ui.has_warning("Could not invoke request.defaults()"));
    }

    #[test]
    fn strict_mode_makes_factory_failures_fatal() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "9.2.1");
        let mut config = CheckConfig::new(temp.path());
        config.strict_factory = true;

        let outcomes = [
            Ok(FactoryOutcome::Threw {
                name: "TypeError".into(),
                message: "boom".into(),
            }),
            Ok(FactoryOutcome::NonCallable {
                kind: "undefined".into(),
            }),
            Err("no node".to_string()),
        ];

        for outcome in outcomes {
            let probe = ScriptedProbe::new(ExportInspection::function(), outcome);
            let (result, ui) = run(&config, &probe);
            assert_eq!(result.exit_code, 1);
            assert_eq!(result.error_kind.as_deref(), Some("FactoryError"));
            assert!(!ui.has_success("All checks passed"));
        }
    }

    #[test]
    fn custom_export_and_factory_names() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("node_modules").join("got");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), r#"{"version": "14.4.0"}"#).unwrap();

        let mut config = CheckConfig::new(temp.path());
        config.package = crate::manifest::PackageReference::new("got", "got").unwrap();
        config.factory = "extend".into();
        config.min_version = "14.0.0".parse().unwrap();

        let (result, ui) = run(&config, &callable_probe());

        assert!(result.passed);
        assert!(ui.has_success("Got extend function works correctly"));
        assert!(ui.has_success("Version: got@14.4.0 (meets requirement >= 14.0.0)"));
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("request"), "Request");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("$x"), "$x");
    }
}
