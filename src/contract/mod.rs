//! Dependency contract checking.
//!
//! # Modules
//!
//! - [`checker`] - The sequential check pipeline
//! - [`probe`] - Runtime observation of the package's export
//! - [`status`] - Step outcomes and the aggregate check result

pub mod checker;
pub mod probe;
pub mod status;

pub use checker::ContractChecker;
pub use probe::{ExportInspection, FactoryOutcome, ModuleProbe, NodeProbe, ScriptedProbe};
pub use status::{CheckResult, CheckStep, StepOutcome, StepStatus};
