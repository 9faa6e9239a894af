//! Check configuration: defaults, YAML files, and command-line overrides.

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_file, ConfigPaths, CONFIG_FILE, LOCAL_CONFIG_FILE};
pub use schema::{CheckConfig, ConfigLayer};
