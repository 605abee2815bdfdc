pub mod artifact_filter;
pub mod config_loader;
pub mod exact_version;
pub mod project_scanner;
pub mod version_control;

pub use config_loader::{CliOverrides, ProjectConfig};
pub use exact_version::{ExactVersion, ExactVersionUpdater, UpdateReport};
pub use project_scanner::{ProjectScannerAgent, Reactor};
pub use version_control::VersionControlAgent;
