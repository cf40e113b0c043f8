//! Installation state tracking and orchestration.

mod bulk;
mod installer;
mod tracker;

pub use bulk::{BulkInstaller, BulkReport};
pub use installer::{INSTALL_ENDPOINT, InstallOutcome, PluginInstaller};
pub use tracker::{InstallState, InstallTracker, TrackerSnapshot};
