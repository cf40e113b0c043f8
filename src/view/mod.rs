//! Row-action resolution for the catalog list view.

use crate::catalog::{PluginDescriptor, PluginId, PluginType};
use crate::install::{InstallState, TrackerSnapshot};

/// The affordance shown for one catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// An install is outstanding; non-interactive.
    Downloading,
    /// The install completed; non-interactive.
    Done,
    /// Interactive: triggers an install with the row's fields.
    Install {
        id: PluginId,
        name: String,
        plugin_type: PluginType,
        version: String,
    },
}

/// Resolve the affordance for `plugin` against a tracker snapshot.
///
/// In-flight is checked before succeeded before the default. The tracker
/// keeps the sets disjoint, so at most one can match, but the check order
/// is fixed regardless.
pub fn row_action(snapshot: &TrackerSnapshot, plugin: &PluginDescriptor) -> RowAction {
    let id = plugin.id();
    match snapshot.state(&id) {
        InstallState::InFlight => RowAction::Downloading,
        InstallState::Succeeded => RowAction::Done,
        InstallState::NotStarted => RowAction::Install {
            id,
            name: plugin.name.clone(),
            plugin_type: plugin.plugin_type,
            version: plugin.version.clone(),
        },
    }
}

impl RowAction {
    /// Short label for list output.
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Downloading => "downloading",
            RowAction::Done => "done",
            RowAction::Install { .. } => "installable",
        }
    }
}
