//! Per-plugin installation state.
//!
//! Two identifier sets, in-flight and succeeded, guarded by one mutex.
//! Invariant: an identifier is a member of at most one set at any time;
//! every operation re-establishes disjointness before releasing the lock.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::catalog::PluginId;

/// Classification of a plugin identifier's install progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// Not tracked by either set.
    NotStarted,
    /// An install request for this identifier is outstanding.
    InFlight,
    /// An install request for this identifier completed successfully.
    Succeeded,
}

#[derive(Debug, Default)]
struct Sets {
    in_flight: HashSet<PluginId>,
    succeeded: HashSet<PluginId>,
}

/// Tracks install progress across concurrently running installs.
///
/// Operations on disjoint identifiers never conflict; operations on the
/// same identifier are serialized by the orchestrator (the row affordance
/// for an in-flight plugin is non-interactive).
#[derive(Debug, Default)]
pub struct InstallTracker {
    sets: Mutex<Sets>,
}

/// Point-in-time copy of the tracker's sets, for the view layer.
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    in_flight: HashSet<PluginId>,
    succeeded: HashSet<PluginId>,
}

impl TrackerSnapshot {
    /// State of `id` at snapshot time. In-flight is checked before
    /// succeeded; the sets are disjoint but the check order stays fixed.
    pub fn state(&self, id: &PluginId) -> InstallState {
        if self.in_flight.contains(id) {
            InstallState::InFlight
        } else if self.succeeded.contains(id) {
            InstallState::Succeeded
        } else {
            InstallState::NotStarted
        }
    }
}

impl InstallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` in-flight. Called before the install request is issued,
    /// so the view reflects "downloading" immediately.
    pub fn begin_install(&self, id: &PluginId) {
        let mut sets = self.sets.lock().unwrap();
        sets.succeeded.remove(id);
        sets.in_flight.insert(id.clone());
    }

    /// Move `id` from in-flight to succeeded. Idempotent: repeating the
    /// call leaves the state unchanged.
    pub fn complete_install(&self, id: &PluginId) {
        let mut sets = self.sets.lock().unwrap();
        sets.in_flight.remove(id);
        sets.succeeded.insert(id.clone());
    }

    /// Remove `id` from in-flight without marking it succeeded; the plugin
    /// reverts to `NotStarted` and can be re-triggered.
    pub fn fail_install(&self, id: &PluginId) {
        self.sets.lock().unwrap().in_flight.remove(id);
    }

    /// Clear the succeeded set only. Invoked on a manual catalog refresh;
    /// in-flight identifiers survive since those requests are already
    /// underway.
    pub fn reset_succeeded(&self) {
        self.sets.lock().unwrap().succeeded.clear();
    }

    /// Current state of `id`, same precedence as [`TrackerSnapshot::state`].
    pub fn state(&self, id: &PluginId) -> InstallState {
        let sets = self.sets.lock().unwrap();
        if sets.in_flight.contains(id) {
            InstallState::InFlight
        } else if sets.succeeded.contains(id) {
            InstallState::Succeeded
        } else {
            InstallState::NotStarted
        }
    }

    /// Copy of both sets for the view layer.
    pub fn snapshot(&self) -> TrackerSnapshot {
        let sets = self.sets.lock().unwrap();
        TrackerSnapshot {
            in_flight: sets.in_flight.clone(),
            succeeded: sets.succeeded.clone(),
        }
    }
}
