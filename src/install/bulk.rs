//! Bulk installation of all safe plugins in the visible catalog.
//!
//! Membership is a snapshot at launch time; the visible set changing
//! mid-flight does not add or remove members. One aggregate flag covers
//! the whole session and clears only once every member has settled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use futures_util::future::join_all;
use log::{debug, info};

use crate::catalog::{PluginDescriptor, PluginId};

use super::installer::{InstallOutcome, PluginInstaller};

/// What happened to each member of a bulk session.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub installed: Vec<PluginId>,
    pub failed: Vec<PluginId>,
    /// Visible plugins with `safe == false`, skipped without an install
    /// attempt; they keep their per-row install affordance.
    pub skipped_unsafe: Vec<PluginId>,
}

impl BulkReport {
    pub fn launched(&self) -> usize {
        self.installed.len() + self.failed.len()
    }
}

/// Clears the aggregate flag when the session ends, on every exit path.
struct SessionGuard<'a>(&'a AtomicBool);

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs bulk-install sessions; at most one is alive at a time.
pub struct BulkInstaller {
    installer: Arc<PluginInstaller>,
    in_progress: AtomicBool,
}

impl BulkInstaller {
    pub fn new(installer: Arc<PluginInstaller>) -> Self {
        Self {
            installer,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Whether a bulk session is currently alive. The trigger affordance
    /// is disabled while this is true.
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Install every `safe == true` plugin in `visible`, concurrently and
    /// unordered. Unsafe plugins are skipped and reported. Member failures
    /// never abort the session.
    #[tracing::instrument(skip(self, visible))]
    pub async fn install_all_safe(&self, visible: &[PluginDescriptor]) -> Result<BulkReport> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            anyhow::bail!("A bulk install is already in progress");
        }
        let _guard = SessionGuard(&self.in_progress);

        let (safe, skipped): (Vec<_>, Vec<_>) = visible.iter().partition(|p| p.safe);
        let skipped_unsafe: Vec<PluginId> = skipped.iter().map(|p| p.id()).collect();
        for plugin in &skipped {
            debug!("Skipping unsafe plugin {}", plugin.id());
        }

        info!(
            "Bulk install: launching {} safe plugin(s), skipping {} unsafe",
            safe.len(),
            skipped_unsafe.len()
        );

        let outcomes = join_all(safe.iter().map(|p| self.installer.install_plugin(p))).await;

        let mut report = BulkReport {
            skipped_unsafe,
            ..Default::default()
        };
        for (plugin, outcome) in safe.iter().zip(outcomes) {
            match outcome {
                InstallOutcome::Installed => report.installed.push(plugin.id()),
                InstallOutcome::Failed(_) => report.failed.push(plugin.id()),
            }
        }

        Ok(report)
    }
}
