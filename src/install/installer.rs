//! Single-install orchestration.
//!
//! One install run: mark in-flight, issue the PUT, mark succeeded and
//! refresh the installed listing on success, log and revert on failure.
//! The in-flight mark is released on every exit path via a drop guard.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::catalog::{CatalogProvider, PluginDescriptor, PluginId, PluginType};
use crate::http::ApiClient;

use super::tracker::InstallTracker;

/// Endpoint the install request is issued against.
pub const INSTALL_ENDPOINT: &str = "/api/install-agent-plugin";

/// Explicit result of one install run. Failures are isolated per plugin
/// and never propagate to sibling installs, so this is not a `Result`.
#[derive(Debug)]
pub enum InstallOutcome {
    Installed,
    Failed(anyhow::Error),
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed)
    }
}

#[derive(Serialize)]
struct InstallRequest<'a> {
    plugin_type: &'a str,
    name: &'a str,
    version: &'a str,
}

/// Clears the in-flight mark on drop unless disarmed by a successful
/// completion first.
struct InFlightGuard<'a> {
    tracker: &'a InstallTracker,
    id: &'a PluginId,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(tracker: &'a InstallTracker, id: &'a PluginId) -> Self {
        Self {
            tracker,
            id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.tracker.fail_install(self.id);
        }
    }
}

/// Performs single install runs against the marketplace API.
pub struct PluginInstaller {
    api: ApiClient,
    tracker: Arc<InstallTracker>,
    provider: Arc<dyn CatalogProvider>,
}

impl PluginInstaller {
    pub fn new(
        api: ApiClient,
        tracker: Arc<InstallTracker>,
        provider: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            api,
            tracker,
            provider,
        }
    }

    pub fn tracker(&self) -> &Arc<InstallTracker> {
        &self.tracker
    }

    /// Install one plugin. The returned future resolves once the in-flight
    /// mark is cleared, success or failure.
    #[tracing::instrument(skip(self))]
    pub async fn install(
        &self,
        id: &PluginId,
        name: &str,
        plugin_type: PluginType,
        version: &str,
    ) -> InstallOutcome {
        // Before the request goes out, so the view shows "downloading"
        // without waiting for a round trip.
        self.tracker.begin_install(id);
        let mut guard = InFlightGuard::new(&self.tracker, id);

        let request = InstallRequest {
            plugin_type: plugin_type.as_str(),
            name,
            version,
        };

        match self.api.put_json(INSTALL_ENDPOINT, &request).await {
            Ok(()) => {
                guard.disarm();
                self.tracker.complete_install(id);
                debug!("Installed plugin {}", id);

                if let Err(e) = self.provider.refresh_installed_plugins().await {
                    warn!("Failed to refresh installed plugins after install: {}", e);
                }

                InstallOutcome::Installed
            }
            Err(e) => {
                warn!("Error installing plugin {}: {}", id, e);
                InstallOutcome::Failed(e)
            }
        }
    }

    /// Install the plugin described by `plugin`.
    pub async fn install_plugin(&self, plugin: &PluginDescriptor) -> InstallOutcome {
        self.install(&plugin.id(), &plugin.name, plugin.plugin_type, &plugin.version)
            .await
    }
}
