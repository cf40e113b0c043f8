//! Marketplace façade: wires the catalog provider, filter registry,
//! installation tracker, and install orchestrators, and exposes the hooks
//! the operator-facing widgets call into.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use log::debug;

use crate::catalog::{CatalogProvider, PluginDescriptor, PluginType};
use crate::filter::{FilterRegistry, TEXT_FILTER, TYPE_FILTER, text_filter, type_filter};
use crate::http::ApiClient;
use crate::install::{BulkInstaller, BulkReport, InstallOutcome, InstallTracker, PluginInstaller};
use crate::view::{self, RowAction};

pub struct Marketplace {
    provider: Arc<dyn CatalogProvider>,
    tracker: Arc<InstallTracker>,
    installer: Arc<PluginInstaller>,
    bulk: BulkInstaller,
    filters: Mutex<FilterRegistry>,
}

impl Marketplace {
    pub fn new(provider: Arc<dyn CatalogProvider>, api: ApiClient) -> Self {
        let tracker = Arc::new(InstallTracker::new());
        let installer = Arc::new(PluginInstaller::new(
            api,
            tracker.clone(),
            provider.clone(),
        ));
        Self {
            provider,
            tracker,
            bulk: BulkInstaller::new(installer.clone()),
            installer,
            filters: Mutex::new(FilterRegistry::new()),
        }
    }

    pub fn tracker(&self) -> &Arc<InstallTracker> {
        &self.tracker
    }

    /// Search-widget hook: registers the free-text predicate under the
    /// "text" key, replacing the previous query.
    pub fn set_search_query(&self, query: &str) {
        debug!("Search query changed to {:?}", query);
        self.filters
            .lock()
            .unwrap()
            .set_filter(TEXT_FILTER, text_filter(query));
    }

    /// Type-filter-widget hook: registers or clears the "type" predicate.
    pub fn set_type_filter(&self, plugin_type: Option<PluginType>) {
        let mut filters = self.filters.lock().unwrap();
        match plugin_type {
            Some(t) => filters.set_filter(TYPE_FILTER, type_filter(t)),
            None => filters.remove_filter(TYPE_FILTER),
        }
    }

    /// The catalog entries passing every registered filter, in catalog
    /// order. Re-derived from the provider's latest snapshot on each call.
    pub fn visible_plugins(&self) -> Vec<PluginDescriptor> {
        let catalog = self.provider.available_plugins();
        let filters = self.filters.lock().unwrap();
        filters.visible(&catalog).cloned().collect()
    }

    /// Resolve the row affordance for `plugin`.
    pub fn row_action(&self, plugin: &PluginDescriptor) -> RowAction {
        view::row_action(&self.tracker.snapshot(), plugin)
    }

    /// Install a single plugin (the per-row affordance).
    pub async fn install(&self, plugin: &PluginDescriptor) -> InstallOutcome {
        self.installer.install_plugin(plugin).await
    }

    /// Install every safe plugin in the currently visible set. The
    /// membership is snapshotted here; filter changes mid-session have no
    /// effect on it.
    pub async fn install_all_safe(&self) -> Result<BulkReport> {
        let visible = self.visible_plugins();
        self.bulk.install_all_safe(&visible).await
    }

    /// Whether a bulk session is alive (trigger disabled while true).
    pub fn bulk_in_progress(&self) -> bool {
        self.bulk.in_progress()
    }

    /// Operator refresh: clear stale "done" badges, then re-fetch the
    /// available catalog bypassing any cache. In-flight installs are
    /// untouched.
    pub async fn refresh(&self) -> Result<()> {
        self.tracker.reset_succeeded();
        self.provider.refresh_available_plugins(true).await
    }
}
