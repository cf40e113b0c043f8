//! CLI command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;

use crate::catalog::{CatalogProvider, HttpCatalogProvider, PluginDescriptor, PluginType};
use crate::config::Config;
use crate::install::InstallOutcome;
use crate::marketplace::Marketplace;

fn connect(server_url: Option<String>) -> Result<(Arc<HttpCatalogProvider>, Marketplace)> {
    let config = Config::new(server_url)?;
    let provider = Arc::new(HttpCatalogProvider::new(config.api.clone()));
    let marketplace = Marketplace::new(provider.clone(), config.api);
    Ok((provider, marketplace))
}

fn apply_filters(
    marketplace: &Marketplace,
    search: Option<&str>,
    plugin_type: Option<&str>,
) -> Result<()> {
    if let Some(query) = search {
        marketplace.set_search_query(query);
    }
    if let Some(t) = plugin_type {
        marketplace.set_type_filter(Some(t.parse::<PluginType>()?));
    }
    Ok(())
}

fn print_row(marketplace: &Marketplace, plugin: &PluginDescriptor) {
    println!(
        "{} {} {} {} [{}]",
        plugin.name,
        plugin.version,
        plugin.plugin_type,
        if plugin.safe { "safe" } else { "unsafe" },
        marketplace.row_action(plugin).label()
    );
}

/// List the available plugins passing the given filters.
#[tracing::instrument]
pub async fn list(
    server_url: Option<String>,
    search: Option<String>,
    plugin_type: Option<String>,
) -> Result<()> {
    let (provider, marketplace) = connect(server_url)?;
    provider
        .refresh_available_plugins(false)
        .await
        .context("Failed to fetch the plugin catalog")?;

    apply_filters(&marketplace, search.as_deref(), plugin_type.as_deref())?;

    let visible = marketplace.visible_plugins();
    if visible.is_empty() {
        println!("No plugins match.");
        return Ok(());
    }

    debug!("Showing {} plugin(s)", visible.len());
    for plugin in &visible {
        print_row(&marketplace, plugin);
    }

    Ok(())
}

/// Install a single plugin by name, optionally narrowed by type/version.
#[tracing::instrument]
pub async fn install(
    server_url: Option<String>,
    name: &str,
    plugin_type: Option<String>,
    version: Option<String>,
) -> Result<()> {
    let wanted_type = plugin_type
        .as_deref()
        .map(str::parse::<PluginType>)
        .transpose()?;

    let (provider, marketplace) = connect(server_url)?;
    provider
        .refresh_available_plugins(false)
        .await
        .context("Failed to fetch the plugin catalog")?;

    let catalog = provider.available_plugins();
    let mut candidates: Vec<&PluginDescriptor> =
        catalog.iter().filter(|p| p.name == name).collect();
    if let Some(t) = wanted_type {
        candidates.retain(|p| p.plugin_type == t);
    }
    if let Some(v) = version.as_deref() {
        candidates.retain(|p| p.version == v);
    }

    let plugin = match candidates.as_slice() {
        [] => anyhow::bail!("Plugin '{}' not found in the available catalog.", name),
        [plugin] => *plugin,
        many => anyhow::bail!(
            "Plugin '{}' matches {} catalog entries; narrow with --type/--version. Matches: {}",
            name,
            many.len(),
            many.iter()
                .map(|p| format!("{} {} {}", p.name, p.plugin_type, p.version))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    match marketplace.install(plugin).await {
        InstallOutcome::Installed => {
            println!("Installed {} {}", plugin.name, plugin.version);
            Ok(())
        }
        InstallOutcome::Failed(e) => {
            Err(e.context(format!("Failed to install {} {}", plugin.name, plugin.version)))
        }
    }
}

/// Install every safe plugin in the visible (filtered) catalog.
/// Member failures are reported but never fail the run.
#[tracing::instrument]
pub async fn install_all_safe(
    server_url: Option<String>,
    search: Option<String>,
    plugin_type: Option<String>,
) -> Result<()> {
    let (provider, marketplace) = connect(server_url)?;
    provider
        .refresh_available_plugins(false)
        .await
        .context("Failed to fetch the plugin catalog")?;

    apply_filters(&marketplace, search.as_deref(), plugin_type.as_deref())?;

    let report = marketplace.install_all_safe().await?;

    println!(
        "Installed {} plugin(s), {} failed, {} skipped (unsafe).",
        report.installed.len(),
        report.failed.len(),
        report.skipped_unsafe.len()
    );
    for id in &report.failed {
        println!("  failed: {}", id);
    }
    for id in &report.skipped_unsafe {
        println!("  skipped (unsafe): {}", id);
    }

    Ok(())
}

/// Force-refresh the available-plugins catalog.
#[tracing::instrument]
pub async fn refresh(server_url: Option<String>) -> Result<()> {
    let (provider, marketplace) = connect(server_url)?;
    marketplace
        .refresh()
        .await
        .context("Failed to refresh the plugin catalog")?;

    println!(
        "Refreshed; {} plugin(s) available.",
        provider.available_plugins().len()
    );
    Ok(())
}
