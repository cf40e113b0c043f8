//! Catalog provider contract and its HTTP-backed implementation.
//!
//! The provider owns the "available" and "installed" plugin listings. The
//! core only ever reads the latest cached snapshot and asks for refreshes;
//! caching policy beyond that stays with the backend.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::sync::Mutex;

use crate::http::ApiClient;

use super::PluginDescriptor;

/// Wire types for the catalog endpoints (internal).
mod api {
    use serde::Deserialize;

    use crate::catalog::{PluginDescriptor, PluginType};

    #[derive(Deserialize, Debug)]
    pub struct Plugin {
        pub name: String,
        #[serde(rename = "type")]
        pub plugin_type: PluginType,
        pub version: String,
        pub safe: bool,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub author: Option<String>,
    }

    impl From<Plugin> for PluginDescriptor {
        fn from(p: Plugin) -> Self {
            PluginDescriptor {
                name: p.name,
                plugin_type: p.plugin_type,
                version: p.version,
                safe: p.safe,
                description: p.description,
                author: p.author,
            }
        }
    }
}

/// Source of the plugin catalogs.
///
/// `available_plugins` returns the latest cached snapshot of the
/// "available" listing; the refresh operations re-fetch from the backend.
/// Installed plugins are a distinct catalog from available ones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Snapshot of the available-plugins catalog, in backend order.
    fn available_plugins(&self) -> Vec<PluginDescriptor>;

    /// Re-fetch the available-plugins catalog. `force` bypasses any cache.
    async fn refresh_available_plugins(&self, force: bool) -> Result<()>;

    /// Re-fetch the installed-plugins listing. Called after every
    /// successful install.
    async fn refresh_installed_plugins(&self) -> Result<()>;
}

/// Catalog provider backed by the marketplace HTTP API.
pub struct HttpCatalogProvider {
    api: ApiClient,
    available: Mutex<Vec<PluginDescriptor>>,
    installed: Mutex<Vec<PluginDescriptor>>,
}

impl HttpCatalogProvider {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            available: Mutex::new(Vec::new()),
            installed: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the installed-plugins listing.
    pub fn installed_plugins(&self) -> Vec<PluginDescriptor> {
        self.installed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalogProvider {
    fn available_plugins(&self) -> Vec<PluginDescriptor> {
        self.available.lock().unwrap().clone()
    }

    #[tracing::instrument(skip(self))]
    async fn refresh_available_plugins(&self, force: bool) -> Result<()> {
        if !force && !self.available.lock().unwrap().is_empty() {
            debug!("Available-plugins cache is warm, skipping refresh");
            return Ok(());
        }

        let plugins: Vec<api::Plugin> = self.api.get_json("/api/agent-plugins/available").await?;
        debug!("Fetched {} available plugin(s)", plugins.len());

        let descriptors = plugins.into_iter().map(Into::into).collect();
        *self.available.lock().unwrap() = descriptors;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn refresh_installed_plugins(&self) -> Result<()> {
        let plugins: Vec<api::Plugin> = self.api.get_json("/api/agent-plugins/installed").await?;
        debug!("Fetched {} installed plugin(s)", plugins.len());

        let descriptors = plugins.into_iter().map(Into::into).collect();
        *self.installed.lock().unwrap() = descriptors;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PluginType;
    use reqwest::Client;

    const CATALOG_BODY: &str = r#"[
        {"name": "Foo", "type": "exploiter", "version": "1.0.0", "safe": true},
        {"name": "Bar", "type": "payload", "version": "2.0.0", "safe": false}
    ]"#;

    fn provider_for(server: &mockito::Server) -> HttpCatalogProvider {
        HttpCatalogProvider::new(ApiClient::new(Client::new(), server.url()))
    }

    #[tokio::test]
    async fn test_refresh_available_populates_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agent-plugins/available")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_BODY)
            .create_async()
            .await;

        let provider = provider_for(&server);
        assert!(provider.available_plugins().is_empty());

        provider.refresh_available_plugins(false).await.unwrap();

        mock.assert_async().await;
        let plugins = provider.available_plugins();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "Foo");
        assert_eq!(plugins[0].plugin_type, PluginType::Exploiter);
        assert!(!plugins[1].safe);
    }

    #[tokio::test]
    async fn test_refresh_available_warm_cache_skips_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agent-plugins/available")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_BODY)
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server);
        provider.refresh_available_plugins(false).await.unwrap();
        provider.refresh_available_plugins(false).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_available_force_bypasses_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agent-plugins/available")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_BODY)
            .expect(2)
            .create_async()
            .await;

        let provider = provider_for(&server);
        provider.refresh_available_plugins(false).await.unwrap();
        provider.refresh_available_plugins(true).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_installed_populates_listing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/agent-plugins/installed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "Foo", "type": "exploiter", "version": "1.0.0", "safe": true}]"#)
            .create_async()
            .await;

        let provider = provider_for(&server);
        provider.refresh_installed_plugins().await.unwrap();

        mock.assert_async().await;
        assert_eq!(provider.installed_plugins().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_available_error_keeps_cache() {
        let mut server = mockito::Server::new_async().await;
        let ok_mock = server
            .mock("GET", "/api/agent-plugins/available")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_BODY)
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server);
        provider.refresh_available_plugins(false).await.unwrap();
        ok_mock.assert_async().await;

        let _err_mock = server
            .mock("GET", "/api/agent-plugins/available")
            .with_status(500)
            .create_async()
            .await;

        let result = provider.refresh_available_plugins(true).await;
        assert!(result.is_err());
        // The previous snapshot is still served.
        assert_eq!(provider.available_plugins().len(), 2);
    }
}
