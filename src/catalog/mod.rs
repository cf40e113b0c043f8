//! Plugin catalog types.
//!
//! Descriptors arrive from the backend's available-plugins listing and are
//! treated as immutable input everywhere else in the crate. The stable
//! per-plugin identifier is derived here.

mod provider;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use provider::{CatalogProvider, HttpCatalogProvider};

#[cfg(test)]
pub use provider::MockCatalogProvider;

/// Plugin kind, one of the backend-defined enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    Exploiter,
    Payload,
    CredentialsCollector,
    Fingerprinter,
}

impl PluginType {
    /// Wire/display form of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Exploiter => "exploiter",
            PluginType::Payload => "payload",
            PluginType::CredentialsCollector => "credentials_collector",
            PluginType::Fingerprinter => "fingerprinter",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exploiter" => Ok(PluginType::Exploiter),
            "payload" => Ok(PluginType::Payload),
            "credentials_collector" => Ok(PluginType::CredentialsCollector),
            "fingerprinter" => Ok(PluginType::Fingerprinter),
            _ => anyhow::bail!(
                "Unknown plugin type: {}. Expected exploiter, payload, \
                 credentials_collector, or fingerprinter.",
                s
            ),
        }
    }
}

/// Stable identifier for a plugin, derived from name, type, and version.
///
/// The derivation is deterministic, so the same plugin keeps the same id
/// across catalog refreshes. It is collision-free: the type and version
/// components never contain the `:` separator, so the original triple is
/// recoverable from the id string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginId(String);

impl PluginId {
    /// Derive the identifier for a (name, type, version) triple.
    pub fn derive(name: &str, plugin_type: PluginType, version: &str) -> Self {
        PluginId(format!("{}:{}:{}", plugin_type, name, version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A plugin as listed in the backend catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub plugin_type: PluginType,
    pub version: String,
    /// Backend-asserted trust classification. Unsafe plugins require
    /// explicit per-row operator consent and are skipped by bulk install.
    pub safe: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl PluginDescriptor {
    /// The stable identifier for this descriptor.
    pub fn id(&self) -> PluginId {
        PluginId::derive(&self.name, self.plugin_type, &self.version)
    }

    /// String-valued fields considered by free-text search.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.name.as_str()),
            Some(self.plugin_type.as_str()),
            Some(self.version.as_str()),
            self.description.as_deref(),
            self.author.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, plugin_type: PluginType, version: &str) -> PluginDescriptor {
        PluginDescriptor {
            name: name.into(),
            plugin_type,
            version: version.into(),
            safe: true,
            description: None,
            author: None,
        }
    }

    #[test]
    fn test_plugin_type_parse() {
        assert_eq!(
            "exploiter".parse::<PluginType>().unwrap(),
            PluginType::Exploiter
        );
        assert_eq!(
            "Exploiter".parse::<PluginType>().unwrap(),
            PluginType::Exploiter
        );
        assert_eq!(
            "credentials_collector".parse::<PluginType>().unwrap(),
            PluginType::CredentialsCollector
        );
        assert!("unknown".parse::<PluginType>().is_err());
    }

    #[test]
    fn test_plugin_type_display() {
        assert_eq!(PluginType::Payload.to_string(), "payload");
        assert_eq!(
            PluginType::CredentialsCollector.to_string(),
            "credentials_collector"
        );
    }

    #[test]
    fn test_plugin_id_deterministic() {
        let a = PluginId::derive("Foo", PluginType::Exploiter, "1.0.0");
        let b = PluginId::derive("Foo", PluginType::Exploiter, "1.0.0");
        assert_eq!(a, b);
    }

    #[test]
    fn test_plugin_id_distinct_per_component() {
        let base = PluginId::derive("Foo", PluginType::Exploiter, "1.0.0");
        assert_ne!(base, PluginId::derive("Bar", PluginType::Exploiter, "1.0.0"));
        assert_ne!(base, PluginId::derive("Foo", PluginType::Payload, "1.0.0"));
        assert_ne!(base, PluginId::derive("Foo", PluginType::Exploiter, "2.0.0"));
    }

    #[test]
    fn test_descriptor_id_matches_derivation() {
        let plugin = descriptor("Foo", PluginType::Fingerprinter, "0.3.1");
        assert_eq!(
            plugin.id(),
            PluginId::derive("Foo", PluginType::Fingerprinter, "0.3.1")
        );
    }

    #[test]
    fn test_descriptor_deserialize() {
        let json = r#"{
            "name": "ssh-exploiter",
            "type": "exploiter",
            "version": "1.2.0",
            "safe": true,
            "description": "Propagates via SSH"
        }"#;
        let plugin: PluginDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(plugin.name, "ssh-exploiter");
        assert_eq!(plugin.plugin_type, PluginType::Exploiter);
        assert_eq!(plugin.version, "1.2.0");
        assert!(plugin.safe);
        assert_eq!(plugin.description.as_deref(), Some("Propagates via SSH"));
        assert_eq!(plugin.author, None);
    }

    #[test]
    fn test_searchable_fields_include_optional() {
        let mut plugin = descriptor("Foo", PluginType::Payload, "1.0.0");
        plugin.author = Some("Acme".into());
        let fields: Vec<&str> = plugin.searchable_fields().collect();
        assert_eq!(fields, vec!["Foo", "payload", "1.0.0", "Acme"]);
    }
}
