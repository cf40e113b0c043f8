//! Keyed predicate registry over the plugin catalog.
//!
//! The visible subset of the catalog is always the intersection of the
//! catalog with every registered predicate, in catalog order. Registering
//! under an existing key replaces the old predicate; an empty registry is
//! the identity.

use std::collections::HashMap;

use crate::catalog::{PluginDescriptor, PluginType};

/// A pure predicate over a plugin descriptor.
pub type FilterFn = Box<dyn Fn(&PluginDescriptor) -> bool + Send + Sync>;

/// Registry key used by the search hook.
pub const TEXT_FILTER: &str = "text";

/// Registry key used by the type-filter hook.
pub const TYPE_FILTER: &str = "type";

#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `predicate` under `key`, replacing any previous predicate
    /// with that key. Never touches the catalog itself.
    pub fn set_filter(&mut self, key: impl Into<String>, predicate: FilterFn) {
        self.filters.insert(key.into(), predicate);
    }

    /// Unregister the predicate under `key`, if any.
    pub fn remove_filter(&mut self, key: &str) {
        self.filters.remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Lazily yields the catalog entries passing every registered
    /// predicate, preserving catalog order.
    pub fn visible<'a>(
        &'a self,
        catalog: &'a [PluginDescriptor],
    ) -> impl Iterator<Item = &'a PluginDescriptor> {
        catalog
            .iter()
            .filter(|plugin| self.filters.values().all(|predicate| predicate(plugin)))
    }
}

/// Case-insensitive substring match over every string field of a
/// descriptor. An empty query matches everything.
pub fn text_filter(query: &str) -> FilterFn {
    let query = query.to_lowercase();
    Box::new(move |plugin| {
        query.is_empty()
            || plugin
                .searchable_fields()
                .any(|field| field.to_lowercase().contains(&query))
    })
}

/// Keeps only plugins of the given type.
pub fn type_filter(plugin_type: PluginType) -> FilterFn {
    Box::new(move |plugin| plugin.plugin_type == plugin_type)
}
