//! Turns descriptors into the list of icons a batch has to provide

use crate::constants::{
    DEFAULT_CLUSTER_ICON_ID, DEFAULT_CLUSTER_ICON_PATH, DEFAULT_MARKER_ICON_ID,
    DEFAULT_MARKER_ICON_PATH,
};
use crate::core::config::{IconBounds, IconLoadingConfig};
use crate::icons::descriptor::IconDescriptor;
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    /// Icon of a single point
    Marker,
    /// Icon of a group of nearby points
    Cluster,
}

impl IconKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Marker => "marker",
            IconKind::Cluster => "cluster",
        }
    }

    /// Registered identifier of this kind's icon for `key`
    pub fn identifier(&self, key: &str) -> String {
        format!("{}-icon-{}", self.as_str(), key)
    }

    pub fn default_identifier(&self) -> &'static str {
        match self {
            IconKind::Marker => DEFAULT_MARKER_ICON_ID,
            IconKind::Cluster => DEFAULT_CLUSTER_ICON_ID,
        }
    }

    pub fn default_asset_path(&self) -> &'static str {
        match self {
            IconKind::Marker => DEFAULT_MARKER_ICON_PATH,
            IconKind::Cluster => DEFAULT_CLUSTER_ICON_PATH,
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One icon to fetch, normalize and register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconWorkItem {
    pub identifier: String,
    pub source_url: String,
    pub kind: IconKind,
    /// Descriptor-level bounds, applied on top of the kind's configured bounds
    #[serde(default, skip_serializing_if = "IconBounds::is_unconstrained")]
    pub bounds: IconBounds,
}

impl IconWorkItem {
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>, kind: IconKind) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: source_url.into(),
            kind,
            bounds: IconBounds::unconstrained(),
        }
    }

    pub fn with_bounds(mut self, bounds: IconBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Built-in fallback item of `kind`
    pub fn fallback(kind: IconKind) -> Self {
        Self::new(kind.default_identifier(), kind.default_asset_path(), kind)
    }

    /// Bounds in effect for this item under `config`
    pub fn effective_bounds(&self, config: &IconLoadingConfig) -> IconBounds {
        config.bounds_for(self.kind).overridden_by(self.bounds)
    }
}

/// Builds the work list for `descriptors`.
///
/// Every descriptor yields one item per configured kind, falling back to the
/// kind's bundled asset when it has no icon. The two default items always
/// close the list. Identifiers are unique: a later descriptor mapping to an
/// existing identifier replaces that item in place.
pub fn resolve(descriptors: &[IconDescriptor], config: &IconLoadingConfig) -> Vec<IconWorkItem> {
    let mut items: Vec<IconWorkItem> = Vec::with_capacity(descriptors.len() * 2 + 2);
    let mut positions: HashMap<String, usize> = HashMap::default();

    let mut push = |item: IconWorkItem| match positions.get(&item.identifier) {
        Some(&index) => {
            log::debug!("icon {} redefined, keeping the latest source", item.identifier);
            items[index] = item;
        }
        None => {
            positions.insert(item.identifier.clone(), items.len());
            items.push(item);
        }
    };

    for descriptor in descriptors {
        let key = descriptor.key();
        for &kind in &config.kinds {
            let url = descriptor
                .icon_url()
                .unwrap_or_else(|| kind.default_asset_path());
            push(
                IconWorkItem::new(kind.identifier(&key), url, kind)
                    .with_bounds(descriptor.bounds_override()),
            );
        }
    }

    push(IconWorkItem::fallback(IconKind::Marker));
    push(IconWorkItem::fallback(IconKind::Cluster));

    log::debug!(
        "resolved {} descriptors into {} icon work items",
        descriptors.len(),
        items.len()
    );
    items
}
