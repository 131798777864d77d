//! Configuration for icon loading and click interaction
//!
//! Loading behaviour is configured per batch through [`IconLoadingConfig`],
//! either built directly, taken from one of the [`IconProfile`] presets, or
//! deserialized from JSON (camelCase keys, every field optional).

use crate::constants::{
    CLUSTER_ICON_MAX_SIZE, CLUSTER_LAYER_ID, FLY_TO_ZOOM, MARKER_ICON_MAX_SIZE, MARKER_LAYER_ID,
};
use crate::icons::resolver::IconKind;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum IconProfile {
    #[default]
    Standard,
    HighDensity,
    Custom(IconLoadingConfig),
}

impl IconProfile {
    pub fn resolve(&self) -> IconLoadingConfig {
        match self {
            Self::Standard => IconLoadingConfig {
                fail_fast: false,
                cluster: IconBounds::new(CLUSTER_ICON_MAX_SIZE.0, CLUSTER_ICON_MAX_SIZE.1),
                marker: IconBounds::new(MARKER_ICON_MAX_SIZE.0, MARKER_ICON_MAX_SIZE.1),
                upsize_to_max: false,
                kinds: vec![IconKind::Marker, IconKind::Cluster],
            },
            Self::HighDensity => IconLoadingConfig {
                fail_fast: false,
                cluster: IconBounds::new(48, 48),
                marker: IconBounds::new(64, 64),
                upsize_to_max: true,
                kinds: vec![IconKind::Marker, IconKind::Cluster],
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

/// Maximum icon dimensions. `None` on an axis means no constraint on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconBounds {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl IconBounds {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: Some(max_width),
            max_height: Some(max_height),
        }
    }

    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.max_width.is_none() && self.max_height.is_none()
    }

    /// Field-wise override: axes set on `other` win, the rest are kept.
    pub fn overridden_by(self, other: IconBounds) -> IconBounds {
        IconBounds {
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
        }
    }

    pub fn validate(&self, label: &str) -> Result<()> {
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(MapError::Config(format!(
                "{label} bounds must be positive or absent, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Per-batch icon loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconLoadingConfig {
    /// Reject the whole batch on the first failed icon
    pub fail_fast: bool,
    pub cluster: IconBounds,
    pub marker: IconBounds,
    /// Scale icons up to the bounds as well as down
    pub upsize_to_max: bool,
    /// Icon kinds emitted for each descriptor, in order
    pub kinds: Vec<IconKind>,
}

impl Default for IconLoadingConfig {
    fn default() -> Self {
        IconProfile::default().resolve()
    }
}

impl IconLoadingConfig {
    pub fn high_density() -> Self {
        IconProfile::HighDensity.resolve()
    }

    pub fn for_testing() -> Self {
        Self {
            fail_fast: false,
            cluster: IconBounds::new(32, 32),
            marker: IconBounds::new(32, 32),
            upsize_to_max: false,
            kinds: vec![IconKind::Marker, IconKind::Cluster],
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_upsize(mut self, upsize_to_max: bool) -> Self {
        self.upsize_to_max = upsize_to_max;
        self
    }

    pub fn with_bounds(mut self, kind: IconKind, bounds: IconBounds) -> Self {
        match kind {
            IconKind::Cluster => self.cluster = bounds,
            IconKind::Marker => self.marker = bounds,
        }
        self
    }

    pub fn bounds_for(&self, kind: IconKind) -> IconBounds {
        match kind {
            IconKind::Cluster => self.cluster,
            IconKind::Marker => self.marker,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cluster.validate("cluster")?;
        self.marker.validate("marker")
    }
}

/// Options for the icon click dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatcherOptions {
    /// Layers whose features open a popup when clicked
    pub layers: Vec<String>,
    /// Camera zoom after flying to a clicked feature
    pub fly_to_zoom: f64,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            layers: vec![MARKER_LAYER_ID.to_string()],
            fly_to_zoom: FLY_TO_ZOOM,
        }
    }
}

impl DispatcherOptions {
    /// Clicks on both the marker and the cluster layer open popups
    pub fn all_icon_layers() -> Self {
        Self {
            layers: vec![MARKER_LAYER_ID.to_string(), CLUSTER_LAYER_ID.to_string()],
            ..Self::default()
        }
    }
}
