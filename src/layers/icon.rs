use crate::constants::{CLUSTER_LAYER_ID, MARKER_LAYER_ID, POINT_SOURCE_ID};
use crate::data::geojson::GeoJsonFeature;
use crate::icons::resolver::IconKind;
use crate::interaction::feature::CategoryField;
use crate::surface::IconSurface;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Property marking a clustered point in a clustered point source
const POINT_COUNT_PROPERTY: &str = "point_count";
/// Explicit icon key of a point, takes precedence over its categories
const ICON_KEY_PROPERTY: &str = "icon_slug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconAnchor {
    Center,
    #[default]
    Bottom,
    Top,
}

impl IconAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconAnchor::Center => "center",
            IconAnchor::Bottom => "bottom",
            IconAnchor::Top => "top",
        }
    }
}

/// A symbol layer drawing registered icons over a clustered point source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconLayer {
    pub id: String,
    pub kind: IconKind,
    pub source: String,
    pub icon_size: f64,
    pub allow_overlap: bool,
    pub anchor: IconAnchor,
    pub visible: bool,
}

impl IconLayer {
    pub fn new(id: impl Into<String>, kind: IconKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source: POINT_SOURCE_ID.to_string(),
            icon_size: 1.0,
            allow_overlap: true,
            anchor: IconAnchor::default(),
            visible: true,
        }
    }

    /// Layer of unclustered points
    pub fn marker() -> Self {
        Self::new(MARKER_LAYER_ID, IconKind::Marker)
    }

    /// Layer of clusters, icons centred on the cluster position
    pub fn cluster() -> Self {
        Self::new(CLUSTER_LAYER_ID, IconKind::Cluster).with_anchor(IconAnchor::Center)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_icon_size(mut self, icon_size: f64) -> Self {
        self.icon_size = icon_size.max(0.0);
        self
    }

    pub fn with_anchor(mut self, anchor: IconAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_allow_overlap(mut self, allow_overlap: bool) -> Self {
        self.allow_overlap = allow_overlap;
        self
    }

    /// Whether `feature` is drawn by this layer
    pub fn matches(&self, feature: &GeoJsonFeature) -> bool {
        let clustered = feature.property(POINT_COUNT_PROPERTY).is_some();
        match self.kind {
            IconKind::Cluster => clustered,
            IconKind::Marker => !clustered,
        }
    }

    /// Icon key of `feature`: its explicit icon key, else its first category
    pub fn icon_key(feature: &GeoJsonFeature) -> Option<String> {
        if let Some(key) = feature.str_property(ICON_KEY_PROPERTY) {
            return Some(key.to_string());
        }
        CategoryField::from_feature(feature)
            .and_then(|field| field.ids().ok())
            .and_then(|ids| ids.first().map(|id| id.to_string()))
    }

    /// Identifier of the icon drawn for `feature`, falling back to the
    /// kind's default icon when the specific one was never registered
    pub fn icon_for<S>(&self, feature: &GeoJsonFeature, surface: &S) -> String
    where
        S: IconSurface + ?Sized,
    {
        Self::icon_key(feature)
            .map(|key| self.kind.identifier(&key))
            .filter(|identifier| surface.has_image(identifier))
            .unwrap_or_else(|| self.kind.default_identifier().to_string())
    }

    /// Mapbox style layer object equivalent to this layer
    pub fn to_style_json(&self) -> Value {
        let has_count = json!(["has", POINT_COUNT_PROPERTY]);
        let filter = match self.kind {
            IconKind::Cluster => has_count,
            IconKind::Marker => json!(["!", has_count]),
        };
        let prefix = format!("{}-icon-", self.kind.as_str());

        json!({
            "id": self.id,
            "type": "symbol",
            "source": self.source,
            "filter": filter,
            "layout": {
                "icon-image": [
                    "coalesce",
                    ["image", ["concat", prefix, ["to-string", ["get", ICON_KEY_PROPERTY]]]],
                    ["image", self.kind.default_identifier()]
                ],
                "icon-size": self.icon_size,
                "icon-allow-overlap": self.allow_overlap,
                "icon-anchor": self.anchor.as_str(),
                "visibility": if self.visible { "visible" } else { "none" }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ImageFetcher;
    use crate::surface::memory::MemorySurface;
    use crate::Result;
    use async_trait::async_trait;
    use image::RgbaImage;
    use std::sync::Arc;

    struct NoFetch;

    #[async_trait]
    impl ImageFetcher for NoFetch {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(crate::MapError::Fetch {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_matches_clustered_points() {
        let point = GeoJsonFeature::point_with([10.0, 50.0], json!({"title": "Stall"}));
        let cluster = GeoJsonFeature::point_with([10.0, 50.0], json!({"point_count": 4}));

        assert!(IconLayer::marker().matches(&point));
        assert!(!IconLayer::marker().matches(&cluster));
        assert!(IconLayer::cluster().matches(&cluster));
    }

    #[test]
    fn test_icon_key_sources() {
        let explicit = GeoJsonFeature::point_with([0.0, 0.0], json!({"icon_slug": "food"}));
        let encoded = GeoJsonFeature::point_with([0.0, 0.0], json!({"categories": "[12,34]"}));
        let objects =
            GeoJsonFeature::point_with([0.0, 0.0], json!({"categories": [{"id": 7, "name": "x"}]}));
        let bare = GeoJsonFeature::point_with([0.0, 0.0], json!({}));

        assert_eq!(IconLayer::icon_key(&explicit).as_deref(), Some("food"));
        assert_eq!(IconLayer::icon_key(&encoded).as_deref(), Some("12"));
        assert_eq!(IconLayer::icon_key(&objects).as_deref(), Some("7"));
        assert_eq!(IconLayer::icon_key(&bare), None);
    }

    #[test]
    fn test_icon_for_falls_back_to_default() {
        let surface = MemorySurface::new(Arc::new(NoFetch));
        surface
            .add_image("marker-icon-food", RgbaImage::new(4, 4))
            .unwrap();
        let layer = IconLayer::marker();

        let food = GeoJsonFeature::point_with([0.0, 0.0], json!({"icon_slug": "food"}));
        let crafts = GeoJsonFeature::point_with([0.0, 0.0], json!({"icon_slug": "crafts"}));

        assert_eq!(layer.icon_for(&food, &surface), "marker-icon-food");
        assert_eq!(layer.icon_for(&crafts, &surface), "default-marker-icon");
    }

    #[test]
    fn test_style_json() {
        let style = IconLayer::cluster().with_icon_size(0.5).to_style_json();

        assert_eq!(style["id"], "cluster-icon");
        assert_eq!(style["source"], "points-clustered");
        assert_eq!(style["filter"], json!(["has", "point_count"]));
        assert_eq!(style["layout"]["icon-anchor"], "center");
        assert_eq!(style["layout"]["icon-size"], 0.5);
        assert_eq!(style["layout"]["icon-image"][2], json!(["image", "default-cluster-icon"]));
    }
}
