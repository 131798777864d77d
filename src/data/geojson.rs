use crate::core::geo::LatLng;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
}

impl GeoJsonGeometry {
    /// The position of a point geometry; other geometries have none
    pub fn point(&self) -> Option<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => Some(LatLng::from_position(*coordinates)),
            _ => None,
        }
    }
}

/// GeoJSON feature with geometry and properties, as handed to click handlers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, Value>>,
}

impl GeoJsonFeature {
    /// Creates a point feature at `[lng, lat]` with the given properties
    pub fn point(position: [f64; 2], properties: HashMap<String, Value>) -> Self {
        Self {
            id: None,
            geometry: Some(GeoJsonGeometry::Point {
                coordinates: position,
            }),
            properties: Some(properties),
        }
    }

    /// Builds a point feature from a JSON object of properties
    pub fn point_with(position: [f64; 2], properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self::point(position, properties)
    }

    pub fn position(&self) -> Option<LatLng> {
        self.geometry.as_ref().and_then(GeoJsonGeometry::point)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// A non-empty string property. JSON `null` and blank strings read as absent.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Truthiness of a flag property; map renderers flatten booleans to
    /// strings or numbers in some paths
    pub fn flag_property(&self, key: &str) -> bool {
        match self.property(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
            Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
            _ => false,
        }
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    /// Parses a GeoJSON document
    pub fn from_str(geojson_str: &str) -> Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    /// Gets all features in the document
    pub fn features(&self) -> Vec<&GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features.iter().collect(),
        }
    }
}
