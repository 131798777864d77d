//! Decoding of clicked feature properties

use crate::core::geo::LatLng;
use crate::data::geojson::GeoJsonFeature;
use crate::{MapError, Result};
use serde_json::Value;

const TITLE_PROPERTIES: [&str; 2] = ["title", "name"];
const DEFAULT_TITLE: &str = "Unknown location";

/// The `categories` property of a feature. Sources store it either as a
/// JSON-encoded string or as a native array.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryField {
    Encoded(String),
    List(Vec<Value>),
}

impl CategoryField {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(CategoryField::Encoded(s.clone())),
            Value::Array(items) => Some(CategoryField::List(items.clone())),
            Value::Null => None,
            other => Some(CategoryField::List(vec![other.clone()])),
        }
    }

    pub fn from_feature(feature: &GeoJsonFeature) -> Option<Self> {
        feature.property("categories").and_then(Self::from_value)
    }

    /// Category ids in field order.
    ///
    /// Malformed JSON is an error. Elements that carry no usable id are
    /// skipped.
    pub fn ids(&self) -> Result<Vec<u64>> {
        match self {
            CategoryField::Encoded(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Ok(Vec::new());
                }
                let decoded: Value = serde_json::from_str(raw).map_err(|e| {
                    MapError::ParseError(format!("invalid categories {:?}: {}", raw, e))
                })?;
                match decoded {
                    Value::Array(items) => Ok(collect_ids(&items)),
                    Value::Null => Ok(Vec::new()),
                    single => Ok(collect_ids(std::slice::from_ref(&single))),
                }
            }
            CategoryField::List(items) => Ok(collect_ids(items)),
        }
    }
}

fn collect_ids(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .filter_map(|item| {
            let id = element_id(item);
            if id.is_none() {
                log::debug!("ignoring category element without an id: {}", item);
            }
            id
        })
        .collect()
}

fn element_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map
            .get("id")
            .filter(|id| !id.is_object())
            .and_then(element_id),
        _ => None,
    }
}

/// What a popup shows about a clicked feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub title: String,
    pub description: Option<String>,
    /// Feature type label, e.g. "Vendor" or "Service"
    pub kind: Option<String>,
    pub accessible: bool,
    pub category_ids: Vec<u64>,
    pub position: Option<LatLng>,
}

impl FeatureSummary {
    /// Reads the summary out of `feature`. Never fails: a malformed
    /// `categories` property is logged and yields no categories.
    pub fn from_feature(feature: &GeoJsonFeature) -> Self {
        let title = TITLE_PROPERTIES
            .iter()
            .find_map(|key| feature.str_property(key))
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let category_ids = match CategoryField::from_feature(feature).map(|field| field.ids()) {
            Some(Ok(ids)) => ids,
            Some(Err(err)) => {
                log::warn!("ignoring categories of {:?}: {}", title, err);
                Vec::new()
            }
            None => Vec::new(),
        };

        Self {
            description: feature.str_property("description").map(str::to_string),
            kind: feature.str_property("type").map(capitalize),
            accessible: feature.flag_property("is_accessible"),
            category_ids,
            position: feature.position(),
            title,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
