use crate::core::config::IconBounds;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content API ids arrive as numbers or strings depending on the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorId {
    Number(i64),
    Text(String),
}

impl DescriptorId {
    /// Numeric value of the id, if it has one
    pub fn as_number(&self) -> Option<u64> {
        match self {
            DescriptorId::Number(n) => u64::try_from(*n).ok(),
            DescriptorId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorId::Number(n) => write!(f, "{}", n),
            DescriptorId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for DescriptorId {
    fn from(id: i64) -> Self {
        DescriptorId::Number(id)
    }
}

impl From<&str> for DescriptorId {
    fn from(id: &str) -> Self {
        DescriptorId::Text(id.to_string())
    }
}

/// A category or map as delivered by the content API, reduced to what icon
/// provisioning needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconDescriptor {
    pub id: DescriptorId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "icon")]
    pub icon_ref: Option<String>,
    #[serde(default, alias = "max_width")]
    pub max_width: Option<u32>,
    #[serde(default, alias = "max_height")]
    pub max_height: Option<u32>,
}

impl IconDescriptor {
    pub fn new(id: impl Into<DescriptorId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            slug: None,
            icon_ref: None,
            max_width: None,
            max_height: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_icon(mut self, icon_ref: impl Into<String>) -> Self {
        self.icon_ref = Some(icon_ref.into());
        self
    }

    pub fn with_max_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = Some(max_width);
        self.max_height = Some(max_height);
        self
    }

    /// Parses a JSON array of descriptors
    pub fn from_json_list(json: &str) -> Result<Vec<Self>> {
        serde_json::from_str(json)
            .map_err(|e| MapError::ParseError(format!("Invalid descriptor list: {}", e)))
    }

    /// Identifier suffix: the slug when present, the id otherwise
    pub fn key(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// The icon reference, ignoring blank values
    pub fn icon_url(&self) -> Option<&str> {
        self.icon_ref
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Per-descriptor bound override. Zero dimensions count as absent.
    pub fn bounds_override(&self) -> IconBounds {
        IconBounds {
            max_width: self.max_width.filter(|&w| w > 0),
            max_height: self.max_height.filter(|&h| h > 0),
        }
    }
}
