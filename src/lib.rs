//! # fairmap
//!
//! Icon provisioning and click interaction for fairground event maps.
//!
//! The crate turns category and map descriptors into icon work items, loads
//! and normalizes those icons concurrently into a rendering surface's icon
//! registry, and dispatches clicks on icon layers into a single info popup.
//! The rendering surface is only reached through the capability traits in
//! [`surface`], so any map renderer exposing those operations can host it.

pub mod core;
pub mod data;
pub mod fetch;
pub mod icons;
pub mod interaction;
pub mod layers;
pub mod prelude;
pub mod surface;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{DispatcherOptions, IconBounds, IconLoadingConfig, IconProfile},
    geo::{LatLng, Point},
    viewport::Viewport,
};

pub use icons::{
    descriptor::{DescriptorId, IconDescriptor},
    loader::{load_all, LoadReport},
    resolver::{resolve, IconKind, IconWorkItem},
};

pub use interaction::{
    dispatcher::{attach, DispatcherHandle},
    names::{CategoryDirectory, NameResolver},
};

pub use layers::icon::IconLayer;

pub use surface::{memory::MemorySurface, IconSurface, InteractiveSurface, PopupHandle};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Failed to register icon {identifier}: {reason}")]
    Register { identifier: String, reason: String },

    #[error("Rendering surface has been destroyed")]
    SurfaceDestroyed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Icon {identifier} failed and fail-fast is enabled: {reason}")]
    FailFast { identifier: String, reason: String },

    #[error("All {requested} requested icons failed to load")]
    AllIconsFailed {
        requested: usize,
        errors: Vec<String>,
    },
}

impl From<image::ImageError> for MapError {
    fn from(err: image::ImageError) -> Self {
        MapError::Decode(err.to_string())
    }
}

/// Error type alias for convenience
pub type Error = MapError;
