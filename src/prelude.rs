//! Prelude module for common fairmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use fairmap::prelude::*;`

pub use crate::core::{
    config::{DispatcherOptions, IconBounds, IconLoadingConfig, IconProfile},
    geo::{LatLng, Point},
    viewport::Viewport,
};

pub use crate::data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry};

pub use crate::fetch::{decode_image, CachedFetcher, ImageFetcher};

#[cfg(feature = "tokio-runtime")]
pub use crate::fetch::AssetFetcher;

#[cfg(feature = "http")]
pub use crate::fetch::HttpFetcher;

pub use crate::icons::{
    descriptor::{DescriptorId, IconDescriptor},
    loader::{load_all, LoadReport},
    provision,
    resolver::{resolve, IconKind, IconWorkItem},
};

pub use crate::interaction::{
    dispatcher::{attach, DispatcherHandle},
    feature::{CategoryField, FeatureSummary},
    names::{CategoryDirectory, NameResolver},
    popup::PopupContent,
};

pub use crate::layers::icon::IconLayer;

pub use crate::surface::{
    memory::MemorySurface, CameraTarget, ClickEvent, IconSurface, InteractiveSurface,
    MoveEvent, PopupHandle,
};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
