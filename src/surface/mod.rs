//! Capability interfaces of the rendering surface
//!
//! The loader and the dispatcher never talk to a concrete map renderer.
//! They need an icon registry with image loading ([`IconSurface`]) and
//! event subscription, camera control and popups ([`InteractiveSurface`]).
//! [`memory::MemorySurface`] implements both headlessly.

pub mod memory;

use crate::{
    core::geo::{LatLng, Point},
    data::geojson::GeoJsonFeature,
    layers::icon::IconLayer,
    Result,
};
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use std::sync::Arc;

/// Identifies a registered event handler for later removal
pub type HandlerId = u64;

pub type ClickHandler = Arc<dyn Fn(&ClickEvent) + Send + Sync>;
pub type MoveHandler = Arc<dyn Fn(&MoveEvent) + Send + Sync>;

/// Click or tap on a layer
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub layer_id: String,
    /// Geographic position of the pointer
    pub lat_lng: LatLng,
    /// Container pixel position of the pointer
    pub pixel: Point,
    /// Features of the layer under the pointer, topmost first
    pub features: Vec<GeoJsonFeature>,
}

/// Emitted on every camera change (pan, zoom, fly-to step)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvent {
    pub center: LatLng,
    pub zoom: f64,
}

/// Camera destination for `fly_to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub center: LatLng,
    /// Keep the current zoom when `None`
    pub zoom: Option<f64>,
}

impl CameraTarget {
    pub fn new(center: LatLng, zoom: Option<f64>) -> Self {
        Self { center, zoom }
    }
}

/// Icon registry and image loading of a rendering surface
#[async_trait]
pub trait IconSurface: Send + Sync {
    /// Whether an image is registered under `id`
    fn has_image(&self, id: &str) -> bool;

    /// Fetch and decode the image behind `url`
    async fn load_image(&self, url: &str) -> Result<DynamicImage>;

    /// Register a pixel buffer under `id`. Registering an id twice is an error.
    fn add_image(&self, id: &str, image: RgbaImage) -> Result<()>;

    fn add_layer(&self, layer: IconLayer) -> Result<()>;

    fn has_layer(&self, id: &str) -> bool;

    /// A destroyed surface must not be written to
    fn is_destroyed(&self) -> bool {
        false
    }
}

/// Event subscription, camera and popup primitives of a rendering surface
pub trait InteractiveSurface: Send + Sync {
    fn on_click(&self, layer_id: &str, handler: ClickHandler) -> HandlerId;

    fn on_move(&self, handler: MoveHandler) -> HandlerId;

    /// Remove a click or move handler. Returns false for unknown ids.
    fn off(&self, id: HandlerId) -> bool;

    fn fly_to(&self, target: CameraTarget);

    /// Container pixel position of a geographic coordinate in the current view
    fn project(&self, lat_lng: LatLng) -> Point;

    /// Create an empty, unpositioned popup
    fn create_popup(&self) -> Box<dyn PopupHandle>;
}

/// A popup living on the surface
pub trait PopupHandle: Send {
    fn set_position(&mut self, position: Point);

    fn set_content(&mut self, html: &str);

    /// Remove the popup from the surface. Further calls are no-ops.
    fn destroy(&mut self);
}
