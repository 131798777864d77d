//! Headless rendering surface
//!
//! Keeps registered icons, layers, handlers and popups in memory and drives a
//! [`Viewport`] for projection. Used by tests and by command line tooling
//! that needs a surface without a window.

use super::{
    CameraTarget, ClickEvent, ClickHandler, HandlerId, IconSurface, InteractiveSurface,
    MoveEvent, MoveHandler, PopupHandle,
};
use crate::core::{
    geo::{LatLng, Point},
    viewport::Viewport,
};
use crate::data::geojson::GeoJsonFeature;
use crate::fetch::{decode_image, ImageFetcher};
use crate::layers::icon::IconLayer;
use crate::prelude::HashMap;
use crate::{MapError, Result};
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Snapshot of a popup on a [`MemorySurface`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupRecord {
    pub position: Option<Point>,
    pub content: String,
}

type PopupTable = Mutex<BTreeMap<u64, PopupRecord>>;

#[derive(Default)]
struct HandlerTable {
    click: BTreeMap<HandlerId, (String, ClickHandler)>,
    moves: BTreeMap<HandlerId, MoveHandler>,
}

pub struct MemorySurface {
    fetcher: Arc<dyn ImageFetcher>,
    images: Mutex<HashMap<String, RgbaImage>>,
    layers: Mutex<Vec<IconLayer>>,
    viewport: Mutex<Viewport>,
    handlers: Mutex<HandlerTable>,
    popups: Arc<PopupTable>,
    next_id: AtomicU64,
    destroyed: AtomicBool,
}

impl MemorySurface {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            images: Mutex::new(HashMap::default()),
            layers: Mutex::new(Vec::new()),
            viewport: Mutex::new(Viewport::default()),
            handlers: Mutex::new(HandlerTable::default()),
            popups: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: AtomicU64::new(1),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        if let Ok(mut current) = self.viewport.lock() {
            *current = viewport;
        }
        self
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// A copy of the image registered under `id`
    pub fn image(&self, id: &str) -> Option<RgbaImage> {
        self.images.lock().ok()?.get(id).cloned()
    }

    pub fn image_count(&self) -> usize {
        self.images.lock().map(|images| images.len()).unwrap_or(0)
    }

    /// Registered icon ids, sorted
    pub fn image_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .images
            .lock()
            .map(|images| images.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn layer(&self, id: &str) -> Option<IconLayer> {
        self.layers
            .lock()
            .ok()?
            .iter()
            .find(|layer| layer.id == id)
            .cloned()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
            .lock()
            .map(|viewport| viewport.clone())
            .unwrap_or_default()
    }

    /// Open popups in creation order
    pub fn popups(&self) -> Vec<PopupRecord> {
        self.popups
            .lock()
            .map(|popups| popups.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn open_popup_count(&self) -> usize {
        self.popups.lock().map(|popups| popups.len()).unwrap_or(0)
    }

    /// Number of attached (click, move) handlers
    pub fn handler_counts(&self) -> (usize, usize) {
        self.handlers
            .lock()
            .map(|handlers| (handlers.click.len(), handlers.moves.len()))
            .unwrap_or((0, 0))
    }

    /// Simulates a click at `lat_lng` on `layer_id` hitting `features`.
    /// Returns the number of handlers that were invoked.
    pub fn click(&self, layer_id: &str, lat_lng: LatLng, features: Vec<GeoJsonFeature>) -> usize {
        let handlers: Vec<ClickHandler> = match self.handlers.lock() {
            Ok(handlers) => handlers
                .click
                .values()
                .filter(|(layer, _)| layer == layer_id)
                .map(|(_, handler)| handler.clone())
                .collect(),
            Err(_) => return 0,
        };

        let event = ClickEvent {
            layer_id: layer_id.to_string(),
            lat_lng,
            pixel: self.project(lat_lng),
            features,
        };

        // Handlers may call back into the surface, so no lock is held here
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Moves the camera and notifies move handlers
    pub fn set_view(&self, center: LatLng, zoom: f64) {
        let event = match self.viewport.lock() {
            Ok(mut viewport) => {
                viewport.set_center(center);
                viewport.set_zoom(zoom);
                MoveEvent {
                    center: viewport.center,
                    zoom: viewport.zoom,
                }
            }
            Err(_) => return,
        };
        self.emit_move(&event);
    }

    /// Pans the camera by a screen-space offset and notifies move handlers
    pub fn pan_by(&self, delta: Point) {
        let event = match self.viewport.lock() {
            Ok(mut viewport) => {
                viewport.pan_by(delta);
                MoveEvent {
                    center: viewport.center,
                    zoom: viewport.zoom,
                }
            }
            Err(_) => return,
        };
        self.emit_move(&event);
    }

    fn emit_move(&self, event: &MoveEvent) {
        let handlers: Vec<MoveHandler> = match self.handlers.lock() {
            Ok(handlers) => handlers.moves.values().cloned().collect(),
            Err(_) => return,
        };
        for handler in &handlers {
            handler(event);
        }
    }

    /// Tears the surface down: drops icons, layers, handlers and popups.
    /// Later registrations fail with [`MapError::SurfaceDestroyed`].
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        if let Ok(mut images) = self.images.lock() {
            images.clear();
        }
        if let Ok(mut layers) = self.layers.lock() {
            layers.clear();
        }
        // Dropping handlers may drop closures that own popups; release the
        // table lock first.
        let dropped = self.handlers.lock().map(|mut handlers| std::mem::take(&mut *handlers));
        drop(dropped);
        if let Ok(mut popups) = self.popups.lock() {
            popups.clear();
        }
    }
}

#[async_trait]
impl IconSurface for MemorySurface {
    fn has_image(&self, id: &str) -> bool {
        self.images
            .lock()
            .map(|images| images.contains_key(id))
            .unwrap_or(false)
    }

    async fn load_image(&self, url: &str) -> Result<DynamicImage> {
        let bytes = self.fetcher.fetch(url).await?;
        decode_image(&bytes)
    }

    fn add_image(&self, id: &str, image: RgbaImage) -> Result<()> {
        if self.is_destroyed() {
            return Err(MapError::SurfaceDestroyed);
        }

        let mut images = self.images.lock().map_err(|_| MapError::Register {
            identifier: id.to_string(),
            reason: "image registry lock poisoned".to_string(),
        })?;

        if images.contains_key(id) {
            return Err(MapError::Register {
                identifier: id.to_string(),
                reason: "an image with this id already exists".to_string(),
            });
        }

        images.insert(id.to_string(), image);
        Ok(())
    }

    fn add_layer(&self, layer: IconLayer) -> Result<()> {
        if self.is_destroyed() {
            return Err(MapError::SurfaceDestroyed);
        }

        let mut layers = self
            .layers
            .lock()
            .map_err(|_| MapError::Config("layer list lock poisoned".to_string()))?;

        if layers.iter().any(|existing| existing.id == layer.id) {
            return Err(MapError::Config(format!(
                "layer {} already exists",
                layer.id
            )));
        }

        layers.push(layer);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers
            .lock()
            .map(|layers| layers.iter().any(|layer| layer.id == id))
            .unwrap_or(false)
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl InteractiveSurface for MemorySurface {
    fn on_click(&self, layer_id: &str, handler: ClickHandler) -> HandlerId {
        let id = self.next_id();
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.click.insert(id, (layer_id.to_string(), handler));
        }
        id
    }

    fn on_move(&self, handler: MoveHandler) -> HandlerId {
        let id = self.next_id();
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.moves.insert(id, handler);
        }
        id
    }

    fn off(&self, id: HandlerId) -> bool {
        let removed = match self.handlers.lock() {
            Ok(mut handlers) => {
                let click = handlers.click.remove(&id).map(|(_, handler)| handler);
                let moved = handlers.moves.remove(&id);
                (click, moved)
            }
            Err(_) => return false,
        };
        removed.0.is_some() || removed.1.is_some()
    }

    fn fly_to(&self, target: CameraTarget) {
        let zoom = target.zoom.unwrap_or_else(|| self.viewport().zoom);
        self.set_view(target.center, zoom);
    }

    fn project(&self, lat_lng: LatLng) -> Point {
        self.viewport
            .lock()
            .map(|viewport| viewport.lat_lng_to_pixel(&lat_lng))
            .unwrap_or_default()
    }

    fn create_popup(&self) -> Box<dyn PopupHandle> {
        let id = self.next_id();
        if !self.is_destroyed() {
            if let Ok(mut popups) = self.popups.lock() {
                popups.insert(id, PopupRecord::default());
            }
        }
        Box::new(MemoryPopup {
            id,
            table: Arc::downgrade(&self.popups),
        })
    }
}

/// Popup handle pointing into a [`MemorySurface`]'s popup table. Holds no
/// strong reference to the surface.
struct MemoryPopup {
    id: u64,
    table: Weak<PopupTable>,
}

impl MemoryPopup {
    fn update(&self, apply: impl FnOnce(&mut PopupRecord)) {
        if let Some(table) = self.table.upgrade() {
            if let Ok(mut popups) = table.lock() {
                if let Some(record) = popups.get_mut(&self.id) {
                    apply(record);
                }
            }
        }
    }
}

impl PopupHandle for MemoryPopup {
    fn set_position(&mut self, position: Point) {
        self.update(|record| record.position = Some(position));
    }

    fn set_content(&mut self, html: &str) {
        self.update(|record| record.content = html.to_string());
    }

    fn destroy(&mut self) {
        if let Some(table) = self.table.upgrade() {
            if let Ok(mut popups) = table.lock() {
                popups.remove(&self.id);
            }
        }
        self.table = Weak::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct NoFetch;

    #[async_trait]
    impl ImageFetcher for NoFetch {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(MapError::Fetch {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn surface() -> MemorySurface {
        MemorySurface::new(Arc::new(NoFetch))
    }

    #[test]
    fn test_add_image_twice_is_register_error() {
        let surface = surface();
        surface.add_image("a", RgbaImage::new(2, 2)).unwrap();
        assert!(surface.has_image("a"));
        assert!(matches!(
            surface.add_image("a", RgbaImage::new(2, 2)),
            Err(MapError::Register { .. })
        ));
        assert_eq!(surface.image_count(), 1);
    }

    #[test]
    fn test_destroyed_surface_rejects_images() {
        let surface = surface();
        surface.add_image("a", RgbaImage::new(1, 1)).unwrap();
        surface.destroy();

        assert!(surface.is_destroyed());
        assert!(!surface.has_image("a"));
        assert!(matches!(
            surface.add_image("b", RgbaImage::new(1, 1)),
            Err(MapError::SurfaceDestroyed)
        ));
    }

    #[test]
    fn test_click_reaches_only_matching_layer() {
        let surface = surface();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = surface.on_click(
            "marker-icon",
            Arc::new(move |_: &ClickEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(surface.click("cluster-icon", LatLng::default(), Vec::new()), 0);
        assert_eq!(surface.click("marker-icon", LatLng::default(), Vec::new()), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(surface.off(id));
        assert!(!surface.off(id));
        assert_eq!(surface.click("marker-icon", LatLng::default(), Vec::new()), 0);
    }

    #[test]
    fn test_fly_to_notifies_move_handlers() {
        let surface = surface();
        let moves = Arc::new(Mutex::new(Vec::new()));
        let sink = moves.clone();
        surface.on_move(Arc::new(move |event: &MoveEvent| {
            sink.lock().unwrap().push(*event);
        }));

        let target = LatLng::new(39.96, -82.99);
        surface.fly_to(CameraTarget::new(target, Some(17.0)));

        let moves = moves.lock().unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].center, target);
        assert_eq!(moves[0].zoom, 17.0);
        assert_eq!(surface.project(target), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_popup_lifecycle() {
        let surface = surface();
        let mut popup = surface.create_popup();
        popup.set_content("<h3>Hi</h3>");
        popup.set_position(Point::new(10.0, 20.0));

        assert_eq!(
            surface.popups(),
            vec![PopupRecord {
                position: Some(Point::new(10.0, 20.0)),
                content: "<h3>Hi</h3>".to_string(),
            }]
        );

        popup.destroy();
        popup.destroy();
        assert_eq!(surface.open_popup_count(), 0);
    }

    #[test]
    fn test_custom_viewport_and_sorted_ids() {
        let center = LatLng::new(47.37, 8.54);
        let surface = surface().with_viewport(Viewport::new(center, 12.0, Point::new(200.0, 100.0)));
        assert_eq!(surface.viewport().zoom, 12.0);
        assert_eq!(surface.project(center), Point::new(100.0, 50.0));

        surface.add_image("marker-icon-b", RgbaImage::new(1, 1)).unwrap();
        surface.add_image("cluster-icon-a", RgbaImage::new(1, 1)).unwrap();
        assert_eq!(surface.image_ids(), vec!["cluster-icon-a", "marker-icon-b"]);
    }
}
