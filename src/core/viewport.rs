use crate::core::geo::{LatLng, Point, EARTH_RADIUS};
use serde::{Deserialize, Serialize};

/// The current view of a map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 22.0),
            size,
            min_zoom: 0.0,
            max_zoom: 22.0,
        }
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    /// (Web Mercator, EPSG:3857, 256px tiles)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let mercator = lat_lng.to_mercator();
        let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS;

        let pixel_x = (mercator.x + std::f64::consts::PI * EARTH_RADIUS) / circumference * scale;
        let pixel_y = (-mercator.y + std::f64::consts::PI * EARTH_RADIUS) / circumference * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * circumference - std::f64::consts::PI * EARTH_RADIUS;
        let y = std::f64::consts::PI * EARTH_RADIUS - (pixel.y / scale) * circumference;

        LatLng::from_mercator(Point::new(x, y))
    }

    /// Converts geographical coordinates to container (screen) pixels, with
    /// the viewport center at the middle of the container
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center, None);
        self.project(lat_lng, None)
            .subtract(&origin)
            .add(&self.size.multiply(0.5))
    }

    /// Converts container pixels back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, None);
        let world = pixel.subtract(&self.size.multiply(0.5)).add(&origin);
        self.unproject(&world, None)
    }

    /// Moves the view by a screen-space offset
    pub fn pan_by(&mut self, delta: Point) {
        let center = self.size.multiply(0.5).add(&delta);
        let target = self.pixel_to_lat_lng(&center);
        self.set_center(target);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 15.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_container_middle() {
        let center = LatLng::new(39.9612, -82.9988);
        let viewport = Viewport::new(center, 16.0, Point::new(800.0, 600.0));

        let pixel = viewport.lat_lng_to_pixel(&center);
        assert!((pixel.x - 400.0).abs() < 1e-6);
        assert!((pixel.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_round_trip() {
        let viewport = Viewport::new(LatLng::new(40.0, -83.0), 14.0, Point::new(640.0, 480.0));
        let target = LatLng::new(40.001, -82.999);

        let back = viewport.pixel_to_lat_lng(&viewport.lat_lng_to_pixel(&target));
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_pan_shifts_point_on_screen() {
        let mut viewport = Viewport::new(LatLng::new(40.0, -83.0), 15.0, Point::new(800.0, 600.0));
        let anchor = LatLng::new(40.0, -83.0);
        let before = viewport.lat_lng_to_pixel(&anchor);

        viewport.pan_by(Point::new(100.0, 0.0));
        let after = viewport.lat_lng_to_pixel(&anchor);

        assert!((before.x - after.x - 100.0).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(40.0);
        assert_eq!(viewport.zoom, 22.0);
        viewport.set_zoom_limits(2.0, 18.0);
        assert_eq!(viewport.zoom, 18.0);
    }
}
