mod common;

#[cfg(test)]
mod interaction_tests {
    use super::common::{init_logging, surface_with, MockFetcher};
    use fairmap::data::geojson::GeoJsonFeature;
    use fairmap::{
        attach, CategoryDirectory, DispatcherOptions, IconDescriptor, InteractiveSurface, LatLng,
        MemorySurface, Point,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn names(id: u64) -> String {
        match id {
            12 => "Food".to_string(),
            34 => "Crafts".to_string(),
            _ => "Unknown".to_string(),
        }
    }

    fn surface() -> Arc<MemorySurface> {
        init_logging();
        surface_with(&MockFetcher::new())
    }

    fn stall(categories: serde_json::Value) -> GeoJsonFeature {
        GeoJsonFeature::point_with(
            [8.54, 47.37],
            json!({
                "title": "Lemonade Stand",
                "description": "Fresh & cold",
                "type": "service",
                "categories": categories,
                "is_accessible": true
            }),
        )
    }

    fn click(surface: &MemorySurface, feature: GeoJsonFeature) -> usize {
        let at = feature.position().unwrap();
        surface.click("marker-icon", at, vec![feature])
    }

    #[test]
    fn test_click_lists_resolved_categories() {
        let surface = surface();
        let handle = attach(surface.clone(), names, DispatcherOptions::default());

        assert_eq!(click(&surface, stall(json!("[12,34]"))), 1);

        let popups = surface.popups();
        assert_eq!(popups.len(), 1);
        assert!(handle.has_open_popup());
        let content = &popups[0].content;
        assert!(content.contains("<p class=\"popup-category\">Food, Crafts</p>"));
        assert!(content.contains("<h3>Lemonade Stand</h3>"));
        assert!(content.contains("Fresh &amp; cold"));
        assert!(content.contains("<strong>Accessible</strong>"));
        assert!(content.contains("<p class=\"popup-type\">Service</p>"));
    }

    #[test]
    fn test_malformed_categories_render_without_category_line() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!("[12,")));

        let popups = surface.popups();
        assert_eq!(popups.len(), 1);
        assert!(!popups[0].content.contains("popup-category"));
        assert!(popups[0].content.contains("Lemonade Stand"));
    }

    #[test]
    fn test_native_category_list() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!([{"id": 34}, "12"])));

        assert!(surface.popups()[0].content.contains("Crafts, Food"));
    }

    #[test]
    fn test_teardown_twice_is_safe() {
        let surface = surface();
        let mut handle = attach(surface.clone(), names, DispatcherOptions::default());
        assert_eq!(surface.handler_counts(), (1, 1));

        click(&surface, stall(json!("[12]")));
        assert_eq!(surface.open_popup_count(), 1);

        handle.teardown();
        handle.teardown();

        assert!(handle.is_torn_down());
        assert!(!handle.has_open_popup());
        assert_eq!(surface.open_popup_count(), 0);
        assert_eq!(surface.handler_counts(), (0, 0));

        assert_eq!(click(&surface, stall(json!("[12]"))), 0);
        assert_eq!(surface.open_popup_count(), 0);
    }

    #[test]
    fn test_dropping_handle_tears_down() {
        let surface = surface();
        {
            let _handle = attach(surface.clone(), names, DispatcherOptions::default());
            click(&surface, stall(json!("[12]")));
            assert_eq!(surface.open_popup_count(), 1);
        }
        assert_eq!(surface.open_popup_count(), 0);
        assert_eq!(surface.handler_counts(), (0, 0));
    }

    #[test]
    fn test_new_click_replaces_popup() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!("[12]")));
        let other = GeoJsonFeature::point_with([8.55, 47.38], json!({"name": "Main Stage"}));
        click(&surface, other);

        let popups = surface.popups();
        assert_eq!(popups.len(), 1);
        assert!(popups[0].content.contains("Main Stage"));
        assert!(!popups[0].content.contains("Lemonade"));
    }

    #[test]
    fn test_click_flies_to_feature() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!([])));

        let viewport = surface.viewport();
        assert!((viewport.center.lat - 47.37).abs() < 1e-9);
        assert!((viewport.center.lng - 8.54).abs() < 1e-9);
        assert_eq!(viewport.zoom, 17.0);
        assert_eq!(surface.popups()[0].position, Some(Point::new(400.0, 300.0)));
    }

    #[test]
    fn test_popup_follows_camera_moves() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());
        let feature = stall(json!([]));
        let anchor = feature.position().unwrap();

        click(&surface, feature);
        surface.pan_by(Point::new(120.0, -40.0));

        let position = surface.popups()[0].position.unwrap();
        assert_eq!(position, surface.project(anchor));
        assert!(position.distance_to(&Point::new(400.0, 300.0)) > 100.0);
    }

    #[test]
    fn test_moves_without_popup_are_ignored() {
        let surface = surface();
        let handle = attach(surface.clone(), names, DispatcherOptions::default());

        surface.set_view(LatLng::new(10.0, 10.0), 12.0);
        surface.pan_by(Point::new(5.0, 5.0));

        assert!(!handle.has_open_popup());
        assert_eq!(surface.open_popup_count(), 0);
    }

    #[test]
    fn test_close_popup() {
        let surface = surface();
        let handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!("[12]")));
        handle.close_popup();

        assert!(!handle.has_open_popup());
        assert_eq!(surface.open_popup_count(), 0);
        assert_eq!(surface.handler_counts(), (1, 1));
    }

    #[test]
    fn test_longitude_unwrapped_toward_click() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        let feature = GeoJsonFeature::point_with([10.0, 50.0], json!({"title": "Far east"}));
        surface.click("marker-icon", LatLng::new(50.0, 370.2), vec![feature]);

        assert!((surface.viewport().center.lng - 370.0).abs() < 1e-9);
    }

    #[test]
    fn test_features_without_point_are_ignored() {
        let surface = surface();
        let _handle = attach(surface.clone(), names, DispatcherOptions::default());

        let feature = GeoJsonFeature {
            id: None,
            geometry: None,
            properties: None,
        };
        surface.click("marker-icon", LatLng::new(0.0, 0.0), vec![feature]);
        surface.click("marker-icon", LatLng::new(0.0, 0.0), Vec::new());

        assert_eq!(surface.open_popup_count(), 0);
    }

    #[test]
    fn test_only_configured_layers_respond() {
        let surface = surface();
        let _marker_only = attach(surface.clone(), names, DispatcherOptions::default());
        let feature = stall(json!([]));

        assert_eq!(
            surface.click("cluster-icon", feature.position().unwrap(), vec![feature]),
            0
        );

        let both = surface_with(&MockFetcher::new());
        let _handle = attach(both.clone(), names, DispatcherOptions::all_icon_layers());
        assert_eq!(both.handler_counts(), (2, 1));
    }

    #[test]
    fn test_custom_fly_to_zoom_and_directory_names() {
        let surface = surface();
        let directory = CategoryDirectory::from_descriptors(&[
            IconDescriptor::new(12).with_name("Food"),
        ]);
        let options = DispatcherOptions {
            fly_to_zoom: 14.0,
            ..DispatcherOptions::default()
        };
        let _handle = attach(surface.clone(), directory, options);

        click(&surface, stall(json!("[12, 99]")));

        assert_eq!(surface.viewport().zoom, 14.0);
        assert!(surface.popups()[0].content.contains("Food, Unknown"));
    }

    #[test]
    fn test_surface_destroyed_before_teardown() {
        let surface = surface();
        let mut handle = attach(surface.clone(), names, DispatcherOptions::default());

        click(&surface, stall(json!("[12]")));
        surface.destroy();
        drop(surface);

        handle.teardown();
        assert!(!handle.has_open_popup());
    }
}
