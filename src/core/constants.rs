//! Icon naming, default asset and layer constants shared across the crate.

/// Identifier of the fallback marker icon, always part of a resolved work list.
pub const DEFAULT_MARKER_ICON_ID: &str = "default-marker-icon";

/// Identifier of the fallback cluster icon, always part of a resolved work list.
pub const DEFAULT_CLUSTER_ICON_ID: &str = "default-cluster-icon";

/// Packaged asset used for markers whose descriptor carries no icon.
pub const DEFAULT_MARKER_ICON_PATH: &str = "/icons/default-map-icon.png";

/// Packaged asset used for clusters whose descriptor carries no icon.
pub const DEFAULT_CLUSTER_ICON_PATH: &str = "/icons/default-map-cluster-icon.png";

/// Symbol layer drawing single point features.
pub const MARKER_LAYER_ID: &str = "marker-icon";

/// Symbol layer drawing clustered point features.
pub const CLUSTER_LAYER_ID: &str = "cluster-icon";

/// Clustered GeoJSON source both icon layers read from.
pub const POINT_SOURCE_ID: &str = "points-clustered";

/// Zoom the camera flies to when an icon is clicked.
pub const FLY_TO_ZOOM: f64 = 17.0;

/// Default bounding box (width, height) for marker icons, in pixels.
pub const MARKER_ICON_MAX_SIZE: (u32, u32) = (96, 96);

/// Default bounding box (width, height) for cluster icons, in pixels.
pub const CLUSTER_ICON_MAX_SIZE: (u32, u32) = (64, 64);

/// Display name used when a category id has no known name.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";
