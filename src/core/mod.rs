pub mod config;
pub mod constants;
pub mod geo;
pub mod viewport;

pub use config::{DispatcherOptions, IconBounds, IconLoadingConfig, IconProfile};
pub use geo::{LatLng, Point};
pub use viewport::Viewport;
