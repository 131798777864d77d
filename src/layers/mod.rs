//! Layer descriptions handed to the rendering surface

pub mod icon;

pub use icon::{IconAnchor, IconLayer};
