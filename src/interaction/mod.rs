//! Click interaction on icon layers

pub mod dispatcher;
pub mod feature;
pub mod names;
pub mod popup;

pub use dispatcher::{attach, DispatcherHandle};
pub use feature::{CategoryField, FeatureSummary};
pub use names::{CategoryDirectory, NameResolver};
pub use popup::{ActivePopup, PopupContent};
