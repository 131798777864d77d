//! Click handling on icon layers
//!
//! [`attach`] subscribes to clicks on the configured layers and to camera
//! moves. A click flies the camera to the clicked feature and replaces the
//! open popup with a summary of that feature; camera moves keep the popup on
//! its geographic anchor. All of it is undone by [`DispatcherHandle`].

use crate::core::config::DispatcherOptions;
use crate::interaction::feature::FeatureSummary;
use crate::interaction::names::NameResolver;
use crate::interaction::popup::{ActivePopup, PopupContent};
use crate::surface::{
    CameraTarget, ClickEvent, ClickHandler, HandlerId, InteractiveSurface, MoveEvent, MoveHandler,
};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Debug, Default)]
struct DispatcherState {
    active: Option<ActivePopup>,
    torn_down: bool,
}

type SharedState = Arc<Mutex<DispatcherState>>;

fn lock(state: &Mutex<DispatcherState>) -> MutexGuard<'_, DispatcherState> {
    // A panicking handler must not wedge the dispatcher
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Wires click and move handling into `surface`.
///
/// Handlers keep only a weak reference to the surface, so a dropped surface
/// turns them into no-ops.
pub fn attach<S, R>(surface: Arc<S>, names: R, options: DispatcherOptions) -> DispatcherHandle
where
    S: InteractiveSurface + 'static,
    R: NameResolver + 'static,
{
    let state: SharedState = Arc::new(Mutex::new(DispatcherState::default()));
    let names: Arc<dyn NameResolver> = Arc::new(names);
    let weak: Weak<dyn InteractiveSurface> = {
        let surface: Arc<dyn InteractiveSurface> = surface.clone();
        Arc::downgrade(&surface)
    };

    let mut handler_ids = Vec::with_capacity(options.layers.len() + 1);

    for layer in &options.layers {
        let handler: ClickHandler = {
            let state = state.clone();
            let names = names.clone();
            let weak = weak.clone();
            let zoom = options.fly_to_zoom;
            Arc::new(move |event: &ClickEvent| {
                if let Some(surface) = weak.upgrade() {
                    handle_click(&*surface, &state, &*names, zoom, event);
                }
            })
        };
        handler_ids.push(surface.on_click(layer, handler));
    }

    let move_handler: MoveHandler = {
        let state = state.clone();
        let weak = weak.clone();
        Arc::new(move |_: &MoveEvent| {
            if let Some(surface) = weak.upgrade() {
                if let Some(popup) = lock(&state).active.as_mut() {
                    popup.reposition(&*surface);
                }
            }
        })
    };
    handler_ids.push(surface.on_move(move_handler));

    log::debug!(
        "dispatcher attached to layers {:?} ({} handlers)",
        options.layers,
        handler_ids.len()
    );

    DispatcherHandle {
        surface: Some(weak),
        handler_ids,
        state,
    }
}

fn handle_click(
    surface: &dyn InteractiveSurface,
    state: &Mutex<DispatcherState>,
    names: &dyn NameResolver,
    zoom: f64,
    event: &ClickEvent,
) {
    if lock(state).torn_down {
        return;
    }

    let Some(feature) = event.features.first() else {
        log::debug!("click on {} without features", event.layer_id);
        return;
    };
    let Some(position) = feature.position() else {
        log::error!(
            "clicked feature on {} has no point geometry",
            event.layer_id
        );
        return;
    };
    let anchor = position.unwrapped_near(event.lat_lng.lng);

    let summary = FeatureSummary::from_feature(feature);
    let content = PopupContent::from_summary(&summary, names);
    log::info!(
        "{} clicked (categories: {})",
        summary.title,
        content.category_line()
    );

    // fly_to emits move events, which take the state lock
    surface.fly_to(CameraTarget::new(anchor, Some(zoom)));

    let mut state = lock(state);
    if state.torn_down {
        return;
    }
    if let Some(previous) = state.active.take() {
        previous.close();
    }
    state.active = Some(ActivePopup::open(surface, anchor, &content.to_html()));
}

/// Owns everything [`attach`] set up. Dropping it tears the dispatcher down.
pub struct DispatcherHandle {
    surface: Option<Weak<dyn InteractiveSurface>>,
    handler_ids: Vec<HandlerId>,
    state: SharedState,
}

impl DispatcherHandle {
    /// Removes all handlers and closes the open popup. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        let Some(weak) = self.surface.take() else {
            return;
        };

        let popup = {
            let mut state = lock(&self.state);
            state.torn_down = true;
            state.active.take()
        };
        if let Some(popup) = popup {
            popup.close();
        }

        match weak.upgrade() {
            Some(surface) => {
                for id in self.handler_ids.drain(..) {
                    if !surface.off(id) {
                        log::debug!("handler {} was already removed", id);
                    }
                }
            }
            None => self.handler_ids.clear(),
        }
        log::debug!("dispatcher torn down");
    }

    /// Closes the open popup, if any
    pub fn close_popup(&self) {
        let popup = lock(&self.state).active.take();
        if let Some(popup) = popup {
            popup.close();
        }
    }

    pub fn has_open_popup(&self) -> bool {
        lock(&self.state).active.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.surface.is_none()
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for DispatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("handler_ids", &self.handler_ids)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}
