use crate::core::geo::LatLng;
use crate::interaction::feature::FeatureSummary;
use crate::interaction::names::NameResolver;
use crate::surface::{InteractiveSurface, PopupHandle};
use std::fmt::Write;

/// Rendered popup content for a clicked feature
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub description: Option<String>,
    pub accessible: bool,
    pub category_names: Vec<String>,
    pub kind: Option<String>,
}

impl PopupContent {
    /// Resolves the summary's category ids through `names`
    pub fn from_summary<R: NameResolver + ?Sized>(summary: &FeatureSummary, names: &R) -> Self {
        Self {
            title: summary.title.clone(),
            description: summary.description.clone(),
            accessible: summary.accessible,
            category_names: summary
                .category_ids
                .iter()
                .map(|&id| names.category_name(id))
                .collect(),
            kind: summary.kind.clone(),
        }
    }

    /// Comma separated category names, empty when there are none
    pub fn category_line(&self) -> String {
        self.category_names.join(", ")
    }

    pub fn to_html(&self) -> String {
        let class = self
            .kind
            .as_deref()
            .map(|kind| kind.to_lowercase().replace(char::is_whitespace, "-"))
            .unwrap_or_else(|| "feature".to_string());

        let mut html = String::new();
        // Writing into a String cannot fail
        let _ = write!(html, "<div class=\"{}-popup\">", escape(&class));
        let _ = write!(html, "<h3>{}</h3>", escape(&self.title));
        if let Some(description) = &self.description {
            let _ = write!(html, "<p>{}</p>", escape(description));
        }
        if self.accessible {
            html.push_str("<p><strong>Accessible</strong></p>");
        }
        if !self.category_names.is_empty() {
            let _ = write!(
                html,
                "<p class=\"popup-category\">{}</p>",
                escape(&self.category_line())
            );
        }
        if let Some(kind) = &self.kind {
            let _ = write!(html, "<p class=\"popup-type\">{}</p>", escape(kind));
        }
        html.push_str("</div>");
        html
    }
}

/// Escapes text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The one popup a dispatcher keeps open, anchored to a geographic point
pub struct ActivePopup {
    handle: Box<dyn PopupHandle>,
    anchor: LatLng,
}

impl ActivePopup {
    pub fn open<S: InteractiveSurface + ?Sized>(surface: &S, anchor: LatLng, html: &str) -> Self {
        let mut handle = surface.create_popup();
        handle.set_content(html);
        handle.set_position(surface.project(anchor));
        Self { handle, anchor }
    }

    pub fn anchor(&self) -> LatLng {
        self.anchor
    }

    /// Moves the popup to where its anchor is in the current view
    pub fn reposition<S: InteractiveSurface + ?Sized>(&mut self, surface: &S) {
        let position = surface.project(self.anchor);
        self.handle.set_position(position);
    }

    pub fn close(mut self) {
        self.handle.destroy();
    }
}

impl std::fmt::Debug for ActivePopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivePopup")
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}
