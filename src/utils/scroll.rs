use crate::libs::dom::Document;
use crate::utils::time::round_half_up;

/// Scroll geometry of the document root, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self { scroll_top, scroll_height, client_height }
    }

    pub fn is_scrollable(&self) -> bool {
        self.scroll_height - self.client_height > 0.0
    }
}

/// How far the reader has scrolled, as a rounded percentage.
///
/// A page that cannot scroll has no meaningful percentage: the result is NaN
/// (nothing scrolled) or infinite, and callers are expected to check
/// [`ScrollMetrics::is_scrollable`] or `is_finite` if they care.
pub fn scroll_percentage(metrics: ScrollMetrics) -> f64 {
    let scrollable = metrics.scroll_height - metrics.client_height;
    round_half_up((metrics.scroll_top / scrollable) * 100.0)
}

pub fn scroll_percentage_of(document: &dyn Document) -> f64 {
    scroll_percentage(document.scroll_metrics())
}
