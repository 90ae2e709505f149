//! Scroll measurements and edge proximity.
//!
//! Detecting that the viewport is near the end of its content is a platform
//! measurement; this module reduces it to a yes/no proximity signal so the
//! reveal state machine never sees raw scroll positions.

use serde::{Deserialize, Serialize};

/// A snapshot of one scroll axis, in pixels.
///
/// For the board container this is the horizontal axis; for the page it is
/// the vertical one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Scroll position of the leading edge of the viewport.
    pub offset: f64,
    /// Visible extent of the viewport.
    pub viewport: f64,
    /// Total extent of the scrollable content.
    pub content: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, viewport: f64, content: f64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Whether the trailing edge of the viewport is within `threshold` of the
    /// end of the content. Content that fits in the viewport is always near
    /// its end.
    pub fn is_near_end(&self, threshold: f64) -> bool {
        self.offset + self.viewport >= self.content - threshold
    }
}
