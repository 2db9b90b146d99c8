//! Collaborator seams: document text, live layout measurement, overlay drawing
//!
//! The engine never decodes documents, owns layout, or touches a canvas.
//! Everything it needs from the hosting viewer comes through these three
//! traits; everything it produces goes back out through them.

use crate::config::FillColor;
use crate::geometry::RectPx;
use crate::highlight::HighlightBox;
use crate::text_layer::RunId;

/// Errors from the document side of the fence.
#[derive(Debug, thiserror::Error)]
pub enum SourceFault {
    #[error("page {page} is not available")]
    PageUnavailable { page: usize },

    #[error("{detail}")]
    Generic { detail: String },
}

impl SourceFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Supplies page text. Implementations are called from worker threads, so
/// they must be shareable; a decode handle behind a mutex is typical.
pub trait DocumentSource: Send + Sync {
    /// Total pages in the document.
    fn page_count(&self) -> usize;

    /// The text runs of a page, in reading order. A run is one leaf
    /// text-bearing primitive; extraction gives no whitespace guarantees
    /// between runs (the locator tolerates that).
    fn page_runs(&self, page: usize) -> Result<Vec<String>, SourceFault>;
}

/// Live layout measurement at the current scale.
///
/// All rectangles are absolute (viewport frame). Every method returns
/// `None` when the thing being measured is not currently mounted (an
/// evicted page, a run mid re-render). Callers treat `None` as "stale,
/// retry later", never as an error.
pub trait LayoutProbe {
    /// Bounding box of a page's surface.
    fn page_box(&self, page: usize) -> Option<RectPx>;

    /// Bounding box of a whole text run.
    fn run_box(&self, run: RunId) -> Option<RectPx>;

    /// Bounding box of the single character at char index `index` within
    /// the run. `None` when the run is unmounted or the index is out of
    /// range.
    fn char_box(&self, run: RunId, index: usize) -> Option<RectPx>;

    /// The topmost highlightable text run under an absolute point, if any.
    /// Highlightable means a presentation text leaf; page chrome and
    /// margins yield `None`.
    fn run_at(&self, x: f32, y: f32) -> Option<RunId>;
}

/// Receives paint instructions for per-page overlay surfaces.
///
/// A page whose overlay is not mounted should no-op; the engine will issue
/// a fresh paint when that overlay reports ready.
pub trait OverlayPainter {
    /// Replace the page's overlay content with the given boxes
    /// (page-relative coordinates) using the given fill.
    fn paint(&mut self, page: usize, boxes: &[HighlightBox], fill: FillColor);

    /// Wipe the page's overlay.
    fn clear(&mut self, page: usize);
}
