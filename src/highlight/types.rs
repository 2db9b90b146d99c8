//! Core types for highlight mapping and selection

use crate::geometry::RectPx;
use crate::text_layer::RunId;

/// Active search query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    /// Literal first-occurrence search instead of the fuzzy pattern
    pub exact: bool,
}

impl Query {
    #[must_use]
    pub fn fuzzy(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: false,
        }
    }

    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exact: true,
        }
    }
}

/// One endpoint of a live selection: a run, a character index within it,
/// and the pixel edges of that character relative to the run's left edge.
///
/// The pixel fields are `None` for endpoints synthesized by nearest-focus
/// resolution; `None` means "run edge" when boxes are trimmed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightEnd {
    pub run: RunId,
    /// Character index within the run
    pub offset: usize,
    /// Left edge of the character at `offset`
    pub px_start: Option<f32>,
    /// Right edge of the character at `offset`
    pub px_end: Option<f32>,
}

/// Character-level hit under the pointer within one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharHit {
    pub index: usize,
    pub px_start: Option<f32>,
    pub px_end: Option<f32>,
}

impl CharHit {
    /// Fallback when the pointer is inside the run box but between
    /// measurable characters: first character, edge semantics.
    #[must_use]
    pub const fn run_start() -> Self {
        Self {
            index: 0,
            px_start: None,
            px_end: None,
        }
    }
}

/// Page-relative highlight rectangle, carrying the sub-offsets that were
/// applied when it covers a run only partially.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightBox {
    pub rect: RectPx,
    /// Left trim relative to the source run box, when partial
    pub start_offset: Option<f32>,
    /// Right edge relative to the source run box, when partial
    pub end_offset: Option<f32>,
}

impl HighlightBox {
    /// Full-width box over a run.
    #[must_use]
    pub fn full(run_box: RectPx) -> Self {
        Self::trimmed(run_box, None, None)
    }

    /// Box over a run with optional pixel sub-offsets applied. `start`
    /// shifts the left edge right; `end` caps the right edge. Width never
    /// goes negative; degenerate inputs yield degenerate boxes.
    #[must_use]
    pub fn trimmed(run_box: RectPx, start: Option<f32>, end: Option<f32>) -> Self {
        let left_trim = start.unwrap_or(0.0);
        let right_cut = end.map_or(0.0, |px| run_box.width - px);
        let width = (run_box.width - left_trim - right_cut).max(0.0);

        Self {
            rect: RectPx::new(
                run_box.left + left_trim,
                run_box.top,
                width,
                run_box.height,
            ),
            start_offset: start,
            end_offset: end,
        }
    }
}

/// Inclusive range of materialized pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Tolerance band of `radius` pages around a center page.
    #[must_use]
    pub fn around(center: usize, radius: usize) -> Self {
        Self {
            start: center.saturating_sub(radius),
            end: center + radius,
        }
    }

    #[must_use]
    pub fn contains(&self, page: usize) -> bool {
        page >= self.start && page <= self.end
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self { start: 0, end: 0 }
    }
}
