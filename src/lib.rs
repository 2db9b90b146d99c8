//! Search-match and drag-selection highlighting for paginated viewers
//! that virtualize their pages.
//!
//! The host supplies three capabilities: a [`DocumentSource`] that yields
//! raw run strings per page, a [`LayoutProbe`] that measures on-screen
//! geometry, and an [`OverlayPainter`] that draws boxes. Page text is
//! materialized off-thread by [`TextLayerService`] into a shared
//! [`TextArena`]; [`HighlightEngine`] locates the active query in the
//! loaded window, maps it to page-relative pixel boxes, and tracks pointer
//! drags that select text to search for.

pub mod config;
pub mod geometry;
pub mod highlight;
pub mod provider;
pub mod text_layer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{EngineConfig, FillColor};
pub use geometry::{BoundingBox, RectPx};
pub use highlight::{HighlightBox, HighlightEngine, PointerEvent, PointerPhase, Query};
pub use provider::{DocumentSource, LayoutProbe, OverlayPainter, SourceFault};
pub use text_layer::{TextArena, TextLayerEvent, TextLayerService};
