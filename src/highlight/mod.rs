//! Query highlighting and pointer selection over paged text

mod cache;
mod engine;
mod focus;
mod locator;
mod selection;
mod span_map;
mod state;
mod types;

pub use cache::GeometryCache;
pub use engine::{HighlightEngine, PointerEvent, PointerPhase};
pub use focus::SortedRun;
pub use locator::{ConcatenatedIndex, IndexEntry, locate};
pub use selection::SelectionTracker;
pub use span_map::{MapFault, PageBoxes};
pub use types::{CharHit, HighlightBox, HighlightEnd, PageWindow, Query};
