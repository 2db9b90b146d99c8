//! Page-relative run geometry cache

use std::collections::HashMap;

use super::types::PageWindow;
use crate::geometry::RectPx;
use crate::provider::LayoutProbe;
use crate::text_layer::RunId;

/// Measured run boxes, page-relative. Probing layout is the expensive
/// part of box mapping, and run boxes only move on reflow, so entries
/// stay valid until a scale or document change wipes the lot.
///
/// Character boxes are never cached; they depend on query offsets.
#[derive(Debug, Default)]
pub struct GeometryCache {
    boxes: HashMap<RunId, RectPx>,
}

impl GeometryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached box for the run, measuring through the probe on a miss.
    /// `None` means the probe no longer knows the run or its page;
    /// callers treat that as stale geometry and nothing is cached.
    pub fn get_or_measure<P>(&mut self, run: RunId, probe: &P) -> Option<RectPx>
    where
        P: LayoutProbe + ?Sized,
    {
        if let Some(rect) = self.boxes.get(&run) {
            return Some(*rect);
        }

        let page_box = probe.page_box(run.page)?;
        let rect = probe.run_box(run)?.relative_to(&page_box);
        self.boxes.insert(run, rect);
        Some(rect)
    }

    pub fn invalidate_all(&mut self) {
        self.boxes.clear();
    }

    /// Drop cached boxes for pages outside the window.
    pub fn retain_window(&mut self, window: PageWindow) {
        self.boxes.retain(|run, _| window.contains(run.page));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
