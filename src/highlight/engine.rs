//! Highlight render coordinator

use std::collections::HashMap;

use log::{debug, warn};

use super::cache::GeometryCache;
use super::focus::{self, SortedRun};
use super::locator::{self, ConcatenatedIndex};
use super::selection::SelectionTracker;
use super::span_map::{self, PageBoxes};
use super::state::{Command, Effect, EngineState};
use super::types::{CharHit, HighlightBox, HighlightEnd, PageWindow, Query};
use crate::config::EngineConfig;
use crate::geometry::BoundingBox;
use crate::provider::{LayoutProbe, OverlayPainter};
use crate::text_layer::TextArena;

/// Pointer event phases the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Moved,
    Up,
}

/// One pointer event in the viewer's absolute coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
    /// Primary button held during the event.
    pub primary_down: bool,
}

impl PointerEvent {
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self { x, y, phase: PointerPhase::Down, primary_down: true }
    }

    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self { x, y, phase: PointerPhase::Moved, primary_down: true }
    }

    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self { x, y, phase: PointerPhase::Up, primary_down: false }
    }
}

/// Owns the page → box map and decides when to recompute it.
///
/// Hosts drive the engine from one event loop: query changes, window
/// moves, text-ready signals and pointer events go in, repaints come out
/// through the [`OverlayPainter`]. All coordinates handed in are absolute;
/// everything stored or handed back out is page-relative.
pub struct HighlightEngine<L, P> {
    config: EngineConfig,
    arena: TextArena,
    probe: L,
    painter: P,
    state: EngineState,
    cache: GeometryCache,
    sorted_runs: HashMap<usize, Vec<SortedRun>>,
    boxes: PageBoxes,
    tracker: SelectionTracker,
    tooltip: Option<(usize, BoundingBox)>,
}

impl<L, P> HighlightEngine<L, P>
where
    L: LayoutProbe,
    P: OverlayPainter,
{
    #[must_use]
    pub fn new(arena: TextArena, probe: L, painter: P, config: EngineConfig) -> Self {
        let state = EngineState::new(config.overscan);
        Self {
            config,
            arena,
            probe,
            painter,
            state,
            cache: GeometryCache::new(),
            sorted_runs: HashMap::new(),
            boxes: PageBoxes::new(),
            tracker: SelectionTracker::new(),
            tooltip: None,
        }
    }

    /// Set or clear the active search.
    pub fn set_query(&mut self, query: Option<Query>) {
        let effects = self.state.apply(Command::QuerySet(query));
        self.execute(effects);
    }

    /// The loaded page range changed (inclusive).
    pub fn set_page_window(&mut self, start: usize, end: usize) {
        let effects = self.state.apply(Command::WindowSet(PageWindow::new(start, end)));
        self.execute(effects);
    }

    /// The displayed page changed.
    pub fn set_current_page(&mut self, page: usize) {
        let effects = self.state.apply(Command::CurrentPageSet(page));
        self.execute(effects);
    }

    /// A page's text layer became available or was rebuilt.
    pub fn on_text_layer_ready(&mut self, page: usize) {
        let first_time = !self.sorted_runs.contains_key(&page);

        // Run identities for the page changed; measured boxes are void.
        self.cache.invalidate_all();
        self.rebuild_sorted_runs(page);

        let effects = self.state.apply(Command::PageReady { page, first_time });
        self.execute(effects);
    }

    /// A page's text failed to materialize.
    pub fn on_text_layer_failed(&mut self, page: usize) {
        warn!("text layer for page {page} failed, leaving highlights as-is");
        let effects = self.state.apply(Command::PageFailed { page });
        self.execute(effects);
    }

    /// A page's overlay surface mounted and wants its boxes painted.
    pub fn on_overlay_ready(&mut self, page: usize) {
        let effects = self.state.apply(Command::OverlayMounted(page));
        self.execute(effects);
    }

    /// Render scale changed; remeasure everything and relocate eagerly.
    pub fn on_scale_changed(&mut self) {
        self.sorted_runs.clear();
        let effects = self.state.apply(Command::ScaleChanged);
        self.execute(effects);
    }

    /// A different document was loaded. The query survives and relocates
    /// as the new document's pages become ready.
    pub fn on_document_changed(&mut self) {
        self.sorted_runs.clear();
        let effects = self.state.apply(Command::DocumentChanged);
        self.execute(effects);
    }

    /// Force remeasurement after host reflows that move runs within their
    /// pages. Plain scrolling never needs this: boxes are page-relative.
    pub fn invalidate_geometry(&mut self) {
        self.cache.invalidate_all();
    }

    /// Feed one pointer event. On release of a drag that selected text,
    /// answers the selected string as a query for the host to adopt.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Query> {
        match event.phase {
            PointerPhase::Down => {
                self.tracker.pointer_down();
                None
            }
            PointerPhase::Moved => {
                self.pointer_moved(event.x, event.y, event.primary_down);
                None
            }
            PointerPhase::Up => self.pointer_up(),
        }
    }

    /// Reset any in-progress drag without emitting (container unmounted,
    /// pointer capture lost).
    pub fn cancel_selection(&mut self) {
        self.tracker.cancel();
    }

    /// Current boxes for a page, page-relative.
    #[must_use]
    pub fn boxes_for(&self, page: usize) -> &[HighlightBox] {
        self.boxes.get(&page).map_or(&[], Vec::as_slice)
    }

    /// Bounding box of the first page holding any boxes, for tooltip
    /// placement. Suppressed during a drag.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(usize, BoundingBox)> {
        if self.tracker.is_dragging() {
            return None;
        }
        self.tooltip
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Relocate => self.relocate(),
                Effect::ClearHighlights => self.clear_highlights(),
                Effect::TrimCaches(band) => self.trim_caches(band),
                Effect::InvalidateGeometry => self.cache.invalidate_all(),
                Effect::ResetArena => self.arena.clear(),
                Effect::RepaintPage(page) => self.paint_page(page),
            }
        }
    }

    /// Locate the active query in the materialized window and rebuild the
    /// box map. Not-found clears the boxes but keeps the stale marker so
    /// the next ready signal retries; a geometry fault keeps the previous
    /// boxes for the same reason.
    fn relocate(&mut self) {
        let Some(query) = self.state.query().cloned() else {
            return;
        };

        let index = ConcatenatedIndex::build(&self.arena, self.state.window());
        let Some(range) = locator::locate(&index, &query) else {
            debug!("query not found in window, clearing boxes");
            self.boxes.clear();
            self.tooltip = None;
            self.repaint_window();
            return;
        };

        match span_map::boxes_for_range(&index, range, &mut self.cache, &self.probe) {
            Ok(boxes) => {
                self.boxes = boxes;
                self.state.mark_highlighted(&query.text);
                self.refresh_tooltip();
                self.repaint_window();
            }
            Err(fault) => {
                warn!("box mapping aborted: {fault}");
            }
        }
    }

    fn clear_highlights(&mut self) {
        self.boxes.clear();
        self.tooltip = None;
        self.repaint_window();
    }

    fn trim_caches(&mut self, band: PageWindow) {
        self.arena.retain_range(band.start, band.end);
        self.cache.retain_window(band);
        self.sorted_runs.retain(|page, _| band.contains(*page));
        self.boxes.retain(|page, _| band.contains(*page));
    }

    fn rebuild_sorted_runs(&mut self, page: usize) {
        let Some(text) = self.arena.get(page) else {
            self.sorted_runs.remove(&page);
            return;
        };

        match focus::sort_runs(page, &text, &self.probe) {
            Some(runs) => {
                self.sorted_runs.insert(page, runs);
            }
            None => {
                debug!("page {page} runs not measurable yet, sorted list deferred");
                self.sorted_runs.remove(&page);
            }
        }
    }

    fn refresh_tooltip(&mut self) {
        self.tooltip = self
            .boxes
            .iter()
            .find(|(_, list)| !list.is_empty())
            .and_then(|(page, list)| {
                BoundingBox::enclosing(list.iter().map(|b| b.rect)).map(|bb| (*page, bb))
            });
    }

    fn repaint_window(&mut self) {
        for page in self.state.window().pages() {
            self.paint_page(page);
        }
    }

    fn paint_page(&mut self, page: usize) {
        match self.boxes.get(&page) {
            Some(list) if !list.is_empty() => {
                self.painter.paint(page, list, self.config.highlight_fill);
            }
            _ => self.painter.clear(page),
        }
    }

    fn pointer_moved(&mut self, x: f32, y: f32, primary_down: bool) {
        if !self.tracker.is_dragging() || !primary_down {
            return;
        }

        match self.hit_test(x, y) {
            Some(end) => self.tracker.update_hover(end),
            None => {
                if let Some(end) = self.focus_endpoint(x, y) {
                    self.tracker.update_focus(end);
                }
            }
        }

        self.repaint_selection();
    }

    fn pointer_up(&mut self) -> Option<Query> {
        if !self.tracker.is_dragging() {
            return None;
        }

        let index = ConcatenatedIndex::build(&self.arena, self.state.window());
        let text = self.tracker.finish(&index)?;
        debug!("drag selected {} bytes", text.len());
        Some(Query::fuzzy(text))
    }

    /// Character under the pointer with run-relative pixel edges, via a
    /// linear scan over the run's character boxes. Runs are short enough
    /// that a binary search would not buy anything.
    fn hit_test(&self, x: f32, y: f32) -> Option<HighlightEnd> {
        let run = self.probe.run_at(x, y)?;
        let run_box = self.probe.run_box(run)?;
        let text = self.arena.get(run.page)?;
        let chars = text.run_text(run.run)?.chars().count();

        let mut hit = CharHit::run_start();
        for index in 0..chars {
            let Some(cb) = self.probe.char_box(run, index) else {
                continue;
            };
            if x >= cb.left && x < cb.right() {
                hit = CharHit {
                    index,
                    px_start: Some(cb.left - run_box.left),
                    px_end: Some(cb.right() - run_box.left),
                };
                break;
            }
        }

        Some(HighlightEnd {
            run,
            offset: hit.index,
            px_start: hit.px_start,
            px_end: hit.px_end,
        })
    }

    /// Snap a pointer over empty space to the nearest run edge. Only
    /// meaningful once a drag has an anchor.
    fn focus_endpoint(&self, x: f32, y: f32) -> Option<HighlightEnd> {
        self.tracker.endpoints()?;

        let page = focus::page_in_focus(self.state.window(), &self.probe, y)?;
        let page_box = self.probe.page_box(page)?;
        let runs = self.sorted_runs.get(&page)?;
        let backwards = self.tracker.is_backwards();

        let run = focus::closest_run(runs, x - page_box.left, y - page_box.top, backwards)?;

        let text = self.arena.get(page)?;
        let chars = text.run_text(run.run)?.chars().count();
        let offset = if backwards { 0 } else { chars.saturating_sub(1) };

        Some(HighlightEnd {
            run,
            offset,
            px_start: None,
            px_end: None,
        })
    }

    fn repaint_selection(&mut self) {
        let Some((anchor, current)) = self.tracker.endpoints() else {
            return;
        };

        let index = ConcatenatedIndex::build(&self.arena, self.state.window());
        let backwards = self.tracker.is_backwards();

        match span_map::boxes_for_selection(
            &index,
            &anchor,
            &current,
            backwards,
            &mut self.cache,
            &self.probe,
        ) {
            Ok(boxes) => {
                self.boxes = boxes;
                self.repaint_window();
            }
            Err(fault) => {
                debug!("selection mapping skipped: {fault}");
            }
        }
    }
}
