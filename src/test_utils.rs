//! Shared fakes for engine and integration tests
//!
//! [`GridLayout`] models a monospaced viewer: pages stacked vertically,
//! every run on its own line, every character a fixed-width cell. The
//! geometry is predictable enough to assert exact pixel rectangles.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::FillColor;
use crate::geometry::RectPx;
use crate::highlight::{HighlightBox, HighlightEngine, PointerEvent, Query};
use crate::provider::{DocumentSource, LayoutProbe, OverlayPainter, SourceFault};
use crate::text_layer::{PageText, RunId, TextArena};

const CHAR_W: f32 = 8.0;
const LINE_H: f32 = 12.0;
const PAGE_W: f32 = 200.0;
const PAGE_H: f32 = 100.0;
const INSET: f32 = 10.0;

/// Insert every page's assembled text straight into the arena, skipping
/// the worker round-trip.
pub fn materialize_all(arena: &TextArena, pages: &[&[&str]]) {
    for (page, runs) in pages.iter().enumerate() {
        arena.insert(Arc::new(PageText::assemble(
            page,
            runs.iter().map(|r| (*r).to_string()).collect(),
        )));
    }
}

/// In-memory document source serving fixed run strings per page.
pub struct FakeDocument {
    pages: Vec<Vec<String>>,
}

impl FakeDocument {
    #[must_use]
    pub fn new(pages: &[&[&str]]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|runs| runs.iter().map(|r| (*r).to_string()).collect())
                .collect(),
        })
    }
}

impl DocumentSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_runs(&self, page: usize) -> Result<Vec<String>, SourceFault> {
        self.pages
            .get(page)
            .cloned()
            .ok_or(SourceFault::PageUnavailable { page })
    }
}

/// Monospaced layout probe over the same page/run fixture.
///
/// Clones share state: killing a run or changing the scale through the
/// test's handle is visible to the engine's copy.
#[derive(Clone)]
pub struct GridLayout {
    pages: Rc<Vec<Vec<String>>>,
    dead_runs: Rc<RefCell<HashSet<RunId>>>,
    scale: Rc<Cell<f32>>,
}

impl GridLayout {
    #[must_use]
    pub fn new(pages: &[&[&str]]) -> Self {
        Self {
            pages: Rc::new(
                pages
                    .iter()
                    .map(|runs| runs.iter().map(|r| (*r).to_string()).collect())
                    .collect(),
            ),
            dead_runs: Rc::default(),
            scale: Rc::new(Cell::new(1.0)),
        }
    }

    /// Make a run unmeasurable, as if its page were mid-render.
    pub fn kill_run(&self, run: RunId) {
        self.dead_runs.borrow_mut().insert(run);
    }

    pub fn revive_all(&self) {
        self.dead_runs.borrow_mut().clear();
    }

    /// Change the render scale; all reported geometry multiplies by it.
    pub fn set_scale(&self, scale: f32) {
        self.scale.set(scale);
    }

    /// Absolute center of a character cell, handy for pointer scripts.
    #[must_use]
    pub fn char_center(&self, run: RunId, index: usize) -> (f32, f32) {
        let s = self.scale.get();
        (
            (INSET + (index as f32 + 0.5) * CHAR_W) * s,
            (run.page as f32 * PAGE_H + INSET + (run.run as f32 + 0.5) * LINE_H) * s,
        )
    }

    fn run_chars(&self, run: RunId) -> Option<usize> {
        Some(self.pages.get(run.page)?.get(run.run)?.chars().count())
    }
}

impl LayoutProbe for GridLayout {
    fn page_box(&self, page: usize) -> Option<RectPx> {
        let s = self.scale.get();
        (page < self.pages.len())
            .then(|| RectPx::new(0.0, page as f32 * PAGE_H * s, PAGE_W * s, PAGE_H * s))
    }

    fn run_box(&self, run: RunId) -> Option<RectPx> {
        if self.dead_runs.borrow().contains(&run) {
            return None;
        }
        let chars = self.run_chars(run)?;
        let s = self.scale.get();
        Some(RectPx::new(
            INSET * s,
            (run.page as f32 * PAGE_H + INSET + run.run as f32 * LINE_H) * s,
            chars as f32 * CHAR_W * s,
            LINE_H * s,
        ))
    }

    fn char_box(&self, run: RunId, index: usize) -> Option<RectPx> {
        if index >= self.run_chars(run)? {
            return None;
        }
        let run_box = self.run_box(run)?;
        let s = self.scale.get();
        Some(RectPx::new(
            run_box.left + index as f32 * CHAR_W * s,
            run_box.top,
            CHAR_W * s,
            run_box.height,
        ))
    }

    fn run_at(&self, x: f32, y: f32) -> Option<RunId> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let s = self.scale.get();
        let page = (y / (PAGE_H * s)) as usize;
        let runs = self.pages.get(page)?;

        let rel_y = y - (page as f32 * PAGE_H + INSET) * s;
        if rel_y < 0.0 {
            return None;
        }
        let row = (rel_y / (LINE_H * s)) as usize;
        if row >= runs.len() {
            return None;
        }

        let run = RunId::new(page, row);
        self.run_box(run)?.contains(x, y).then_some(run)
    }
}

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintEvent {
    Painted {
        page: usize,
        boxes: Vec<HighlightBox>,
        fill: FillColor,
    },
    Cleared {
        page: usize,
    },
}

/// Overlay painter that logs calls; clones share the log.
#[derive(Clone, Default)]
pub struct RecordingPainter {
    log: Rc<RefCell<Vec<PaintEvent>>>,
}

impl RecordingPainter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<PaintEvent> {
        self.log.borrow().clone()
    }

    pub fn reset(&self) {
        self.log.borrow_mut().clear();
    }

    /// Pages painted with boxes since the last reset, in call order.
    #[must_use]
    pub fn painted_pages(&self) -> Vec<usize> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                PaintEvent::Painted { page, .. } => Some(*page),
                PaintEvent::Cleared { .. } => None,
            })
            .collect()
    }
}

impl OverlayPainter for RecordingPainter {
    fn paint(&mut self, page: usize, boxes: &[HighlightBox], fill: FillColor) {
        self.log.borrow_mut().push(PaintEvent::Painted {
            page,
            boxes: boxes.to_vec(),
            fill,
        });
    }

    fn clear(&mut self, page: usize) {
        self.log.borrow_mut().push(PaintEvent::Cleared { page });
    }
}

/// Fluent pointer script for drag scenarios.
///
/// Pair with [`GridLayout::char_center`] so tests read as "press on
/// this character" instead of raw pixel literals.
#[derive(Default)]
pub struct DragScript {
    events: Vec<PointerEvent>,
}

impl DragScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Press at a position. Real pointers report a move at the press
    /// position too, so the script does as well.
    #[must_use]
    pub fn press(mut self, at: (f32, f32)) -> Self {
        self.events.push(PointerEvent::down(at.0, at.1));
        self.events.push(PointerEvent::moved(at.0, at.1));
        self
    }

    #[must_use]
    pub fn drag_to(mut self, at: (f32, f32)) -> Self {
        self.events.push(PointerEvent::moved(at.0, at.1));
        self
    }

    /// Release at the last position.
    #[must_use]
    pub fn release(mut self) -> Self {
        let (x, y) = self
            .events
            .last()
            .map_or((0.0, 0.0), |event| (event.x, event.y));
        self.events.push(PointerEvent::up(x, y));
        self
    }

    /// Feed the script to an engine, answering the final emission.
    pub fn run<L, P>(self, engine: &mut HighlightEngine<L, P>) -> Option<Query>
    where
        L: LayoutProbe,
        P: OverlayPainter,
    {
        let mut emitted = None;
        for event in self.events {
            if let Some(query) = engine.handle_pointer(event) {
                emitted = Some(query);
            }
        }
        emitted
    }
}
