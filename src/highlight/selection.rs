//! Drag selection state machine

use log::{debug, warn};

use super::locator::ConcatenatedIndex;
use super::types::HighlightEnd;

/// Pointer-driven selection: idle until pointerdown, then tracking an
/// anchor/current endpoint pair until release.
///
/// While the pointer stays inside the anchor's own run, the anchor follows
/// it; it freezes once the pointer crosses into another run. Selections
/// therefore anchor where the pointer left its starting run, not where the
/// press happened.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    dragging: bool,
    anchor: Option<HighlightEnd>,
    current: Option<HighlightEnd>,
    backwards: bool,
}

impl SelectionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `dragging`. No anchor yet; the first hovered run seeds it.
    pub fn pointer_down(&mut self) {
        self.dragging = true;
        self.anchor = None;
        self.current = None;
        self.backwards = false;
    }

    /// Pointer moved over a text run while dragging.
    pub fn update_hover(&mut self, end: HighlightEnd) {
        if !self.dragging {
            debug!("hover update while idle, ignoring");
            return;
        }

        let reseed = match &self.anchor {
            None => true,
            Some(anchor) => anchor.run == end.run && anchor.offset != end.offset,
        };
        if reseed {
            self.anchor = Some(end);
        }

        self.current = Some(end);
        self.recompute_direction();
    }

    /// Pointer moved over empty space; `end` came from nearest-focus
    /// resolution. Only meaningful once an anchor exists.
    pub fn update_focus(&mut self, end: HighlightEnd) {
        if !self.dragging || self.anchor.is_none() {
            debug!("focus update without an active anchor, ignoring");
            return;
        }

        self.current = Some(end);
        self.recompute_direction();
    }

    fn recompute_direction(&mut self) {
        let (Some(anchor), Some(current)) = (&self.anchor, &self.current) else {
            return;
        };

        self.backwards = if current.run == anchor.run {
            current.offset < anchor.offset
        } else {
            current.run < anchor.run
        };
    }

    /// Pointer released: materialize the selected text, reading forward
    /// regardless of drag direction, and reset to idle. Backwards
    /// selections end at the anchor character's left edge, excluding it.
    ///
    /// Range construction can fail when an endpoint's run is no longer in
    /// the window; the failure is logged and the emission skipped.
    pub fn finish(&mut self, index: &ConcatenatedIndex) -> Option<String> {
        let anchor = self.anchor.take();
        let current = self.current.take();
        let backwards = self.backwards;
        self.dragging = false;
        self.backwards = false;

        let (anchor, current) = (anchor?, current?);
        let (start, end) = if backwards {
            (
                index.global_offset(current.run, current.offset),
                index.global_offset(anchor.run, anchor.offset),
            )
        } else {
            (
                index.global_offset(anchor.run, anchor.offset),
                index.global_offset(current.run, current.offset + 1),
            )
        };

        match (start, end) {
            (Some(start), Some(end)) if start < end => Some(index.text()[start..end].to_string()),
            _ => {
                warn!(
                    "selection range construction failed ({:?}..{:?}), skipping emission",
                    anchor.run, current.run
                );
                None
            }
        }
    }

    /// Reset without emitting (container unmounted, pointer capture lost).
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.anchor = None;
        self.current = None;
        self.backwards = false;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn is_backwards(&self) -> bool {
        self.backwards
    }

    /// Both endpoints, once the drag has touched text.
    #[must_use]
    pub fn endpoints(&self) -> Option<(HighlightEnd, HighlightEnd)> {
        Some((self.anchor?, self.current?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::highlight::types::PageWindow;
    use crate::text_layer::{PageText, RunId, TextArena};

    fn index_of(pages: &[&[&str]]) -> ConcatenatedIndex {
        let arena = TextArena::new();
        for (page, runs) in pages.iter().enumerate() {
            arena.insert(Arc::new(PageText::assemble(
                page,
                runs.iter().map(|r| (*r).to_string()).collect(),
            )));
        }
        ConcatenatedIndex::build(&arena, PageWindow::new(0, pages.len().max(1) - 1))
    }

    fn hover(run: RunId, offset: usize) -> HighlightEnd {
        HighlightEnd {
            run,
            offset,
            px_start: Some(offset as f32 * 8.0),
            px_end: Some((offset + 1) as f32 * 8.0),
        }
    }

    fn edge(run: RunId, offset: usize) -> HighlightEnd {
        HighlightEnd {
            run,
            offset,
            px_start: None,
            px_end: None,
        }
    }

    #[test]
    fn starts_idle_with_no_endpoints() {
        let tracker = SelectionTracker::new();
        assert!(!tracker.is_dragging());
        assert!(tracker.endpoints().is_none());
    }

    #[test]
    fn hover_while_idle_is_ignored() {
        let mut tracker = SelectionTracker::new();
        tracker.update_hover(hover(RunId::new(0, 0), 3));
        assert!(tracker.endpoints().is_none());
    }

    #[test]
    fn first_hover_seeds_both_endpoints() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 3));

        let (anchor, current) = tracker.endpoints().unwrap();
        assert_eq!(anchor.offset, 3);
        assert_eq!(current.offset, 3);
        assert!(!tracker.is_backwards());
    }

    #[test]
    fn anchor_follows_pointer_within_its_own_run_then_freezes() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 3));
        tracker.update_hover(hover(RunId::new(0, 0), 7));

        let (anchor, _) = tracker.endpoints().unwrap();
        assert_eq!(anchor.offset, 7);

        tracker.update_hover(hover(RunId::new(0, 1), 2));
        let (anchor, current) = tracker.endpoints().unwrap();
        assert_eq!(anchor.run, RunId::new(0, 0));
        assert_eq!(anchor.offset, 7);
        assert_eq!(current.run, RunId::new(0, 1));
    }

    #[test]
    fn dragging_to_an_earlier_run_marks_backwards() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 1), 5));
        tracker.update_hover(hover(RunId::new(0, 0), 2));

        assert!(tracker.is_backwards());
        let (anchor, _) = tracker.endpoints().unwrap();
        assert_eq!(anchor.run, RunId::new(0, 1));
    }

    #[test]
    fn focus_update_keeps_the_anchor_and_recomputes_direction() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 5));
        tracker.update_focus(edge(RunId::new(0, 0), 0));

        let (anchor, current) = tracker.endpoints().unwrap();
        assert_eq!(anchor.offset, 5);
        assert_eq!(current.offset, 0);
        assert!(tracker.is_backwards());
    }

    #[test]
    fn focus_update_without_anchor_is_ignored() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_focus(edge(RunId::new(0, 0), 0));
        assert!(tracker.endpoints().is_none());
    }

    #[test]
    fn finish_reads_forward_text_on_a_forward_drag() {
        let index = index_of(&[&["The quick brown fox"]]);
        let run = RunId::new(0, 0);

        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(run, 4));
        tracker.update_focus(edge(run, 8));

        assert_eq!(tracker.finish(&index).as_deref(), Some("quick"));
        assert!(!tracker.is_dragging());
        assert!(tracker.endpoints().is_none());
    }

    #[test]
    fn finish_excludes_the_anchor_character_on_a_backward_drag() {
        let index = index_of(&[&["The quick brown fox"]]);
        let run = RunId::new(0, 0);

        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(run, 8));
        tracker.update_focus(edge(run, 4));

        assert_eq!(tracker.finish(&index).as_deref(), Some("quic"));
    }

    #[test]
    fn finish_reads_forward_across_runs_either_direction() {
        let index = index_of(&[&["The quick ", "brown fox"]]);
        let first = RunId::new(0, 0);
        let second = RunId::new(0, 1);

        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(first, 4));
        tracker.update_hover(hover(second, 4));
        assert!(!tracker.is_backwards());
        assert_eq!(tracker.finish(&index).as_deref(), Some("quick brown"));

        tracker.pointer_down();
        tracker.update_hover(hover(second, 4));
        tracker.update_hover(hover(first, 4));
        assert!(tracker.is_backwards());
        assert_eq!(tracker.finish(&index).as_deref(), Some("quick brow"));
    }

    #[test]
    fn finish_skips_emission_when_a_run_left_the_window() {
        let full = index_of(&[&["The quick ", "brown fox"]]);
        let evicted = ConcatenatedIndex::default();

        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 4));
        tracker.update_hover(hover(RunId::new(0, 1), 2));

        assert!(tracker.finish(&evicted).is_none());
        assert!(!tracker.is_dragging());
        assert!(tracker.endpoints().is_none());

        // State was reset regardless; a fresh drag works again.
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 0));
        tracker.update_focus(edge(RunId::new(0, 0), 2));
        assert_eq!(tracker.finish(&full).as_deref(), Some("The"));
    }

    #[test]
    fn finish_without_endpoints_emits_nothing() {
        let index = index_of(&[&["text"]]);
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        assert!(tracker.finish(&index).is_none());
    }

    #[test]
    fn cancel_resets_without_emitting() {
        let mut tracker = SelectionTracker::new();
        tracker.pointer_down();
        tracker.update_hover(hover(RunId::new(0, 0), 3));
        tracker.cancel();

        assert!(!tracker.is_dragging());
        assert!(tracker.endpoints().is_none());
    }
}
