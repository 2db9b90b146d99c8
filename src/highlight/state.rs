//! Recompute triggers
//!
//! Pure decision table between host events and engine work: each command
//! updates the bookkeeping and answers with the effects the coordinator
//! must execute, in order. Keeping this free of I/O makes the trigger
//! rules testable without a layout or painter.

use super::types::{PageWindow, Query};

/// Host events that can change what is highlighted.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Active query changed; `None` or empty text clears the search.
    QuerySet(Option<Query>),
    /// The virtualization collaborator loaded a new page range.
    WindowSet(PageWindow),
    /// The displayed page changed.
    CurrentPageSet(usize),
    /// A page's text became available. `first_time` marks the first ready
    /// signal for that page in this window.
    PageReady { page: usize, first_time: bool },
    /// A page's text failed to materialize.
    PageFailed { page: usize },
    /// Render scale changed; every measured box is void.
    ScaleChanged,
    /// A different document was loaded into the viewer.
    DocumentChanged,
    /// A page's overlay surface (re)mounted and wants its boxes painted.
    OverlayMounted(usize),
}

/// Work the coordinator performs in response to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Run the locate, map, paint pipeline for the active query.
    Relocate,
    /// Drop all boxes and clear every overlay in the paint band.
    ClearHighlights,
    /// Evict arena, sorted-run and geometry entries outside the band.
    TrimCaches(PageWindow),
    /// Wipe measured geometry.
    InvalidateGeometry,
    /// Drop all materialized page text.
    ResetArena,
    /// Paint one page from the current box map.
    RepaintPage(usize),
}

/// Query and window bookkeeping plus the command decision table.
#[derive(Debug)]
pub struct EngineState {
    overscan: usize,
    window: PageWindow,
    current_page: usize,
    query: Option<Query>,
    /// Query text the current box map was computed for.
    highlighted: Option<String>,
}

impl EngineState {
    #[must_use]
    pub fn new(overscan: usize) -> Self {
        Self {
            overscan,
            window: PageWindow::default(),
            current_page: 0,
            query: None,
            highlighted: None,
        }
    }

    /// Apply one command, answering the effects to execute in order.
    pub fn apply(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::QuerySet(query) => {
                self.query = query.filter(|q| !q.text.is_empty());
                if self.query.is_some() {
                    vec![Effect::Relocate]
                } else {
                    self.highlighted = None;
                    vec![Effect::ClearHighlights]
                }
            }
            Command::WindowSet(window) => {
                self.window = window;
                Vec::new()
            }
            Command::CurrentPageSet(page) => {
                self.current_page = page;
                let mut effects = vec![Effect::TrimCaches(self.band())];
                if self.query.is_some() && self.is_stale() {
                    effects.push(Effect::Relocate);
                }
                effects
            }
            Command::PageReady { page: _, first_time } => {
                if self.query.is_some() && (self.is_stale() || first_time) {
                    vec![Effect::Relocate]
                } else {
                    Vec::new()
                }
            }
            Command::PageFailed { .. } => Vec::new(),
            Command::ScaleChanged => {
                self.highlighted = None;
                let mut effects = vec![Effect::InvalidateGeometry];
                if self.query.is_some() {
                    effects.push(Effect::Relocate);
                }
                effects
            }
            Command::DocumentChanged => {
                self.highlighted = None;
                vec![
                    Effect::InvalidateGeometry,
                    Effect::ResetArena,
                    Effect::ClearHighlights,
                ]
            }
            Command::OverlayMounted(page) => vec![Effect::RepaintPage(page)],
        }
    }

    /// Record that the box map now reflects `text`.
    pub fn mark_highlighted(&mut self, text: &str) {
        self.highlighted = Some(text.to_string());
    }

    /// The painted boxes do not belong to the active query.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.query.as_ref().map(|q| q.text.as_str()) != self.highlighted.as_deref()
    }

    #[must_use]
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Pages kept warm around the displayed one.
    #[must_use]
    pub fn band(&self) -> PageWindow {
        PageWindow::around(self.current_page, self.overscan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_query(text: &str) -> EngineState {
        let mut state = EngineState::new(1);
        state.apply(Command::QuerySet(Some(Query::fuzzy(text))));
        state
    }

    #[test]
    fn setting_a_query_relocates() {
        let mut state = EngineState::new(1);
        let effects = state.apply(Command::QuerySet(Some(Query::fuzzy("cat"))));
        assert_eq!(effects, vec![Effect::Relocate]);
        assert!(state.is_stale());
    }

    #[test]
    fn clearing_the_query_clears_highlights() {
        let mut state = with_query("cat");
        state.mark_highlighted("cat");

        assert_eq!(
            state.apply(Command::QuerySet(None)),
            vec![Effect::ClearHighlights]
        );
        assert!(!state.is_stale());
    }

    #[test]
    fn empty_query_text_counts_as_clearing() {
        let mut state = with_query("cat");
        let effects = state.apply(Command::QuerySet(Some(Query::fuzzy(""))));
        assert_eq!(effects, vec![Effect::ClearHighlights]);
        assert!(state.query().is_none());
    }

    #[test]
    fn page_ready_relocates_until_the_query_is_painted() {
        let mut state = with_query("cat");

        let effects = state.apply(Command::PageReady { page: 0, first_time: false });
        assert_eq!(effects, vec![Effect::Relocate]);

        state.mark_highlighted("cat");
        let effects = state.apply(Command::PageReady { page: 0, first_time: false });
        assert_eq!(effects, vec![]);

        // A page this window has not seen can hold a better match.
        let effects = state.apply(Command::PageReady { page: 1, first_time: true });
        assert_eq!(effects, vec![Effect::Relocate]);
    }

    #[test]
    fn page_ready_without_a_query_is_idle() {
        let mut state = EngineState::new(1);
        let effects = state.apply(Command::PageReady { page: 0, first_time: true });
        assert_eq!(effects, vec![]);
    }

    #[test]
    fn page_failures_trigger_nothing() {
        let mut state = with_query("cat");
        assert_eq!(state.apply(Command::PageFailed { page: 2 }), vec![]);
    }

    #[test]
    fn current_page_move_trims_and_relocates_only_when_stale() {
        let mut state = with_query("cat");
        state.mark_highlighted("cat");

        let effects = state.apply(Command::CurrentPageSet(5));
        assert_eq!(effects, vec![Effect::TrimCaches(PageWindow::new(4, 6))]);

        state.apply(Command::QuerySet(Some(Query::fuzzy("dog"))));
        let effects = state.apply(Command::CurrentPageSet(6));
        assert_eq!(
            effects,
            vec![Effect::TrimCaches(PageWindow::new(5, 7)), Effect::Relocate]
        );
    }

    #[test]
    fn scale_change_invalidates_and_relocates_eagerly() {
        let mut state = with_query("cat");
        state.mark_highlighted("cat");

        let effects = state.apply(Command::ScaleChanged);
        assert_eq!(effects, vec![Effect::InvalidateGeometry, Effect::Relocate]);
        assert!(state.is_stale());

        let mut idle = EngineState::new(1);
        assert_eq!(
            idle.apply(Command::ScaleChanged),
            vec![Effect::InvalidateGeometry]
        );
    }

    #[test]
    fn document_change_resets_everything_but_the_query() {
        let mut state = with_query("cat");
        state.mark_highlighted("cat");

        let effects = state.apply(Command::DocumentChanged);
        assert_eq!(
            effects,
            vec![
                Effect::InvalidateGeometry,
                Effect::ResetArena,
                Effect::ClearHighlights,
            ]
        );
        assert_eq!(state.query().map(|q| q.text.as_str()), Some("cat"));
        assert!(state.is_stale());
    }

    #[test]
    fn window_set_stores_without_effects() {
        let mut state = with_query("cat");
        assert_eq!(state.apply(Command::WindowSet(PageWindow::new(3, 9))), vec![]);
        assert_eq!(state.window(), PageWindow::new(3, 9));
    }

    #[test]
    fn overlay_mount_repaints_that_page() {
        let mut state = EngineState::new(1);
        let effects = state.apply(Command::OverlayMounted(3));
        assert_eq!(effects, vec![Effect::RepaintPage(3)]);
    }
}
