//! Page-in-focus and nearest-run resolution for drags over empty space

use crate::geometry::RectPx;
use crate::provider::LayoutProbe;
use crate::text_layer::{PageText, RunId};

use super::types::PageWindow;

/// Top-coordinate slack when grouping runs into visual lines for sorting.
const SORT_LINE_ALLOWANCE: f32 = 5.0;
/// Top-coordinate slack when walking back to the start of a line.
const FOCUS_LINE_ALLOWANCE: f32 = 10.0;

/// One run with its page-relative box, held in visual order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SortedRun {
    pub run: RunId,
    pub rect: RectPx,
}

/// Build a page's visual-order run list: top to bottom, left to right,
/// tops within the sort allowance treated as one line. `None` when any
/// run cannot be measured; the caller retries on the next ready signal.
pub fn sort_runs<P>(page: usize, text: &PageText, probe: &P) -> Option<Vec<SortedRun>>
where
    P: LayoutProbe + ?Sized,
{
    let page_box = probe.page_box(page)?;

    let mut runs = Vec::with_capacity(text.run_count());
    for i in 0..text.run_count() {
        let run = RunId::new(page, i);
        let rect = probe.run_box(run)?.relative_to(&page_box);
        runs.push(SortedRun { run, rect });
    }

    // Runs group into visual lines off each line's first top; comparing
    // tops pairwise with an allowance is not a total order, so the line
    // split happens before any sort.
    runs.sort_by(|a, b| a.rect.top.total_cmp(&b.rect.top));

    let mut out = Vec::with_capacity(runs.len());
    let mut line: Vec<SortedRun> = Vec::new();
    for run in runs {
        let next_line = line
            .first()
            .is_some_and(|first| run.rect.top - first.rect.top > SORT_LINE_ALLOWANCE);
        if next_line {
            line.sort_by(|a, b| a.rect.left.total_cmp(&b.rect.left));
            out.append(&mut line);
        }
        line.push(run);
    }
    line.sort_by(|a, b| a.rect.left.total_cmp(&b.rect.left));
    out.append(&mut line);

    Some(out)
}

/// The window page whose layout box vertically contains `y` (absolute).
pub fn page_in_focus<P>(window: PageWindow, probe: &P, y: f32) -> Option<usize>
where
    P: LayoutProbe + ?Sized,
{
    window
        .pages()
        .find(|&page| probe.page_box(page).is_some_and(|b| b.contains_y(y)))
}

/// Resolve a page-relative drag position over empty space to the nearest
/// run.
///
/// The scan finds the last run whose top is at or above the cursor, walks
/// back to the first run on that visual line, then decides by horizontal
/// position whether the cursor sits before the line start or within/after
/// the line. Selection direction breaks the tie: growing backwards leans
/// toward the following run, growing forwards toward the preceding one.
pub fn closest_run(runs: &[SortedRun], x: f32, y: f32, backwards: bool) -> Option<RunId> {
    if runs.is_empty() {
        return None;
    }

    let mut i = 0;
    while i + 1 < runs.len() && runs[i + 1].rect.top <= y {
        i += 1;
    }

    let mut j = i;
    while j > 0 && (runs[i].rect.top - runs[j - 1].rect.top).abs() <= FOCUS_LINE_ALLOWANCE {
        j -= 1;
    }

    if runs[i].rect.bottom() > y && x < runs[j].rect.left {
        // Cursor sits in the margin before the line start.
        return if backwards {
            Some(runs[j].run)
        } else {
            (j > 0).then(|| runs[j - 1].run)
        };
    }

    if backwards {
        runs.get(i + 1).map(|r| r.run)
    } else {
        Some(runs[i].run)
    }
}
